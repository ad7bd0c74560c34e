use std::sync::Arc;

use storage::repository::{KeyValueStore, StorageError};

/// Storage key under which the best score is kept.
pub const HIGH_SCORE_KEY: &str = "quizHighScore";

/// Reads and writes the persisted best score.
///
/// The value is stored as a decimal string. Anything absent or unparseable
/// reads as zero.
#[derive(Clone)]
pub struct HighScoreService {
    store: Arc<dyn KeyValueStore>,
}

impl HighScoreService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Current high score. Storage failures are logged and read as zero.
    pub async fn load(&self) -> u32 {
        match self.store.get(HIGH_SCORE_KEY).await {
            Ok(Some(raw)) => raw.trim().parse::<u32>().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "stored high score is not a number, treating as 0");
                0
            }),
            Ok(None) => 0,
            Err(err) => {
                tracing::warn!(error = %err, "failed to read high score, treating as 0");
                0
            }
        }
    }

    /// Persist `score` if it beats the stored value.
    ///
    /// Returns whether a write happened.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails.
    pub async fn record(&self, score: u32) -> Result<bool, StorageError> {
        let current = self.load().await;
        if score <= current {
            return Ok(false);
        }
        self.store.set(HIGH_SCORE_KEY, &score.to_string()).await?;
        tracing::info!(score, previous = current, "new high score saved");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;

    fn service() -> (HighScoreService, Arc<InMemoryRepository>) {
        let repo = Arc::new(InMemoryRepository::new());
        (HighScoreService::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn absent_value_reads_as_zero() {
        let (svc, _) = service();
        assert_eq!(svc.load().await, 0);
    }

    #[tokio::test]
    async fn garbage_value_reads_as_zero() {
        let (svc, repo) = service();
        repo.set(HIGH_SCORE_KEY, "not-a-number").await.unwrap();
        assert_eq!(svc.load().await, 0);
    }

    struct BrokenStore;

    #[async_trait::async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Connection("disk unavailable".into()))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Connection("disk unavailable".into()))
        }
    }

    #[tokio::test]
    async fn storage_failures_read_as_zero_and_surface_on_write() {
        let svc = HighScoreService::new(Arc::new(BrokenStore));
        assert_eq!(svc.load().await, 0);
        assert!(svc.record(10).await.is_err());
    }

    #[tokio::test]
    async fn record_only_writes_strictly_greater_scores() {
        let (svc, repo) = service();
        assert!(svc.record(40).await.unwrap());
        assert!(!svc.record(40).await.unwrap());
        assert!(!svc.record(12).await.unwrap());
        assert_eq!(repo.get(HIGH_SCORE_KEY).await.unwrap().as_deref(), Some("40"));
        assert!(svc.record(41).await.unwrap());
        assert_eq!(svc.load().await, 41);
    }
}
