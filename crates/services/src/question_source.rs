use std::collections::HashSet;
use std::env;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::ACCEPT;
use serde_json::Value;

use quiz_core::model::{Question, QuestionDraft};

use crate::error::QuestionSourceError;
use crate::fallback::fallback_questions;

pub const DEFAULT_API_URL: &str = "https://api.jsonserve.com/Uw5CrX";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct QuestionSourceConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl QuestionSourceConfig {
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `QUIZ_API_URL` / `QUIZ_API_TIMEOUT_MS`.
    ///
    /// Returns `None` when `QUIZ_OFFLINE` is set to a truthy value, which
    /// leaves only the bundled questions.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let offline = env::var("QUIZ_OFFLINE")
            .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);
        if offline {
            return None;
        }
        let endpoint = env::var("QUIZ_API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.into());
        let timeout = env::var("QUIZ_API_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .map_or(DEFAULT_TIMEOUT, Duration::from_millis);
        Some(Self { endpoint, timeout })
    }
}

/// Supplies the question set once at startup.
///
/// Tries the remote endpoint a single time and falls back to the bundled
/// questions on any failure.
#[derive(Clone)]
pub struct QuestionSource {
    client: Client,
    config: Option<QuestionSourceConfig>,
}

impl QuestionSource {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(QuestionSourceConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<QuestionSourceConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Only the bundled questions, no network.
    #[must_use]
    pub fn offline() -> Self {
        Self::new(None)
    }

    /// Load the question set. Never fails: any remote problem resolves to the
    /// bundled fallback collection.
    pub async fn load(&self) -> Vec<Question> {
        match self.fetch().await {
            Ok(questions) => {
                tracing::info!(count = questions.len(), "loaded questions from remote source");
                questions
            }
            Err(QuestionSourceError::Disabled) => {
                tracing::info!("remote question source disabled, using bundled questions");
                fallback_questions()
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch questions, falling back to bundled set");
                fallback_questions()
            }
        }
    }

    /// One bounded attempt against the remote endpoint.
    ///
    /// # Errors
    ///
    /// Returns `QuestionSourceError` when the source is disabled, the request
    /// fails or times out, the status is not 2xx, or the payload does not
    /// validate.
    pub async fn fetch(&self) -> Result<Vec<Question>, QuestionSourceError> {
        let config = self.config.as_ref().ok_or(QuestionSourceError::Disabled)?;

        tracing::debug!(endpoint = %config.endpoint, "requesting questions");
        let body = tokio::time::timeout(config.timeout, self.request(config))
            .await
            .map_err(|_| QuestionSourceError::Timeout(config.timeout))??;

        parse_questions(body)
    }

    async fn request(&self, config: &QuestionSourceConfig) -> Result<Value, QuestionSourceError> {
        let response = self
            .client
            .get(&config.endpoint)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(QuestionSourceError::HttpStatus(response.status()));
        }

        Ok(response.json::<Value>().await?)
    }
}

/// Validate a decoded payload into questions.
///
/// The payload must be a non-empty array where every element has the question
/// shape with exact JSON types and unique ids.
///
/// # Errors
///
/// Returns the first `QuestionSourceError` found.
pub fn parse_questions(body: Value) -> Result<Vec<Question>, QuestionSourceError> {
    let Value::Array(records) = body else {
        return Err(QuestionSourceError::NotAnArray);
    };
    if records.is_empty() {
        return Err(QuestionSourceError::EmptyPayload);
    }

    let mut seen = HashSet::with_capacity(records.len());
    let mut questions = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let draft: QuestionDraft = serde_json::from_value(record).map_err(|err| {
            QuestionSourceError::InvalidRecord {
                index,
                reason: err.to_string(),
            }
        })?;
        let question = draft
            .validate()
            .map_err(|err| QuestionSourceError::InvalidRecord {
                index,
                reason: err.to_string(),
            })?;
        if !seen.insert(question.id()) {
            return Err(QuestionSourceError::DuplicateId(question.id()));
        }
        questions.push(question);
    }

    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::QuestionId;
    use serde_json::json;

    fn record(id: i64) -> Value {
        json!({
            "id": id,
            "question": format!("Question {id}?"),
            "options": ["a", "b", "c"],
            "correctAnswer": "b",
            "points": 10,
            "category": "General"
        })
    }

    #[test]
    fn parses_valid_array_in_order() {
        let questions = parse_questions(json!([record(3), record(1)])).unwrap();
        let ids: Vec<_> = questions.iter().map(Question::id).collect();
        assert_eq!(ids, vec![QuestionId::new(3), QuestionId::new(1)]);
    }

    #[test]
    fn rejects_non_array_and_empty_payloads() {
        assert!(matches!(
            parse_questions(json!({"questions": []})),
            Err(QuestionSourceError::NotAnArray)
        ));
        assert!(matches!(
            parse_questions(json!([])),
            Err(QuestionSourceError::EmptyPayload)
        ));
    }

    #[test]
    fn one_bad_element_rejects_the_whole_payload() {
        let mut bad = record(2);
        bad["points"] = json!("10");
        let err = parse_questions(json!([record(1), bad])).unwrap_err();
        assert!(matches!(err, QuestionSourceError::InvalidRecord { index: 1, .. }));
    }

    #[test]
    fn rejects_non_string_options_and_blank_prompt() {
        let mut numeric_options = record(1);
        numeric_options["options"] = json!([1, 2, 3]);
        assert!(parse_questions(json!([numeric_options])).is_err());

        let mut blank = record(1);
        blank["question"] = json!("");
        assert!(matches!(
            parse_questions(json!([blank])),
            Err(QuestionSourceError::InvalidRecord { index: 0, .. })
        ));
    }

    #[test]
    fn rejects_duplicate_ids() {
        assert!(matches!(
            parse_questions(json!([record(4), record(4)])),
            Err(QuestionSourceError::DuplicateId(id)) if id == QuestionId::new(4)
        ));
    }

    #[tokio::test]
    async fn offline_source_loads_fallback() {
        let source = QuestionSource::offline();
        let questions = source.load().await;
        assert_eq!(questions, fallback_questions());
    }
}
