use storage::repository::{KeyValueStore, Storage};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_kv_roundtrip_and_overwrite() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get("quizHighScore").await.unwrap(), None);

    repo.set("quizHighScore", "120").await.unwrap();
    assert_eq!(
        repo.get("quizHighScore").await.unwrap().as_deref(),
        Some("120")
    );

    repo.set("quizHighScore", "135").await.unwrap();
    assert_eq!(
        repo.get("quizHighScore").await.unwrap().as_deref(),
        Some("135")
    );
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.set("k", "v").await.unwrap();
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("v"));
}

#[tokio::test]
async fn storage_sqlite_exposes_kv_store() {
    let storage = Storage::sqlite("sqlite:file:memdb_kv_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage.kv.set("quizHighScore", "7").await.unwrap();
    assert_eq!(
        storage.kv.get("quizHighScore").await.unwrap().as_deref(),
        Some("7")
    );
}
