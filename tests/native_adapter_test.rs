//! Integration tests for the native adapter and its platform bootstrap.
//!
//! The bundled asset is simulated with a real SQLite file seeded through a
//! direct driver connection, then opened through the adapter the way each
//! platform would.

use std::path::Path;

use loadmaster_db::config::{NativeConfig, Platform};
use loadmaster_db::db::NativeDatabase;
use loadmaster_db::{DbError, SqlParam, SqlStatement};
use serde_json::json;

mod common;

/// Directory layout standing in for the platform's asset/bundle/document
/// locations.
struct Dirs {
    _root: tempfile::TempDir,
    asset: std::path::PathBuf,
    bundle: std::path::PathBuf,
    docs: std::path::PathBuf,
}

fn dirs() -> Dirs {
    common::init_tracing();
    let root = tempfile::tempdir().unwrap();
    let asset = root.path().join("assets");
    let bundle = root.path().join("bundle");
    let docs = root.path().join("docs");
    std::fs::create_dir_all(&asset).unwrap();
    std::fs::create_dir_all(&bundle).unwrap();
    Dirs {
        _root: root,
        asset,
        bundle,
        docs,
    }
}

/// Write a pre-populated database file where the platform would ship it.
fn seed_asset(dir: &Path) {
    let conn = rusqlite::Connection::open(dir.join("loadmaster.db")).unwrap();
    conn.execute_batch(
        "CREATE TABLE items (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, weight REAL);
         INSERT INTO items (name, weight) VALUES ('Seeded', 100.0);",
    )
    .unwrap();
}

fn android_config(d: &Dirs) -> NativeConfig {
    NativeConfig::new(Platform::Android, &d.asset, &d.bundle, &d.docs)
}

#[tokio::test]
async fn test_android_copies_asset_on_first_open() {
    let d = dirs();
    seed_asset(&d.asset);

    let db = NativeDatabase::open(&android_config(&d)).await.unwrap();
    let resp = db.execute_query("SELECT name FROM items", &[]).await;
    assert_eq!(resp.count, 1);
    assert_eq!(resp.results[0].data().unwrap()["name"], json!("Seeded"));

    // The adapter works on the writable copy, not the asset.
    assert!(d.docs.join("loadmaster.db").exists());
}

#[tokio::test]
async fn test_android_second_open_keeps_writes() {
    let d = dirs();
    seed_asset(&d.asset);

    {
        let db = NativeDatabase::open(&android_config(&d)).await.unwrap();
        let resp = db
            .execute_query(
                "INSERT INTO items (name) VALUES (?)",
                &[SqlParam::from("Added")],
            )
            .await;
        assert!(!resp.is_err());
        db.close().await;
    }

    // Re-open: the existing copy must be reused, not clobbered by the asset.
    let db = NativeDatabase::open(&android_config(&d)).await.unwrap();
    let resp = db.execute_query("SELECT name FROM items ORDER BY id", &[]).await;
    assert_eq!(resp.count, 2);
    assert_eq!(resp.results[1].data().unwrap()["name"], json!("Added"));

    // The shipped asset is untouched.
    let asset = rusqlite::Connection::open(d.asset.join("loadmaster.db")).unwrap();
    let rows: i64 = asset
        .query_row("SELECT COUNT(*) FROM items", [], |r| r.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_ios_opens_bundle_directly() {
    let d = dirs();
    seed_asset(&d.bundle);

    let config = NativeConfig::new(Platform::Ios, &d.asset, &d.bundle, &d.docs);
    let db = NativeDatabase::open(&config).await.unwrap();
    let resp = db.execute_query("SELECT name FROM items", &[]).await;
    assert_eq!(resp.count, 1);

    // No copy is made.
    assert!(!d.docs.join("loadmaster.db").exists());
}

#[tokio::test]
async fn test_ios_missing_bundle_fails_bootstrap() {
    let d = dirs();
    let config = NativeConfig::new(Platform::Ios, &d.asset, &d.bundle, &d.docs);
    let err = NativeDatabase::open(&config).await.unwrap_err();
    assert!(matches!(err, DbError::Bootstrap { .. }));
}

#[tokio::test]
async fn test_windows_copies_from_bundle() {
    let d = dirs();
    seed_asset(&d.bundle);

    let config = NativeConfig::new(Platform::Windows, &d.asset, &d.bundle, &d.docs);
    let db = NativeDatabase::open(&config).await.unwrap();
    let resp = db.execute_query("SELECT name FROM items", &[]).await;
    assert_eq!(resp.count, 1);
    assert!(d.docs.join("loadmaster.db").exists());
}

#[tokio::test]
async fn test_mutation_response_carries_changes_and_id() {
    let d = dirs();
    seed_asset(&d.asset);
    let db = NativeDatabase::open(&android_config(&d)).await.unwrap();

    let resp = db
        .execute_query(
            "INSERT INTO items (name, weight) VALUES (?, ?)",
            &[SqlParam::from("Crate"), SqlParam::from(42.5)],
        )
        .await;
    assert_eq!(resp.count, 1);
    assert_eq!(resp.results[0].changes(), Some(1));
    assert_eq!(resp.results[0].last_insert_id(), Some(2));
}

#[tokio::test]
async fn test_null_and_real_columns_decode() {
    let d = dirs();
    seed_asset(&d.asset);
    let db = NativeDatabase::open(&android_config(&d)).await.unwrap();

    db.execute_query("INSERT INTO items (name, weight) VALUES ('NoWeight', NULL)", &[])
        .await;
    let resp = db
        .execute_query(
            "SELECT weight FROM items WHERE name = ?",
            &[SqlParam::from("NoWeight")],
        )
        .await;
    assert_eq!(resp.results[0].data().unwrap()["weight"], json!(null));

    let resp = db
        .execute_query(
            "SELECT weight FROM items WHERE name = ?",
            &[SqlParam::from("Seeded")],
        )
        .await;
    assert_eq!(resp.results[0].data().unwrap()["weight"], json!(100.0));
}

#[tokio::test]
async fn test_query_error_absorbed_into_response() {
    let d = dirs();
    seed_asset(&d.asset);
    let db = NativeDatabase::open(&android_config(&d)).await.unwrap();

    let resp = db.execute_query("SELECT * FROM no_such_table", &[]).await;
    assert!(resp.is_err());
    assert!(resp.results.is_empty());
    assert_eq!(resp.count, 0);
}

#[tokio::test]
async fn test_transaction_commit_and_rollback() {
    let d = dirs();
    seed_asset(&d.asset);
    let db = NativeDatabase::open(&android_config(&d)).await.unwrap();

    let responses = db
        .execute_transaction(&[
            SqlStatement::new("INSERT INTO items (name) VALUES (?)").with_param("TxA"),
            SqlStatement::new("INSERT INTO items (name) VALUES (?)").with_param("TxB"),
        ])
        .await
        .unwrap();
    assert_eq!(responses.len(), 2);

    let err = db
        .execute_transaction(&[
            SqlStatement::new("INSERT INTO items (name) VALUES (?)").with_param("Doomed"),
            SqlStatement::new("INSERT INTO items (name) VALUES (NULL)"),
        ])
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Transaction { index: 1, .. }));

    let resp = db.execute_query("SELECT COUNT(*) AS n FROM items", &[]).await;
    // Seeded + TxA + TxB; the rolled-back pair left nothing behind.
    assert_eq!(resp.results[0].data().unwrap()["n"], json!(3));
}

#[tokio::test]
async fn test_schema_script_applies_twice() {
    let d = dirs();
    seed_asset(&d.asset);
    let db = NativeDatabase::open(&android_config(&d)).await.unwrap();

    let sql = loadmaster_db::db::generate_schema_sql();
    db.initialize_schema(&sql).await.unwrap();
    db.initialize_schema(&sql).await.unwrap();

    let resp = db
        .execute_query(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'mission'",
            &[],
        )
        .await;
    assert_eq!(resp.count, 1);
}

#[tokio::test]
async fn test_malformed_schema_script_propagates() {
    let d = dirs();
    seed_asset(&d.asset);
    let db = NativeDatabase::open(&android_config(&d)).await.unwrap();

    let err = db
        .initialize_schema("CREATE TABLE broken (id INTEGER")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Schema { .. }));
}
