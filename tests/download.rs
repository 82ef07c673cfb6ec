use sqlite_snapshot::{connect, download, Error, Fetcher, SnapshotConfig};
use std::path::PathBuf;
use tempfile::tempdir;
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

/// Bytes of a small SQLite file holding one `scores` table with 3 rows
fn scores_db_bytes() -> Vec<u8> {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("source.db");
    let conn = rusqlite::Connection::open(&db_path).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE scores (id INTEGER PRIMARY KEY, student TEXT, score REAL);
        INSERT INTO scores (student, score) VALUES ('ann', 71.5), ('bob', 64), ('cy', 88);
        "#,
    )
    .unwrap();
    conn.close().unwrap();
    std::fs::read(&db_path).unwrap()
}

async fn serve(route: &str, status: u16, body: Vec<u8>) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_bytes(body))
        .mount(&server)
        .await;
    server
}

// The blocking client must not run on an async worker thread.
async fn download_blocking(url: String, dest: PathBuf) -> sqlite_snapshot::Result<u64> {
    tokio::task::spawn_blocking(move || download(&url, &dest))
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_download_writes_exact_body() {
    let body = scores_db_bytes();
    let server = serve("/score.db", 200, body.clone()).await;
    let dir = tempdir().unwrap();
    let dest = dir.path().join("score.db");

    let written = download_blocking(format!("{}/score.db", server.uri()), dest.clone())
        .await
        .unwrap();

    assert_eq!(written, body.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), body);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_download_overwrites_and_is_idempotent() {
    let body = b"fresh content".to_vec();
    let server = serve("/file", 200, body.clone()).await;
    let dir = tempdir().unwrap();
    let dest = dir.path().join("file.bin");
    std::fs::write(&dest, vec![b'x'; 4096]).unwrap();

    let url = format!("{}/file", server.uri());
    download_blocking(url.clone(), dest.clone()).await.unwrap();
    let first = std::fs::read(&dest).unwrap();
    download_blocking(url, dest.clone()).await.unwrap();
    let second = std::fs::read(&dest).unwrap();

    assert_eq!(first, body);
    assert_eq!(first, second);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_download_writes_body_of_error_status() {
    let server = serve("/gone", 404, b"not here".to_vec()).await;
    let dir = tempdir().unwrap();
    let dest = dir.path().join("gone.db");

    download_blocking(format!("{}/gone", server.uri()), dest.clone())
        .await
        .unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), b"not here");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_download_into_missing_directory_fails() {
    let server = serve("/score.db", 200, b"data".to_vec()).await;
    let dir = tempdir().unwrap();
    let dest = dir.path().join("no_such_dir").join("score.db");

    let err = download_blocking(format!("{}/score.db", server.uri()), dest.clone())
        .await
        .unwrap_err();
    match err {
        Error::Io { path, .. } => assert_eq!(path, dest),
        other => panic!("expected Io error, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_download_unreachable_host_fails() {
    // Nothing listens on port 1.
    let url = "http://127.0.0.1:1/score.db".to_string();
    let dir = tempdir().unwrap();

    let err = download_blocking(url.clone(), dir.path().join("score.db"))
        .await
        .unwrap_err();
    match err {
        Error::Http { url: failed, .. } => assert_eq!(failed, url),
        other => panic!("expected Http error, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetcher_sends_configured_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/score.db"))
        .and(header("user-agent", "score-check/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    let dir = tempdir().unwrap();
    let config = SnapshotConfig::new(format!("{}/score.db", server.uri()), dir.path().join("score.db"))
        .with_user_agent("score-check/1.0");

    let written = tokio::task::spawn_blocking(move || {
        Fetcher::from_config(&config)?.download(&config.url, &config.db_path)
    })
    .await
    .unwrap()
    .unwrap();
    assert_eq!(written, 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_download_connect_and_load() {
    let server = serve("/score.db", 200, scores_db_bytes()).await;
    let dir = tempdir().unwrap();
    let dest = dir.path().join("score.db");
    let url = format!("{}/score.db", server.uri());

    let tables = tokio::task::spawn_blocking(move || {
        download(&url, &dest).unwrap();
        let db = connect(&dest).unwrap();
        let tables = db.load_all_tables().unwrap();
        db.close().unwrap();
        tables
    })
    .await
    .unwrap();

    assert_eq!(tables.len(), 1);
    assert_eq!(tables.get("scores").unwrap().row_count(), 3);
}
