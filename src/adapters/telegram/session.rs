//! Session management. Persistent grammers session and client bootstrap.
//!
//! Uses grammers-session's SqliteSession for file-based storage so the
//! authorization made by `login` survives across dispatches.

use grammers_session::storages::SqliteSession;
use std::path::Path;
use std::sync::Arc;

/// Opens a persistent session storage at the given path.
///
/// The file is created if it does not exist. Parent directories are created
/// as needed.
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created, or if the
/// SQLite database cannot be opened (e.g. permissions, disk full).
pub async fn open_file_session(path: impl AsRef<Path>) -> anyhow::Result<SqliteSession> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| anyhow::anyhow!("create session directory: {}", e))?;
    }
    SqliteSession::open(path)
        .await
        .map_err(|e| anyhow::anyhow!("open session file: {}", e))
}

/// Create a grammers Client over the session at `session_path`.
///
/// The sender pool runs on a background task for the life of the process.
pub async fn connect_client(
    api_id: i32,
    session_path: &Path,
) -> anyhow::Result<grammers_client::Client> {
    if api_id == 0 {
        anyhow::bail!(
            "Set NOTIFY_API_ID (and NOTIFY_API_HASH) in .env. Get from https://my.telegram.org"
        );
    }

    let session = Arc::new(open_file_session(session_path).await?);
    let pool = grammers_client::SenderPool::new(session, api_id);
    let handle = pool.handle.clone();
    tokio::spawn(async move {
        pool.runner.run().await;
    });
    Ok(grammers_client::Client::new(handle))
}
