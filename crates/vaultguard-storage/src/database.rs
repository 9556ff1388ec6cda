// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and schema.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use tracing::debug;
use vaultguard_core::VaultError;

/// Current schema version, stored in `PRAGMA user_version`.
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA_V1: &str = "
CREATE TABLE IF NOT EXISTS index_entries (
    label TEXT PRIMARY KEY NOT NULL,
    content_id TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_index_entries_content_id ON index_entries(content_id);
CREATE TABLE IF NOT EXISTS tombstones (
    content_id TEXT PRIMARY KEY NOT NULL,
    label TEXT NOT NULL,
    deleted_at TEXT NOT NULL
);
";

/// Convert a tokio-rusqlite error into VaultError::Storage.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> VaultError {
    VaultError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the index database.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` and bring the schema
    /// up to date.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, VaultError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| VaultError::Storage {
                    source: Box::new(e),
                })?;
            }
        }
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| VaultError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.prepare(true).await?;
        debug!(path = %path.display(), "index database opened");
        Ok(db)
    }

    /// A private in-memory database.
    pub async fn open_in_memory() -> Result<Self, VaultError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| VaultError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    async fn prepare(&self, wal: bool) -> Result<(), VaultError> {
        let version = self
            .conn
            .call(move |conn| -> Result<i64, rusqlite::Error> {
                if wal {
                    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
                }
                conn.execute_batch("PRAGMA busy_timeout=5000;")?;

                let version: i64 =
                    conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
                if version < SCHEMA_VERSION {
                    let tx = conn.transaction()?;
                    tx.execute_batch(SCHEMA_V1)?;
                    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
                    tx.commit()?;
                }
                Ok(version)
            })
            .await
            .map_err(map_tr_err)?;

        if version > SCHEMA_VERSION {
            return Err(VaultError::Storage {
                source: format!(
                    "index database schema version {version} is newer than supported {SCHEMA_VERSION}"
                )
                .into(),
            });
        }
        Ok(())
    }

    /// Flush the WAL into the main database file.
    pub async fn checkpoint(&self) -> Result<(), VaultError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}
