// SPDX-FileCopyrightText: 2026 VaultGuard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the IndexStore trait.

use std::path::Path;

use async_trait::async_trait;
use rusqlite::{OptionalExtension, params};
use tracing::debug;
use vaultguard_config::model::StorageConfig;
use vaultguard_core::{
    AdapterType, ContentId, HealthStatus, IndexEntry, IndexStore, PluginAdapter, VaultError,
};

use crate::database::{Database, map_tr_err};

/// A label row as stored, before the content id is validated.
struct Row {
    label: String,
    content_id: String,
    created_at: String,
}

impl Row {
    fn from_sql(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            label: row.get(0)?,
            content_id: row.get(1)?,
            created_at: row.get(2)?,
        })
    }

    fn into_entry(self) -> Result<IndexEntry, VaultError> {
        Ok(IndexEntry {
            label: self.label,
            content_id: ContentId::new(self.content_id)?,
            created_at: self.created_at,
        })
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Label index persisted in SQLite.
///
/// Deleted entries leave a tombstone keyed by content id, so
/// [`IndexStore::is_known`] stays true after a delete.
#[derive(Clone)]
pub struct SqliteIndex {
    db: Database,
}

impl SqliteIndex {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn open(path: impl AsRef<Path>) -> Result<Self, VaultError> {
        Ok(Self::new(Database::open(path).await?))
    }

    pub async fn from_config(config: &StorageConfig) -> Result<Self, VaultError> {
        Self::open(&config.database_path).await
    }

    pub async fn open_in_memory() -> Result<Self, VaultError> {
        Ok(Self::new(Database::open_in_memory().await?))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl PluginAdapter for SqliteIndex {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Index
    }

    async fn health_check(&self) -> Result<HealthStatus, VaultError> {
        self.db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }
}

#[async_trait]
impl IndexStore for SqliteIndex {
    async fn get(&self, label: &str) -> Result<Option<IndexEntry>, VaultError> {
        let label = label.to_string();
        let row = self
            .db
            .connection()
            .call(move |conn| -> Result<Option<Row>, rusqlite::Error> {
                conn.query_row(
                    "SELECT label, content_id, created_at FROM index_entries WHERE label = ?1",
                    params![label],
                    Row::from_sql,
                )
                .optional()
            })
            .await
            .map_err(map_tr_err)?;
        row.map(Row::into_entry).transpose()
    }

    async fn list(&self) -> Result<Vec<IndexEntry>, VaultError> {
        let rows = self
            .db
            .connection()
            .call(|conn| -> Result<Vec<Row>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT label, content_id, created_at FROM index_entries ORDER BY label",
                )?;
                let rows = stmt.query_map([], Row::from_sql)?;
                rows.collect()
            })
            .await
            .map_err(map_tr_err)?;
        rows.into_iter().map(Row::into_entry).collect()
    }

    async fn insert(&self, entry: &IndexEntry) -> Result<(), VaultError> {
        let entry = entry.clone();
        let label = entry.label.clone();
        let inserted = self
            .db
            .connection()
            .call(move |conn| -> Result<bool, rusqlite::Error> {
                let changed = conn.execute(
                    "INSERT OR IGNORE INTO index_entries (label, content_id, created_at)
                     VALUES (?1, ?2, ?3)",
                    params![entry.label, entry.content_id.as_str(), entry.created_at],
                )?;
                Ok(changed == 1)
            })
            .await
            .map_err(map_tr_err)?;

        if !inserted {
            return Err(VaultError::LabelExists(label));
        }
        debug!(label = %label, "index entry inserted");
        Ok(())
    }

    async fn replace(&self, entry: &IndexEntry) -> Result<Option<IndexEntry>, VaultError> {
        let entry = entry.clone();
        let previous = self
            .db
            .connection()
            .call(move |conn| -> Result<Option<Row>, rusqlite::Error> {
                let tx = conn.transaction()?;
                let previous = tx
                    .query_row(
                        "SELECT label, content_id, created_at FROM index_entries WHERE label = ?1",
                        params![entry.label],
                        Row::from_sql,
                    )
                    .optional()?;
                tx.execute(
                    "DELETE FROM index_entries WHERE label = ?1",
                    params![entry.label],
                )?;
                tx.execute(
                    "INSERT INTO index_entries (label, content_id, created_at) VALUES (?1, ?2, ?3)",
                    params![entry.label, entry.content_id.as_str(), entry.created_at],
                )?;
                tx.commit()?;
                Ok(previous)
            })
            .await
            .map_err(map_tr_err)?;
        previous.map(Row::into_entry).transpose()
    }

    async fn remove(&self, label: &str) -> Result<Option<IndexEntry>, VaultError> {
        let label = label.to_string();
        let deleted_at = now();
        let removed = self
            .db
            .connection()
            .call(move |conn| -> Result<Option<Row>, rusqlite::Error> {
                let tx = conn.transaction()?;
                let removed = tx
                    .query_row(
                        "SELECT label, content_id, created_at FROM index_entries WHERE label = ?1",
                        params![label],
                        Row::from_sql,
                    )
                    .optional()?;
                if let Some(row) = &removed {
                    tx.execute(
                        "DELETE FROM index_entries WHERE label = ?1",
                        params![row.label],
                    )?;
                    tx.execute(
                        "INSERT OR REPLACE INTO tombstones (content_id, label, deleted_at)
                         VALUES (?1, ?2, ?3)",
                        params![row.content_id, row.label, deleted_at],
                    )?;
                }
                tx.commit()?;
                Ok(removed)
            })
            .await
            .map_err(map_tr_err)?;
        removed.map(Row::into_entry).transpose()
    }

    async fn is_known(&self, content_id: &ContentId) -> Result<bool, VaultError> {
        let content_id = content_id.as_str().to_string();
        self.db
            .connection()
            .call(move |conn| -> Result<bool, rusqlite::Error> {
                conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM index_entries WHERE content_id = ?1)
                         OR EXISTS(SELECT 1 FROM tombstones WHERE content_id = ?1)",
                    params![content_id],
                    |row| row.get(0),
                )
            })
            .await
            .map_err(map_tr_err)
    }
}
