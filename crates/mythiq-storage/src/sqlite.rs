// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`KnowledgeStore`] trait.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use mythiq_config::model::StorageConfig;
use mythiq_core::{
    AdapterType, ConversationTurn, Fact, HealthStatus, KnowledgeStore, MythiqError, PluginAdapter,
    StoreStats, UserId,
};

use crate::database::{Database, map_read_err};
use crate::queries;

/// SQLite-backed knowledge store.
///
/// The database is opened lazily by [`SqliteKnowledgeStore::initialize`].
/// Same-user writes are serialized by the single connection thread, and
/// every write is a single transaction, so concurrent overwrites of one key
/// cannot interleave.
pub struct SqliteKnowledgeStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteKnowledgeStore {
    /// The connection is not opened until [`initialize`](Self::initialize) is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Open the database and run migrations.
    pub async fn initialize(&self) -> Result<(), MythiqError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| MythiqError::Storage {
            source: "knowledge store already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite knowledge store initialized");
        Ok(())
    }

    /// Checkpoint the WAL. Safe to call when never initialized.
    pub async fn close(&self) -> Result<(), MythiqError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("WAL checkpoint complete");
        }
        Ok(())
    }

    fn db(&self) -> Result<&Database, MythiqError> {
        self.db.get().ok_or_else(|| MythiqError::Storage {
            source: "knowledge store not initialized".into(),
        })
    }

    fn db_for_read(&self) -> Result<&Database, MythiqError> {
        self.db.get().ok_or_else(|| MythiqError::StorageUnavailableForRead {
            source: "knowledge store not initialized".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteKnowledgeStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, MythiqError> {
        let Some(db) = self.db.get() else {
            return Ok(HealthStatus::Unhealthy("not initialized".into()));
        };
        let probe = db
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_read_err);
        Ok(match probe {
            Ok(()) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(e.to_string()),
        })
    }

    async fn shutdown(&self) -> Result<(), MythiqError> {
        self.close().await
    }
}

#[async_trait]
impl KnowledgeStore for SqliteKnowledgeStore {
    async fn get_facts(&self, user_id: &UserId) -> Result<HashMap<String, String>, MythiqError> {
        queries::facts::get_facts(self.db_for_read()?, user_id).await
    }

    async fn get_fact_records(&self, user_id: &UserId) -> Result<Vec<Fact>, MythiqError> {
        queries::facts::get_fact_records(self.db_for_read()?, user_id).await
    }

    async fn upsert_fact(
        &self,
        user_id: &UserId,
        key: &str,
        value: &str,
        turn_id: u64,
    ) -> Result<(), MythiqError> {
        queries::facts::upsert_fact(self.db()?, user_id, key, value, turn_id).await
    }

    async fn reserve_turn_id(&self, user_id: &UserId) -> Result<u64, MythiqError> {
        queries::turns::reserve_turn_id(self.db()?, user_id).await
    }

    async fn append_turn(&self, turn: &ConversationTurn) -> Result<(), MythiqError> {
        queries::turns::append_turn(self.db()?, turn).await
    }

    async fn recent_turns(
        &self,
        user_id: &UserId,
        limit: usize,
    ) -> Result<Vec<ConversationTurn>, MythiqError> {
        queries::turns::recent_turns(self.db_for_read()?, user_id, limit).await
    }

    async fn stats(&self, user_id: Option<&UserId>) -> Result<StoreStats, MythiqError> {
        queries::users::stats(self.db_for_read()?, user_id).await
    }

    async fn delete_user(&self, user_id: &UserId) -> Result<bool, MythiqError> {
        queries::users::delete_user(self.db()?, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mythiq_config::model::StorageBackend;
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            backend: StorageBackend::Sqlite,
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn implements_plugin_adapter() {
        let storage = SqliteKnowledgeStore::new(make_config("unused.db"));
        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn uninitialized_store_fails_reads_and_writes_distinctly() {
        let storage = SqliteKnowledgeStore::new(make_config("unused.db"));
        let u = UserId::from("u");

        let read = storage.get_facts(&u).await.unwrap_err();
        assert!(matches!(read, MythiqError::StorageUnavailableForRead { .. }));

        let write = storage.upsert_fact(&u, "k", "v", 1).await.unwrap_err();
        assert!(matches!(write, MythiqError::Storage { .. }));

        assert!(matches!(
            storage.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
        storage.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn double_initialize_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("double.db");
        let storage = SqliteKnowledgeStore::new(make_config(path.to_str().unwrap()));
        storage.initialize().await.unwrap();
        assert!(storage.initialize().await.is_err());
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn facts_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("durable.db");
        let u = UserId::from("u1");
        {
            let storage = SqliteKnowledgeStore::new(make_config(path.to_str().unwrap()));
            storage.initialize().await.unwrap();
            let turn = storage.reserve_turn_id(&u).await.unwrap();
            storage.upsert_fact(&u, "likes", "science fiction", turn).await.unwrap();
            storage.shutdown().await.unwrap();
        }
        let storage = SqliteKnowledgeStore::new(make_config(path.to_str().unwrap()));
        storage.initialize().await.unwrap();
        let facts = storage.get_facts(&u).await.unwrap();
        assert_eq!(facts.get("likes").map(String::as_str), Some("science fiction"));
        assert_eq!(storage.reserve_turn_id(&u).await.unwrap(), 2);
    }
}
