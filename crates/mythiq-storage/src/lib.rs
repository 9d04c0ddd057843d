// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Knowledge Store implementations.
//!
//! [`SqliteKnowledgeStore`] is the durable backend: WAL-mode SQLite with
//! embedded migrations, every statement running on tokio-rusqlite's single
//! background thread. [`MemoryKnowledgeStore`] keeps everything in
//! process and is used for tests and ephemeral deployments.

pub mod database;
pub mod memory;
pub mod migrations;
pub mod queries;
pub mod sqlite;

use std::sync::Arc;

use mythiq_config::model::{StorageBackend, StorageConfig};
use mythiq_core::{KnowledgeStore, MythiqError};

pub use database::Database;
pub use memory::MemoryKnowledgeStore;
pub use sqlite::SqliteKnowledgeStore;

/// Build and initialize the store selected by `config.backend`.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn KnowledgeStore>, MythiqError> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryKnowledgeStore::new())),
        StorageBackend::Sqlite => {
            let store = SqliteKnowledgeStore::new(config.clone());
            store.initialize().await?;
            Ok(Arc::new(store))
        }
    }
}
