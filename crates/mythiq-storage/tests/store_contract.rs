// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Behaviour every knowledge store backend must share.

use std::sync::Arc;

use chrono::Utc;
use mythiq_config::model::{StorageBackend, StorageConfig};
use mythiq_core::{ConversationTurn, Emotion, KnowledgeStore, PluginAdapter, ServedBy, UserId};
use mythiq_storage::open_store;
use tempfile::TempDir;

async fn backends() -> Vec<(Arc<dyn KnowledgeStore>, Option<TempDir>)> {
    let dir = tempfile::tempdir().unwrap();
    let sqlite = open_store(&StorageConfig {
        backend: StorageBackend::Sqlite,
        database_path: dir.path().join("contract.db").display().to_string(),
        wal_mode: true,
    })
    .await
    .unwrap();
    let memory = open_store(&StorageConfig {
        backend: StorageBackend::Memory,
        database_path: String::new(),
        wal_mode: false,
    })
    .await
    .unwrap();
    vec![(sqlite, Some(dir)), (memory, None)]
}

#[tokio::test]
async fn read_after_write_and_overwrite() {
    for (store, _dir) in backends().await {
        let u = UserId::from("u1");
        store.upsert_fact(&u, "favorite_color", "blue", 1).await.unwrap();
        assert_eq!(store.get_facts(&u).await.unwrap()["favorite_color"], "blue");
        store.upsert_fact(&u, "favorite_color", "red", 2).await.unwrap();
        let facts = store.get_facts(&u).await.unwrap();
        assert_eq!(facts["favorite_color"], "red", "backend {}", store.name());
        assert_eq!(facts.len(), 1);
    }
}

#[tokio::test]
async fn cross_user_isolation() {
    for (store, _dir) in backends().await {
        store.upsert_fact(&"alice".into(), "likes", "jazz", 1).await.unwrap();
        store.upsert_fact(&"bob".into(), "likes", "metal", 1).await.unwrap();
        assert_eq!(store.get_facts(&"alice".into()).await.unwrap()["likes"], "jazz");
        assert_eq!(store.get_facts(&"bob".into()).await.unwrap()["likes"], "metal");
        assert!(store.get_facts(&"carol".into()).await.unwrap().is_empty());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_same_key_writes_leave_one_value() {
    for (store, _dir) in backends().await {
        let u = UserId::from("racer");
        let mut handles = Vec::new();
        for i in 0..20u64 {
            let store = Arc::clone(&store);
            let u = u.clone();
            handles.push(tokio::spawn(async move {
                store.upsert_fact(&u, "mood", &format!("v{i}"), i).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        let facts = store.get_facts(&u).await.unwrap();
        assert_eq!(facts.len(), 1);
        assert!(facts["mood"].starts_with('v'));
        assert_eq!(store.stats(Some(&u)).await.unwrap().fact_count, 1);
    }
}

#[tokio::test]
async fn turns_history_and_stats() {
    for (store, _dir) in backends().await {
        let u = UserId::from("u");
        for _ in 0..3 {
            let id = store.reserve_turn_id(&u).await.unwrap();
            store
                .append_turn(&ConversationTurn {
                    user_id: u.clone(),
                    turn_id: id,
                    input_text: format!("message {id}"),
                    detected_emotion: Emotion::Happy,
                    provider_used: ServedBy::LocalFallback,
                    output_text: "ok".into(),
                    timestamp: Utc::now(),
                })
                .await
                .unwrap();
        }
        let recent = store.recent_turns(&u, 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].input_text, "message 2");
        assert_eq!(recent[1].input_text, "message 3");

        let stats = store.stats(None).await.unwrap();
        assert_eq!(stats.turn_count, 3);
        assert_eq!(stats.distinct_users, 1);

        assert!(store.delete_user(&u).await.unwrap());
        assert!(store.recent_turns(&u, 10).await.unwrap().is_empty());
    }
}
