// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fact queries. One row per `(user_id, key)`; upserts overwrite.

use std::collections::HashMap;

use chrono::Utc;
use mythiq_core::{Fact, MythiqError, PreferenceCategory, UserId};
use rusqlite::params;

use super::{ensure_user, format_ts, from_sql_id, parse_ts, to_sql_id};
use crate::database::{Database, map_read_err, map_tr_err};

/// Current value of every fact key for a user.
pub async fn get_facts(db: &Database, user_id: &UserId) -> Result<HashMap<String, String>, MythiqError> {
    let user_id = user_id.as_str().to_string();
    db.connection()
        .call(move |conn| -> Result<HashMap<String, String>, rusqlite::Error> {
            let mut stmt = conn.prepare("SELECT key, value FROM facts WHERE user_id = ?1")?;
            let rows = stmt.query_map(params![user_id], |row| Ok((row.get(0)?, row.get(1)?)))?;
            rows.collect()
        })
        .await
        .map_err(map_read_err)
}

/// Full fact rows for a user, ordered by key.
pub async fn get_fact_records(db: &Database, user_id: &UserId) -> Result<Vec<Fact>, MythiqError> {
    let owner = user_id.clone();
    let user_id = user_id.as_str().to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<Fact>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT key, value, learned_at, source_turn FROM facts
                 WHERE user_id = ?1 ORDER BY key ASC",
            )?;
            let rows = stmt.query_map(params![user_id], |row| {
                let learned_at: String = row.get(2)?;
                Ok(Fact {
                    user_id: owner.clone(),
                    key: row.get(0)?,
                    value: row.get(1)?,
                    learned_at: parse_ts(2, &learned_at)?,
                    source_turn: from_sql_id(3, row.get(3)?)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_read_err)
}

/// Insert or overwrite `(user_id, key)`, creating the user if needed.
pub async fn upsert_fact(
    db: &Database,
    user_id: &UserId,
    key: &str,
    value: &str,
    turn_id: u64,
) -> Result<(), MythiqError> {
    let user_id = user_id.as_str().to_string();
    let key = key.to_string();
    let value = value.to_string();
    let category = PreferenceCategory::from_key(&key).map(|c| c.to_string());
    let now = format_ts(&Utc::now());

    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            ensure_user(&tx, &user_id, &now)?;
            tx.execute(
                "INSERT INTO facts (user_id, key, value, category, learned_at, source_turn)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(user_id, key) DO UPDATE SET
                     value = excluded.value,
                     category = excluded.category,
                     learned_at = excluded.learned_at,
                     source_turn = excluded.source_turn",
                params![user_id, key, value, category, now, to_sql_id(turn_id)?],
            )?;
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}
