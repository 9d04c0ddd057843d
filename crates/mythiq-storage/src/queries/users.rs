// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-level queries: aggregate counts and explicit deletion.

use mythiq_core::{MythiqError, StoreStats, UserId};
use rusqlite::params;

use crate::database::{Database, map_read_err, map_tr_err};

fn count(conn: &rusqlite::Connection, sql: &str, user_id: Option<&str>) -> Result<u64, rusqlite::Error> {
    let n: i64 = match user_id {
        Some(id) => conn.query_row(sql, params![id], |row| row.get(0))?,
        None => conn.query_row(sql, [], |row| row.get(0))?,
    };
    Ok(n.max(0) as u64)
}

/// Counts for one user, or for the whole store.
pub async fn stats(db: &Database, user_id: Option<&UserId>) -> Result<StoreStats, MythiqError> {
    let user_id = user_id.map(|u| u.as_str().to_string());
    db.connection()
        .call(move |conn| -> Result<StoreStats, rusqlite::Error> {
            let stats = match user_id.as_deref() {
                Some(id) => StoreStats {
                    fact_count: count(conn, "SELECT COUNT(*) FROM facts WHERE user_id = ?1", Some(id))?,
                    turn_count: count(conn, "SELECT COUNT(*) FROM turns WHERE user_id = ?1", Some(id))?,
                    distinct_users: count(conn, "SELECT COUNT(*) FROM users WHERE user_id = ?1", Some(id))?,
                },
                None => StoreStats {
                    fact_count: count(conn, "SELECT COUNT(*) FROM facts", None)?,
                    turn_count: count(conn, "SELECT COUNT(*) FROM turns", None)?,
                    distinct_users: count(conn, "SELECT COUNT(*) FROM users", None)?,
                },
            };
            Ok(stats)
        })
        .await
        .map_err(map_read_err)
}

/// Remove a user with all facts and turns. Returns whether the user existed.
pub async fn delete_user(db: &Database, user_id: &UserId) -> Result<bool, MythiqError> {
    let user_id = user_id.as_str().to_string();
    db.connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM facts WHERE user_id = ?1", params![user_id])?;
            tx.execute("DELETE FROM turns WHERE user_id = ?1", params![user_id])?;
            let removed = tx.execute("DELETE FROM users WHERE user_id = ?1", params![user_id])?;
            tx.commit()?;
            Ok(removed > 0)
        })
        .await
        .map_err(map_tr_err)
}
