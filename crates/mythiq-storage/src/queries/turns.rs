// SPDX-FileCopyrightText: 2026 Mythiq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation turn queries. Turns are append-only.

use std::str::FromStr;

use chrono::Utc;
use mythiq_core::{ConversationTurn, Emotion, MythiqError, ServedBy, UserId};
use rusqlite::params;
use rusqlite::types::Type;

use super::{ensure_user, format_ts, from_sql_id, parse_ts, to_sql_id};
use crate::database::{Database, map_read_err, map_tr_err};

/// Atomically allocate the next turn id for a user.
///
/// The counter lives on the user row, so ids stay monotonic across restarts
/// and a reserved id is never handed out again even if its turn is never
/// written.
pub async fn reserve_turn_id(db: &Database, user_id: &UserId) -> Result<u64, MythiqError> {
    let user_id = user_id.as_str().to_string();
    let now = format_ts(&Utc::now());
    db.connection()
        .call(move |conn| -> Result<u64, rusqlite::Error> {
            let next: i64 = conn.query_row(
                "INSERT INTO users (user_id, last_turn_id, created_at) VALUES (?1, 1, ?2)
                 ON CONFLICT(user_id) DO UPDATE SET last_turn_id = last_turn_id + 1
                 RETURNING last_turn_id",
                params![user_id, now],
                |row| row.get(0),
            )?;
            from_sql_id(0, next)
        })
        .await
        .map_err(map_tr_err)
}

/// Append a turn. Fails if `(user_id, turn_id)` already exists.
pub async fn append_turn(db: &Database, turn: &ConversationTurn) -> Result<(), MythiqError> {
    let turn = turn.clone();
    let now = format_ts(&Utc::now());
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            ensure_user(&tx, turn.user_id.as_str(), &now)?;
            tx.execute(
                "INSERT INTO turns (user_id, turn_id, input_text, detected_emotion, provider_used, output_text, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    turn.user_id.as_str(),
                    to_sql_id(turn.turn_id)?,
                    turn.input_text,
                    turn.detected_emotion.as_str(),
                    turn.provider_used.to_string(),
                    turn.output_text,
                    format_ts(&turn.timestamp),
                ],
            )?;
            // Keep the reservation counter ahead of externally supplied ids.
            tx.execute(
                "UPDATE users SET last_turn_id = MAX(last_turn_id, ?2) WHERE user_id = ?1",
                params![turn.user_id.as_str(), to_sql_id(turn.turn_id)?],
            )?;
            tx.commit()
        })
        .await
        .map_err(map_tr_err)
}

/// Up to `limit` most recent turns for a user, oldest first.
pub async fn recent_turns(
    db: &Database,
    user_id: &UserId,
    limit: usize,
) -> Result<Vec<ConversationTurn>, MythiqError> {
    let owner = user_id.clone();
    let user_id = user_id.as_str().to_string();
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| -> Result<Vec<ConversationTurn>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT turn_id, input_text, detected_emotion, provider_used, output_text, created_at
                 FROM turns WHERE user_id = ?1
                 ORDER BY turn_id DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![user_id, limit], |row| {
                let emotion: String = row.get(2)?;
                let provider: String = row.get(3)?;
                let created_at: String = row.get(5)?;
                Ok(ConversationTurn {
                    user_id: owner.clone(),
                    turn_id: from_sql_id(0, row.get(0)?)?,
                    input_text: row.get(1)?,
                    detected_emotion: Emotion::from_str(&emotion).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e))
                    })?,
                    provider_used: ServedBy::from(provider),
                    output_text: row.get(4)?,
                    timestamp: parse_ts(5, &created_at)?,
                })
            })?;
            let mut turns = rows.collect::<Result<Vec<_>, _>>()?;
            turns.reverse();
            Ok(turns)
        })
        .await
        .map_err(map_read_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::setup_db;
    use mythiq_core::ProviderId;

    fn turn(user: &str, id: u64, input: &str) -> ConversationTurn {
        ConversationTurn {
            user_id: user.into(),
            turn_id: id,
            input_text: input.to_string(),
            detected_emotion: Emotion::Curious,
            provider_used: ServedBy::Provider(ProviderId::from("groq")),
            output_text: format!("reply to {input}"),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn turn_ids_are_monotonic_per_user() {
        let (db, _dir) = setup_db().await;
        let a = UserId::from("a");
        let b = UserId::from("b");
        assert_eq!(reserve_turn_id(&db, &a).await.unwrap(), 1);
        assert_eq!(reserve_turn_id(&db, &a).await.unwrap(), 2);
        assert_eq!(reserve_turn_id(&db, &b).await.unwrap(), 1);
        assert_eq!(reserve_turn_id(&db, &a).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn recent_turns_are_oldest_first_and_limited() {
        let (db, _dir) = setup_db().await;
        for i in 1..=4 {
            append_turn(&db, &turn("u", i, &format!("m{i}"))).await.unwrap();
        }
        let recent = recent_turns(&db, &"u".into(), 2).await.unwrap();
        let ids: Vec<_> = recent.iter().map(|t| t.turn_id).collect();
        assert_eq!(ids, [3, 4]);
        assert_eq!(recent[0].detected_emotion, Emotion::Curious);
        assert_eq!(recent[0].provider_used.to_string(), "groq");

        // The counter moved past the appended ids.
        assert_eq!(reserve_turn_id(&db, &"u".into()).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn duplicate_turn_is_rejected() {
        let (db, _dir) = setup_db().await;
        append_turn(&db, &turn("u", 1, "first")).await.unwrap();
        let err = append_turn(&db, &turn("u", 1, "again")).await.unwrap_err();
        assert!(matches!(err, MythiqError::Storage { .. }));
    }

    #[tokio::test]
    async fn turns_cannot_be_updated() {
        let (db, _dir) = setup_db().await;
        append_turn(&db, &turn("u", 1, "first")).await.unwrap();
        let result = db
            .connection()
            .call(|conn| -> Result<usize, rusqlite::Error> {
                conn.execute("UPDATE turns SET output_text = 'rewritten'", [])
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn fallback_sentinel_roundtrips() {
        let (db, _dir) = setup_db().await;
        let mut t = turn("u", 1, "hello");
        t.provider_used = ServedBy::LocalFallback;
        append_turn(&db, &t).await.unwrap();
        let recent = recent_turns(&db, &"u".into(), 5).await.unwrap();
        assert!(recent[0].provider_used.is_fallback());
    }
}
