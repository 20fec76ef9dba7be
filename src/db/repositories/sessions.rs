use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{parse_datetime, parse_optional_datetime},
    models::DocumentSession,
};

fn row_to_session(row: &Row) -> Result<DocumentSession> {
    let started_at: String = row.get("started_at")?;
    let ended_at: Option<String> = row.get("ended_at")?;

    Ok(DocumentSession {
        id: row.get("id")?,
        document_path: row.get("document_path")?,
        started_at: parse_datetime(&started_at, "started_at")?,
        ended_at: parse_optional_datetime(ended_at, "ended_at")?,
    })
}

impl Database {
    pub async fn insert_session(&self, session: &DocumentSession) -> Result<()> {
        let record = session.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO document_sessions (id, document_path, started_at, ended_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.id,
                    record.document_path,
                    record.started_at.to_rfc3339(),
                    record.ended_at.as_ref().map(|dt| dt.to_rfc3339()),
                ],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn end_session(
        &self,
        session_id: &str,
        ended_at: DateTime<Utc>,
    ) -> Result<()> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            conn.execute(
                "UPDATE document_sessions SET ended_at = ?1 WHERE id = ?2",
                params![ended_at.to_rfc3339(), session_id],
            )?;
            Ok(())
        })
        .await
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Option<DocumentSession>> {
        let session_id = session_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, document_path, started_at, ended_at
                 FROM document_sessions
                 WHERE id = ?1",
            )?;

            let mut rows = stmt.query(params![session_id])?;
            match rows.next()? {
                Some(row) => Ok(Some(row_to_session(row)?)),
                None => Ok(None),
            }
        })
        .await
    }

    /// Delete sessions (and, via cascade, their usage rows) that started
    /// more than `days` before `now`.
    pub async fn purge_sessions_older_than(
        &self,
        days: i64,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let cutoff = now - Duration::days(days);
        self.execute(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM document_sessions WHERE started_at < ?1",
                params![cutoff.to_rfc3339()],
            )?;
            Ok(deleted)
        })
        .await
    }
}
