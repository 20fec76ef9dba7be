use anyhow::Result;
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{to_i64, to_usize},
    models::IconUsage,
};

fn row_to_usage(row: &Row) -> Result<IconUsage> {
    let line_number: i64 = row.get("line_number")?;

    Ok(IconUsage {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        emoji_unicode: row.get("emoji_unicode")?,
        icon_name: row.get("icon_name")?,
        context_text: row.get("context_text")?,
        line_number: to_usize(line_number, "line_number")?,
        applied: row.get("applied")?,
    })
}

impl Database {
    /// Append one usage row; returns the rowid.
    pub async fn record_icon_usage(&self, usage: &IconUsage) -> Result<i64> {
        let record = usage.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO session_icon_usage
                 (session_id, emoji_unicode, icon_name, context_text, line_number, applied)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.session_id,
                    record.emoji_unicode,
                    record.icon_name,
                    record.context_text,
                    to_i64(record.line_number)?,
                    record.applied,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    /// Usage rows for a session in insertion order, optionally restricted to
    /// one icon name (the duplicate-check path).
    pub async fn usages_for_session(
        &self,
        session_id: &str,
        icon_name: Option<&str>,
    ) -> Result<Vec<IconUsage>> {
        let session_id = session_id.to_string();
        let icon_name = icon_name.map(|s| s.to_string());
        self.execute(move |conn| {
            let mut usages = Vec::new();

            match icon_name {
                Some(icon) => {
                    let mut stmt = conn.prepare(
                        "SELECT id, session_id, emoji_unicode, icon_name, context_text, line_number, applied
                         FROM session_icon_usage
                         WHERE session_id = ?1 AND icon_name = ?2
                         ORDER BY id ASC",
                    )?;
                    let mut rows = stmt.query(params![session_id, icon])?;
                    while let Some(row) = rows.next()? {
                        usages.push(row_to_usage(row)?);
                    }
                }
                None => {
                    let mut stmt = conn.prepare(
                        "SELECT id, session_id, emoji_unicode, icon_name, context_text, line_number, applied
                         FROM session_icon_usage
                         WHERE session_id = ?1
                         ORDER BY id ASC",
                    )?;
                    let mut rows = stmt.query(params![session_id])?;
                    while let Some(row) = rows.next()? {
                        usages.push(row_to_usage(row)?);
                    }
                }
            }

            Ok(usages)
        })
        .await
    }
}
