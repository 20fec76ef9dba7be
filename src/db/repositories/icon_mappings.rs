use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use crate::db::{
    connection::Database, helpers::parse_datetime, models::IconMapping,
};

fn row_to_mapping(row: &Row) -> Result<IconMapping> {
    let last_selected: String = row.get("last_selected")?;

    Ok(IconMapping {
        id: row.get("id")?,
        emoji_unicode: row.get("emoji_unicode")?,
        library_name: row.get("library_name")?,
        icon_name: row.get("icon_name")?,
        selection_count: row.get("selection_count")?,
        last_selected: parse_datetime(&last_selected, "last_selected")?,
    })
}

impl Database {
    /// Record that the user picked `icon_name` for this emoji. Repeat
    /// selections increment the count instead of inserting a new row.
    pub async fn record_icon_selection(
        &self,
        emoji_unicode: &str,
        library_name: &str,
        icon_name: &str,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let emoji_unicode = emoji_unicode.to_string();
        let library_name = library_name.to_string();
        let icon_name = icon_name.to_string();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO icon_mappings (emoji_unicode, library_name, icon_name, selection_count, last_selected)
                 VALUES (?1, ?2, ?3, 1, ?4)
                 ON CONFLICT (emoji_unicode, library_name, icon_name) DO UPDATE SET
                     selection_count = selection_count + 1,
                     last_selected = excluded.last_selected",
                params![emoji_unicode, library_name, icon_name, now.to_rfc3339()],
            )?;
            Ok(())
        })
        .await
    }

    /// Mapping rows for one emoji across all libraries, most-selected first.
    pub async fn mappings_for_emoji(&self, emoji_unicode: &str) -> Result<Vec<IconMapping>> {
        let emoji_unicode = emoji_unicode.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, emoji_unicode, library_name, icon_name, selection_count, last_selected
                 FROM icon_mappings
                 WHERE emoji_unicode = ?1
                 ORDER BY selection_count DESC, last_selected DESC, icon_name ASC",
            )?;

            let mut rows = stmt.query(params![emoji_unicode])?;
            let mut mappings = Vec::new();
            while let Some(row) = rows.next()? {
                mappings.push(row_to_mapping(row)?);
            }

            Ok(mappings)
        })
        .await
    }

    /// Most popular icon previously chosen for this emoji in a library.
    pub async fn top_icon_for_emoji(
        &self,
        emoji_unicode: &str,
        library_name: &str,
    ) -> Result<Option<String>> {
        let emoji_unicode = emoji_unicode.to_string();
        let library_name = library_name.to_string();
        self.execute(move |conn| {
            let icon = conn
                .query_row(
                    "SELECT icon_name FROM icon_mappings
                     WHERE emoji_unicode = ?1 AND library_name = ?2
                     ORDER BY selection_count DESC, last_selected DESC, icon_name ASC
                     LIMIT 1",
                    params![emoji_unicode, library_name],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(icon)
        })
        .await
    }
}
