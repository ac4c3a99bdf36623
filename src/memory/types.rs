//! Memory record type and row mapping.

use rusqlite::Row;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A memory record, matching the `memories` table schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    /// UUID v7 (time-sortable) primary key, immutable once assigned.
    pub id: String,
    /// The full text content of the memory.
    pub content: String,
    /// Tags in insertion order. Order is irrelevant for matching but
    /// preserved for display.
    pub tags: Vec<String>,
    /// Arbitrary string→string metadata (e.g. `category`, `importance`).
    pub metadata: HashMap<String, String>,
    /// Unix-second creation timestamp, immutable once assigned.
    pub created_at: i64,
    /// Unix-second timestamp of the last content/tags update.
    pub updated_at: i64,
}

impl Memory {
    /// Map a `SELECT id, content, tags, metadata, created_at, updated_at` row.
    ///
    /// Malformed JSON in the tags/metadata columns maps to empty collections
    /// rather than failing the whole query.
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let tags_json: String = row.get(2)?;
        let metadata_json: String = row.get(3)?;
        Ok(Self {
            id: row.get(0)?,
            content: row.get(1)?,
            tags: serde_json::from_str(&tags_json).unwrap_or_default(),
            metadata: serde_json::from_str(&metadata_json).unwrap_or_default(),
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
        })
    }
}
