//! Write path for memory records and their vectors.
//!
//! Every mutation keeps the `memories` table and the `memories_vec` index
//! consistent inside a single transaction. The ordering is deliberate: the
//! record write precedes the vector write on insert/update, and the vector
//! delete precedes the record delete — a crash mid-operation can leave a
//! record briefly missing its vector, never a ghost vector pointing at a
//! missing record.

use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;

use crate::error::{HavenError, Result};
use crate::memory::index;
use crate::memory::types::Memory;

const MEMORY_COLUMNS: &str = "id, content, tags, metadata, created_at, updated_at";

/// Insert a new memory with its embedding. Returns the stored record.
pub fn store_memory(
    conn: &mut Connection,
    content: &str,
    tags: &[String],
    metadata: &HashMap<String, String>,
    embedding: &[f32],
    dims: usize,
) -> Result<Memory> {
    if content.trim().is_empty() {
        return Err(HavenError::InvalidArgument(
            "content must not be empty".into(),
        ));
    }

    let id = uuid::Uuid::now_v7().to_string();
    let now = chrono::Utc::now().timestamp();
    let tags_json = serde_json::to_string(tags)?;
    let metadata_json = serde_json::to_string(metadata)?;

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO memories (id, content, tags, metadata, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![id, content, tags_json, metadata_json, now],
    )?;
    index::upsert(&tx, &id, embedding, dims)?;
    tx.commit()?;

    tracing::info!(id = %id, content_len = content.len(), "memory stored");

    Ok(Memory {
        id,
        content: content.to_string(),
        tags: tags.to_vec(),
        metadata: metadata.clone(),
        created_at: now,
        updated_at: now,
    })
}

/// Fetch a memory by id. `NotFound` when absent.
pub fn get_memory(conn: &Connection, id: &str) -> Result<Memory> {
    let memory = conn
        .query_row(
            &format!("SELECT {MEMORY_COLUMNS} FROM memories WHERE id = ?1"),
            params![id],
            Memory::from_row,
        )
        .optional()?;

    memory.ok_or_else(|| HavenError::NotFound(id.to_string()))
}

/// Replace a memory's content and tags and re-index its embedding.
///
/// `metadata` and `created_at` are preserved; `updated_at` is bumped.
pub fn update_memory(
    conn: &mut Connection,
    id: &str,
    content: &str,
    tags: &[String],
    embedding: &[f32],
    dims: usize,
) -> Result<Memory> {
    if content.trim().is_empty() {
        return Err(HavenError::InvalidArgument(
            "content must not be empty".into(),
        ));
    }

    let now = chrono::Utc::now().timestamp();
    let tags_json = serde_json::to_string(tags)?;

    let tx = conn.transaction()?;
    let updated = tx.execute(
        "UPDATE memories SET content = ?1, tags = ?2, updated_at = ?3 WHERE id = ?4",
        params![content, tags_json, now, id],
    )?;
    if updated == 0 {
        return Err(HavenError::NotFound(id.to_string()));
    }
    index::upsert(&tx, id, embedding, dims)?;

    let memory = tx.query_row(
        &format!("SELECT {MEMORY_COLUMNS} FROM memories WHERE id = ?1"),
        params![id],
        Memory::from_row,
    )?;
    tx.commit()?;

    tracing::info!(id = %id, "memory updated");
    Ok(memory)
}

/// Delete a memory and its vector. Idempotent: returns whether the record
/// existed.
pub fn delete_memory(conn: &mut Connection, id: &str) -> Result<bool> {
    let tx = conn.transaction()?;
    index::remove(&tx, id)?;
    let deleted = tx.execute("DELETE FROM memories WHERE id = ?1", params![id])?;
    tx.commit()?;

    tracing::info!(id = %id, existed = deleted > 0, "memory deleted");
    Ok(deleted > 0)
}
