//! Store statistics for the `stats` CLI command.

use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;

use crate::error::Result;

/// Counts across both stores.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_memories: u64,
    pub indexed_vectors: u64,
    pub total_secrets: u64,
    pub db_size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_memory: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest_memory: Option<i64>,
}

/// Compute store statistics.
///
/// `db_path` is used for file size calculation; pass None for in-memory
/// databases.
pub fn store_stats(conn: &Connection, db_path: Option<&Path>) -> Result<StatsResponse> {
    let total_memories: u64 =
        conn.query_row("SELECT COUNT(*) FROM memories", [], |row| row.get::<_, i64>(0))? as u64;
    let indexed_vectors: u64 =
        conn.query_row("SELECT COUNT(*) FROM memories_vec", [], |row| row.get::<_, i64>(0))?
            as u64;
    let total_secrets: u64 =
        conn.query_row("SELECT COUNT(*) FROM secrets", [], |row| row.get::<_, i64>(0))? as u64;

    let (oldest_memory, newest_memory): (Option<i64>, Option<i64>) = conn.query_row(
        "SELECT MIN(created_at), MAX(created_at) FROM memories",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let db_size_bytes = db_path
        .and_then(|p| std::fs::metadata(p).ok())
        .map(|m| m.len())
        .unwrap_or(0);

    Ok(StatsResponse {
        total_memories,
        indexed_vectors,
        total_secrets,
        db_size_bytes,
        oldest_memory,
        newest_memory,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn counts_reflect_store_contents() {
        let mut conn = crate::db::open_memory_database().unwrap();

        let empty = store_stats(&conn, None).unwrap();
        assert_eq!(empty.total_memories, 0);
        assert_eq!(empty.total_secrets, 0);
        assert!(empty.oldest_memory.is_none());

        let mut embedding = vec![0.0f32; 384];
        embedding[0] = 1.0;
        crate::memory::store::store_memory(
            &mut conn,
            "counted memory",
            &[],
            &HashMap::new(),
            &embedding,
            384,
        )
        .unwrap();

        let stats = store_stats(&conn, None).unwrap();
        assert_eq!(stats.total_memories, 1);
        assert_eq!(stats.indexed_vectors, 1);
        assert!(stats.oldest_memory.is_some());
        assert_eq!(stats.oldest_memory, stats.newest_memory);
    }
}
