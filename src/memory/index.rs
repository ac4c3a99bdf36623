//! Embedding index over the `memories_vec` vec0 table.
//!
//! Vectors are owned 1:1 by memory records and keyed by the same id. Search
//! is a brute-force cosine scan: at personal-vault scale (thousands of
//! records) the exact scan beats an approximate index, and it makes the
//! threshold and tie-break semantics exact. The vec0 table is still used for
//! storage so the vectors live next to the records in the same database file.

use rusqlite::{params, Connection};

use crate::error::{HavenError, Result};
use crate::memory::{bytes_to_embedding, cosine_similarity, embedding_to_bytes};

/// A ranked search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub id: String,
    pub score: f32,
}

/// Check a vector against the index's fixed dimensionality.
fn check_dimensions(vector: &[f32], dims: usize) -> Result<()> {
    if vector.len() != dims {
        return Err(HavenError::InvalidArgument(format!(
            "embedding has {} dimensions, index expects {dims}",
            vector.len()
        )));
    }
    Ok(())
}

/// Insert or replace the vector for `id`.
pub fn upsert(conn: &Connection, id: &str, vector: &[f32], dims: usize) -> Result<()> {
    check_dimensions(vector, dims)?;

    // vec0 has no ON CONFLICT support; delete-then-insert is the replace path.
    conn.execute("DELETE FROM memories_vec WHERE id = ?1", params![id])?;
    conn.execute(
        "INSERT INTO memories_vec (id, embedding) VALUES (?1, ?2)",
        params![id, embedding_to_bytes(vector)],
    )?;
    Ok(())
}

/// Delete the vector for `id`. No-op if absent.
pub fn remove(conn: &Connection, id: &str) -> Result<()> {
    conn.execute("DELETE FROM memories_vec WHERE id = ?1", params![id])?;
    Ok(())
}

/// Rank all stored vectors against `query` by cosine similarity.
///
/// Results are sorted by score descending; ties go to the most recently
/// created record. Entries scoring below `threshold` are excluded and at
/// most `limit` hits are returned. An empty index yields an empty vec.
pub fn search(
    conn: &Connection,
    query: &[f32],
    limit: usize,
    threshold: f32,
    dims: usize,
) -> Result<Vec<Hit>> {
    check_dimensions(query, dims)?;

    let mut stmt = conn.prepare(
        "SELECT v.id, v.embedding, m.created_at \
         FROM memories_vec v JOIN memories m ON m.id = v.id",
    )?;

    let mut scored: Vec<(String, f32, i64)> = stmt
        .query_map([], |row| {
            let id: String = row.get(0)?;
            let blob: Vec<u8> = row.get(1)?;
            let created_at: i64 = row.get(2)?;
            Ok((id, blob, created_at))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?
        .into_iter()
        .filter_map(|(id, blob, created_at)| {
            let score = cosine_similarity(query, &bytes_to_embedding(&blob));
            (score >= threshold).then_some((id, score, created_at))
        })
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.2.cmp(&a.2))
    });
    scored.truncate(limit);

    Ok(scored
        .into_iter()
        .map(|(id, score, _)| Hit { id, score })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    const DIMS: usize = 384;

    fn test_db() -> Connection {
        crate::db::open_memory_database().unwrap()
    }

    /// Unit vector with a spike at `seed`.
    fn embedding(seed: usize) -> Vec<f32> {
        let mut v = vec![0.0f32; DIMS];
        v[seed % DIMS] = 1.0;
        v
    }

    fn insert_record(conn: &Connection, id: &str, created_at: i64) {
        conn.execute(
            "INSERT INTO memories (id, content, tags, metadata, created_at, updated_at) \
             VALUES (?1, ?2, '[]', '{}', ?3, ?3)",
            params![id, format!("content for {id}"), created_at],
        )
        .unwrap();
    }

    #[test]
    fn upsert_replaces_existing_vector() {
        let conn = test_db();
        insert_record(&conn, "m1", 100);

        upsert(&conn, "m1", &embedding(0), DIMS).unwrap();
        upsert(&conn, "m1", &embedding(5), DIMS).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM memories_vec", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);

        let hits = search(&conn, &embedding(5), 10, 0.9, DIMS).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "m1");
    }

    #[test]
    fn dimension_mismatch_rejected() {
        let conn = test_db();
        let short = vec![1.0f32; 10];
        assert!(matches!(
            upsert(&conn, "m1", &short, DIMS),
            Err(HavenError::InvalidArgument(_))
        ));
        assert!(matches!(
            search(&conn, &short, 10, 0.0, DIMS),
            Err(HavenError::InvalidArgument(_))
        ));
    }

    #[test]
    fn remove_is_noop_when_absent() {
        let conn = test_db();
        remove(&conn, "missing").unwrap();
    }

    #[test]
    fn search_orders_by_score_descending() {
        let conn = test_db();
        insert_record(&conn, "near", 100);
        insert_record(&conn, "far", 200);
        upsert(&conn, "near", &embedding(0), DIMS).unwrap();
        upsert(&conn, "far", &embedding(7), DIMS).unwrap();

        // Query leans toward dimension 0: "near" should rank first.
        let mut query = vec![0.0f32; DIMS];
        query[0] = 1.0;
        query[7] = 0.2;

        let hits = search(&conn, &query, 10, -1.0, DIMS).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "near");
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn ties_break_by_most_recent_created_at() {
        let conn = test_db();
        insert_record(&conn, "older", 100);
        insert_record(&conn, "newer", 200);
        // Identical vectors → identical scores.
        upsert(&conn, "older", &embedding(3), DIMS).unwrap();
        upsert(&conn, "newer", &embedding(3), DIMS).unwrap();

        let hits = search(&conn, &embedding(3), 10, 0.0, DIMS).unwrap();
        assert_eq!(hits[0].id, "newer");
        assert_eq!(hits[1].id, "older");
    }

    #[test]
    fn threshold_excludes_low_scores() {
        let conn = test_db();
        insert_record(&conn, "match", 100);
        insert_record(&conn, "other", 200);
        upsert(&conn, "match", &embedding(0), DIMS).unwrap();
        upsert(&conn, "other", &embedding(50), DIMS).unwrap();

        // "other" is orthogonal to the query (score 0.0) — below threshold.
        let hits = search(&conn, &embedding(0), 10, 0.5, DIMS).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "match");
        assert!((hits[0].score - 1.0).abs() < 1e-5);
    }

    #[test]
    fn limit_caps_results() {
        let conn = test_db();
        for i in 0..5 {
            let id = format!("m{i}");
            insert_record(&conn, &id, 100 + i as i64);
            upsert(&conn, &id, &embedding(i), DIMS).unwrap();
        }

        let hits = search(&conn, &embedding(0), 2, -1.0, DIMS).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn empty_index_yields_empty_results() {
        let conn = test_db();
        let hits = search(&conn, &embedding(0), 10, 0.0, DIMS).unwrap();
        assert!(hits.is_empty());
    }
}
