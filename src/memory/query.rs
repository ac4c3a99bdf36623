//! Read path: lexical querying and vector search over memory records.
//!
//! Two deliberately distinct entry points. [`query_memories`] is lexical —
//! case-insensitive substring matching plus exact tag/metadata filters,
//! newest first. [`search_memories`] ranks by cosine similarity against a
//! caller-supplied query vector and hydrates the hits into full records. The
//! engine reads from both stores and mutates neither.

use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

use crate::error::{HavenError, Result};
use crate::memory::types::Memory;
use crate::memory::{index, store};

/// Filter key that matches against a record's tags instead of its metadata.
const TAG_FILTER_KEY: &str = "tag";

/// One page of lexical query results.
#[derive(Debug, Serialize)]
pub struct QueryPage {
    pub memories: Vec<Memory>,
    /// Count of all matches before the limit cutoff, not the page size.
    pub total_count: usize,
}

/// A vector search hit hydrated into its full record.
#[derive(Debug, Serialize)]
pub struct SearchMatch {
    pub memory: Memory,
    pub similarity_score: f32,
}

/// Case-insensitive substring query with exact-match filters.
///
/// The query matches against content and tag values; an empty query matches
/// every record (filters still apply). The filter key `tag` requires the
/// record to carry that exact tag; any other filter key must equal
/// `metadata[key]`. Results are ordered by `created_at` descending with id
/// as a stable tiebreak.
pub fn query_memories(
    conn: &Connection,
    query: &str,
    limit: usize,
    filters: &HashMap<String, String>,
) -> Result<QueryPage> {
    let mut stmt = conn.prepare(
        "SELECT id, content, tags, metadata, created_at, updated_at \
         FROM memories ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt
        .query_map([], Memory::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let needle = query.to_lowercase();
    let matched: Vec<Memory> = rows
        .into_iter()
        .filter(|memory| matches_query(memory, &needle) && matches_filters(memory, filters))
        .collect();

    let total_count = matched.len();
    let memories = matched.into_iter().take(limit).collect();

    Ok(QueryPage {
        memories,
        total_count,
    })
}

/// Rank stored vectors against `query_embedding` and hydrate each hit.
///
/// A record deleted between ranking and hydration is silently skipped; the
/// limit is not backfilled, so callers may receive fewer than `limit`
/// matches.
pub fn search_memories(
    conn: &Connection,
    query_embedding: &[f32],
    limit: usize,
    similarity_threshold: f32,
    dims: usize,
) -> Result<Vec<SearchMatch>> {
    let hits = index::search(conn, query_embedding, limit, similarity_threshold, dims)?;

    let mut matches = Vec::with_capacity(hits.len());
    for hit in hits {
        match store::get_memory(conn, &hit.id) {
            Ok(memory) => matches.push(SearchMatch {
                memory,
                similarity_score: hit.score,
            }),
            Err(HavenError::NotFound(_)) => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(matches)
}

fn matches_query(memory: &Memory, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    memory.content.to_lowercase().contains(needle)
        || memory
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
}

fn matches_filters(memory: &Memory, filters: &HashMap<String, String>) -> bool {
    filters.iter().all(|(key, value)| {
        if key == TAG_FILTER_KEY {
            memory.tags.iter().any(|tag| tag == value)
        } else {
            memory.metadata.get(key) == Some(value)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    const DIMS: usize = 384;

    fn test_db() -> Connection {
        crate::db::open_memory_database().unwrap()
    }

    fn embedding(seed: usize) -> Vec<f32> {
        let mut v = vec![0.0f32; DIMS];
        v[seed % DIMS] = 1.0;
        v
    }

    fn insert(
        conn: &mut Connection,
        content: &str,
        tags: &[&str],
        metadata: &[(&str, &str)],
        seed: usize,
    ) -> Memory {
        let tags: Vec<String> = tags.iter().map(|s| s.to_string()).collect();
        let metadata: HashMap<String, String> = metadata
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        store::store_memory(conn, content, &tags, &metadata, &embedding(seed), DIMS).unwrap()
    }

    /// Force distinct created_at values so ordering tests are deterministic
    /// even when inserts land in the same second.
    fn backdate(conn: &Connection, id: &str, created_at: i64) {
        conn.execute(
            "UPDATE memories SET created_at = ?1 WHERE id = ?2",
            params![created_at, id],
        )
        .unwrap();
    }

    #[test]
    fn substring_match_is_case_insensitive() {
        let mut conn = test_db();
        insert(&mut conn, "User prefers Python for analysis", &[], &[], 0);
        insert(&mut conn, "Works on ML projects", &[], &[], 1);

        let page = query_memories(&conn, "python", 10, &HashMap::new()).unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.memories.len(), 1);
        assert!(page.memories[0].content.contains("Python"));
    }

    #[test]
    fn query_matches_tag_values() {
        let mut conn = test_db();
        insert(&mut conn, "Dark mode preferred", &["python", "ui"], &[], 0);
        insert(&mut conn, "Uses TensorFlow", &["ml"], &[], 1);

        let page = query_memories(&conn, "python", 10, &HashMap::new()).unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.memories[0].content, "Dark mode preferred");
    }

    #[test]
    fn total_count_ignores_limit() {
        let mut conn = test_db();
        for i in 0..5 {
            insert(&mut conn, &format!("shared term entry {i}"), &[], &[], i);
        }

        let page = query_memories(&conn, "shared term", 2, &HashMap::new()).unwrap();
        assert_eq!(page.total_count, 5);
        assert_eq!(page.memories.len(), 2);
    }

    #[test]
    fn results_ordered_newest_first() {
        let mut conn = test_db();
        let a = insert(&mut conn, "entry alpha", &[], &[], 0);
        let b = insert(&mut conn, "entry beta", &[], &[], 1);
        let c = insert(&mut conn, "entry gamma", &[], &[], 2);
        backdate(&conn, &a.id, 100);
        backdate(&conn, &b.id, 300);
        backdate(&conn, &c.id, 200);

        let page = query_memories(&conn, "entry", 10, &HashMap::new()).unwrap();
        let ids: Vec<&str> = page.memories.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec![b.id.as_str(), c.id.as_str(), a.id.as_str()]);
    }

    #[test]
    fn tag_filter_requires_exact_tag() {
        let mut conn = test_db();
        insert(&mut conn, "First note", &["python"], &[], 0);
        insert(&mut conn, "Second note", &["pythonic"], &[], 1);

        let mut filters = HashMap::new();
        filters.insert("tag".to_string(), "python".to_string());

        let page = query_memories(&conn, "", 10, &filters).unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.memories[0].content, "First note");
    }

    #[test]
    fn metadata_filter_requires_exact_value() {
        let mut conn = test_db();
        insert(&mut conn, "Important", &[], &[("importance", "high")], 0);
        insert(&mut conn, "Trivial", &[], &[("importance", "low")], 1);

        let mut filters = HashMap::new();
        filters.insert("importance".to_string(), "high".to_string());

        let page = query_memories(&conn, "", 10, &filters).unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.memories[0].content, "Important");
    }

    #[test]
    fn filters_intersect_with_query() {
        let mut conn = test_db();
        insert(
            &mut conn,
            "Python data analysis",
            &["work"],
            &[("category", "work")],
            0,
        );
        insert(
            &mut conn,
            "Python gaming hobby",
            &["fun"],
            &[("category", "hobby")],
            1,
        );

        let mut filters = HashMap::new();
        filters.insert("category".to_string(), "work".to_string());

        let page = query_memories(&conn, "python", 10, &filters).unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.memories[0].content, "Python data analysis");
    }

    #[test]
    fn empty_query_matches_everything() {
        let mut conn = test_db();
        insert(&mut conn, "one", &[], &[], 0);
        insert(&mut conn, "two", &[], &[], 1);

        let page = query_memories(&conn, "", 10, &HashMap::new()).unwrap();
        assert_eq!(page.total_count, 2);
    }

    #[test]
    fn search_returns_exact_match_first_with_top_score() {
        let mut conn = test_db();
        let target = insert(&mut conn, "exact target", &[], &[], 3);
        insert(&mut conn, "unrelated", &[], &[], 77);

        let matches = search_memories(&conn, &embedding(3), 10, 0.5, DIMS).unwrap();
        assert!(!matches.is_empty());
        assert_eq!(matches[0].memory.id, target.id);
        assert!((matches[0].similarity_score - 1.0).abs() < 1e-5);
        // Nothing below the threshold leaks through.
        assert!(matches.iter().all(|m| m.similarity_score >= 0.5));
    }

    #[test]
    fn vectors_without_records_never_surface() {
        let mut conn = test_db();
        let kept = insert(&mut conn, "kept", &[], &[], 0);
        let orphaned = insert(&mut conn, "orphaned", &[], &[], 0);

        // Delete the record row only, leaving its vector behind. Whether the
        // ghost is dropped at ranking or at hydration, it must not surface.
        conn.execute(
            "DELETE FROM memories WHERE id = ?1",
            params![orphaned.id],
        )
        .unwrap();

        let matches = search_memories(&conn, &embedding(0), 10, 0.0, DIMS).unwrap();
        let ids: Vec<&str> = matches.iter().map(|m| m.memory.id.as_str()).collect();
        assert_eq!(ids, vec![kept.id.as_str()]);
    }

    #[test]
    fn search_on_empty_store_is_empty() {
        let conn = test_db();
        let matches = search_memories(&conn, &embedding(0), 10, 0.0, DIMS).unwrap();
        assert!(matches.is_empty());
    }
}
