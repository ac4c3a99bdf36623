#![allow(dead_code)]

use haven::config::VaultConfig;
use haven::vault::Vault;
use rusqlite::Connection;
use std::collections::HashMap;

pub const DIMS: usize = haven::db::schema::EMBEDDING_DIM;

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    haven::db::load_sqlite_vec();
    let conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    haven::db::schema::init_schema(&conn).unwrap();
    haven::db::migrations::run_migrations(&conn).unwrap();
    conn
}

/// Cheap Argon2 parameters so vault tests stay fast.
pub fn fast_kdf() -> VaultConfig {
    VaultConfig {
        kdf_memory_kib: 8,
        kdf_iterations: 1,
        kdf_parallelism: 1,
    }
}

/// A vault already unlocked with `passphrase`.
pub fn unlocked_vault(conn: &Connection, passphrase: &str) -> Vault {
    let vault = Vault::new(fast_kdf());
    vault.unlock(conn, passphrase).unwrap();
    vault
}

/// Generate a deterministic embedding with a spike at position `seed`.
/// Each seed produces a distinct, orthogonal vector.
pub fn test_embedding(seed: usize) -> Vec<f32> {
    let mut v = vec![0.0f32; DIMS];
    v[seed % DIMS] = 1.0;
    v
}

/// Insert a memory with defaults. Returns the stored record.
pub fn insert_memory(
    conn: &mut Connection,
    content: &str,
    tags: &[&str],
    metadata: &[(&str, &str)],
    seed: usize,
) -> haven::memory::types::Memory {
    let tags: Vec<String> = tags.iter().map(|s| s.to_string()).collect();
    let metadata: HashMap<String, String> = metadata
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    haven::memory::store::store_memory(conn, content, &tags, &metadata, &test_embedding(seed), DIMS)
        .unwrap()
}
