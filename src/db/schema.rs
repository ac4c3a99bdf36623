//! SQL DDL for all haven tables.
//!
//! Defines the `secrets`, `vault_meta`, `memories`, `memories_vec` (vec0),
//! and `schema_meta` tables. All DDL uses `IF NOT EXISTS` for idempotent
//! initialization.

use rusqlite::Connection;

/// Fixed dimensionality of the embedding vectors stored in `memories_vec`.
pub const EMBEDDING_DIM: usize = 384;

/// All schema DDL statements for haven's core tables.
const SCHEMA_SQL: &str = r#"
-- Encrypted secret storage. ciphertext is a nonce-prefixed AES-256-GCM packet.
CREATE TABLE IF NOT EXISTS secrets (
    key_id TEXT PRIMARY KEY,
    ciphertext BLOB NOT NULL,
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

-- Vault bookkeeping: KDF salt and the encrypted unlock check value.
CREATE TABLE IF NOT EXISTS vault_meta (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL
);

-- Memory records. tags is a JSON array, metadata a JSON object of strings.
CREATE TABLE IF NOT EXISTS memories (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    tags TEXT NOT NULL DEFAULT '[]',
    metadata TEXT NOT NULL DEFAULT '{}',
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_memories_created ON memories(created_at);

-- Schema metadata
CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// vec0 virtual table must be created separately (sqlite-vec syntax).
const VEC_TABLE_SQL: &str = r#"
CREATE VIRTUAL TABLE IF NOT EXISTS memories_vec USING vec0(
    id TEXT PRIMARY KEY,
    embedding FLOAT[384]
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute_batch(VEC_TABLE_SQL)?;

    // Record the schema version and vector dimensionality the tables were
    // created with, so a later binary can detect a mismatch.
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('schema_version', '1')",
        [],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('embedding_dim', ?1)",
        [EMBEDDING_DIM.to_string()],
    )?;

    Ok(())
}
