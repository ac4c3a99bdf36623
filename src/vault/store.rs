//! Write and read path for the `secrets` table.
//!
//! All mutations commit a transaction before returning, so an acknowledged
//! call is durable. Plaintext never touches the table: [`store_key`] seals
//! bytes before the insert and [`retrieve_key`] opens them after the select.

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::collections::HashMap;

use crate::error::{HavenError, Result};
use crate::vault::cipher::Cipher;
use crate::vault::key::{generate_salt, SALT_LEN};

/// vault_meta key for the persisted KDF salt.
const SALT_META_KEY: &str = "kdf_salt";

/// vault_meta key for the encrypted unlock check value.
const CHECK_META_KEY: &str = "unlock_check";

/// Plaintext sealed into the check value at first unlock.
const CHECK_PLAINTEXT: &[u8] = b"haven.vault.check.v1";

/// A decrypted secret with its sidecar metadata.
#[derive(Debug, Serialize)]
pub struct SecretRecord {
    pub key_data: Vec<u8>,
    pub metadata: HashMap<String, String>,
    pub created_at: i64,
}

/// Encrypt and upsert a secret. Overwriting an existing `key_id` replaces the
/// ciphertext and metadata atomically; `created_at` of the original entry is
/// preserved by the upsert.
pub fn store_key(
    conn: &mut Connection,
    cipher: &Cipher,
    key_id: &str,
    secret: &[u8],
    metadata: &HashMap<String, String>,
) -> Result<()> {
    if key_id.trim().is_empty() {
        return Err(HavenError::InvalidArgument(
            "key_id must not be empty".into(),
        ));
    }

    let packet = cipher.seal(secret)?;
    let metadata_json = serde_json::to_string(metadata)?;
    let now = chrono::Utc::now().timestamp();

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO secrets (key_id, ciphertext, metadata, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?4) \
         ON CONFLICT(key_id) DO UPDATE SET \
             ciphertext = excluded.ciphertext, \
             metadata = excluded.metadata, \
             updated_at = excluded.updated_at",
        params![key_id, packet, metadata_json, now],
    )?;
    tx.commit()?;

    tracing::info!(key_id = %key_id, bytes = secret.len(), "secret stored");
    Ok(())
}

/// Fetch and decrypt a secret. `NotFound` when absent, `DecryptionFailed`
/// when the ciphertext does not open under the session key.
pub fn retrieve_key(conn: &Connection, cipher: &Cipher, key_id: &str) -> Result<SecretRecord> {
    let row: Option<(Vec<u8>, String, i64)> = conn
        .query_row(
            "SELECT ciphertext, metadata, created_at FROM secrets WHERE key_id = ?1",
            params![key_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;

    let (packet, metadata_json, created_at) =
        row.ok_or_else(|| HavenError::NotFound(key_id.to_string()))?;

    let key_data = cipher.open(&packet)?;
    let metadata: HashMap<String, String> =
        serde_json::from_str(&metadata_json).unwrap_or_default();

    Ok(SecretRecord {
        key_data,
        metadata,
        created_at,
    })
}

/// Pure existence check — never touches the ciphertext.
pub fn key_exists(conn: &Connection, key_id: &str) -> Result<bool> {
    let exists: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM secrets WHERE key_id = ?1",
            params![key_id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(exists.is_some())
}

/// Delete a secret. Idempotent: returns `Ok` whether or not the key existed.
pub fn delete_key(conn: &mut Connection, key_id: &str) -> Result<()> {
    let tx = conn.transaction()?;
    let deleted = tx.execute("DELETE FROM secrets WHERE key_id = ?1", params![key_id])?;
    tx.commit()?;

    tracing::info!(key_id = %key_id, existed = deleted > 0, "secret deleted");
    Ok(())
}

/// All stored key identifiers, sorted for stable output.
pub fn list_keys(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT key_id FROM secrets ORDER BY key_id")?;
    let keys = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(keys)
}

/// Load the persisted KDF salt, creating and persisting a fresh random one on
/// first use. Reusing the salt keeps derivation consistent across reopens.
pub fn load_or_create_salt(conn: &Connection) -> Result<[u8; SALT_LEN]> {
    let existing: Option<Vec<u8>> = conn
        .query_row(
            "SELECT value FROM vault_meta WHERE key = ?1",
            params![SALT_META_KEY],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(bytes) = existing {
        let salt: [u8; SALT_LEN] = bytes.try_into().map_err(|_| {
            HavenError::Internal("persisted KDF salt has the wrong length".into())
        })?;
        return Ok(salt);
    }

    let salt = generate_salt();
    conn.execute(
        "INSERT INTO vault_meta (key, value) VALUES (?1, ?2)",
        params![SALT_META_KEY, salt.as_slice()],
    )?;
    tracing::info!("generated new vault KDF salt");
    Ok(salt)
}

/// Verify the derived key against the stored check value, or create the check
/// value on first unlock.
///
/// A wrong passphrase derives a different key, the stored check packet fails
/// to open, and the caller gets `DecryptionFailed` without any secret having
/// been touched.
pub fn verify_or_init_check(conn: &Connection, cipher: &Cipher) -> Result<()> {
    let existing: Option<Vec<u8>> = conn
        .query_row(
            "SELECT value FROM vault_meta WHERE key = ?1",
            params![CHECK_META_KEY],
            |row| row.get(0),
        )
        .optional()?;

    match existing {
        Some(packet) => {
            let plaintext = cipher.open(&packet)?;
            if plaintext != CHECK_PLAINTEXT {
                return Err(HavenError::DecryptionFailed);
            }
            Ok(())
        }
        None => {
            let packet = cipher.seal(CHECK_PLAINTEXT)?;
            conn.execute(
                "INSERT INTO vault_meta (key, value) VALUES (?1, ?2)",
                params![CHECK_META_KEY, packet],
            )?;
            tracing::info!("initialized vault unlock check value");
            Ok(())
        }
    }
}
