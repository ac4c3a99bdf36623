//! Encrypted secret vault.
//!
//! The vault is a two-state machine: **Locked** (no key material in memory)
//! and **Unlocked** (a session [`Cipher`] derived from the passphrase). Every
//! secret operation is gated on the state; only [`Vault::unlock`] transitions
//! Locked → Unlocked and only [`Vault::lock`] transitions back. State
//! transitions hold the session write lock, serializing them against all key
//! operations.

pub mod cipher;
pub mod key;
pub mod store;

use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::config::VaultConfig;
use crate::error::{HavenError, Result};
use cipher::Cipher;
use key::MasterKey;
use store::SecretRecord;

/// Externally visible vault state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VaultStatus {
    Locked,
    Unlocked,
}

/// Process-wide vault handle. Shared across requests behind an `Arc`.
pub struct Vault {
    kdf: VaultConfig,
    session: RwLock<Option<Cipher>>,
}

impl Vault {
    /// Create a locked vault with the given KDF parameters.
    pub fn new(kdf: VaultConfig) -> Self {
        Self {
            kdf,
            session: RwLock::new(None),
        }
    }

    pub fn status(&self) -> VaultStatus {
        let locked = self
            .session
            .read()
            .map(|guard| guard.is_none())
            .unwrap_or(true);
        if locked {
            VaultStatus::Locked
        } else {
            VaultStatus::Unlocked
        }
    }

    /// Derive the master key from the passphrase and transition to Unlocked.
    ///
    /// The derived key is verified against the persisted check value before
    /// it becomes the session key, so a wrong passphrase fails with
    /// [`HavenError::DecryptionFailed`] and leaves the vault locked.
    /// Unlocking an already-unlocked vault re-derives and replaces the
    /// session key.
    pub fn unlock(&self, conn: &Connection, passphrase: &str) -> Result<()> {
        if passphrase.is_empty() {
            return Err(HavenError::InvalidArgument(
                "passphrase must not be empty".into(),
            ));
        }

        let mut session = self
            .session
            .write()
            .map_err(|_| HavenError::Internal("vault session lock poisoned".into()))?;

        let salt = store::load_or_create_salt(conn)?;
        let master = MasterKey::derive(passphrase, &salt, &self.kdf)?;
        let cipher = Cipher::new(&master);
        store::verify_or_init_check(conn, &cipher)?;

        *session = Some(cipher);
        tracing::info!("vault unlocked");
        Ok(())
    }

    /// Drop the session key and transition to Locked. Idempotent.
    pub fn lock(&self) {
        if let Ok(mut session) = self.session.write() {
            *session = None;
        }
        tracing::info!("vault locked");
    }

    /// Run `f` with the session cipher, or fail with `VaultLocked`.
    fn with_cipher<T>(&self, f: impl FnOnce(&Cipher) -> Result<T>) -> Result<T> {
        let session = self
            .session
            .read()
            .map_err(|_| HavenError::Internal("vault session lock poisoned".into()))?;
        match session.as_ref() {
            Some(cipher) => f(cipher),
            None => Err(HavenError::VaultLocked),
        }
    }

    /// Encrypt and persist a secret under `key_id`. Overwrites atomically.
    pub fn store_key(
        &self,
        conn: &mut Connection,
        key_id: &str,
        secret: &[u8],
        metadata: &HashMap<String, String>,
    ) -> Result<()> {
        self.with_cipher(|cipher| store::store_key(conn, cipher, key_id, secret, metadata))
    }

    /// Decrypt and return the secret stored under `key_id`.
    pub fn retrieve_key(&self, conn: &Connection, key_id: &str) -> Result<SecretRecord> {
        self.with_cipher(|cipher| store::retrieve_key(conn, cipher, key_id))
    }

    /// Existence check. Gated on the unlock state like every secret
    /// operation, but never decrypts.
    pub fn key_exists(&self, conn: &Connection, key_id: &str) -> Result<bool> {
        self.with_cipher(|_| store::key_exists(conn, key_id))
    }

    /// Delete the secret under `key_id`. Idempotent.
    pub fn delete_key(&self, conn: &mut Connection, key_id: &str) -> Result<()> {
        self.with_cipher(|_| store::delete_key(conn, key_id))
    }

    /// All stored key identifiers.
    pub fn list_keys(&self, conn: &Connection) -> Result<Vec<String>> {
        self.with_cipher(|_| store::list_keys(conn))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_kdf() -> VaultConfig {
        VaultConfig {
            kdf_memory_kib: 8,
            kdf_iterations: 1,
            kdf_parallelism: 1,
        }
    }

    fn test_db() -> Connection {
        crate::db::open_memory_database().unwrap()
    }

    #[test]
    fn operations_fail_while_locked() {
        let mut conn = test_db();
        let vault = Vault::new(fast_kdf());
        assert_eq!(vault.status(), VaultStatus::Locked);

        assert!(matches!(
            vault.store_key(&mut conn, "a@x", b"s", &HashMap::new()),
            Err(HavenError::VaultLocked)
        ));
        assert!(matches!(
            vault.retrieve_key(&conn, "a@x"),
            Err(HavenError::VaultLocked)
        ));
        assert!(matches!(
            vault.key_exists(&conn, "a@x"),
            Err(HavenError::VaultLocked)
        ));
        assert!(matches!(
            vault.delete_key(&mut conn, "a@x"),
            Err(HavenError::VaultLocked)
        ));
        assert!(matches!(
            vault.list_keys(&conn),
            Err(HavenError::VaultLocked)
        ));
    }

    #[test]
    fn unlock_then_round_trip() {
        let mut conn = test_db();
        let vault = Vault::new(fast_kdf());
        vault.unlock(&conn, "correct horse").unwrap();
        assert_eq!(vault.status(), VaultStatus::Unlocked);

        vault
            .store_key(&mut conn, "alice@x", b"s3cret", &HashMap::new())
            .unwrap();
        let record = vault.retrieve_key(&conn, "alice@x").unwrap();
        assert_eq!(record.key_data, b"s3cret");
    }

    #[test]
    fn wrong_passphrase_rejected_and_stays_locked() {
        let conn = test_db();
        let vault = Vault::new(fast_kdf());
        vault.unlock(&conn, "correct horse").unwrap();
        vault.lock();

        let result = vault.unlock(&conn, "battery staple");
        assert!(matches!(result, Err(HavenError::DecryptionFailed)));
        assert_eq!(vault.status(), VaultStatus::Locked);
    }

    #[test]
    fn relock_clears_session() {
        let mut conn = test_db();
        let vault = Vault::new(fast_kdf());
        vault.unlock(&conn, "pw").unwrap();
        vault
            .store_key(&mut conn, "alice@x", b"s3cret", &HashMap::new())
            .unwrap();

        vault.lock();
        assert!(matches!(
            vault.retrieve_key(&conn, "alice@x"),
            Err(HavenError::VaultLocked)
        ));

        // Unlock again with the same passphrase — secret still readable.
        vault.unlock(&conn, "pw").unwrap();
        assert_eq!(vault.retrieve_key(&conn, "alice@x").unwrap().key_data, b"s3cret");
    }

    #[test]
    fn empty_passphrase_rejected() {
        let conn = test_db();
        let vault = Vault::new(fast_kdf());
        assert!(matches!(
            vault.unlock(&conn, ""),
            Err(HavenError::InvalidArgument(_))
        ));
    }
}
