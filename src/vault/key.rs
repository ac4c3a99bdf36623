//! Master-key derivation.
//!
//! The vault-wide master key is derived once per unlocked session from the
//! user's passphrase with Argon2id over a random salt persisted in
//! `vault_meta`. Key material lives only in a zeroized wrapper.

use argon2::{Algorithm, Argon2, Params, Version};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::VaultConfig;
use crate::error::{HavenError, Result};

/// Derived key length (AES-256).
pub const KEY_LEN: usize = 32;

/// Persisted KDF salt length.
pub const SALT_LEN: usize = 16;

/// A derived 256-bit master key, zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; KEY_LEN]);

impl MasterKey {
    /// Derive the master key from a passphrase and the persisted salt.
    ///
    /// Deterministic: same passphrase, salt and parameters always produce the
    /// same key, so the vault can be reopened across sessions.
    pub fn derive(passphrase: &str, salt: &[u8; SALT_LEN], config: &VaultConfig) -> Result<Self> {
        let params = Params::new(
            config.kdf_memory_kib,
            config.kdf_iterations,
            config.kdf_parallelism,
            Some(KEY_LEN),
        )
        .map_err(|e| HavenError::KeyDerivation(e.to_string()))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut out = [0u8; KEY_LEN];
        argon2
            .hash_password_into(passphrase.as_bytes(), salt, &mut out)
            .map_err(|e| HavenError::KeyDerivation(e.to_string()))?;

        Ok(Self(out))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

/// Generate a fresh random KDF salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    use aes_gcm::aead::rand_core::RngCore;

    let mut salt = [0u8; SALT_LEN];
    aes_gcm::aead::OsRng.fill_bytes(&mut salt);
    salt
}
