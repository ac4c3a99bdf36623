//! AES-256-GCM sealing of secret bytes.
//!
//! A sealed packet is the 12-byte random nonce followed by the ciphertext and
//! authentication tag. Packets are opaque to the rest of the crate; only
//! [`Cipher::open`] can tell a valid packet from a corrupt one.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};

use crate::error::{HavenError, Result};
use crate::vault::key::MasterKey;

/// Nonce length for AES-GCM (96 bits).
pub const NONCE_LEN: usize = 12;

/// A vault cipher bound to one derived master key.
pub struct Cipher {
    inner: Aes256Gcm,
}

impl Cipher {
    pub fn new(key: &MasterKey) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(key.as_bytes());
        Self {
            inner: Aes256Gcm::new(key),
        }
    }

    /// Encrypt plaintext into a nonce-prefixed packet.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .inner
            .encrypt(&nonce, plaintext)
            .map_err(|_| HavenError::Internal("encryption failed".into()))?;

        let mut packet = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        packet.extend_from_slice(&nonce);
        packet.extend_from_slice(&ciphertext);
        Ok(packet)
    }

    /// Decrypt a nonce-prefixed packet back into plaintext.
    ///
    /// Fails with [`HavenError::DecryptionFailed`] on truncated packets, a
    /// wrong key, or tampered ciphertext.
    pub fn open(&self, packet: &[u8]) -> Result<Vec<u8>> {
        if packet.len() < NONCE_LEN {
            return Err(HavenError::DecryptionFailed);
        }
        let (nonce_bytes, ciphertext) = packet.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        self.inner
            .decrypt(nonce, ciphertext)
            .map_err(|_| HavenError::DecryptionFailed)
    }
}
