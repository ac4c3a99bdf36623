//! Error taxonomy shared by the vault and memory services.
//!
//! Every operation returns a typed [`HavenError`]; the tool layer renders the
//! message verbatim to the client. Deletes never produce [`HavenError::NotFound`]
//! — they are idempotent by design.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HavenError>;

#[derive(Debug, Error)]
pub enum HavenError {
    /// The requested entity (secret or memory) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller supplied an invalid input (empty key/content, dimension mismatch).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A secret operation was attempted while the vault is locked.
    #[error("vault is locked — unlock it first")]
    VaultLocked,

    /// Ciphertext could not be decrypted: corrupt data or wrong master key.
    #[error("decryption failed: ciphertext corrupt or wrong passphrase")]
    DecryptionFailed,

    /// Reserved for uniqueness constraints beyond key_id overwrite semantics.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Master-key derivation failed (bad KDF parameters).
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// The embedding provider could not produce a vector.
    #[error("embedding provider error: {0}")]
    Embedding(String),

    /// Underlying SQLite failure.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Filesystem failure (database directory, config file).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata/tags column (de)serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invariant violation that callers cannot act on.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_stable() {
        assert_eq!(
            HavenError::NotFound("alice@x".into()).to_string(),
            "not found: alice@x"
        );
        assert_eq!(
            HavenError::VaultLocked.to_string(),
            "vault is locked — unlock it first"
        );
    }
}
