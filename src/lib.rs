//! Local-first encrypted vault and memory daemon.
//!
//! haven is the storage backend behind a desktop chat client. It serves two
//! local services from a single SQLite database:
//!
//! - **Vault** — at-rest-encrypted secrets keyed by caller-chosen identity
//!   strings. Secrets are sealed with AES-256-GCM under a master key derived
//!   per session (Argon2id over a persisted salt); the vault is an explicit
//!   Locked/Unlocked state machine.
//! - **Memory** — free-text records with tags and string metadata,
//!   retrievable both lexically (substring + filters, newest first) and by
//!   cosine similarity over caller-associated embedding vectors.
//!
//! # Architecture
//!
//! - **Storage**: SQLite (WAL, `synchronous=FULL`) with
//!   [sqlite-vec](https://github.com/asg017/sqlite-vec) for vector storage.
//!   Record and vector writes share one transaction, so the index never
//!   drifts from the records.
//! - **Embeddings**: supplied externally — the daemon stores and compares
//!   vectors but never runs a model. See [`embedding::EmbeddingProvider`].
//! - **Transport**: tool server over stdio (primary) or Streamable HTTP.
//!
//! # Modules
//!
//! - [`config`] — Configuration loading from TOML files and environment variables
//! - [`db`] — SQLite initialization, schema, and migrations
//! - [`vault`] — Encrypted key store and the Locked/Unlocked state machine
//! - [`memory`] — Memory records, embedding index, and the query engine
//! - [`embedding`] — Provider seam for externally computed vectors

pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod memory;
pub mod vault;

pub use error::{HavenError, Result};
