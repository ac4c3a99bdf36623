pub mod delete_key;
pub mod delete_memory;
pub mod get_memory;
pub mod key_exists;
pub mod list_keys;
pub mod lock_vault;
pub mod query_memories;
pub mod retrieve_key;
pub mod search_memories;
pub mod store_key;
pub mod store_memory;
pub mod unlock_vault;
pub mod update_memory;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

use delete_key::DeleteKeyParams;
use delete_memory::DeleteMemoryParams;
use get_memory::GetMemoryParams;
use key_exists::KeyExistsParams;
use list_keys::ListKeysParams;
use lock_vault::LockVaultParams;
use query_memories::QueryMemoriesParams;
use retrieve_key::RetrieveKeyParams;
use search_memories::SearchMemoriesParams;
use store_key::StoreKeyParams;
use store_memory::StoreMemoryParams;
use unlock_vault::UnlockVaultParams;
use update_memory::UpdateMemoryParams;

use crate::config::HavenConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::HavenError;
use crate::memory;
use crate::vault::Vault;

/// The haven tool handler. Holds shared state (db connection, vault,
/// embedding provider, config) and exposes the vault and memory services via
/// the `#[tool_router]` macro.
#[derive(Clone)]
pub struct HavenTools {
    tool_router: ToolRouter<Self>,
    db: Arc<Mutex<Connection>>,
    vault: Arc<Vault>,
    embedding: Arc<dyn EmbeddingProvider>,
    config: Arc<HavenConfig>,
}

impl HavenTools {
    pub fn new(
        db: Arc<Mutex<Connection>>,
        vault: Arc<Vault>,
        embedding: Arc<dyn EmbeddingProvider>,
        config: Arc<HavenConfig>,
    ) -> Self {
        Self {
            tool_router: Self::tool_router(),
            db,
            vault,
            embedding,
            config,
        }
    }

    /// Run a closure against the shared connection on the blocking pool.
    async fn with_db<T, F>(&self, f: F) -> Result<T, String>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> crate::error::Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut conn = db
                .lock()
                .map_err(|e| HavenError::Internal(format!("db lock poisoned: {e}")))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| format!("db task failed: {e}"))?
        .map_err(|e| e.to_string())
    }

    /// Embed content on the blocking pool (the provider does network I/O).
    async fn embed(&self, content: &str) -> Result<Vec<f32>, String> {
        let provider = Arc::clone(&self.embedding);
        let content = content.to_string();
        tokio::task::spawn_blocking(move || provider.embed(&content))
            .await
            .map_err(|e| format!("embedding task failed: {e}"))?
            .map_err(|e| e.to_string())
    }
}

#[tool_router]
impl HavenTools {
    // ── Vault service ─────────────────────────────────────────────────────

    /// Unlock the vault for this session.
    #[tool(description = "Unlock the vault by deriving the master key from the session passphrase. Required before any key operation.")]
    async fn unlock_vault(
        &self,
        Parameters(params): Parameters<UnlockVaultParams>,
    ) -> Result<String, String> {
        let vault = Arc::clone(&self.vault);
        self.with_db(move |conn| vault.unlock(conn, &params.passphrase))
            .await?;

        Ok(serde_json::json!({"status": "unlocked"}).to_string())
    }

    /// Lock the vault, clearing the session key.
    #[tool(description = "Lock the vault. Key operations fail until the next unlock.")]
    async fn lock_vault(
        &self,
        Parameters(_params): Parameters<LockVaultParams>,
    ) -> Result<String, String> {
        self.vault.lock();
        Ok(serde_json::json!({"status": "locked"}).to_string())
    }

    /// Encrypt and store a secret.
    #[tool(description = "Encrypt secret bytes under the vault master key and store them under key_id. Overwrites any existing entry.")]
    async fn store_key(
        &self,
        Parameters(params): Parameters<StoreKeyParams>,
    ) -> Result<String, String> {
        let vault = Arc::clone(&self.vault);
        let key_id = params.key_id;
        let metadata = params.metadata.unwrap_or_default();

        tracing::info!(key_id = %key_id, bytes = params.key_data.len(), "store_key called");

        let key_id_for_db = key_id.clone();
        self.with_db(move |conn| {
            vault.store_key(conn, &key_id_for_db, &params.key_data, &metadata)
        })
        .await?;

        Ok(serde_json::json!({
            "success": true,
            "message": format!("Key '{key_id}' stored successfully"),
        })
        .to_string())
    }

    /// Retrieve and decrypt a secret.
    #[tool(description = "Decrypt and return the secret stored under key_id, with its metadata and creation timestamp.")]
    async fn retrieve_key(
        &self,
        Parameters(params): Parameters<RetrieveKeyParams>,
    ) -> Result<String, String> {
        let vault = Arc::clone(&self.vault);

        tracing::info!(key_id = %params.key_id, "retrieve_key called");

        let record = self
            .with_db(move |conn| vault.retrieve_key(conn, &params.key_id))
            .await?;

        serde_json::to_string(&record).map_err(|e| format!("serialization failed: {e}"))
    }

    /// Check whether a key exists without decrypting it.
    #[tool(description = "Check whether a secret exists under key_id. Never decrypts.")]
    async fn key_exists(
        &self,
        Parameters(params): Parameters<KeyExistsParams>,
    ) -> Result<String, String> {
        let vault = Arc::clone(&self.vault);
        let exists = self
            .with_db(move |conn| vault.key_exists(conn, &params.key_id))
            .await?;

        Ok(serde_json::json!({"exists": exists}).to_string())
    }

    /// Delete a secret.
    #[tool(description = "Delete the secret stored under key_id. Deleting a missing key is not an error.")]
    async fn delete_key(
        &self,
        Parameters(params): Parameters<DeleteKeyParams>,
    ) -> Result<String, String> {
        let vault = Arc::clone(&self.vault);
        let key_id = params.key_id;

        tracing::info!(key_id = %key_id, "delete_key called");

        let key_id_for_db = key_id.clone();
        self.with_db(move |conn| vault.delete_key(conn, &key_id_for_db))
            .await?;

        Ok(serde_json::json!({
            "success": true,
            "message": format!("Key '{key_id}' deleted successfully"),
        })
        .to_string())
    }

    /// List all stored key identifiers.
    #[tool(description = "List the key_ids of all stored secrets.")]
    async fn list_keys(
        &self,
        Parameters(_params): Parameters<ListKeysParams>,
    ) -> Result<String, String> {
        let vault = Arc::clone(&self.vault);
        let key_ids = self.with_db(move |conn| vault.list_keys(conn)).await?;

        Ok(serde_json::json!({"key_ids": key_ids}).to_string())
    }

    // ── Memory service ────────────────────────────────────────────────────

    /// Store a new memory.
    #[tool(description = "Store a free-text memory with optional tags and metadata. The content is embedded and indexed for similarity search.")]
    async fn store_memory(
        &self,
        Parameters(params): Parameters<StoreMemoryParams>,
    ) -> Result<String, String> {
        if params.content.trim().is_empty() {
            return Err("content must not be empty".into());
        }

        let tags = params.tags.unwrap_or_default();
        let metadata = params.metadata.unwrap_or_default();

        tracing::info!(
            content_len = params.content.len(),
            tags = tags.len(),
            "store_memory called"
        );

        let embedding = self.embed(&params.content).await?;

        let dims = self.config.index.dimensions;
        let content = params.content;
        let memory = self
            .with_db(move |conn| {
                memory::store::store_memory(conn, &content, &tags, &metadata, &embedding, dims)
            })
            .await?;

        tracing::info!(id = %memory.id, "memory indexed");

        Ok(serde_json::json!({
            "memory_id": memory.id,
            "success": true,
            "message": "Indexed",
        })
        .to_string())
    }

    /// Query memories by substring and filters.
    #[tool(description = "Lexical search: case-insensitive substring match against content and tags, with exact-match tag/metadata filters. Newest first.")]
    async fn query_memories(
        &self,
        Parameters(params): Parameters<QueryMemoriesParams>,
    ) -> Result<String, String> {
        let limit = match params.limit {
            Some(n) if n > 0 => n,
            _ => self.config.index.default_query_limit,
        };
        let filters = params.filters.unwrap_or_default();

        tracing::info!(query = %params.query, limit, "query_memories called");

        let page = self
            .with_db(move |conn| {
                memory::query::query_memories(conn, &params.query, limit, &filters)
            })
            .await?;

        serde_json::to_string(&page).map_err(|e| format!("serialization failed: {e}"))
    }

    /// Fetch a memory by id.
    #[tool(description = "Fetch a single memory by its identifier.")]
    async fn get_memory(
        &self,
        Parameters(params): Parameters<GetMemoryParams>,
    ) -> Result<String, String> {
        let memory = self
            .with_db(move |conn| memory::store::get_memory(conn, &params.memory_id))
            .await?;

        Ok(serde_json::json!({"memory": memory}).to_string())
    }

    /// Replace a memory's content and tags.
    #[tool(description = "Replace a memory's content and tags and re-embed it. Metadata and creation time are preserved.")]
    async fn update_memory(
        &self,
        Parameters(params): Parameters<UpdateMemoryParams>,
    ) -> Result<String, String> {
        if params.content.trim().is_empty() {
            return Err("content must not be empty".into());
        }

        let tags = params.tags.unwrap_or_default();

        tracing::info!(id = %params.memory_id, "update_memory called");

        let embedding = self.embed(&params.content).await?;

        let dims = self.config.index.dimensions;
        let memory = self
            .with_db(move |conn| {
                memory::store::update_memory(
                    conn,
                    &params.memory_id,
                    &params.content,
                    &tags,
                    &embedding,
                    dims,
                )
            })
            .await?;

        Ok(serde_json::json!({"memory": memory}).to_string())
    }

    /// Similarity search over stored memories.
    #[tool(description = "Vector search: rank memories by cosine similarity against a caller-supplied query embedding, with a score threshold.")]
    async fn search_memories(
        &self,
        Parameters(params): Parameters<SearchMemoriesParams>,
    ) -> Result<String, String> {
        let limit = match params.limit {
            Some(n) if n > 0 => n,
            _ => self.config.index.default_search_limit,
        };
        let threshold = params.similarity_threshold.unwrap_or(0.0);
        let dims = self.config.index.dimensions;

        tracing::info!(limit, threshold, "search_memories called");

        let matches = self
            .with_db(move |conn| {
                memory::query::search_memories(
                    conn,
                    &params.query_embedding,
                    limit,
                    threshold,
                    dims,
                )
            })
            .await?;

        Ok(serde_json::json!({"matches": matches}).to_string())
    }

    /// Delete a memory.
    #[tool(description = "Delete a memory and its embedding. Deleting a missing memory is not an error.")]
    async fn delete_memory(
        &self,
        Parameters(params): Parameters<DeleteMemoryParams>,
    ) -> Result<String, String> {
        let id = params.memory_id;

        tracing::info!(id = %id, "delete_memory called");

        let id_for_db = id.clone();
        let existed = self
            .with_db(move |conn| memory::store::delete_memory(conn, &id_for_db))
            .await?;

        let message = if existed { "Deleted" } else { "Not found" };
        Ok(serde_json::json!({
            "success": existed,
            "message": message,
        })
        .to_string())
    }
}

#[tool_handler]
impl ServerHandler for HavenTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "haven is a local encrypted vault and memory daemon. Unlock the vault with \
                 unlock_vault before key operations; use store_memory/query_memories/\
                 search_memories for the personal memory store."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
