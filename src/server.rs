//! Server initialization for stdio and Streamable HTTP transports.
//!
//! Provides [`serve_stdio`] and [`serve_http`] entry points that wire up the
//! database, vault, embedding provider, and tool handler into a running
//! server.

use crate::config::HavenConfig;
use crate::db;
use crate::embedding;
use crate::tools::HavenTools;
use crate::vault::Vault;
use anyhow::Result;
use rmcp::ServiceExt;
use std::sync::{Arc, Mutex};

/// Shared setup: open DB, create the vault and embedding provider.
fn setup_shared_state(
    config: HavenConfig,
) -> Result<(
    Arc<Mutex<rusqlite::Connection>>,
    Arc<Vault>,
    Arc<dyn embedding::EmbeddingProvider>,
    Arc<HavenConfig>,
)> {
    let db_path = config.resolved_db_path();
    let conn = db::open_database(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    // Warn if the configured dimensionality disagrees with the one the
    // vector table was created with — vectors of the wrong size will be
    // rejected at insert time.
    if let Ok(Some(stored_dim)) = db::migrations::get_embedding_dim(&conn) {
        if stored_dim != config.index.dimensions {
            tracing::warn!(
                stored = stored_dim,
                configured = config.index.dimensions,
                "index dimensionality differs from the database's — inserts will fail"
            );
        }
    }

    let db = Arc::new(Mutex::new(conn));

    let vault = Arc::new(Vault::new(config.vault.clone()));
    tracing::info!("vault ready (locked)");

    let provider = embedding::create_provider(&config.embedding)?;
    let embedding: Arc<dyn embedding::EmbeddingProvider> = Arc::from(provider);
    tracing::info!("embedding provider ready");

    let config = Arc::new(config);

    Ok((db, vault, embedding, config))
}

/// Start the daemon over stdio transport.
pub async fn serve_stdio(config: HavenConfig) -> Result<()> {
    tracing::info!("starting haven daemon on stdio");

    let (db, vault, embedding, config) = setup_shared_state(config)?;

    let tools = HavenTools::new(db, vault, embedding, config);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("daemon running — waiting for client");

    server.waiting().await?;
    tracing::info!("daemon shut down");

    Ok(())
}

/// Start the daemon over Streamable HTTP transport.
pub async fn serve_http(config: HavenConfig) -> Result<()> {
    let host = config.server.host.clone();
    let port = config.server.port;
    let bind_addr = format!("{host}:{port}");

    tracing::info!(addr = %bind_addr, "starting haven daemon on HTTP");

    let (db, vault, embedding, config) = setup_shared_state(config)?;

    let service = rmcp::transport::streamable_http_server::StreamableHttpService::new(
        move || {
            Ok(HavenTools::new(
                db.clone(),
                vault.clone(),
                embedding.clone(),
                config.clone(),
            ))
        },
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default()
            .into(),
        Default::default(),
    );

    let router = axum::Router::new().nest_service("/rpc", service);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "daemon listening at http://{bind_addr}/rpc");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to listen for ctrl-c");
            tracing::info!("shutting down HTTP server");
        })
        .await?;

    Ok(())
}
