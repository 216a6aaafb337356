//! Library root for `slack-quoter`.
//!
//! Slack-quoter keeps a shared collection of quoted Slack messages and serves
//! them back in a channel:
//! - `quoth [name]` posts a random saved quote, optionally by one author
//! - `forget <id>` deletes a saved quote
//! - messages starred in the channel are saved as they happen
//! - a one-shot crawl imports everything already starred or pinned
//!
//! The bot integrates with Slack for chat and SurrealDB for storage. The
//! architecture is built around extensible traits that allow for different
//! implementations of each service.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::info;

/// Public async entry for the listener.
///
/// Sets up necessary services and starts the slack-quoter runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with database and chat clients
/// - Starts the main event loop for processing events
pub async fn start(config: Config) -> Void {
    info!("Starting slack-quoter ...");

    install_crypto_provider();

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}

/// Public async entry for the crawler.
pub async fn crawl(config: Config) -> Void {
    info!("Starting slack-quoter crawl ...");

    install_crypto_provider();

    runtime::crawl(&config).await?;

    Ok(())
}

fn install_crypto_provider() {
    // Fails only if a provider is already installed, which is fine.
    let _ = crypto::ring::default_provider().install_default();
}
