//! quizd: a multi-session interactive quiz server
//!
//! Remote clients connect over TCP and drive an independent command session
//! (help, list, show, add, edit, delete, test, play, quit) against a shared
//! quiz catalog.
//!
//! Features:
//! - One isolated session per connection, many sessions concurrently
//! - In-memory or JSON-file-backed quiz catalog
//! - Play mode: every quiz once, in random order, until a miss
//! - Configuration via CLI arguments or TOML file

mod command;
mod config;
mod normalize;
mod play;
mod server;
mod session;
mod store;
mod text;

use config::Config;
use server::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Sessions write to sockets, never a tty, so colored's auto-detection
    // must not decide for us
    colored::control::set_override(config.color);

    info!(
        listen = %config.listen,
        data_file = ?config.data_file,
        echo_prefill = config.echo_prefill,
        "Starting quizd server"
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let server = Server::new(config)?;
        server.run().await
    })
}
