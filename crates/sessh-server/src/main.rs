//! sesshd server binary.

use clap::Parser;
use tracing::info;

use sessh_core::init_logging;
use sessh_core::transport::auth::LogAndAccept;
use sessh_server::handshake::UnconfiguredBackend;
use sessh_server::keys::HostKeys;
use sessh_server::stats::spawn_stats_reporter;
use sessh_server::{Cli, Listener};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = init_logging(cli.verbose, cli.log_file.as_deref(), cli.log_format.into()) {
        eprintln!("Failed to initialize logging: {err}");
        std::process::exit(1);
    }

    info!(version = env!("CARGO_PKG_VERSION"), "sesshd starting");

    let config = cli.server_config();

    let host_keys = match HostKeys::load(&config.key_paths) {
        Ok(keys) => keys,
        Err(err) => {
            eprintln!("Failed to load host keys: {err}");
            std::process::exit(1);
        }
    };

    let backend = UnconfiguredBackend::new(host_keys, LogAndAccept);

    let listener = match Listener::bind(&config, backend).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("Failed to bind {}: {err}", config.bind_addr);
            std::process::exit(1);
        }
    };

    let _stats = spawn_stats_reporter(listener.metrics(), config.stats_interval);

    if let Err(err) = listener.serve().await {
        eprintln!("Server error: {err}");
        std::process::exit(1);
    }
}
