//! Server CLI implementation.
//!
//! Provides command-line argument parsing for the sessh server.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};

use crate::listener::ServerConfig;

/// Log output format for CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CliLogFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// Structured JSON output.
    Json,
}

impl From<CliLogFormat> for sessh_core::LogFormat {
    fn from(fmt: CliLogFormat) -> Self {
        match fmt {
            CliLogFormat::Text => sessh_core::LogFormat::Text,
            CliLogFormat::Json => sessh_core::LogFormat::Json,
        }
    }
}

/// sessh server - session-layer endpoint for interactive shell channels.
#[derive(Debug, Parser)]
#[command(
    name = "sesshd",
    version,
    about = "sessh server - session-layer endpoint for interactive shell channels"
)]
pub struct Cli {
    /// Address to listen on
    #[arg(short = 'b', long = "bind", default_value = "0.0.0.0")]
    pub bind_addr: IpAddr,

    /// Port to listen on
    #[arg(short = 'p', long = "port", default_value = "2022")]
    pub port: u16,

    /// RSA host key file (PEM format)
    #[arg(long = "rsa-key", value_name = "FILE", default_value = "id_rsa")]
    pub rsa_key: PathBuf,

    /// DSA host key file (PEM format)
    #[arg(long = "dsa-key", value_name = "FILE", default_value = "id_dsa")]
    pub dsa_key: PathBuf,

    /// ECDSA host key file (PEM format)
    #[arg(long = "ecdsa-key", value_name = "FILE", default_value = "id_ecdsa")]
    pub ecdsa_key: PathBuf,

    /// Seconds between server statistics reports
    #[arg(
        long = "stats-interval",
        value_name = "SECONDS",
        default_value = "3600",
        env = "SESSH_STATS_INTERVAL_SECS"
    )]
    pub stats_interval_secs: u64,

    /// Increase verbosity (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Log to file instead of stderr
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(long = "log-format", default_value = "text")]
    pub log_format: CliLogFormat,
}

impl Cli {
    /// The full socket address to bind.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    /// Host key files in probe order.
    pub fn key_paths(&self) -> Vec<PathBuf> {
        vec![
            self.rsa_key.clone(),
            self.dsa_key.clone(),
            self.ecdsa_key.clone(),
        ]
    }

    /// Statistics reporting interval.
    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs)
    }

    /// Assemble the server configuration.
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: self.socket_addr(),
            key_paths: self.key_paths(),
            stats_interval: self.stats_interval(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
