//! Gateway configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use romvault_core::{SlotPolicy, StoreConfig};

/// Default request body limit for save uploads. Base64 adds a third on top of
/// the raw save, so this admits states of roughly 48 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// romvault gateway command line arguments.
#[derive(Debug, Parser)]
#[command(name = "romvault-gateway")]
#[command(about = "Serves ROMs and keeps emulator saves in a relational store")]
#[command(version)]
pub struct Args {
    /// Save store connection URL (postgres://… or sqlite://…).
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Address to listen on for HTTP requests.
    #[arg(short, long, env = "ROMVAULT_LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: String,

    /// Port override for the listen address.
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Directory holding the ROM files to serve.
    #[arg(long, env = "ROMVAULT_ROMS_DIR", default_value = "roms")]
    pub roms_dir: PathBuf,

    /// Maximum number of pooled store connections.
    #[arg(long, default_value_t = 10)]
    pub pool_max_connections: u32,

    /// Minimum number of idle store connections to keep open.
    #[arg(long, default_value_t = 0)]
    pub pool_min_connections: u32,

    /// Timeout (ms) when acquiring a pooled connection.
    #[arg(long, default_value_t = 30_000)]
    pub pool_acquire_timeout_ms: u64,

    /// Idle timeout (ms) after which pooled connections can be closed.
    #[arg(long, default_value_t = 300_000)]
    pub pool_idle_timeout_ms: u64,

    /// Deadline (ms) for each save store operation.
    #[arg(long, default_value_t = 30_000)]
    pub request_timeout_ms: u64,

    /// Largest accepted request body (bytes) on the save endpoints.
    #[arg(long, env = "ROMVAULT_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Read a non-numeric `slot` query value as slot 0 instead of rejecting it.
    #[arg(long, env = "ROMVAULT_LENIENT_SLOTS")]
    pub lenient_slots: bool,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address to listen on for HTTP requests.
    pub listen_addr: String,
    /// Save store connection URL.
    pub database_url: String,
    /// Directory holding the ROM files.
    pub roms_dir: PathBuf,
    /// Maximum number of pooled store connections.
    pub pool_max_connections: u32,
    /// Minimum number of idle store connections.
    pub pool_min_connections: u32,
    /// Timeout when acquiring a pooled connection.
    pub pool_acquire_timeout: Duration,
    /// Idle timeout after which pooled connections can be closed.
    pub pool_idle_timeout: Duration,
    /// Deadline for each save store operation.
    pub request_timeout: Duration,
    /// Largest accepted request body on the save endpoints.
    pub max_body_bytes: usize,
    /// Treatment of malformed slot values.
    pub slot_policy: SlotPolicy,
}

impl From<&Args> for GatewayConfig {
    fn from(args: &Args) -> Self {
        Self {
            listen_addr: listen_addr(&args.listen, args.port),
            database_url: args.database_url.clone(),
            roms_dir: args.roms_dir.clone(),
            pool_max_connections: args.pool_max_connections,
            pool_min_connections: args.pool_min_connections,
            pool_acquire_timeout: Duration::from_millis(args.pool_acquire_timeout_ms),
            pool_idle_timeout: Duration::from_millis(args.pool_idle_timeout_ms),
            request_timeout: Duration::from_millis(args.request_timeout_ms),
            max_body_bytes: args.max_body_bytes,
            slot_policy: if args.lenient_slots {
                SlotPolicy::Lenient
            } else {
                SlotPolicy::Strict
            },
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            database_url: "sqlite::memory:".to_string(),
            roms_dir: PathBuf::from("roms"),
            pool_max_connections: 10,
            pool_min_connections: 0,
            pool_acquire_timeout: Duration::from_secs(30),
            pool_idle_timeout: Duration::from_secs(300),
            request_timeout: Duration::from_secs(30),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            slot_policy: SlotPolicy::Strict,
        }
    }
}

impl GatewayConfig {
    /// Store pool settings derived from this configuration.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.database_url)
            .with_max_connections(self.pool_max_connections)
            .with_min_connections(self.pool_min_connections)
            .with_acquire_timeout(self.pool_acquire_timeout)
            .with_idle_timeout(self.pool_idle_timeout)
    }
}

/// Apply a port override to a `host:port` listen address.
fn listen_addr(listen: &str, port: Option<u16>) -> String {
    match port {
        Some(port) => {
            let host = listen.rsplit_once(':').map_or(listen, |(host, _)| host);
            format!("{host}:{port}")
        }
        None => listen.to_string(),
    }
}
