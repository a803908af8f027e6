//! Store configuration.

use std::time::Duration;

/// Connection pool configuration for a save store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Connection target, e.g. `postgres://…` or `sqlite://saves.db`.
    pub url: String,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
    /// Minimum number of idle connections kept open.
    pub min_connections: u32,
    /// How long a caller waits for a pooled connection before failing.
    pub acquire_timeout: Duration,
    /// Idle time after which a pooled connection may be closed.
    pub idle_timeout: Duration,
}

impl StoreConfig {
    /// Create a configuration with default pool settings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 0,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(300),
        }
    }

    /// Set the maximum connections.
    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the minimum connections.
    pub fn with_min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Set the acquire timeout.
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Set the idle timeout.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Which backend the URL selects, if any.
    pub fn backend(&self) -> Option<Backend> {
        let scheme = self.url.split(':').next()?.to_ascii_lowercase();
        match scheme.as_str() {
            "postgres" | "postgresql" => Some(Backend::Postgres),
            "sqlite" => Some(Backend::Sqlite),
            _ => None,
        }
    }

    /// Whether the URL points at a private in-memory SQLite database.
    pub(crate) fn is_sqlite_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

/// Supported store backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Sqlite,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_scheme() {
        assert_eq!(
            StoreConfig::new("postgres://localhost/saves").backend(),
            Some(Backend::Postgres)
        );
        assert_eq!(
            StoreConfig::new("postgresql://u:p@db:5432/saves").backend(),
            Some(Backend::Postgres)
        );
        assert_eq!(
            StoreConfig::new("sqlite://saves.db").backend(),
            Some(Backend::Sqlite)
        );
        assert_eq!(StoreConfig::new("sqlite::memory:").backend(), Some(Backend::Sqlite));
        assert_eq!(StoreConfig::new("mysql://localhost/saves").backend(), None);
        assert_eq!(StoreConfig::new("").backend(), None);
    }

    #[test]
    fn test_builder() {
        let config = StoreConfig::new("sqlite::memory:")
            .with_max_connections(4)
            .with_min_connections(1)
            .with_acquire_timeout(Duration::from_millis(250));
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.min_connections, 1);
        assert_eq!(config.acquire_timeout, Duration::from_millis(250));
        assert!(config.is_sqlite_memory());
    }
}
