use rango_core::DirectoryConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration, built from command-line arguments by the binary
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Snapshot file (None = in-memory directory)
    pub db_path: Option<PathBuf>,

    /// How often pending changes are flushed to the snapshot
    pub flush_interval: Duration,

    /// Maximum number of visitor sessions kept (0 = unlimited)
    pub max_sessions: usize,

    /// Max mutating requests per second (0 = unlimited)
    pub mutation_rps: u32,

    /// Field limits and listing sizes
    pub directory: DirectoryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            db_path: None,
            flush_interval: Duration::from_secs(5),
            max_sessions: 10_000,
            mutation_rps: 0,
            directory: DirectoryConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = Some(path.into());
        self
    }

    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }

    pub fn with_mutation_rps(mut self, rps: u32) -> Self {
        self.mutation_rps = rps;
        self
    }

    pub fn with_directory(mut self, directory: DirectoryConfig) -> Self {
        self.directory = directory;
        self
    }

    /// Address to bind, validated
    pub fn bind_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("invalid bind address {}:{}: {}", self.host, self.port, e))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        self.bind_addr()?;

        if self.flush_interval.is_zero() {
            return Err("flush_interval must be greater than 0".to_string());
        }

        self.directory.validate()
    }
}
