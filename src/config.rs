use std::env;
use std::path::PathBuf;
use std::str::FromStr;

// ============================================================================
// Application Configuration
// ============================================================================
//
// Read from the process environment; a `.env` file in the working directory
// is loaded first if present.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Scylla,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "scylla" => Ok(StoreBackend::Scylla),
            other => Err(format!("expected 'memory' or 'scylla', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub store: StoreBackend,
    pub scylla_nodes: Vec<String>,
    pub scylla_keyspace: String,
    pub auth_tokens_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str, default: &str| lookup(var).unwrap_or_else(|| default.to_string());

        let server_host = get("SERVER_HOST", "127.0.0.1");
        let server_port = get("SERVER_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| ConfigError::Invalid { var: "SERVER_PORT", reason: e.to_string() })?;

        let store = get("ORDER_STORE", "memory")
            .parse::<StoreBackend>()
            .map_err(|reason| ConfigError::Invalid { var: "ORDER_STORE", reason })?;

        let scylla_nodes: Vec<String> = get("SCYLLA_NODES", "127.0.0.1:9042")
            .split(',')
            .map(str::trim)
            .filter(|node| !node.is_empty())
            .map(String::from)
            .collect();
        if scylla_nodes.is_empty() {
            return Err(ConfigError::Invalid {
                var: "SCYLLA_NODES",
                reason: "at least one node is required".to_string(),
            });
        }

        // Interpolated into CQL, so restrict to identifier characters.
        let scylla_keyspace = get("SCYLLA_KEYSPACE", "artmarket");
        let valid_keyspace = !scylla_keyspace.is_empty()
            && scylla_keyspace.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid_keyspace {
            return Err(ConfigError::Invalid {
                var: "SCYLLA_KEYSPACE",
                reason: format!("'{scylla_keyspace}' is not a valid keyspace name"),
            });
        }

        let auth_tokens_file = lookup("AUTH_TOKENS_FILE")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        tracing::info!("Application configuration loaded successfully.");

        Ok(Self {
            server_host,
            server_port,
            store,
            scylla_nodes,
            scylla_keyspace,
            auth_tokens_file,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
