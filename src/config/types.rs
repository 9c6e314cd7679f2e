// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub git: GitConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    pub show_headers: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    /// Seconds allowed for a client to send a complete request head
    pub read_timeout: u64,
    pub max_connections: Option<u64>,
    /// Seconds `stop()` waits for in-flight connections
    pub shutdown_timeout: u64,
}

impl PerformanceConfig {
    /// Deadline for receiving a complete request head
    pub const fn header_read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout)
    }
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
}

/// Command executed for every request
#[derive(Debug, Deserialize, Clone)]
pub struct GitConfig {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory for the command; the process cwd when unset
    #[serde(default)]
    pub repo_path: Option<PathBuf>,
    pub timeout_secs: u64,
    pub max_output_bytes: u64,
}

impl GitConfig {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
