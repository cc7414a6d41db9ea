//! Infrastructure layer constants
//!
//! Shard client defaults are defined in `shardcache_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "shardcache.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "shardcache";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "SHARDCACHE";

/// Separator between nested keys in environment variable names
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable holding a tracing filter directive
pub const LOG_FILTER_ENV: &str = "SHARDCACHE_LOG";

/// File name stem used when the log file path has none
pub const DEFAULT_LOG_FILE_STEM: &str = "shardcache";

// ============================================================================
// STATS CONSTANTS
// ============================================================================

/// Default interval between stats reports in seconds
pub const DEFAULT_STATS_INTERVAL_SECS: u64 = 10;
