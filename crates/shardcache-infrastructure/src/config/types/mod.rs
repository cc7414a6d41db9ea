//! Configuration types module

pub mod app;
pub mod logging;
pub mod stats;

pub use app::{AppConfig, ShardProviderKind};
pub use logging::LoggingConfig;
pub use stats::StatsConfig;
