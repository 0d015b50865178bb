//! Probe Monitoring Agent Library

pub mod config;
pub mod watch;

pub use config::schema::MonitorConfig;
pub use config::snapshot::{ConfigApplier, SharedConfig};
pub use watch::registry::{WatcherHandle, WatcherRegistry};
pub use watch::source::ConfigLocation;
