//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config source (local JSON file or remote URL)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → MonitorConfig (validated, immutable)
//!     → snapshot.rs (atomic swap of the shared document)
//!     → consumers read via SharedConfig::current
//!
//! On change detection:
//!     watch subsystem fetches raw bytes
//!     → ConfigApplier parses, validates, checksums
//!     → unchanged documents are dropped
//!     → accepted documents atomically replace the snapshot
//!     → subscribers observe a new generation
//! ```
//!
//! # Design Decisions
//! - Config is immutable once accepted; changes require full replacement
//! - Validation separates syntactic (serde) from semantic checks
//! - A failed load never disturbs the currently visible document

pub mod loader;
pub mod schema;
pub mod snapshot;
pub mod validation;

pub use loader::ConfigError;
pub use schema::{MonitorConfig, Probe, ProbeRequest};
pub use snapshot::{ApplyOutcome, ConfigApplier, SharedConfig};
