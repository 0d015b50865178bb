//! Live configuration source watching.
//!
//! # Data Flow
//! ```text
//! startup locations (files + URLs)
//!     → registry.rs picks an implementation per location tag
//!     → poller.rs polls URLs on a fixed interval
//!     → watcher.rs subscribes to filesystem notifications
//!     → every detection runs one fetch-and-apply cycle (source.rs)
//!     → ConfigApplier accepts or rejects the document
//! ```
//!
//! # Design Decisions
//! - One independent task per location; a stalled source never blocks
//!   the others or any snapshot reader
//! - Each watcher honors its own cancellation token at every suspension
//!   point; cancel is idempotent and never restarts a watcher
//! - Setup failures are per-location and synchronous; runtime fetch
//!   failures are logged and retried on the next natural cycle

pub mod poller;
pub mod registry;
pub mod source;
pub mod watcher;

pub use registry::{StartReport, WatchSetupError, WatcherHandle, WatcherRegistry};
pub use source::{ConfigLocation, ConfigSource, FetchError};
