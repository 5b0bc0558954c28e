/*
[INPUT]:  Public API exports for the stex-watch crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod config;
pub mod stats;
pub mod subscriptions;
pub mod watcher;

// Re-export main types for convenience
pub use config::{SubscriptionConfig, WatchConfig};
pub use stats::WatchStats;
pub use subscriptions::channel_names;
pub use watcher::Watcher;
