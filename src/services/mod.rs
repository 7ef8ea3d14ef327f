//! Asynchronous services
//!
//! Everything that runs off the update loop: network providers, the
//! settings file watcher, and the bridge their results travel through.

pub mod async_bridge;
pub mod providers;
pub mod settings_watcher;
pub mod tracing_setup;
