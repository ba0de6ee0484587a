/// TOML configuration (`ragline.toml`)
pub mod config;
/// Tracing subscriber setup
pub mod logging;
