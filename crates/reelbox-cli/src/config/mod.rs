//! Application configuration module.
//!
//! Locates the config and data directories, reads the TOML config file and
//! merges it with the environment into a [`ResolvedConfig`] that is fixed
//! for the rest of the process.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::ResolvedConfig;
pub use paths::AppPaths;
