//! Configuration for admission-gateway deployments.
//!
//! Mirrors `scratchstack-config`'s split between a raw, `Deserialize`-able
//! shape and a resolved, defaulted, validated shape the rest of the system
//! actually consumes.

mod config;
mod error;
mod resolved;

pub use config::Config;
pub use error::ConfigError;
pub use resolved::ResolvedConfig;
