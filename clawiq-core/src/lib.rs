//! Core shared library for the ClawIQ query tooling.
//!
//! Holds the pieces every other crate leans on: the common error type,
//! client configuration loading, logging setup and JSON helpers.

pub mod config;
pub mod errors;
pub mod logging;
pub mod serde_utils;

pub use config::{ClientConfig, DEFAULT_ENDPOINT};
pub use errors::{ClawIqError, ConfigError};
