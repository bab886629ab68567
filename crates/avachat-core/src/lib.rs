//! Avachat Core - Types, snapshot normalization, config, and error handling

pub mod config;
pub mod error;
pub mod types;

pub use config::AvachatConfig;
pub use error::{Error, Result};
pub use types::*;
