//! # usagecast
//!
//! Command line front end for `usagecast-core`: reads fact files, applies
//! configuration and writes projected units as JSON Lines.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod sink;

pub use config::{AppConfig, InputFormat};
pub use error::AppError;
