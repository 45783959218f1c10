//! # AgroGuard Common Library
//!
//! Shared code for the AgroGuard backend:
//! - Catalog entity models and the analysis verdict type
//! - Error types
//! - Configuration loading

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
