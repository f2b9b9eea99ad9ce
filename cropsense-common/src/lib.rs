//! # CropSense Common Library
//!
//! Shared code for CropSense services:
//! - Error types
//! - Bootstrap configuration (TOML discovery, logging section, compiled defaults)

pub mod config;
pub mod error;

pub use error::{Error, Result};
