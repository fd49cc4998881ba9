//! # filevet Common Library
//!
//! Shared code for the filevet services including:
//! - Content-type detection engine (signature matching + CSV heuristic)
//! - Configuration loading
//! - Common error types

pub mod config;
pub mod detect;
pub mod error;

pub use error::{Error, Result};
