//! # Rankpoll Common Library
//!
//! Shared code for the rankpoll survey service:
//! - Database models and schema initialization
//! - Configuration loading and root folder resolution
//! - Error types

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
