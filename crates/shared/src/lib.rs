//! Shared types, errors, and configuration for Tripdesk.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for tenant, rule and master-data references
//! - Pagination types for list queries
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, DatabaseConfig, LoggingConfig};
pub use error::{AppError, AppResult};
