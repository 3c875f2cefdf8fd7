//! Core business logic for Tripdesk.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence adapters load rows, convert them into these types, and let the
//! engine decide.
//!
//! # Modules
//!
//! - `approval` - Rule matching, step sequencing and step reconciliation

pub mod approval;
