//! Core types and utilities for the gas price aggregator
//!
//! This crate provides shared types used across all components:
//! - Fee data, fee records and unit formatting
//! - The endpoint registry
//! - Configuration schema
//! - Error taxonomy

pub mod types;
pub mod registry;
pub mod config;
pub mod errors;

pub use types::*;
pub use registry::*;
pub use config::*;
pub use errors::*;
