//! # Dockhand Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! Cross-cutting infrastructure shared by the command handlers and the
//! lifecycle core:
//! - `config`: configuration loading, merging, and validation
//! - `error`: error types and error handling utilities
//!
//! ```rust
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{DockhandError, Result}; // For error handling
//! ```
//!
pub mod config;
pub mod error;
