//! # Dockhand Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared functionality used by the command handlers. Currently this is the
//! container lifecycle core under `docker`; command-specific glue stays in
//! `commands::` and cross-cutting infrastructure in `core::`.
//!

/// Container lifecycle core: engine trait, lookup, reconcile, teardown.
pub mod docker;
