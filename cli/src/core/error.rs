//! # Dockhand Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error taxonomy used throughout Dockhand. Every
//! failure the lifecycle core can surface to a caller has a dedicated variant
//! so that the command layer (and tests) can tell a missing image apart from a
//! refused start or an aborted pull.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `DockhandError`: A custom error enum using `thiserror` for specific error kinds
//! - `Result<T>`: A type alias for `anyhow::Result<T>` for flexible error handling
//!
//! Kinds by domain:
//! - Engine connectivity: `EngineUnavailable`
//! - Image acquisition: `PullFailed`, `PullAborted`
//! - Container mutation: `CreateFailed`, `StartFailed`, `RemovalFailed`
//! - Resolution: `ContainerNotFound`, `ContainerVanished`, `PortUnmapped`
//! - Attach sessions: `SessionFailed`, `SessionAborted`
//! - Input: `Config`, `ArgumentParsing`
//!
//! A removal conflict (state changed between snapshot and action) is not part
//! of this enum. It is recovered inside the teardown loop and never reaches a
//! caller.
//!
//! ## Examples
//!
//! ```rust
//! match lifecycle::get_or_start(engine, &desired, &cancel).await {
//!     Ok(reconciled) => println!("{} is {}", desired.name, reconciled.snapshot.state),
//!     Err(e) if e.downcast_ref::<DockhandError>().is_some_and(|de| matches!(de, DockhandError::PullAborted { .. })) => {
//!         println!("Pull interrupted, nothing was created.");
//!     }
//!     Err(e) => return Err(e),
//! }
//! ```
//!
use crate::common::docker::engine::EngineError;
use thiserror::Error;

/// Custom error type for the Dockhand application.
#[derive(Error, Debug)]
pub enum DockhandError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Container engine unavailable: {source}")]
    EngineUnavailable {
        #[source]
        source: EngineError,
    },

    #[error("Failed to pull image '{image}': {reason}")]
    PullFailed { image: String, reason: String },

    #[error("Pull of image '{image}' was interrupted before completion.")]
    PullAborted { image: String },

    #[error("Failed to create container '{name}': {source}")]
    CreateFailed {
        name: String,
        #[source]
        source: EngineError,
    },

    #[error("Failed to start container '{name}': {source}")]
    StartFailed {
        name: String,
        #[source]
        source: EngineError,
    },

    #[error("Failed to remove container '{name}': {source}")]
    RemovalFailed {
        name: String,
        #[source]
        source: EngineError,
    },

    #[error("Container '{name}' not found.")]
    ContainerNotFound { name: String },

    #[error("Container '{name}' disappeared right after being started.")]
    ContainerVanished { name: String },

    #[error("Container '{name}' has no host binding for port {port}.")]
    PortUnmapped { name: String, port: u16 },

    #[error("Attach session on container '{name}' failed: {reason}")]
    SessionFailed { name: String, reason: String },

    #[error("Attach session on container '{name}' was interrupted.")]
    SessionAborted { name: String },

    #[error("Argument parsing error: {0}")]
    ArgumentParsing(String),
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;
