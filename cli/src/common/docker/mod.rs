//! # Dockhand Docker Module Interface
//!
//! File: cli/src/common/docker/mod.rs
//!
//! ## Overview
//!
//! The container lifecycle core. Everything here is written against the
//! `EngineClient` trait so the same logic runs on the live daemon and on the
//! in-memory engine used by the tests.
//!
//! ## Architecture
//!
//! - **`engine`**: the capability trait, snapshot model and `EngineError`.
//! - **`client`**: `DockerEngine`, the `bollard`-backed implementation.
//! - **`connect`**: builds the `bollard::Docker` connection from configuration.
//! - **`state`**: Container Lookup and the Port Mapping Resolver.
//! - **`images`**: Image Presence Check with cancellable pull.
//! - **`operations`**: `DesiredContainer`, port specs, bind mounts and the
//!   create request built from them.
//! - **`lifecycle`**: the idempotent reconciler (`get_or_start`).
//! - **`teardown`**: the conflict-tolerant removal loop (`remove_by_name`).
//! - **`interaction`**: scripted attach sessions.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::docker::{self, DesiredContainer, PortSpec};
//!
//! # async fn run_example(engine: &dyn docker::EngineClient) -> crate::core::error::Result<()> {
//! let cancel = tokio_util::sync::CancellationToken::new();
//! let desired = DesiredContainer::new("nginx:alpine", "demo1").with_ports(vec![PortSpec::auto(80)]);
//! let reconciled = docker::get_or_start(engine, &desired, &cancel).await?;
//! let port = docker::state::host_port(&reconciled.snapshot, 80);
//! docker::remove_by_name(engine, "demo1", std::time::Duration::from_millis(200)).await?;
//! # Ok(())
//! # }
//! ```
//!

pub mod client;
pub mod connect;
pub mod engine;
pub mod images;
pub mod interaction;
pub mod lifecycle;
pub mod operations;
pub mod state;
pub mod teardown;

/// In-memory engine for unit tests.
#[cfg(test)]
pub mod fake;

// --- Re-exports for easier access from the command layer ---
pub use client::DockerEngine;
pub use engine::{ContainerSnapshot, ContainerState, EngineClient};
pub use lifecycle::{get_or_start, ReconcileAction, Reconciled};
pub use operations::{BindMount, DesiredContainer, PortSpec};
pub use teardown::remove_by_name;
