//! # Dockhand Container Lookup and Port Resolution
//!
//! File: cli/src/common/docker/state.rs
//!
//! ## Overview
//!
//! Read-only queries against the engine:
//!
//! - **`find_by_name`**: resolves a logical name to a fresh `ContainerSnapshot`
//!   by enumerating *all* containers (running or not) and comparing each
//!   assigned name with its leading `/` stripped. First match wins.
//! - **`host_port`**: picks the host port bound to a container port out of a
//!   snapshot, ignoring IPv6 host addresses so the IPv4 binding is used.
//! - **`mapped_port`**: lookup followed by `host_port`.
//!
//! Snapshots are never cached. Every call goes back to the engine.
//!
//! ## Usage
//!
//! ```rust
//! if let Some(snapshot) = state::find_by_name(engine, "demo1").await? {
//!     println!("demo1 is {}", snapshot.state);
//! }
//! let port = state::mapped_port(engine, "nested", 2375).await?; // Some(9375)
//! ```
//!
use super::engine::{ContainerSnapshot, EngineClient};
use crate::core::error::{DockhandError, Result};
use anyhow::{anyhow, Context};
use tracing::{debug, instrument};

/// Returns the snapshot of the container named `name`, or `None`.
///
/// # Arguments
///
/// * `engine` - The engine to query.
/// * `name` - Logical name, matched exactly against every name the container
///   carries once the leading `/` is stripped. Stopped containers count.
///
/// # Returns
///
/// * `Ok(Some(snapshot))` for the first matching container.
/// * `Ok(None)` if no container carries that name.
///
/// # Errors
///
/// `DockhandError::EngineUnavailable` if the container list cannot be read.
#[instrument(skip(engine), fields(container = %name))]
pub async fn find_by_name(
    engine: &dyn EngineClient,
    name: &str,
) -> Result<Option<ContainerSnapshot>> {
    let containers = engine
        .list_containers(true)
        .await
        .map_err(|source| anyhow!(DockhandError::EngineUnavailable { source }))
        .with_context(|| format!("Failed to list containers while looking up '{}'", name))?;

    let found = containers.into_iter().find(|c| c.has_name(name));
    match &found {
        Some(c) => debug!("Container '{}' resolved to {} ({})", name, c.id, c.state),
        None => debug!("No container named '{}'", name),
    }
    Ok(found)
}

/// Host port bound to `private_port` in `snapshot`, if any.
///
/// Entries whose host address contains a colon are skipped; dual-stack engines
/// report every binding twice and the IPv4 one is canonical.
pub fn host_port(snapshot: &ContainerSnapshot, private_port: u16) -> Option<u16> {
    snapshot
        .ports
        .iter()
        .filter(|p| p.private_port == private_port)
        .filter(|p| !p.host_ip.as_deref().unwrap_or_default().contains(':'))
        .find_map(|p| p.host_port)
}

/// Resolves the externally reachable host port for `private_port` of the
/// container named `name`. `Ok(None)` means unmapped or no such container.
#[instrument(skip(engine), fields(container = %name, port = private_port))]
pub async fn mapped_port(
    engine: &dyn EngineClient,
    name: &str,
    private_port: u16,
) -> Result<Option<u16>> {
    let port = find_by_name(engine, name)
        .await?
        .and_then(|snapshot| host_port(&snapshot, private_port));
    debug!("Port {} of '{}' maps to {:?}", private_port, name, port);
    Ok(port)
}
