//! # Dockhand Teardown Sequencer
//!
//! File: cli/src/common/docker/teardown.rs
//!
//! ## Overview
//!
//! `remove_by_name` guarantees that no container with the given logical name
//! exists afterwards, whatever state it was in. Snapshots go stale the moment
//! they are read, so teardown is a loop: resolve, act on the observed state,
//! resolve again, until Lookup reports no match.
//!
//! ## Architecture
//!
//! Per iteration:
//! - `exited` / `created`: remove, then wait for removal.
//! - `running` or any other state: kill, remove, wait.
//!
//! A `Conflict` from kill means the container is not running (it exited on
//! its own, or it is `dead` and never will run again), so the same iteration
//! goes straight on to remove. A `Conflict` from remove means the container
//! changed state underneath us (a restart policy brought it back). A
//! `NotFound` from either means someone else removed it. Those two end the
//! iteration as `StepOutcome::Conflict` and the loop re-resolves. Any other
//! kill or removal error aborts with `RemovalFailed`. Waiting for removal is
//! best-effort; its failures are logged only.
//!
use super::engine::{ContainerSnapshot, ContainerState, EngineClient, EngineError};
use super::state;
use crate::core::error::{DockhandError, Result};
use anyhow::anyhow;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Result of a single teardown iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StepOutcome {
    Removed,
    /// State moved underneath us; re-resolve and try again.
    Conflict,
}

/// Removes the container named `name` if it exists.
///
/// # Arguments
///
/// * `engine` - The engine to act on.
/// * `name` - Logical name of the container (without the leading `/`).
/// * `retry_delay` - Pause after each tolerated conflict before re-resolving.
///
/// # Returns
///
/// * `Ok(true)` if a container was removed, `Ok(false)` if there was none.
///
/// # Errors
///
/// * `DockhandError::RemovalFailed` for kill/remove errors other than
///   conflict or not-found.
/// * `DockhandError::EngineUnavailable` if Lookup fails.
#[instrument(skip(engine, retry_delay), fields(container = %name))]
pub async fn remove_by_name(
    engine: &dyn EngineClient,
    name: &str,
    retry_delay: Duration,
) -> Result<bool> {
    let mut removed_any = false;
    let mut iteration = 0u32;

    while let Some(snapshot) = state::find_by_name(engine, name).await? {
        iteration += 1;
        debug!(
            "Teardown iteration {} for '{}' ({}, {})",
            iteration, name, snapshot.id, snapshot.state
        );
        match step(engine, name, &snapshot).await? {
            StepOutcome::Removed => {
                removed_any = true;
            }
            StepOutcome::Conflict => {
                if !retry_delay.is_zero() {
                    tokio::time::sleep(retry_delay).await;
                }
            }
        }
    }

    if removed_any {
        info!("Container '{}' removed.", name);
    } else {
        debug!("Container '{}' not present; nothing to remove.", name);
    }
    Ok(removed_any)
}

async fn step(
    engine: &dyn EngineClient,
    name: &str,
    snapshot: &ContainerSnapshot,
) -> Result<StepOutcome> {
    let id = snapshot.id.as_str();

    if !matches!(
        snapshot.state,
        ContainerState::Exited | ContainerState::Created
    ) {
        info!("Killing container '{}' ({})...", name, snapshot.state);
        match engine.kill_container(id).await {
            Ok(()) => {}
            Err(e) if e.is_conflict() => {
                debug!("'{}' is not running ({}); removing directly.", name, e);
            }
            Err(e) => return tolerate(name, "kill", e),
        }
    }

    if let Err(e) = engine.remove_container(id).await {
        return tolerate(name, "remove", e);
    }

    if let Err(e) = engine.wait_for_removal(id).await {
        warn!("Waiting for removal of '{}' failed: {}", name, e);
    }
    Ok(StepOutcome::Removed)
}

fn tolerate(name: &str, action: &str, err: EngineError) -> Result<StepOutcome> {
    if err.is_conflict() || err.is_not_found() {
        debug!(
            "{} of '{}' raced with a state change ({}); re-resolving.",
            action, name, err
        );
        Ok(StepOutcome::Conflict)
    } else {
        Err(anyhow!(DockhandError::RemovalFailed {
            name: name.to_string(),
            source: err,
        }))
    }
}
