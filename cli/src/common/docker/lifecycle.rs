//! # Dockhand Lifecycle Reconciler
//!
//! File: cli/src/common/docker/lifecycle.rs
//!
//! ## Overview
//!
//! `get_or_start` takes a `DesiredContainer` and makes sure a container with
//! that logical name exists and has been started. It is idempotent: calling it
//! again on an already running container only reads state.
//!
//! ## Architecture
//!
//! 1. Lookup by name (`state::find_by_name`).
//! 2. Missing: ensure the image is local (`images::ensure_image`), create the
//!    container from `operations::build_create_request`, then start it. Create
//!    and start are two separate engine calls; a container left in `created`
//!    is picked up by step 3 on the next run.
//! 3. Found in `created` or `exited`: start it. Its configuration is whatever
//!    it was created with; drift from `desired` is not detected.
//! 4. Found `running`: nothing to do.
//! 5. Re-resolve by name and return the fresh snapshot.
//!
//! Containers in any other state (`paused`, `restarting`, ...) are left alone
//! and reported as they are.
//!
use super::engine::{ContainerSnapshot, ContainerState, EngineClient};
use super::images;
use super::operations::{build_create_request, DesiredContainer};
use super::state;
use crate::core::error::{DockhandError, Result};
use anyhow::{anyhow, Context};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// What `get_or_start` had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    /// Image ensured, container created and started.
    Created,
    /// An existing `created`/`exited` container was started.
    Started,
    AlreadyRunning,
    /// Found in a state reconciliation does not act on.
    LeftAsIs,
}

#[derive(Debug, Clone)]
pub struct Reconciled {
    /// Fresh snapshot taken after the last mutating call.
    pub snapshot: ContainerSnapshot,
    pub action: ReconcileAction,
}

/// Ensures the container described by `desired` exists and is started.
///
/// # Arguments
///
/// * `engine` - The engine to reconcile against.
/// * `desired` - Image, name and creation parameters. Only used when the
///   container has to be created.
/// * `cancel` - Aborts an in-flight image pull.
///
/// # Returns
///
/// * `Ok(Reconciled)` holding a snapshot re-read after the last mutating call
///   and the `ReconcileAction` that was taken.
///
/// # Errors
///
/// * `PullAborted` / `PullFailed` from the image check. No container is
///   created in either case.
/// * `CreateFailed`, `StartFailed` when the engine refuses the call.
/// * `ContainerVanished` if the container is gone by the time it is re-read.
/// * `EngineUnavailable` if lookups fail.
#[instrument(skip(engine, desired, cancel), fields(container = %desired.name, image = %desired.image))]
pub async fn get_or_start(
    engine: &dyn EngineClient,
    desired: &DesiredContainer,
    cancel: &CancellationToken,
) -> Result<Reconciled> {
    let name = desired.name.as_str();

    let action = match state::find_by_name(engine, name).await? {
        None => {
            let request = build_create_request(desired)?;
            images::ensure_image(engine, &desired.image, cancel)
                .await
                .with_context(|| format!("Cannot create '{}' without its image", name))?;

            info!("Creating container '{}' from '{}'...", name, desired.image);
            let id = engine.create_container(&request).await.map_err(|source| {
                anyhow!(DockhandError::CreateFailed {
                    name: name.to_string(),
                    source,
                })
            })?;
            start(engine, name, &id).await?;
            ReconcileAction::Created
        }
        Some(existing) => match existing.state {
            ContainerState::Created | ContainerState::Exited => {
                info!(
                    "Container '{}' exists but is {}. Starting...",
                    name, existing.state
                );
                start(engine, name, &existing.id).await?;
                ReconcileAction::Started
            }
            ContainerState::Running => {
                info!("Container '{}' is already running.", name);
                ReconcileAction::AlreadyRunning
            }
            ContainerState::Other(ref other) => {
                warn!("Container '{}' is '{}'; leaving it untouched.", name, other);
                ReconcileAction::LeftAsIs
            }
        },
    };

    let snapshot = state::find_by_name(engine, name)
        .await?
        .ok_or_else(|| {
            anyhow!(DockhandError::ContainerVanished {
                name: name.to_string(),
            })
        })?;
    Ok(Reconciled { snapshot, action })
}

async fn start(engine: &dyn EngineClient, name: &str, id: &str) -> Result<()> {
    engine.start_container(id).await.map_err(|source| {
        anyhow!(DockhandError::StartFailed {
            name: name.to_string(),
            source,
        })
    })?;
    info!("Container '{}' started.", name);
    Ok(())
}
