//! # Dockhand Image Presence Check
//!
//! File: cli/src/common/docker/images.rs
//!
//! ## Overview
//!
//! Makes sure an image reference is available locally before a container is
//! created from it. Presence is an exact string match against the repo tags of
//! every locally known image; no digest or tag normalisation is attempted.
//!
//! When the image is missing a pull is issued and awaited to completion. The
//! wait races against a `CancellationToken`: if the token fires first the pull
//! is abandoned and `PullAborted` is returned, so the caller never goes on to
//! create a container from an image that may still be missing.
//!
use super::engine::EngineClient;
use crate::core::error::{DockhandError, Result};
use anyhow::anyhow;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// `true` if any local image carries exactly `reference` as a tag.
#[instrument(skip(engine), fields(image = %reference))]
pub async fn image_present(engine: &dyn EngineClient, reference: &str) -> Result<bool> {
    let images = engine
        .list_images()
        .await
        .map_err(|source| anyhow!(DockhandError::EngineUnavailable { source }))?;
    match images
        .iter()
        .find(|img| img.repo_tags.iter().any(|tag| tag == reference))
    {
        Some(img) => {
            debug!("Image '{}' present locally as {}", reference, img.id);
            Ok(true)
        }
        None => {
            debug!("Image '{}' not present locally.", reference);
            Ok(false)
        }
    }
}

/// Pulls `reference` unless it is already present, blocking until the pull
/// completes.
///
/// # Errors
///
/// * `DockhandError::PullAborted` if `cancel` fires before the pull finishes.
/// * `DockhandError::PullFailed` for registry, auth or network failures.
/// * `DockhandError::EngineUnavailable` if the image list cannot be read.
#[instrument(skip(engine, cancel), fields(image = %reference))]
pub async fn ensure_image(
    engine: &dyn EngineClient,
    reference: &str,
    cancel: &CancellationToken,
) -> Result<()> {
    if image_present(engine, reference).await? {
        return Ok(());
    }

    info!("Image '{}' not found locally. Pulling...", reference);
    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            warn!("Pull of '{}' interrupted.", reference);
            Err(anyhow!(DockhandError::PullAborted {
                image: reference.to_string(),
            }))
        }
        pulled = engine.pull_image(reference) => match pulled {
            Ok(()) => {
                info!("Pulled image '{}'.", reference);
                Ok(())
            }
            Err(e) => Err(anyhow!(DockhandError::PullFailed {
                image: reference.to_string(),
                reason: e.to_string(),
            })),
        },
    }
}
