//! # Dockhand Scripted Attach Session
//!
//! File: cli/src/common/docker/interaction.rs
//!
//! ## Overview
//!
//! Drives the interactive shell of a running container from a list of input
//! lines, the way a user would type them: the container's stdin is attached,
//! every line is written followed by a newline, an `exit` line is appended to
//! end the shell, and the call blocks until the engine closes the output
//! stream. The captured output is returned.
//!
//! Typical use is a render container created with `interactive = true`
//! (stdin open, TTY) whose shell runs a tool against files in a bind mount.
//!
//! ## Usage
//!
//! ```rust
//! let lines = vec!["nomnoml /home/node/host/diagram.noml > /home/node/host/diagram.svg".to_string()];
//! let output = interaction::run_script(engine, "render", &lines, &cancel).await?;
//! ```
//!
use super::engine::{ContainerState, EngineClient};
use super::state;
use crate::core::error::{DockhandError, Result};
use anyhow::anyhow;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Line appended to every script so the attached shell terminates.
pub const EXIT_LINE: &str = "exit";

/// Feeds `lines` (plus a trailing `exit`) to the shell of container `name`.
///
/// # Arguments
///
/// * `engine` - The engine hosting the container.
/// * `name` - Logical name of a running container.
/// * `lines` - Shell lines, sent one per line in order.
/// * `cancel` - Interrupts the session when fired.
///
/// # Returns
///
/// * `Ok(String)` with everything the session wrote back.
///
/// # Errors
///
/// * `ContainerNotFound` if no container has that name.
/// * `SessionFailed` if it is not running or the engine breaks the session.
/// * `SessionAborted` if `cancel` fires before the session ends.
#[instrument(skip(engine, lines, cancel), fields(container = %name, lines = lines.len()))]
pub async fn run_script(
    engine: &dyn EngineClient,
    name: &str,
    lines: &[String],
    cancel: &CancellationToken,
) -> Result<String> {
    let snapshot = state::find_by_name(engine, name).await?.ok_or_else(|| {
        anyhow!(DockhandError::ContainerNotFound {
            name: name.to_string(),
        })
    })?;

    if snapshot.state != ContainerState::Running {
        return Err(anyhow!(DockhandError::SessionFailed {
            name: name.to_string(),
            reason: format!("container is {}, not running", snapshot.state),
        }));
    }

    let mut input: Vec<String> = lines.to_vec();
    if input.last().map(String::as_str) != Some(EXIT_LINE) {
        input.push(EXIT_LINE.to_string());
    }
    debug!("Attaching to '{}' with {} input lines", name, input.len());

    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            warn!("Session on '{}' interrupted.", name);
            Err(anyhow!(DockhandError::SessionAborted {
                name: name.to_string(),
            }))
        }
        session = engine.attach_session(&snapshot.id, &input) => match session {
            Ok(output) => {
                info!("Session on '{}' finished.", name);
                Ok(output)
            }
            Err(e) => Err(anyhow!(DockhandError::SessionFailed {
                name: name.to_string(),
                reason: e.to_string(),
            })),
        },
    }
}
