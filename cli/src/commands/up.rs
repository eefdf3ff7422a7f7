//! # Dockhand Up Command
//!
//! File: cli/src/commands/up.rs
//!
//! ## Overview
//!
//! `dockhand up` makes sure a container is running. The container is described
//! either by a `[[containers]]` preset from the configuration or entirely on
//! the command line; flags given alongside a preset override its fields.
//!
//! ## Usage
//!
//! ```bash
//! # From a preset
//! dockhand up demo1
//!
//! # Ad hoc, with an auto-assigned host port for 80 and a bind mount
//! dockhand up --image nginx:alpine --name demo1 -p 80 --bind /tmp/x:/usr/share/nginx/html
//!
//! # Nested engine on a fixed host port, torn down first
//! dockhand up --image docker:dind-rootless --name nested -p 9375:2375 --recreate -- --tls=false
//! ```
//!
//! After reconciling, the resulting state is printed together with the host
//! port of every declared container port.
//!
use super::CommandContext;
use crate::common::docker::{self, state, BindMount, DesiredContainer, PortSpec, ReconcileAction};
use crate::core::error::{DockhandError, Result};
use anyhow::{anyhow, Context};
use clap::Parser;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(
    about = "Create or start a container so that it is running",
    long_about = "Reconciles a container by name: pulls the image if missing, creates the\n\
                  container if it does not exist, starts it if it is stopped, and does\n\
                  nothing if it is already running."
)]
pub struct UpArgs {
    /// Preset name from the `[[containers]]` configuration.
    preset: Option<String>,

    /// Image reference (required without a preset).
    #[arg(long)]
    image: Option<String>,

    /// Container name (required without a preset).
    #[arg(long)]
    name: Option<String>,

    /// Bind mount, HOST:CONTAINER[:ro].
    #[arg(long, value_name = "HOST:CONTAINER[:ro]")]
    bind: Option<BindMount>,

    /// Port spec [HOST:]CONTAINER[/PROTO]. Repeatable.
    #[arg(short = 'p', long = "publish", value_name = "SPEC")]
    ports: Vec<PortSpec>,

    /// Do not keep stdin open or allocate a TTY.
    #[arg(long)]
    no_interactive: bool,

    /// Tear down any existing container with this name first.
    #[arg(long)]
    recreate: bool,

    /// Override command, given after `--`.
    #[arg(last = true)]
    command: Vec<String>,
}

/// Builds the desired container from the preset (if any) and the flags.
fn resolve_desired(args: &UpArgs, ctx: &CommandContext) -> Result<DesiredContainer> {
    let mut desired = match &args.preset {
        Some(preset_name) => ctx
            .config
            .preset(preset_name)
            .ok_or_else(|| {
                anyhow!(DockhandError::Config(format!(
                    "No container preset named '{}' in configuration.",
                    preset_name
                )))
            })?
            .to_desired()?,
        None => {
            let (Some(image), Some(name)) = (&args.image, &args.name) else {
                return Err(anyhow!(DockhandError::ArgumentParsing(
                    "Either a preset or both --image and --name are required.".to_string()
                )));
            };
            DesiredContainer::new(image.clone(), name.clone())
        }
    };

    if let Some(image) = &args.image {
        desired.image = image.clone();
    }
    if let Some(name) = &args.name {
        desired.name = name.clone();
    }
    if let Some(bind) = &args.bind {
        desired.bind = Some(bind.clone());
    }
    if !args.ports.is_empty() {
        desired.ports = Some(args.ports.clone());
    }
    if args.no_interactive {
        desired.interactive = false;
    }
    if !args.command.is_empty() {
        desired.command = Some(args.command.clone());
    }
    Ok(desired)
}

pub async fn handle_up(args: UpArgs, ctx: &CommandContext) -> Result<()> {
    let desired = resolve_desired(&args, ctx)?;
    debug!("Desired container: {:?}", desired);

    if args.recreate {
        info!("Recreating '{}': tearing down any existing container.", desired.name);
        docker::remove_by_name(ctx.engine()?, &desired.name, ctx.config.teardown.retry_delay())
            .await
            .with_context(|| format!("Failed to tear down '{}' before recreating", desired.name))?;
    }

    let reconciled = docker::get_or_start(ctx.engine()?, &desired, &ctx.cancel)
        .await
        .with_context(|| format!("Failed to bring up container '{}'", desired.name))?;

    let verb = match reconciled.action {
        ReconcileAction::Created => "created and started",
        ReconcileAction::Started => "started",
        ReconcileAction::AlreadyRunning => "already running",
        ReconcileAction::LeftAsIs => "left as is",
    };
    println!(
        "Container '{}' ({}): {}, state {}.",
        desired.name,
        short_id(&reconciled.snapshot.id),
        verb,
        reconciled.snapshot.state
    );
    for spec in desired.ports.iter().flatten() {
        match state::host_port(&reconciled.snapshot, spec.container_port) {
            Some(host) => println!("  {} -> {}", spec.key(), host),
            None => println!("  {} -> (unmapped)", spec.key()),
        }
    }
    Ok(())
}

pub(crate) fn short_id(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}
