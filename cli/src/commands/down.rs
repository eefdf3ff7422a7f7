//! # Dockhand Down Command
//!
//! File: cli/src/commands/down.rs
//!
//! ## Overview
//!
//! `dockhand down NAME` removes the container with that name whatever state it
//! is in (killing it first if needed). Running it when nothing exists is not an
//! error.
//!
use super::CommandContext;
use crate::common::docker;
use crate::core::error::Result;
use anyhow::Context;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Kill and remove a container by name")]
pub struct DownArgs {
    /// Logical name of the container.
    name: String,
}

pub async fn handle_down(args: DownArgs, ctx: &CommandContext) -> Result<()> {
    let removed =
        docker::remove_by_name(ctx.engine()?, &args.name, ctx.config.teardown.retry_delay())
            .await
            .with_context(|| format!("Failed to tear down container '{}'", args.name))?;
    if removed {
        println!("Removed container '{}'.", args.name);
    } else {
        println!("No container named '{}'; nothing to do.", args.name);
    }
    Ok(())
}
