//! # Dockhand Port Command
//!
//! File: cli/src/commands/port.rs
//!
//! ## Overview
//!
//! `dockhand port NAME PORT` prints the host port bound to a container port,
//! suitable for scripting (`curl localhost:$(dockhand port demo1 80)`).
//!
use super::CommandContext;
use crate::common::docker::state;
use crate::core::error::{DockhandError, Result};
use anyhow::anyhow;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Print the host port mapped to a container port")]
pub struct PortArgs {
    /// Logical name of the container.
    name: String,
    /// Container-internal port number.
    port: u16,
}

pub async fn handle_port(args: PortArgs, ctx: &CommandContext) -> Result<()> {
    let host_port = state::mapped_port(ctx.engine()?, &args.name, args.port)
        .await?
        .ok_or_else(|| {
            anyhow!(DockhandError::PortUnmapped {
                name: args.name.clone(),
                port: args.port,
            })
        })?;
    println!("{}", host_port);
    Ok(())
}
