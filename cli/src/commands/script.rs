//! # Dockhand Script Command
//!
//! File: cli/src/commands/script.rs
//!
//! ## Overview
//!
//! `dockhand script NAME FILE` attaches to the shell of a running container,
//! types each non-blank line of FILE into it followed by `exit`, and prints
//! whatever the session wrote back. Ctrl+C interrupts the session.
//!
use super::CommandContext;
use crate::common::docker::interaction;
use crate::core::error::Result;
use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(about = "Run a file of shell lines inside a running container's attached shell")]
pub struct ScriptArgs {
    /// Logical name of the container.
    name: String,
    /// File with one shell line per line.
    file: PathBuf,
}

fn script_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn handle_script(args: ScriptArgs, ctx: &CommandContext) -> Result<()> {
    let content = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read script file: {}", args.file.display()))?;
    let lines = script_lines(&content);
    debug!("Read {} script lines from {}", lines.len(), args.file.display());

    let output = interaction::run_script(ctx.engine()?, &args.name, &lines, &ctx.cancel).await?;
    print!("{}", output);
    Ok(())
}
