//! # Dockhand Status Command
//!
//! File: cli/src/commands/status.rs
//!
//! ## Overview
//!
//! `dockhand status NAME` prints a fresh snapshot of one container: id, names,
//! state, image and published ports.
//!
use super::up::short_id;
use super::CommandContext;
use crate::common::docker::{state, ContainerSnapshot};
use crate::core::error::{DockhandError, Result};
use anyhow::anyhow;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Show the current state of a container")]
pub struct StatusArgs {
    /// Logical name of the container.
    name: String,
}

pub async fn handle_status(args: StatusArgs, ctx: &CommandContext) -> Result<()> {
    let snapshot = state::find_by_name(ctx.engine()?, &args.name)
        .await?
        .ok_or_else(|| anyhow!(DockhandError::ContainerNotFound { name: args.name.clone() }))?;
    print!("{}", render(&snapshot));
    Ok(())
}

fn render(snapshot: &ContainerSnapshot) -> String {
    let mut out = String::new();
    out.push_str(&format!("ID:     {}\n", short_id(&snapshot.id)));
    out.push_str(&format!(
        "Names:  {}\n",
        snapshot.logical_names().collect::<Vec<_>>().join(", ")
    ));
    out.push_str(&format!("State:  {}\n", snapshot.state));
    out.push_str(&format!(
        "Image:  {}\n",
        snapshot.image.as_deref().unwrap_or("N/A")
    ));
    if snapshot.ports.is_empty() {
        out.push_str("Ports:  none\n");
    } else {
        out.push_str("Ports:\n");
        for p in &snapshot.ports {
            match (p.host_ip.as_deref(), p.host_port) {
                (Some(ip), Some(host)) => out.push_str(&format!(
                    "  {}/{} -> {}:{}\n",
                    p.private_port, p.protocol, ip, host
                )),
                _ => out.push_str(&format!("  {}/{} (not published)\n", p.private_port, p.protocol)),
            }
        }
    }
    out
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::docker::engine::{ContainerState, Protocol, PublishedPort};
    use crate::common::docker::fake::FakeEngine;
    use crate::core::config::Config;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    #[test]
    fn test_render_snapshot() {
        let snapshot = ContainerSnapshot {
            id: "4f1c2d3e4a5b6c7d".into(),
            names: vec!["/demo1".into()],
            state: ContainerState::Running,
            image: Some("nginx:alpine".into()),
            ports: vec![
                PublishedPort {
                    private_port: 80,
                    protocol: Protocol::Tcp,
                    host_ip: Some("0.0.0.0".into()),
                    host_port: Some(32768),
                },
                PublishedPort {
                    private_port: 443,
                    protocol: Protocol::Tcp,
                    host_ip: None,
                    host_port: None,
                },
            ],
        };
        let text = render(&snapshot);
        assert!(text.contains("ID:     4f1c2d3e4a5b\n"));
        assert!(text.contains("Names:  demo1\n"));
        assert!(text.contains("State:  running\n"));
        assert!(text.contains("80/tcp -> 0.0.0.0:32768"));
        assert!(text.contains("443/tcp (not published)"));
    }

    #[tokio::test]
    async fn test_handle_status_missing_container() {
        let ctx = CommandContext::with_engine(
            Config::default(),
            Arc::new(FakeEngine::new()),
            CancellationToken::new(),
        );
        let err = handle_status(StatusArgs::try_parse_from(["status", "ghost"]).unwrap(), &ctx)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Container 'ghost' not found.");
    }
}
