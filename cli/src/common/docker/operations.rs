//! # Dockhand Desired-State Model
//!
//! File: cli/src/common/docker/operations.rs
//!
//! ## Overview
//!
//! This module holds the caller-supplied description of a container
//! (`DesiredContainer`) and turns it into the engine-facing `CreateRequest`.
//! It also parses the textual forms used on the command line and in
//! configuration files:
//!
//! - **Port specs**: `[HOST_PORT:]CONTAINER_PORT[/tcp|/udp|/sctp]`. A spec
//!   without a host port is exposed with an empty binding and gets its host
//!   port from the engine's publish-all-ports assignment.
//! - **Bind mounts**: `HOST:CONTAINER[:ro]`, host path absolute, container path
//!   absolute.
//!
//! The logical name is the sole identity key used by reconciliation, so the
//! request built here is only ever sent for a name that Lookup reported as
//! absent.
//!
use super::engine::{CreateRequest, HostBinding, Protocol};
use crate::core::error::{DockhandError, Result};
use anyhow::anyhow;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Host path ↔ container path bind mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindMount {
    pub host: String,
    pub container: String,
    pub readonly: bool,
}

impl BindMount {
    pub fn new(host: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            container: container.into(),
            readonly: false,
        }
    }

    /// Checks both sides are absolute; returns the engine bind string.
    pub fn to_bind_string(&self) -> Result<String> {
        if self.host.is_empty() || !Path::new(&self.host).is_absolute() {
            return Err(anyhow!(DockhandError::Config(format!(
                "Host path '{}' for bind mount must be absolute.",
                self.host
            ))));
        }
        if self.container.is_empty() || !self.container.starts_with('/') {
            return Err(anyhow!(DockhandError::Config(format!(
                "Container path '{}' for bind mount must be absolute and non-empty.",
                self.container
            ))));
        }
        let mut bind = format!("{}:{}", self.host, self.container);
        if self.readonly {
            bind.push_str(":ro");
        }
        Ok(bind)
    }
}

impl FromStr for BindMount {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        let (host, container, readonly) = match parts.as_slice() {
            [host, container] => (*host, *container, false),
            [host, container, "ro"] => (*host, *container, true),
            [host, container, "rw"] => (*host, *container, false),
            _ => {
                return Err(anyhow!(DockhandError::ArgumentParsing(format!(
                    "Invalid bind mount '{}'. Expected HOST:CONTAINER[:ro].",
                    s
                ))))
            }
        };
        if host.is_empty() || container.is_empty() {
            return Err(anyhow!(DockhandError::ArgumentParsing(format!(
                "Invalid bind mount '{}': both paths are required.",
                s
            ))));
        }
        Ok(BindMount {
            host: host.to_string(),
            container: container.to_string(),
            readonly,
        })
    }
}

/// One declared container port, optionally pinned to a host port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSpec {
    pub container_port: u16,
    pub protocol: Protocol,
    /// `None` leaves the choice to publish-all-ports.
    pub host_port: Option<u16>,
}

impl PortSpec {
    pub fn auto(container_port: u16) -> Self {
        Self {
            container_port,
            protocol: Protocol::Tcp,
            host_port: None,
        }
    }

    pub fn bound(container_port: u16, host_port: u16) -> Self {
        Self {
            container_port,
            protocol: Protocol::Tcp,
            host_port: Some(host_port),
        }
    }

    /// Engine key, e.g. `80/tcp`.
    pub fn key(&self) -> String {
        format!("{}/{}", self.container_port, self.protocol)
    }
}

fn parse_port_number(raw: &str, spec: &str) -> Result<u16> {
    match raw.parse::<u16>() {
        Ok(0) | Err(_) => Err(anyhow!(DockhandError::ArgumentParsing(format!(
            "Invalid port '{}' in port spec '{}'.",
            raw, spec
        )))),
        Ok(port) => Ok(port),
    }
}

impl FromStr for PortSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (ports, protocol) = match s.split_once('/') {
            Some((ports, proto)) => {
                let protocol = match proto.to_ascii_lowercase().as_str() {
                    "tcp" => Protocol::Tcp,
                    "udp" => Protocol::Udp,
                    "sctp" => Protocol::Sctp,
                    other => {
                        return Err(anyhow!(DockhandError::ArgumentParsing(format!(
                            "Unknown protocol '{}' in port spec '{}'.",
                            other, s
                        ))))
                    }
                };
                (ports, protocol)
            }
            None => (s, Protocol::Tcp),
        };

        let (host_port, container_port) = match ports.split_once(':') {
            Some((host, container)) => (
                Some(parse_port_number(host, s)?),
                parse_port_number(container, s)?,
            ),
            None => (None, parse_port_number(ports, s)?),
        };

        Ok(PortSpec {
            container_port,
            protocol,
            host_port,
        })
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.host_port {
            Some(host) => write!(f, "{}:{}", host, self.key()),
            None => f.write_str(&self.key()),
        }
    }
}

/// Caller-supplied specification of the container that should exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredContainer {
    pub image: String,
    /// Identity key for reconciliation; unique across managed containers.
    pub name: String,
    pub bind: Option<BindMount>,
    /// `None` means no ports are exposed at all.
    pub ports: Option<Vec<PortSpec>>,
    pub command: Option<Vec<String>>,
    /// Keeps stdin open and allocates a TTY.
    pub interactive: bool,
}

impl DesiredContainer {
    pub fn new(image: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            name: name.into(),
            bind: None,
            ports: None,
            command: None,
            interactive: true,
        }
    }

    pub fn with_bind(mut self, bind: BindMount) -> Self {
        self.bind = Some(bind);
        self
    }

    pub fn with_ports(mut self, ports: Vec<PortSpec>) -> Self {
        self.ports = Some(ports);
        self
    }

    pub fn with_command(mut self, command: Vec<String>) -> Self {
        self.command = Some(command);
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }
}

/// Builds the create-container request for a desired container.
///
/// When ports are given, every spec is exposed; specs with a host port get an
/// explicit binding, the rest get an empty one and `publish_all_ports` is
/// requested so the engine assigns them.
///
/// # Errors
///
/// `DockhandError::Config` if the name or image is empty or the bind mount
/// paths are not absolute.
pub fn build_create_request(desired: &DesiredContainer) -> Result<CreateRequest> {
    if desired.name.trim().is_empty() {
        return Err(anyhow!(DockhandError::Config(
            "Container name must not be empty.".to_string()
        )));
    }
    if desired.image.trim().is_empty() {
        return Err(anyhow!(DockhandError::Config(format!(
            "Image reference for container '{}' must not be empty.",
            desired.name
        ))));
    }

    let binds = match &desired.bind {
        Some(bind) => vec![bind.to_bind_string()?],
        None => Vec::new(),
    };

    let mut port_bindings: BTreeMap<String, Vec<HostBinding>> = BTreeMap::new();
    let mut publish_all_ports = false;
    if let Some(ports) = &desired.ports {
        for spec in ports {
            port_bindings.entry(spec.key()).or_default().push(HostBinding {
                host_ip: None,
                host_port: spec.host_port,
            });
        }
        publish_all_ports = !ports.is_empty();
    }

    Ok(CreateRequest {
        image: desired.image.clone(),
        name: desired.name.clone(),
        binds,
        port_bindings,
        publish_all_ports,
        command: desired.command.clone(),
        stdin_open: desired.interactive,
        tty: desired.interactive,
    })
}
