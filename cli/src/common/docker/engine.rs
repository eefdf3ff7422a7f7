//! # Dockhand Engine Capability Set
//!
//! File: cli/src/common/docker/engine.rs
//!
//! ## Overview
//!
//! This module defines the seam between the lifecycle core and the container
//! engine. The core never talks to `bollard` directly: it consumes the
//! `EngineClient` trait, which any Docker-compatible SDK can satisfy. The
//! production implementation lives in `client.rs`; tests use the in-memory
//! engine from `fake.rs`.
//!
//! ## Architecture
//!
//! - **`EngineClient`**: list/create/start/kill/remove/wait/pull/attach, each
//!   independently callable and independently failable.
//! - **`ContainerSnapshot`**: an immutable, point-in-time read of one container.
//!   It is stale the moment it is returned; callers re-resolve by name after
//!   any mutating call.
//! - **`EngineError`**: typed engine failure. `Conflict` is the variant the
//!   teardown loop tolerates; everything else is surfaced.
//!
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Failure reported by the engine for a single call.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The request conflicts with the container's current state (HTTP 409),
    /// e.g. killing a container that is no longer running.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The referenced resource does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other status code returned by the engine.
    #[error("engine rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Connection, I/O or decoding failure between us and the engine.
    #[error("transport failure: {0}")]
    Transport(String),
}

impl EngineError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, EngineError::Conflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::NotFound(_))
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Lifecycle state recorded in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerState {
    Created,
    Running,
    Exited,
    /// Any other engine-defined state (`paused`, `restarting`, `removing`, `dead`, ...).
    Other(String),
}

impl From<&str> for ContainerState {
    fn from(raw: &str) -> Self {
        match raw {
            "created" => ContainerState::Created,
            "running" => ContainerState::Running,
            "exited" => ContainerState::Exited,
            other => ContainerState::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerState::Created => f.write_str("created"),
            ContainerState::Running => f.write_str("running"),
            ContainerState::Exited => f.write_str("exited"),
            ContainerState::Other(s) => f.write_str(s),
        }
    }
}

/// Transport protocol of a container port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Protocol {
    Tcp,
    Udp,
    Sctp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Sctp => "sctp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a snapshot's published-port list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPort {
    pub private_port: u16,
    pub protocol: Protocol,
    /// Host address the port is bound to; IPv6 addresses contain a colon.
    pub host_ip: Option<String>,
    pub host_port: Option<u16>,
}

/// Point-in-time read of an engine-managed container. Never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSnapshot {
    pub id: String,
    /// Names as reported by the engine, each with its leading `/`.
    pub names: Vec<String>,
    pub state: ContainerState,
    pub image: Option<String>,
    pub ports: Vec<PublishedPort>,
}

impl ContainerSnapshot {
    /// Names with the engine's leading separator stripped.
    pub fn logical_names(&self) -> impl Iterator<Item = &str> {
        self.names
            .iter()
            .map(|n| n.strip_prefix('/').unwrap_or(n.as_str()))
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.logical_names().any(|n| n == name)
    }
}

/// Locally known image, reduced to what the presence check needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub id: String,
    pub repo_tags: Vec<String>,
}

/// Host side of a port binding. `host_port: None` asks the engine to pick one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostBinding {
    pub host_ip: Option<String>,
    pub host_port: Option<u16>,
}

/// Everything the engine needs to create one container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateRequest {
    pub image: String,
    pub name: String,
    /// `host:container[:ro]` bind strings.
    pub binds: Vec<String>,
    /// Exposed ports keyed `"<port>/<proto>"`, with their host bindings.
    pub port_bindings: BTreeMap<String, Vec<HostBinding>>,
    pub publish_all_ports: bool,
    pub command: Option<Vec<String>>,
    pub stdin_open: bool,
    pub tty: bool,
}

/// The operations the lifecycle core consumes from a container engine.
#[async_trait]
pub trait EngineClient: Send + Sync {
    /// Enumerates containers; `all` includes non-running ones.
    async fn list_containers(&self, all: bool) -> EngineResult<Vec<ContainerSnapshot>>;

    async fn list_images(&self) -> EngineResult<Vec<ImageRecord>>;

    /// Pulls `reference` and resolves only once the pull has completed.
    async fn pull_image(&self, reference: &str) -> EngineResult<()>;

    /// Creates a container and returns its engine-assigned id. Does not start it.
    async fn create_container(&self, request: &CreateRequest) -> EngineResult<String>;

    async fn start_container(&self, id: &str) -> EngineResult<()>;

    /// Fails with `EngineError::Conflict` if the container is not running.
    async fn kill_container(&self, id: &str) -> EngineResult<()>;

    async fn remove_container(&self, id: &str) -> EngineResult<()>;

    /// Best-effort wait until the engine has fully dropped the container.
    async fn wait_for_removal(&self, id: &str) -> EngineResult<()>;

    /// Attaches to the container's stdin/stdout, writes `input` and returns the
    /// captured output once the engine closes the stream.
    async fn attach_session(&self, id: &str, input: &[String]) -> EngineResult<String>;
}
