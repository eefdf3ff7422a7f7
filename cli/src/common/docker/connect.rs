//! # Dockhand Docker Connection Helper
//!
//! File: cli/src/common/docker/connect.rs
//!
//! ## Overview
//!
//! Establishes the `bollard::Docker` connection that backs the production
//! engine client. The target is taken from the `[engine]` configuration
//! section; when no host is configured the local defaults are used (which
//! also honour `DOCKER_HOST`).
//!
//! Supported host forms:
//! - `unix:///var/run/docker.sock` or a bare socket path
//! - `tcp://host:port` / `http://host:port` (plain HTTP, e.g. a nested engine
//!   started without TLS)
//!
use crate::common::docker::engine::EngineError;
use crate::core::config::EngineConfig;
use crate::core::error::{DockhandError, Result};
use anyhow::anyhow;
use bollard::{Docker, API_DEFAULT_VERSION};
use std::time::Duration;
use tracing::{debug, instrument};

/// How a configured host string should be reached.
#[derive(Debug, PartialEq, Eq)]
enum Endpoint<'a> {
    LocalDefaults,
    Http(String),
    Socket(&'a str),
}

fn classify_host(host: Option<&str>) -> Endpoint<'_> {
    match host.map(str::trim).filter(|h| !h.is_empty()) {
        None => Endpoint::LocalDefaults,
        Some(h) => {
            if let Some(rest) = h.strip_prefix("tcp://") {
                Endpoint::Http(format!("http://{}", rest))
            } else if h.starts_with("http://") {
                Endpoint::Http(h.to_string())
            } else if let Some(path) = h.strip_prefix("unix://") {
                Endpoint::Socket(path)
            } else {
                Endpoint::Socket(h)
            }
        }
    }
}

/// Connects to the engine described by `cfg`.
///
/// # Errors
///
/// Returns `DockhandError::EngineUnavailable` if the client cannot be built
/// (malformed address, socket path that does not exist).
#[instrument(skip(cfg), fields(host = ?cfg.host))]
pub fn connect_docker(cfg: &EngineConfig) -> Result<Docker> {
    let endpoint = classify_host(cfg.host.as_deref());
    debug!("Connecting to container engine via {:?}", endpoint);

    let connected = match endpoint {
        Endpoint::LocalDefaults => Docker::connect_with_local_defaults(),
        Endpoint::Http(addr) => Docker::connect_with_http(&addr, cfg.timeout_secs, API_DEFAULT_VERSION),
        Endpoint::Socket(path) => {
            Docker::connect_with_socket(path, cfg.timeout_secs, API_DEFAULT_VERSION)
        }
    };

    connected
        .map(|docker| docker.with_timeout(Duration::from_secs(cfg.timeout_secs)))
        .map_err(|e| {
            anyhow!(DockhandError::EngineUnavailable {
                source: EngineError::Transport(e.to_string()),
            })
        })
}
