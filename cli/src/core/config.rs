//! # Dockhand Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads, merges and validates Dockhand's configuration. It
//! describes where the container engine lives, how the teardown loop paces
//! itself, and a set of named container presets that `dockhand up` can
//! reconcile without repeating every flag.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Project-specific `.dockhand.toml` in the current directory or ancestors
//!    (the search stops at a directory containing `.git`)
//! 2. User-specific `<config dir>/dockhand/config.toml`
//! 3. Default values defined in the code
//!
//! After merging, `~` in bind-mount host paths is expanded and the result is
//! validated (names, images, port specs, bind paths).
//!
//! ## Examples
//!
//! ```toml
//! [engine]
//! host = "unix:///var/run/docker.sock"
//! timeout_secs = 60
//!
//! [teardown]
//! retry_delay_ms = 100
//!
//! [[containers]]
//! name = "demo1"
//! image = "nginx:alpine"
//! ports = ["80"]
//! bind = { host = "~/site", container = "/usr/share/nginx/html", readonly = true }
//!
//! [[containers]]
//! name = "nested"
//! image = "docker:dind-rootless"
//! ports = ["9375:2375/tcp"]
//! command = ["--tls=false"]
//! ```
//!
use crate::common::docker::operations::{BindMount, DesiredContainer, PortSpec};
use crate::core::error::{DockhandError, Result};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Top-level configuration, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub teardown: TeardownConfig,
    #[serde(default)]
    pub containers: Vec<ContainerPreset>,
}

/// Where and how to reach the container engine.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// `unix:///path`, `tcp://host:port`, `http://host:port` or a socket path.
    /// Unset means local defaults (`DOCKER_HOST` or the platform socket).
    pub host: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            host: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TeardownConfig {
    /// Pause before re-resolving after a tolerated conflict.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for TeardownConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl TeardownConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Bind mount as written in a preset.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BindConfig {
    /// Path on the host machine (can use ~). Will be expanded.
    pub host: String,
    pub container: String,
    #[serde(default)]
    pub readonly: bool,
}

/// A named container description.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ContainerPreset {
    pub name: String,
    pub image: String,
    pub bind: Option<BindConfig>,
    /// Port specs, e.g. `"80"` or `"9375:2375/tcp"`.
    #[serde(default)]
    pub ports: Vec<String>,
    pub command: Option<Vec<String>>,
    #[serde(default = "default_interactive")]
    pub interactive: bool,
}

impl ContainerPreset {
    /// Converts the preset into the reconciler's input.
    pub fn to_desired(&self) -> Result<DesiredContainer> {
        let mut desired =
            DesiredContainer::new(self.image.clone(), self.name.clone()).interactive(self.interactive);
        if let Some(bind) = &self.bind {
            desired = desired.with_bind(BindMount {
                host: bind.host.clone(),
                container: bind.container.clone(),
                readonly: bind.readonly,
            });
        }
        if !self.ports.is_empty() {
            let ports = self
                .ports
                .iter()
                .map(|p| p.parse::<PortSpec>())
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Invalid ports in preset '{}'", self.name))?;
            desired = desired.with_ports(ports);
        }
        if let Some(command) = &self.command {
            desired = desired.with_command(command.clone());
        }
        Ok(desired)
    }
}

impl Config {
    pub fn preset(&self, name: &str) -> Option<&ContainerPreset> {
        self.containers.iter().find(|p| p.name == name)
    }
}

fn default_timeout_secs() -> u64 {
    120
}
fn default_retry_delay_ms() -> u64 {
    200
}
fn default_interactive() -> bool {
    true
}

const PROJECT_CONFIG_FILENAME: &str = ".dockhand.toml";

/// Loads the merged, expanded and validated configuration.
pub fn load_config() -> Result<Config> {
    let user_config = load_user_config()?;
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    let project_config = load_project_config(&current_dir)?;
    let mut merged_config = merge_configs(user_config.unwrap_or_default(), project_config);
    expand_config_paths(&mut merged_config);
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<Config>> {
    let Some(proj_dirs) = ProjectDirs::from("", "", "dockhand") else {
        warn!("Could not determine user config directory.");
        return Ok(None);
    };
    let config_path = proj_dirs.config_dir().join("config.toml");
    if config_path.is_file() {
        info!("Loading user configuration from: {}", config_path.display());
        load_config_from_path(&config_path).map(Some)
    } else {
        debug!(
            "User configuration file not found at {}",
            config_path.display()
        );
        Ok(None)
    }
}

fn load_project_config(start: &Path) -> Result<Option<Config>> {
    match find_project_config_path(start) {
        Some(path) => {
            info!("Loading project configuration from: {}", path.display());
            load_config_from_path(&path).map(Some)
        }
        None => {
            debug!("No project configuration file (.dockhand.toml) found in current directory or ancestors.");
            Ok(None)
        }
    }
}

fn find_project_config_path(start: &Path) -> Option<PathBuf> {
    let mut path = start;
    loop {
        let project_config = path.join(PROJECT_CONFIG_FILENAME);
        if project_config.is_file() {
            return Some(project_config);
        }
        if path.join(".git").is_dir() {
            debug!(
                "Found .git directory at {}, stopping project config search.",
                path.display()
            );
            return None;
        }
        path = path.parent()?;
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .map_err(|e| anyhow!(DockhandError::Config(e.to_string())))
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// Project values win over user values; presets are merged by name.
fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let Some(project) = project else {
        return user;
    };

    let engine = EngineConfig {
        host: project.engine.host.or(user.engine.host),
        timeout_secs: if project.engine.timeout_secs != default_timeout_secs() {
            project.engine.timeout_secs
        } else {
            user.engine.timeout_secs
        },
    };
    let teardown = TeardownConfig {
        retry_delay_ms: if project.teardown.retry_delay_ms != default_retry_delay_ms() {
            project.teardown.retry_delay_ms
        } else {
            user.teardown.retry_delay_ms
        },
    };

    let mut containers: Vec<ContainerPreset> = user
        .containers
        .into_iter()
        .filter(|u| !project.containers.iter().any(|p| p.name == u.name))
        .collect();
    containers.extend(project.containers);

    Config {
        engine,
        teardown,
        containers,
    }
}

fn expand_config_paths(config: &mut Config) {
    for preset in &mut config.containers {
        if let Some(bind) = &mut preset.bind {
            bind.host = shellexpand::tilde(&bind.host).into_owned();
            debug!("Expanded bind host path for '{}': {}", preset.name, bind.host);
        }
    }
}

fn validate_config(config: &Config) -> Result<()> {
    debug!("Validating final configuration...");
    if config.engine.timeout_secs == 0 {
        return Err(anyhow!(DockhandError::Config(
            "engine.timeout_secs must be greater than zero.".to_string()
        )));
    }

    let mut seen = HashSet::new();
    for preset in &config.containers {
        if preset.name.trim().is_empty() {
            return Err(anyhow!(DockhandError::Config(
                "Container preset with an empty name.".to_string()
            )));
        }
        if !seen.insert(preset.name.as_str()) {
            return Err(anyhow!(DockhandError::Config(format!(
                "Duplicate container preset '{}'.",
                preset.name
            ))));
        }
        if preset.image.trim().is_empty() {
            return Err(anyhow!(DockhandError::Config(format!(
                "Container preset '{}' has an empty image.",
                preset.name
            ))));
        }
        for spec in &preset.ports {
            if spec.parse::<PortSpec>().is_err() {
                return Err(anyhow!(DockhandError::Config(format!(
                    "Invalid port spec '{}' in preset '{}'. Expected [HOST:]CONTAINER[/PROTO].",
                    spec, preset.name
                ))));
            }
        }
        if let Some(bind) = &preset.bind {
            if bind.host.is_empty() || bind.container.is_empty() {
                return Err(anyhow!(DockhandError::Config(format!(
                    "Bind mount in preset '{}' cannot have an empty path (host: '{}', container: '{}').",
                    preset.name, bind.host, bind.container
                ))));
            }
        }
    }
    debug!("Configuration validation successful.");
    Ok(())
}
