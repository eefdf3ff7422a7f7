//! # Dockhand Docker Engine Client
//!
//! File: cli/src/common/docker/client.rs
//!
//! ## Overview
//!
//! `DockerEngine` is the production `EngineClient`, a thin translation layer
//! over `bollard`. It converts bollard's summaries into `ContainerSnapshot`s,
//! builds the create-container payload from a `CreateRequest`, and maps
//! Docker HTTP status codes into `EngineError` (409 → `Conflict`,
//! 404 → `NotFound`).
//!
//! Long-running engine operations are exposed as a single awaitable call:
//! - `pull_image` drains the `create_image` progress stream and resolves when
//!   the registry transfer is complete (or fails on the first stream error).
//! - `attach_session` writes the input, then drains the output stream until
//!   the engine closes it.
//!
use super::engine::{
    ContainerSnapshot, ContainerState, CreateRequest, EngineClient, EngineError, EngineResult,
    ImageRecord, Protocol, PublishedPort,
};
use async_trait::async_trait;
use bollard::{
    container::{
        AttachContainerOptions, AttachContainerResults, Config as ContainerConfig,
        CreateContainerOptions, KillContainerOptions, ListContainersOptions, LogOutput,
        RemoveContainerOptions, StartContainerOptions, WaitContainerOptions,
    },
    image::{CreateImageOptions, ListImagesOptions},
    models::{ContainerSummary, HostConfig, PortBinding, PortTypeEnum},
    Docker,
};
use futures_util::StreamExt;
use std::collections::HashMap;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

/// Maps a bollard error into the engine taxonomy.
fn map_bollard_error(e: bollard::errors::Error) -> EngineError {
    match e {
        bollard::errors::Error::DockerResponseServerError {
            status_code: 409,
            message,
        } => EngineError::Conflict(message),
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404,
            message,
        } => EngineError::NotFound(message),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } => EngineError::Rejected {
            status: status_code,
            message,
        },
        other => EngineError::Transport(other.to_string()),
    }
}

fn to_protocol(typ: Option<&PortTypeEnum>) -> Protocol {
    match typ {
        Some(PortTypeEnum::UDP) => Protocol::Udp,
        Some(PortTypeEnum::SCTP) => Protocol::Sctp,
        _ => Protocol::Tcp,
    }
}

fn to_snapshot(summary: ContainerSummary) -> Option<ContainerSnapshot> {
    let id = summary.id?;
    let ports = summary
        .ports
        .unwrap_or_default()
        .into_iter()
        .map(|p| PublishedPort {
            private_port: p.private_port,
            protocol: to_protocol(p.typ.as_ref()),
            host_ip: p.ip,
            host_port: p.public_port,
        })
        .collect();

    Some(ContainerSnapshot {
        id,
        names: summary.names.unwrap_or_default(),
        state: ContainerState::from(summary.state.as_deref().unwrap_or("unknown")),
        image: summary.image,
        ports,
    })
}

/// Translates a `CreateRequest` into bollard's container configuration.
fn to_container_config(request: &CreateRequest) -> ContainerConfig<String> {
    let mut exposed_ports: HashMap<String, HashMap<(), ()>> = HashMap::new();
    let mut port_bindings: HashMap<String, Option<Vec<PortBinding>>> = HashMap::new();

    for (key, bindings) in &request.port_bindings {
        exposed_ports.insert(key.clone(), HashMap::new());
        let host_bindings = bindings
            .iter()
            .map(|b| PortBinding {
                host_ip: b.host_ip.clone(),
                host_port: b.host_port.map(|p| p.to_string()),
            })
            .collect();
        port_bindings.insert(key.clone(), Some(host_bindings));
    }

    let host_config = HostConfig {
        binds: if request.binds.is_empty() {
            None
        } else {
            Some(request.binds.clone())
        },
        port_bindings: if port_bindings.is_empty() {
            None
        } else {
            Some(port_bindings)
        },
        publish_all_ports: Some(request.publish_all_ports),
        ..Default::default()
    };

    ContainerConfig {
        image: Some(request.image.clone()),
        cmd: request.command.clone(),
        exposed_ports: if exposed_ports.is_empty() {
            None
        } else {
            Some(exposed_ports)
        },
        open_stdin: Some(request.stdin_open),
        tty: Some(request.tty),
        host_config: Some(host_config),
        ..Default::default()
    }
}

/// `EngineClient` backed by a live Docker-compatible daemon.
#[derive(Clone)]
pub struct DockerEngine {
    docker: Docker,
}

impl DockerEngine {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }
}

#[async_trait]
impl EngineClient for DockerEngine {
    #[instrument(skip(self))]
    async fn list_containers(&self, all: bool) -> EngineResult<Vec<ContainerSnapshot>> {
        let options = Some(ListContainersOptions::<String> {
            all,
            ..Default::default()
        });
        let summaries = self
            .docker
            .list_containers(options)
            .await
            .map_err(map_bollard_error)?;
        debug!("Engine reported {} containers", summaries.len());
        Ok(summaries.into_iter().filter_map(to_snapshot).collect())
    }

    #[instrument(skip(self))]
    async fn list_images(&self) -> EngineResult<Vec<ImageRecord>> {
        let options = Some(ListImagesOptions::<String> {
            all: false,
            ..Default::default()
        });
        let images = self
            .docker
            .list_images(options)
            .await
            .map_err(map_bollard_error)?;
        Ok(images
            .into_iter()
            .map(|img| ImageRecord {
                id: img.id,
                repo_tags: img.repo_tags,
            })
            .collect())
    }

    #[instrument(skip(self), fields(image = %reference))]
    async fn pull_image(&self, reference: &str) -> EngineResult<()> {
        let options = Some(CreateImageOptions {
            from_image: reference.to_string(),
            ..Default::default()
        });
        let mut progress = self.docker.create_image(options, None, None);

        while let Some(event) = progress.next().await {
            let event = event.map_err(map_bollard_error)?;
            if let Some(err) = event.error {
                return Err(EngineError::Rejected {
                    status: 500,
                    message: err,
                });
            }
            if let Some(status) = event.status {
                debug!("Pull {}: {}", reference, status);
            }
        }
        info!("Pull of '{}' completed.", reference);
        Ok(())
    }

    #[instrument(skip(self, request), fields(container = %request.name, image = %request.image))]
    async fn create_container(&self, request: &CreateRequest) -> EngineResult<String> {
        let options = Some(CreateContainerOptions {
            name: request.name.clone(),
            platform: None,
        });
        let response = self
            .docker
            .create_container(options, to_container_config(request))
            .await
            .map_err(map_bollard_error)?;
        for warning in &response.warnings {
            warn!("Engine warning while creating '{}': {}", request.name, warning);
        }
        Ok(response.id)
    }

    #[instrument(skip(self))]
    async fn start_container(&self, id: &str) -> EngineResult<()> {
        self.docker
            .start_container(id, None::<StartContainerOptions<String>>)
            .await
            .map_err(map_bollard_error)
    }

    #[instrument(skip(self))]
    async fn kill_container(&self, id: &str) -> EngineResult<()> {
        self.docker
            .kill_container(id, None::<KillContainerOptions<String>>)
            .await
            .map_err(map_bollard_error)
    }

    #[instrument(skip(self))]
    async fn remove_container(&self, id: &str) -> EngineResult<()> {
        let options = Some(RemoveContainerOptions {
            force: false,
            v: false,
            link: false,
        });
        self.docker
            .remove_container(id, options)
            .await
            .map_err(map_bollard_error)
    }

    #[instrument(skip(self))]
    async fn wait_for_removal(&self, id: &str) -> EngineResult<()> {
        let options = Some(WaitContainerOptions {
            condition: "removed".to_string(),
        });
        let mut stream = self.docker.wait_container(id, options);
        while let Some(result) = stream.next().await {
            match result {
                Ok(_) => {}
                // The container already left the engine before we started waiting.
                Err(bollard::errors::Error::DockerResponseServerError {
                    status_code: 404, ..
                }) => return Ok(()),
                // Non-zero exit codes are reported as errors by bollard; irrelevant here.
                Err(bollard::errors::Error::DockerContainerWaitError { .. }) => return Ok(()),
                Err(e) => return Err(map_bollard_error(e)),
            }
        }
        Ok(())
    }

    #[instrument(skip(self, input), fields(lines = input.len()))]
    async fn attach_session(&self, id: &str, input: &[String]) -> EngineResult<String> {
        let options = Some(AttachContainerOptions::<String> {
            stdin: Some(true),
            stdout: Some(true),
            stderr: Some(true),
            stream: Some(true),
            logs: Some(false),
            detach_keys: None,
        });
        let AttachContainerResults {
            mut output,
            input: mut writer,
        } = self
            .docker
            .attach_container(id, options)
            .await
            .map_err(map_bollard_error)?;

        for line in input {
            writer
                .write_all(format!("{}\n", line).as_bytes())
                .await
                .map_err(|e| EngineError::Transport(e.to_string()))?;
        }
        writer
            .flush()
            .await
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        let mut captured = String::new();
        while let Some(chunk) = output.next().await {
            match chunk.map_err(map_bollard_error)? {
                LogOutput::StdOut { message }
                | LogOutput::StdErr { message }
                | LogOutput::Console { message } => {
                    captured.push_str(&String::from_utf8_lossy(&message));
                }
                LogOutput::StdIn { .. } => {}
            }
        }
        debug!("Attach session on '{}' closed by engine.", id);
        Ok(captured)
    }
}
