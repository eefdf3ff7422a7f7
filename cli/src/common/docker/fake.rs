//! # Dockhand In-Memory Engine (tests only)
//!
//! File: cli/src/common/docker/fake.rs
//!
//! ## Overview
//!
//! `FakeEngine` implements `EngineClient` over a mutex-guarded table of
//! containers and images. It follows the engine's observable rules closely
//! enough for the lifecycle core to be exercised without a daemon:
//!
//! - create fails with `NotFound` if the image is not local, and with
//!   `Conflict` if the name is taken;
//! - kill on a container that is not running answers `Conflict`;
//! - remove on a running container answers `Conflict`;
//! - start publishes host ports for every exposed port (explicit bindings
//!   as requested, the rest from an ephemeral range), each on an IPv4 and an
//!   IPv6 host address.
//!
//! Every call is recorded so tests can assert on call sequences and counts.
//! Races and failures are scripted through the `script_*` helpers.
//!
use super::engine::{
    ContainerSnapshot, ContainerState, CreateRequest, EngineClient, EngineError, EngineResult,
    ImageRecord, Protocol, PublishedPort,
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

const EPHEMERAL_PORT_BASE: u16 = 32768;

/// One recorded engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListContainers,
    ListImages,
    Pull(String),
    /// Carries the requested container name.
    Create(String),
    Start(String),
    Kill(String),
    Remove(String),
    Wait(String),
    Attach(String),
}

impl Call {
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Call::Pull(_) | Call::Create(_) | Call::Start(_) | Call::Kill(_) | Call::Remove(_)
        )
    }
}

/// Operation selector for scripted failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    ListContainers,
    ListImages,
    Pull,
    Create,
    Start,
    Kill,
    Remove,
    Wait,
    Attach,
}

/// Engine-side race injected at the moment of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Race {
    /// The container exits on its own just before the kill arrives.
    ExitBeforeKill,
    /// Someone else removes the container just before our remove arrives.
    RemovedElsewhere,
    /// The container is restarted by a policy between kill and remove.
    RestartBeforeRemove,
}

#[derive(Debug)]
struct StoredContainer {
    snapshot: ContainerSnapshot,
    request: CreateRequest,
}

#[derive(Debug, Default)]
struct FakeState {
    containers: Vec<StoredContainer>,
    images: Vec<ImageRecord>,
    calls: Vec<Call>,
    next_id: u32,
    next_host_port: u16,
    failures: HashMap<Op, VecDeque<EngineError>>,
    races: VecDeque<Race>,
    hang_pulls: bool,
    hang_attach: bool,
    vanish_after_start: bool,
    attach_output: Option<String>,
    attached_input: Vec<String>,
}

impl FakeState {
    fn position(&self, id: &str) -> Option<usize> {
        self.containers.iter().position(|c| c.snapshot.id == id)
    }

    fn take_failure(&mut self, op: Op) -> Option<EngineError> {
        self.failures.get_mut(&op).and_then(VecDeque::pop_front)
    }

    fn take_race(&mut self, wanted: Race) -> bool {
        if self.races.front() == Some(&wanted) {
            self.races.pop_front();
            true
        } else {
            false
        }
    }

    fn allocate_id(&mut self) -> String {
        self.next_id += 1;
        format!("{:012x}", 0xc0ffee_u64 + u64::from(self.next_id))
    }

    fn publish_ports(&mut self, idx: usize) {
        let mut published = Vec::new();
        let bindings = self.containers[idx].request.port_bindings.clone();
        for (key, hosts) in bindings {
            let (port, proto) = key.split_once('/').unwrap_or((key.as_str(), "tcp"));
            let Ok(private_port) = port.parse::<u16>() else {
                continue;
            };
            let protocol = match proto {
                "udp" => Protocol::Udp,
                "sctp" => Protocol::Sctp,
                _ => Protocol::Tcp,
            };
            for binding in hosts {
                let host_port = match binding.host_port {
                    Some(p) => p,
                    None => {
                        self.next_host_port += 1;
                        EPHEMERAL_PORT_BASE + self.next_host_port
                    }
                };
                for ip in ["0.0.0.0", "::"] {
                    published.push(PublishedPort {
                        private_port,
                        protocol,
                        host_ip: Some(ip.to_string()),
                        host_port: Some(host_port),
                    });
                }
            }
        }
        self.containers[idx].snapshot.ports = published;
    }
}

/// In-memory `EngineClient` used by unit tests.
#[derive(Debug, Default)]
pub struct FakeEngine {
    state: Mutex<FakeState>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_image(self, tag: &str) -> Self {
        {
            let mut st = self.lock();
            let id = format!("sha256:{:x}", st.images.len() + 1);
            st.images.push(ImageRecord {
                id,
                repo_tags: vec![tag.to_string()],
            });
        }
        self
    }

    /// Seeds a container as if it had been created earlier by someone else.
    pub fn with_container(self, name: &str, image: &str, state: ContainerState) -> Self {
        self.seed_container(name, image, state);
        self
    }

    /// Seeds a container and returns its id.
    pub fn seed_container(&self, name: &str, image: &str, state: ContainerState) -> String {
        let mut st = self.lock();
        let id = st.allocate_id();
        st.containers.push(StoredContainer {
            snapshot: ContainerSnapshot {
                id: id.clone(),
                names: vec![format!("/{}", name)],
                state,
                image: Some(image.to_string()),
                ports: Vec::new(),
            },
            request: CreateRequest {
                image: image.to_string(),
                name: name.to_string(),
                ..CreateRequest::default()
            },
        });
        id
    }

    pub fn set_ports(&self, name: &str, ports: Vec<PublishedPort>) {
        let mut st = self.lock();
        if let Some(c) = st
            .containers
            .iter_mut()
            .find(|c| c.snapshot.has_name(name))
        {
            c.snapshot.ports = ports;
        }
    }

    /// Fails the next call of `op` with `error`. Repeated calls queue up.
    pub fn script_failure(&self, op: Op, error: EngineError) {
        self.lock().failures.entry(op).or_default().push_back(error);
    }

    /// Injects `race` at the next call it applies to.
    pub fn script_race(&self, race: Race) {
        self.lock().races.push_back(race);
    }

    /// Pulls never complete; only cancellation gets the caller out.
    pub fn hang_pulls(&self) {
        self.lock().hang_pulls = true;
    }

    pub fn hang_attach(&self) {
        self.lock().hang_attach = true;
    }

    /// The started container is removed before anyone can look it up again.
    pub fn vanish_after_start(&self) {
        self.lock().vanish_after_start = true;
    }

    pub fn set_attach_output(&self, output: &str) {
        self.lock().attach_output = Some(output.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn mutating_calls(&self) -> Vec<Call> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.is_mutating())
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn state_of(&self, name: &str) -> Option<ContainerState> {
        self.lock()
            .containers
            .iter()
            .find(|c| c.snapshot.has_name(name))
            .map(|c| c.snapshot.state.clone())
    }

    pub fn request_for(&self, name: &str) -> Option<CreateRequest> {
        self.lock()
            .containers
            .iter()
            .find(|c| c.snapshot.has_name(name))
            .map(|c| c.request.clone())
    }

    pub fn attached_input(&self) -> Vec<String> {
        self.lock().attached_input.clone()
    }

    pub fn has_image(&self, tag: &str) -> bool {
        self.lock()
            .images
            .iter()
            .any(|i| i.repo_tags.iter().any(|t| t == tag))
    }
}

fn missing(id: &str) -> EngineError {
    EngineError::NotFound(format!("No such container: {}", id))
}

#[async_trait]
impl EngineClient for FakeEngine {
    async fn list_containers(&self, all: bool) -> EngineResult<Vec<ContainerSnapshot>> {
        let mut st = self.lock();
        st.calls.push(Call::ListContainers);
        if let Some(err) = st.take_failure(Op::ListContainers) {
            return Err(err);
        }
        Ok(st
            .containers
            .iter()
            .filter(|c| all || c.snapshot.state == ContainerState::Running)
            .map(|c| c.snapshot.clone())
            .collect())
    }

    async fn list_images(&self) -> EngineResult<Vec<ImageRecord>> {
        let mut st = self.lock();
        st.calls.push(Call::ListImages);
        if let Some(err) = st.take_failure(Op::ListImages) {
            return Err(err);
        }
        Ok(st.images.clone())
    }

    async fn pull_image(&self, reference: &str) -> EngineResult<()> {
        let hang = {
            let mut st = self.lock();
            st.calls.push(Call::Pull(reference.to_string()));
            if let Some(err) = st.take_failure(Op::Pull) {
                return Err(err);
            }
            st.hang_pulls
        };
        if hang {
            std::future::pending::<()>().await;
        }
        let mut st = self.lock();
        let id = format!("sha256:{:x}", st.images.len() + 1);
        st.images.push(ImageRecord {
            id,
            repo_tags: vec![reference.to_string()],
        });
        Ok(())
    }

    async fn create_container(&self, request: &CreateRequest) -> EngineResult<String> {
        let mut st = self.lock();
        st.calls.push(Call::Create(request.name.clone()));
        if let Some(err) = st.take_failure(Op::Create) {
            return Err(err);
        }
        if !st
            .images
            .iter()
            .any(|i| i.repo_tags.iter().any(|t| t == &request.image))
        {
            return Err(EngineError::NotFound(format!(
                "No such image: {}",
                request.image
            )));
        }
        if st.containers.iter().any(|c| c.snapshot.has_name(&request.name)) {
            return Err(EngineError::Conflict(format!(
                "The container name \"/{}\" is already in use",
                request.name
            )));
        }
        let id = st.allocate_id();
        st.containers.push(StoredContainer {
            snapshot: ContainerSnapshot {
                id: id.clone(),
                names: vec![format!("/{}", request.name)],
                state: ContainerState::Created,
                image: Some(request.image.clone()),
                ports: Vec::new(),
            },
            request: request.clone(),
        });
        Ok(id)
    }

    async fn start_container(&self, id: &str) -> EngineResult<()> {
        let mut st = self.lock();
        st.calls.push(Call::Start(id.to_string()));
        if let Some(err) = st.take_failure(Op::Start) {
            return Err(err);
        }
        let idx = st.position(id).ok_or_else(|| missing(id))?;
        st.containers[idx].snapshot.state = ContainerState::Running;
        st.publish_ports(idx);
        if st.vanish_after_start {
            st.containers.remove(idx);
        }
        Ok(())
    }

    async fn kill_container(&self, id: &str) -> EngineResult<()> {
        let mut st = self.lock();
        st.calls.push(Call::Kill(id.to_string()));
        if let Some(err) = st.take_failure(Op::Kill) {
            return Err(err);
        }
        let idx = st.position(id).ok_or_else(|| missing(id))?;
        if st.take_race(Race::ExitBeforeKill) {
            st.containers[idx].snapshot.state = ContainerState::Exited;
        }
        if st.containers[idx].snapshot.state != ContainerState::Running {
            return Err(EngineError::Conflict(format!(
                "Container {} is not running",
                id
            )));
        }
        st.containers[idx].snapshot.state = ContainerState::Exited;
        if st.take_race(Race::RestartBeforeRemove) {
            st.containers[idx].snapshot.state = ContainerState::Running;
        }
        Ok(())
    }

    async fn remove_container(&self, id: &str) -> EngineResult<()> {
        let mut st = self.lock();
        st.calls.push(Call::Remove(id.to_string()));
        if let Some(err) = st.take_failure(Op::Remove) {
            return Err(err);
        }
        let idx = st.position(id).ok_or_else(|| missing(id))?;
        if st.take_race(Race::RemovedElsewhere) {
            st.containers.remove(idx);
            return Err(missing(id));
        }
        if st.containers[idx].snapshot.state == ContainerState::Running {
            return Err(EngineError::Conflict(format!(
                "You cannot remove a running container {}. Stop the container before attempting removal or force remove",
                id
            )));
        }
        st.containers.remove(idx);
        Ok(())
    }

    async fn wait_for_removal(&self, id: &str) -> EngineResult<()> {
        let mut st = self.lock();
        st.calls.push(Call::Wait(id.to_string()));
        if let Some(err) = st.take_failure(Op::Wait) {
            return Err(err);
        }
        Ok(())
    }

    async fn attach_session(&self, id: &str, input: &[String]) -> EngineResult<String> {
        let hang = {
            let mut st = self.lock();
            st.calls.push(Call::Attach(id.to_string()));
            if let Some(err) = st.take_failure(Op::Attach) {
                return Err(err);
            }
            st.position(id).ok_or_else(|| missing(id))?;
            st.attached_input.extend(input.iter().cloned());
            st.hang_attach
        };
        if hang {
            std::future::pending::<()>().await;
        }
        let st = self.lock();
        Ok(st
            .attach_output
            .clone()
            .unwrap_or_else(|| input.iter().map(|l| format!("{}\n", l)).collect()))
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_requires_local_image() {
        let engine = FakeEngine::new();
        let request = CreateRequest {
            image: "nginx:alpine".into(),
            name: "demo1".into(),
            ..CreateRequest::default()
        };
        let err = engine.create_container(&request).await.unwrap_err();
        assert!(err.is_not_found());

        engine.pull_image("nginx:alpine").await.unwrap();
        let id = engine.create_container(&request).await.unwrap();
        assert_eq!(engine.state_of("demo1"), Some(ContainerState::Created));

        let dup = engine.create_container(&request).await.unwrap_err();
        assert!(dup.is_conflict());
        engine.start_container(&id).await.unwrap();
        assert_eq!(engine.state_of("demo1"), Some(ContainerState::Running));
    }

    #[tokio::test]
    async fn test_kill_and_remove_follow_engine_rules() {
        let engine = FakeEngine::new();
        let id = engine.seed_container("demo1", "nginx:alpine", ContainerState::Running);

        assert!(engine.remove_container(&id).await.unwrap_err().is_conflict());
        engine.kill_container(&id).await.unwrap();
        assert!(engine.kill_container(&id).await.unwrap_err().is_conflict());
        engine.remove_container(&id).await.unwrap();
        assert_eq!(engine.state_of("demo1"), None);
        assert!(engine.remove_container(&id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_list_filters_running_unless_all() {
        let engine = FakeEngine::new()
            .with_container("a", "img", ContainerState::Running)
            .with_container("b", "img", ContainerState::Exited);
        assert_eq!(engine.list_containers(false).await.unwrap().len(), 1);
        assert_eq!(engine.list_containers(true).await.unwrap().len(), 2);
        assert_eq!(engine.count(|c| *c == Call::ListContainers), 2);
    }
}
