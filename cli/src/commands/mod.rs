//! # Dockhand Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! One module per subcommand. Each defines a `clap` argument struct and an
//! async `handle_*` function. Handlers are thin: they resolve arguments and
//! configuration into a call on the lifecycle core and print the outcome.
//!
//! Handlers receive a `CommandContext` built once in `main`, so they can run
//! against the live engine or, in tests, against the in-memory one. The live
//! engine is connected on first use: handlers validate their arguments and
//! read their input files before asking for it, so those mistakes are
//! reported as such even when no engine is reachable.
//!
use crate::common::docker::{connect::connect_docker, DockerEngine, EngineClient};
use crate::core::config::Config;
use crate::core::error::Result;
use std::sync::{Arc, OnceLock};
use tokio_util::sync::CancellationToken;

/// Tear down a container by name.
pub mod down;
/// Print the host port mapped to a container port.
pub mod port;
/// Feed a script to the shell of a running container.
pub mod script;
/// Show the current snapshot of a container.
pub mod status;
/// Reconcile a container into the running state.
pub mod up;

/// Shared state handed to every command handler.
#[derive(Clone)]
pub struct CommandContext {
    pub config: Config,
    engine: OnceLock<Arc<dyn EngineClient>>,
    /// Cancelled on Ctrl+C / SIGTERM.
    pub cancel: CancellationToken,
}

impl CommandContext {
    /// Context whose engine is connected from `config.engine` on first use.
    pub fn new(config: Config, cancel: CancellationToken) -> Self {
        Self {
            config,
            engine: OnceLock::new(),
            cancel,
        }
    }

    /// Context bound to an already constructed engine.
    #[cfg(test)]
    pub fn with_engine(
        config: Config,
        engine: Arc<dyn EngineClient>,
        cancel: CancellationToken,
    ) -> Self {
        let ctx = Self::new(config, cancel);
        let _ = ctx.engine.set(engine);
        ctx
    }

    /// Returns the engine, connecting to it if this is the first call.
    ///
    /// # Errors
    ///
    /// Returns `DockhandError::EngineUnavailable` if the connection cannot be
    /// established. A failed attempt is not cached.
    pub fn engine(&self) -> Result<&dyn EngineClient> {
        if let Some(engine) = self.engine.get() {
            return Ok(engine.as_ref());
        }
        let docker = connect_docker(&self.config.engine)?;
        let connected: Arc<dyn EngineClient> = Arc::new(DockerEngine::new(docker));
        Ok(self.engine.get_or_init(|| connected).as_ref())
    }
}
