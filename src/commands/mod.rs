//! CLI command handlers.
//!
//! Each handler resolves the repository root, loads the manifest, probes
//! the host, and drives the task or ledger layer. Handlers return
//! [`anyhow::Result`]; domain errors bubble up through `?`.
pub mod backup;
pub mod doctor;
pub mod install;
pub mod uninstall;
pub mod update;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::{ToolConfig, resolve_root};
use crate::exec::SystemExecutor;
use crate::logging::Logger;
use crate::probe;
use crate::tasks::Context;

/// Resolve everything a command needs into a task [`Context`].
fn build_context(global: &GlobalOpts, force: bool, log: &Logger) -> Result<Context> {
    let root = resolve_root(global.root.as_deref())?;
    let config = ToolConfig::load(&root)?;
    let executor = Arc::new(SystemExecutor);
    let env = probe::probe(executor.as_ref());
    log.debug(&format!("repository root: {}", root.display()));
    log.debug(&format!("environment: {env}"));

    let home = home_dir()?;
    Ok(Context {
        config,
        root,
        env,
        executor,
        dry_run: global.dry_run,
        force,
        home,
    })
}

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine the home directory")
}
