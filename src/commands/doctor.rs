//! `provision doctor`: read-only health checks.
use anyhow::{Result, bail};

use crate::backup::BackupKind;
use crate::cli::GlobalOpts;
use crate::logging::{Logger, TaskStatus};
use crate::resources::config_link::ConfigLinkResource;
use crate::resources::{Resource as _, ResourceState};

/// Run the health checks. Never modifies the host.
///
/// # Errors
///
/// Returns an error when the repository cannot be resolved or any critical
/// check fails (artifact missing, config link wrong).
pub fn run(global: &GlobalOpts, log: &Logger) -> Result<()> {
    let ctx = super::build_context(global, false, log)?;
    log.stage(&format!("Checking {}", ctx.config.artifact.name));
    let mut healthy = true;

    // Artifact on PATH
    let binary = &ctx.config.artifact.binary;
    if ctx.executor.which(binary) {
        log.record_task("artifact on PATH", TaskStatus::Ok, Some(binary));
    } else {
        healthy = false;
        log.record_task(
            "artifact on PATH",
            TaskStatus::Failed,
            Some(&format!("'{binary}' not found")),
        );
    }

    // Config link state
    let resource = ConfigLinkResource::new(
        ctx.source_dir(),
        ctx.target_dir(),
        ctx.config.config.entry_point.clone(),
        ctx.ledger(),
    );
    match resource.current_state()? {
        ResourceState::Correct => log.record_task("config link", TaskStatus::Ok, None),
        ResourceState::Missing => {
            healthy = false;
            log.record_task("config link", TaskStatus::Failed, Some("not deployed"));
        }
        ResourceState::Incorrect { current } => {
            healthy = false;
            log.record_task("config link", TaskStatus::Failed, Some(&current));
        }
        ResourceState::Invalid { reason } => {
            healthy = false;
            log.record_task("config link", TaskStatus::Failed, Some(&reason));
        }
    }

    // Package manager support is advisory: everything else can still work
    if ctx.env.is_supported() {
        log.record_task(
            "package manager",
            TaskStatus::Ok,
            Some(&ctx.env.package_manager.to_string()),
        );
    } else {
        log.record_task(
            "package manager",
            TaskStatus::Skipped,
            Some(&format!("unsupported ({})", ctx.env.package_manager)),
        );
    }

    // Backup inventory
    let ledger = ctx.ledger();
    let configs = ledger
        .list()
        .iter()
        .filter(|r| r.kind == BackupKind::Config)
        .count();
    let total = ledger.list().len();
    log.record_task(
        "backups",
        TaskStatus::Ok,
        Some(&format!("{total} total, {configs} config")),
    );

    log.print_summary();
    if !healthy {
        bail!("health check failed");
    }
    Ok(())
}
