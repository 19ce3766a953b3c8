//! `provision uninstall`: remove the artifact and the config link.
use anyhow::Result;

use crate::cli::{GlobalOpts, UninstallOpts};
use crate::install::{package, prebuilt, source};
use crate::logging::Logger;
use crate::resources::ResourceChange;
use crate::resources::config_link::ConfigLinkResource;

/// Run the uninstall command.
///
/// Artifact removal is best effort across every acquisition origin, since
/// the tool does not track which method originally installed it. Config
/// link removal refuses real directories outright. Backups are kept unless
/// `--purge-backups` is given.
///
/// # Errors
///
/// Returns an error when the repository cannot be resolved, when the config
/// target is a real directory, or when purging backups fails.
pub fn run(global: &GlobalOpts, opts: &UninstallOpts, log: &Logger) -> Result<()> {
    let ctx = super::build_context(global, opts.force, log)?;
    let name = ctx.config.artifact.name.clone();

    if !ctx.force && !ctx.dry_run && !log.confirm(&format!("Uninstall {name}?"))? {
        log.info("aborted");
        return Ok(());
    }

    if !opts.config_only {
        log.stage(&format!("Removing {name}"));
        if ctx.dry_run {
            log.dry_run("remove installed artifact (all origins)");
        } else {
            // Origins that do not exist are silently fine
            let mut warnings = source::remove(&ctx.config, &ctx.home, log);
            warnings.extend(prebuilt::remove(&ctx.config, &ctx.home, log));
            warnings.extend(package::remove(&ctx.config, &ctx.env, ctx.executor.as_ref(), log));
            if warnings.is_empty() {
                log.info(&format!("{name} removed"));
            } else {
                log.warn(&format!("{name} removed with {} warnings", warnings.len()));
            }
        }
    }

    if !opts.artifact_only {
        log.stage("Removing config link");
        let resource = ConfigLinkResource::new(
            ctx.source_dir(),
            ctx.target_dir(),
            ctx.config.config.entry_point.clone(),
            ctx.ledger(),
        );
        if ctx.dry_run {
            log.dry_run(&format!("remove {}", ctx.target_dir().display()));
        } else {
            match resource.remove()? {
                ResourceChange::Applied => log.info("config link removed"),
                ResourceChange::AlreadyCorrect => log.info("config link already absent"),
                ResourceChange::Skipped { reason } => log.info(&reason),
            }
        }
    }

    if opts.purge_backups {
        let ledger = ctx.ledger();
        let count = ledger.list().len();
        if count == 0 {
            log.info("no backups to purge");
        } else if ctx.dry_run {
            log.dry_run(&format!("purge {count} backups"));
        } else if ctx.force || log.confirm(&format!("Permanently delete {count} backups?"))? {
            let removed = ledger.purge_all()?;
            log.info(&format!("{removed} backups purged"));
        } else {
            log.info("backups kept");
        }
    }

    Ok(())
}
