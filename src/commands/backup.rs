//! `provision backup`: list, create, restore, and clean snapshots.
use anyhow::{Result, bail};

use crate::backup::{BackupKind, BackupRecord, Ledger};
use crate::cli::{BackupAction, BackupKindArg, BackupOpts, GlobalOpts};
use crate::error::BackupError;
use crate::logging::Logger;

/// Run a backup subcommand.
///
/// # Errors
///
/// Returns an error when the repository cannot be resolved, a requested
/// backup does not exist, or a filesystem move fails.
pub fn run(global: &GlobalOpts, opts: &BackupOpts, log: &Logger) -> Result<()> {
    let ctx = super::build_context(global, false, log)?;
    let ledger = ctx.ledger();

    match &opts.action {
        BackupAction::List => list(&ledger, log),
        BackupAction::Create { kind } => create(&ledger, *kind, ctx.dry_run, log),
        BackupAction::Restore { timestamp } => restore(&ledger, timestamp, ctx.dry_run, log),
        BackupAction::Clean { all, force } => clean(&ledger, *all, *force, ctx.dry_run, log),
    }
}

fn list(ledger: &Ledger, log: &Logger) -> Result<()> {
    let records = ledger.list();
    if records.is_empty() {
        log.info("no backups");
        return Ok(());
    }
    for record in records {
        log.info(&format!(
            "{}  {:6}  {}",
            record.timestamp,
            record.kind.to_string(),
            record.path.display()
        ));
    }
    Ok(())
}

fn create(ledger: &Ledger, kind: BackupKindArg, dry_run: bool, log: &Logger) -> Result<()> {
    let kinds: &[BackupKind] = match kind {
        BackupKindArg::Config => &[BackupKind::Config],
        BackupKindArg::Data => &[BackupKind::Data],
        BackupKindArg::All => &[BackupKind::Config, BackupKind::Data],
    };

    for kind in kinds {
        if dry_run {
            log.dry_run(&format!("snapshot {kind} directory"));
            continue;
        }
        match ledger.snapshot(*kind)? {
            Some(record) => log.info(&format!(
                "{kind} moved to {}",
                record.path.display()
            )),
            None => log.info(&format!("no {kind} directory to snapshot")),
        }
    }
    Ok(())
}

fn restore(ledger: &Ledger, timestamp: &str, dry_run: bool, log: &Logger) -> Result<()> {
    let record: BackupRecord = if timestamp == "latest" {
        ledger
            .latest(BackupKind::Config)
            .or_else(|| ledger.latest(BackupKind::Data))
            .ok_or_else(|| BackupError::NoSuchBackup("latest".to_string()))?
    } else {
        ledger
            .find(timestamp)
            .ok_or_else(|| BackupError::NoSuchBackup(timestamp.to_string()))?
    };

    if dry_run {
        log.dry_run(&format!("restore {}", record.path.display()));
        return Ok(());
    }
    ledger.restore(&record)?;
    log.info(&format!("restored {} backup {}", record.kind, record.timestamp));
    Ok(())
}

fn clean(ledger: &Ledger, all: bool, force: bool, dry_run: bool, log: &Logger) -> Result<()> {
    let records = ledger.list();
    if records.is_empty() {
        log.info("no backups to clean");
        return Ok(());
    }

    if all {
        if dry_run {
            log.dry_run(&format!("delete all {} backups", records.len()));
            return Ok(());
        }
        if !force && !log.confirm(&format!("Permanently delete {} backups?", records.len()))? {
            log.info("backups kept");
            return Ok(());
        }
        let removed = ledger.purge_all()?;
        log.info(&format!("{removed} backups deleted"));
        return Ok(());
    }

    // Default: drop only the oldest
    let Some(oldest) = records.first() else {
        bail!("no backups to clean");
    };
    if dry_run {
        log.dry_run(&format!("delete {}", oldest.path.display()));
        return Ok(());
    }
    if !force && !log.confirm(&format!("Delete oldest backup {}?", oldest.timestamp))? {
        log.info("backups kept");
        return Ok(());
    }
    ledger.purge(oldest)?;
    log.info(&format!("deleted {}", oldest.path.display()));
    Ok(())
}
