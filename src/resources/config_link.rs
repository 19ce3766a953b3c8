//! Config directory symlink resource.
//!
//! The live config path is managed as a single symlink to the repository's
//! config source. User content found at the live path is snapshotted into
//! the backup ledger before the link is created; a stale symlink pointing
//! elsewhere is dropped without a backup.
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::backup::{BackupKind, Ledger};
use crate::error::DeployError;
use crate::resources::{Resource, ResourceChange, ResourceState};

/// Desired state: `target` is a symlink to `source`.
pub struct ConfigLinkResource {
    source: PathBuf,
    target: PathBuf,
    entry_point: String,
    ledger: Ledger,
}

impl ConfigLinkResource {
    #[must_use]
    pub fn new(source: PathBuf, target: PathBuf, entry_point: String, ledger: Ledger) -> Self {
        Self {
            source,
            target,
            entry_point,
            ledger,
        }
    }

    /// Verify the repository side before touching the live path.
    fn check_source(&self) -> Result<(), DeployError> {
        if !self.source.is_dir() {
            return Err(DeployError::SourceMissing(self.source.clone()));
        }
        let entry = self.source.join(&self.entry_point);
        if !entry.is_file() {
            return Err(DeployError::SourceMissing(entry));
        }
        Ok(())
    }

    fn create_link(&self) -> Result<()> {
        if let Some(parent) = self.target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::os::unix::fs::symlink(&self.source, &self.target)?;
        Ok(())
    }

    /// Remove the managed link.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::TargetIsRealDirectory`] when the target holds
    /// real content. The tool never deletes what it cannot prove it created.
    pub fn remove(&self) -> Result<ResourceChange, DeployError> {
        match self.target.symlink_metadata() {
            Err(_) => Ok(ResourceChange::AlreadyCorrect),
            Ok(meta) if meta.is_symlink() => {
                std::fs::remove_file(&self.target).map_err(|_| {
                    DeployError::TargetIsRealDirectory(self.target.clone())
                })?;
                Ok(ResourceChange::Applied)
            }
            Ok(_) => Err(DeployError::TargetIsRealDirectory(self.target.clone())),
        }
    }
}

/// Compare a link destination against the expected source, resolving
/// relative components where possible.
fn points_to(link_destination: &Path, source: &Path) -> bool {
    if link_destination == source {
        return true;
    }
    match (link_destination.canonicalize(), source.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

impl Resource for ConfigLinkResource {
    fn describe(&self) -> String {
        format!(
            "link {} -> {}",
            self.target.display(),
            self.source.display()
        )
    }

    fn current_state(&self) -> Result<ResourceState> {
        if let Err(e) = self.check_source() {
            return Ok(ResourceState::Invalid {
                reason: e.to_string(),
            });
        }

        match self.target.symlink_metadata() {
            Err(_) => Ok(ResourceState::Missing),
            Ok(meta) if meta.is_symlink() => {
                let destination = std::fs::read_link(&self.target)?;
                if points_to(&destination, &self.source) {
                    Ok(ResourceState::Correct)
                } else {
                    Ok(ResourceState::Incorrect {
                        current: format!("symlink to {}", destination.display()),
                    })
                }
            }
            Ok(meta) if meta.is_dir() => Ok(ResourceState::Incorrect {
                current: "real directory".to_string(),
            }),
            Ok(_) => Ok(ResourceState::Incorrect {
                current: "real file".to_string(),
            }),
        }
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.check_source()?;

        match self.target.symlink_metadata() {
            Err(_) => {
                self.create_link()?;
                Ok(ResourceChange::Applied)
            }
            Ok(meta) if meta.is_symlink() => {
                let destination = std::fs::read_link(&self.target)?;
                if points_to(&destination, &self.source) {
                    return Ok(ResourceChange::AlreadyCorrect);
                }
                // Stale link: managed state, not user data, so no backup
                std::fs::remove_file(&self.target)?;
                self.create_link()?;
                Ok(ResourceChange::Applied)
            }
            Ok(_) => {
                // Real content: snapshot before replacing
                self.ledger.snapshot(BackupKind::Config)?;
                self.create_link()?;
                Ok(ResourceChange::Applied)
            }
        }
    }
}
