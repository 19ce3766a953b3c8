//! Domain-specific error types for the provisioning engine.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! Internal modules return typed errors (e.g., [`InstallError`],
//! [`BackupError`]) while command handlers at the CLI boundary convert them
//! to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! ProvisionError
//! ├── Env(EnvError)        — unsupported/unknown package manager
//! ├── Plan(PlanError)      — dependency installation failures
//! ├── Install(InstallError)— artifact acquisition (network, build, PATH)
//! ├── Deploy(DeployError)  — config link preconditions and removal refusals
//! └── Backup(BackupError)  — ledger operations (snapshot, restore, purge)
//! ```
//!
//! Probe ambiguity is deliberately absent: the prober never fails, it
//! degrades to `Unknown` fields instead.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the provisioning engine.
///
/// Aggregates domain-specific sub-errors and is convertible to
/// [`anyhow::Error`] for use at CLI command boundaries.
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// Host environment error (unsupported package manager).
    #[error("Environment error: {0}")]
    Env(#[from] EnvError),

    /// Dependency plan execution error.
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    /// Artifact installation error (network, build, postcondition).
    #[error("Install error: {0}")]
    Install(#[from] InstallError),

    /// Config deployment error (missing source, removal refusal).
    #[error("Deploy error: {0}")]
    Deploy(#[from] DeployError),

    /// Backup ledger error (snapshot, restore, purge).
    #[error("Backup error: {0}")]
    Backup(#[from] BackupError),
}

/// Errors that arise from the host environment.
#[derive(Error, Debug)]
pub enum EnvError {
    /// No supported package manager could be identified on the host.
    ///
    /// Fatal for dependency and package-method installation; the config
    /// deployer still functions.
    #[error("No supported package manager found (detected: {0})")]
    UnsupportedPackageManager(String),
}

/// Errors that arise while executing a dependency install plan.
#[derive(Error, Debug)]
pub enum PlanError {
    /// The atomic build-tier invocation failed. Toolchain packages are
    /// interdependent, so partial success is meaningless.
    #[error("Build dependency installation failed: {0}")]
    BuildTierFailed(String),
}

/// Errors that arise during artifact acquisition and installation.
#[derive(Error, Debug)]
pub enum InstallError {
    /// A network operation (clone, tag lookup, download) failed.
    /// Fatal for the current invocation; never retried automatically.
    #[error("Network failure during {operation}: {detail}")]
    Network {
        /// What was being fetched (e.g. "git clone", "release download").
        operation: String,
        /// Underlying failure text.
        detail: String,
    },

    /// The source build or install step exited nonzero.
    #[error("Build failed: {0}")]
    BuildFailed(String),

    /// The installed binary does not resolve on PATH.
    ///
    /// Candidate locations found on disk are advisory diagnostics, not a
    /// retry trigger.
    #[error("'{binary}' not found on PATH after install{}", format_candidates(.candidates))]
    NotOnPath {
        /// Executable name that should have been resolvable.
        binary: String,
        /// Known install locations that do exist on disk.
        candidates: Vec<PathBuf>,
    },

    /// The selected method cannot run on this host.
    #[error("Method '{method}' is not available: {reason}")]
    MethodUnavailable {
        /// Name of the requested acquisition method.
        method: String,
        /// Why it cannot be used here.
        reason: String,
    },
}

fn format_candidates(candidates: &[PathBuf]) -> String {
    if candidates.is_empty() {
        String::new()
    } else {
        let list: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
        format!(" (found on disk: {})", list.join(", "))
    }
}

/// Errors that arise from config link deployment.
#[derive(Error, Debug)]
pub enum DeployError {
    /// The managed config source directory is absent or lacks its
    /// entry-point file. Checked before the target is touched.
    #[error("Config source missing: {}", .0.display())]
    SourceMissing(PathBuf),

    /// Removal refused because the target is a real directory, not a
    /// symlink. The tool never deletes data it cannot prove is disposable.
    #[error("{} is a real directory, not a symlink; manual intervention required", .0.display())]
    TargetIsRealDirectory(PathBuf),
}

/// Errors that arise from the backup ledger.
#[derive(Error, Debug)]
pub enum BackupError {
    /// No backup matches the requested timestamp.
    #[error("No backup found for '{0}'")]
    NoSuchBackup(String),

    /// A restore target could not be classified as config or data.
    #[error("Cannot classify backup path: {}", .0.display())]
    AmbiguousTarget(PathBuf),

    /// A filesystem move failed mid-operation.
    #[error("Backup move failed for {}: {source}", .path.display())]
    Move {
        /// Path being moved.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn env_error_display() {
        let e = EnvError::UnsupportedPackageManager("unknown".to_string());
        assert_eq!(
            e.to_string(),
            "No supported package manager found (detected: unknown)"
        );
    }

    #[test]
    fn network_error_display() {
        let e = InstallError::Network {
            operation: "git clone".to_string(),
            detail: "could not resolve host".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "Network failure during git clone: could not resolve host"
        );
    }

    #[test]
    fn not_on_path_without_candidates() {
        let e = InstallError::NotOnPath {
            binary: "nvim".to_string(),
            candidates: vec![],
        };
        assert_eq!(e.to_string(), "'nvim' not found on PATH after install");
    }

    #[test]
    fn not_on_path_lists_candidates() {
        let e = InstallError::NotOnPath {
            binary: "nvim".to_string(),
            candidates: vec![PathBuf::from("/usr/local/bin/nvim")],
        };
        assert!(e.to_string().contains("/usr/local/bin/nvim"));
        assert!(e.to_string().contains("found on disk"));
    }

    #[test]
    fn deploy_source_missing_display() {
        let e = DeployError::SourceMissing(PathBuf::from("/repo/nvim"));
        assert_eq!(e.to_string(), "Config source missing: /repo/nvim");
    }

    #[test]
    fn deploy_refusal_display() {
        let e = DeployError::TargetIsRealDirectory(PathBuf::from("/home/u/.config/nvim"));
        assert!(e.to_string().contains("manual intervention required"));
    }

    #[test]
    fn backup_no_such_backup_display() {
        let e = BackupError::NoSuchBackup("20260101-000000".to_string());
        assert_eq!(e.to_string(), "No backup found for '20260101-000000'");
    }

    #[test]
    fn backup_move_has_source() {
        use std::error::Error as StdError;
        let e = BackupError::Move {
            path: PathBuf::from("/tmp/x"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.source().is_some());
    }

    #[test]
    fn provision_error_from_sub_errors() {
        let e: ProvisionError = EnvError::UnsupportedPackageManager("apk".to_string()).into();
        assert!(e.to_string().contains("Environment error"));

        let e: ProvisionError = DeployError::SourceMissing(PathBuf::from("/x")).into();
        assert!(e.to_string().contains("Deploy error"));

        let e: ProvisionError = BackupError::NoSuchBackup("x".to_string()).into();
        assert!(e.to_string().contains("Backup error"));
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<ProvisionError>();
        assert_send_sync::<EnvError>();
        assert_send_sync::<PlanError>();
        assert_send_sync::<InstallError>();
        assert_send_sync::<DeployError>();
        assert_send_sync::<BackupError>();
    }

    #[test]
    fn errors_convert_to_anyhow() {
        let _e: anyhow::Error = InstallError::BuildFailed("make exited 2".to_string()).into();
        let _e: anyhow::Error = DeployError::SourceMissing(PathBuf::from("/x")).into();
    }
}
