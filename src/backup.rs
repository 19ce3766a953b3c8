//! Timestamped backup ledger for config and data directories.
//!
//! Backups are moves, never copies: snapshotting renames the live directory
//! to a sibling named `<name>.backup.<kind>.<timestamp>`. Moving is atomic
//! on the same filesystem and leaves exactly one owner for the bytes.
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::BackupError;

/// What a backup snapshot contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupKind {
    /// The managed configuration directory.
    Config,
    /// The artifact's state directory (plugins, caches, session data).
    Data,
}

impl BackupKind {
    const fn label(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Data => "data",
        }
    }
}

impl fmt::Display for BackupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One backup on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    pub kind: BackupKind,
    /// Directory holding the snapshot.
    pub path: PathBuf,
    /// Timestamp component of the name, `%Y%m%d-%H%M%S` plus an optional
    /// `-N` collision suffix. Lexicographic order is chronological order.
    pub timestamp: String,
}

/// Ledger over the live config path and optional data path.
///
/// Backups live next to the directory they shadow; the ledger discovers
/// them by name, so it needs no separate index file.
#[derive(Debug, Clone)]
pub struct Ledger {
    config_path: PathBuf,
    data_path: Option<PathBuf>,
}

impl Ledger {
    #[must_use]
    pub fn new(config_path: PathBuf, data_path: Option<PathBuf>) -> Self {
        Self {
            config_path,
            data_path,
        }
    }

    fn live_path(&self, kind: BackupKind) -> Option<&Path> {
        match kind {
            BackupKind::Config => Some(&self.config_path),
            BackupKind::Data => self.data_path.as_deref(),
        }
    }

    /// Move the live directory aside as a new timestamped backup.
    ///
    /// Returns `Ok(None)` when there is nothing to snapshot (the live path
    /// does not exist, or no data path is configured). A dangling symlink at
    /// the live path is not a snapshot candidate either.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Move`] if the rename fails.
    pub fn snapshot(&self, kind: BackupKind) -> Result<Option<BackupRecord>, BackupError> {
        let Some(live) = self.live_path(kind) else {
            return Ok(None);
        };
        // symlink_metadata: a symlink at the live path is managed state, not
        // user data, and is never worth a backup
        match live.symlink_metadata() {
            Ok(meta) if !meta.is_symlink() => {}
            _ => return Ok(None),
        }

        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
        let destination = unique_sibling(live, &backup_name(live, kind, &timestamp));
        std::fs::rename(live, &destination).map_err(|source| BackupError::Move {
            path: live.to_path_buf(),
            source,
        })?;

        let timestamp = record_timestamp(&destination, kind).unwrap_or(timestamp);
        Ok(Some(BackupRecord {
            kind,
            path: destination,
            timestamp,
        }))
    }

    /// All backups on disk, oldest first.
    #[must_use]
    pub fn list(&self) -> Vec<BackupRecord> {
        let mut records = Vec::new();
        records.extend(scan_siblings(&self.config_path, BackupKind::Config));
        if let Some(data) = &self.data_path {
            records.extend(scan_siblings(data, BackupKind::Data));
        }
        records.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        records
    }

    /// Most recent backup of the given kind.
    #[must_use]
    pub fn latest(&self, kind: BackupKind) -> Option<BackupRecord> {
        self.list().into_iter().rev().find(|r| r.kind == kind)
    }

    /// Find a backup by its timestamp string, any kind.
    #[must_use]
    pub fn find(&self, timestamp: &str) -> Option<BackupRecord> {
        self.list().into_iter().find(|r| r.timestamp == timestamp)
    }

    /// Restore a backup into its live location.
    ///
    /// If the live path currently holds real content it is first moved
    /// aside under a distinct `<stem>.pre-restore.<ts>` name, never deleted
    /// in place.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::AmbiguousTarget`] when the record's kind has no
    /// live path, or [`BackupError::Move`] when a rename fails.
    pub fn restore(&self, record: &BackupRecord) -> Result<(), BackupError> {
        let live = self
            .live_path(record.kind)
            .ok_or_else(|| BackupError::AmbiguousTarget(record.path.clone()))?
            .to_path_buf();

        match live.symlink_metadata() {
            // A symlink at the live path is managed state, drop it
            Ok(meta) if meta.is_symlink() => {
                std::fs::remove_file(&live).map_err(|source| BackupError::Move {
                    path: live.clone(),
                    source,
                })?;
            }
            Ok(_) => {
                let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
                let stem = live
                    .file_name()
                    .map_or_else(|| "live".to_string(), |n| n.to_string_lossy().to_string());
                let aside = unique_sibling(&live, &format!("{stem}.pre-restore.{timestamp}"));
                std::fs::rename(&live, &aside).map_err(|source| BackupError::Move {
                    path: live.clone(),
                    source,
                })?;
            }
            Err(_) => {}
        }

        std::fs::rename(&record.path, &live).map_err(|source| BackupError::Move {
            path: record.path.clone(),
            source,
        })
    }

    /// Delete one backup permanently.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Move`] if the directory cannot be removed.
    pub fn purge(&self, record: &BackupRecord) -> Result<(), BackupError> {
        std::fs::remove_dir_all(&record.path).map_err(|source| BackupError::Move {
            path: record.path.clone(),
            source,
        })
    }

    /// Delete every backup permanently. Returns the number removed.
    ///
    /// # Errors
    ///
    /// Returns the first removal failure.
    pub fn purge_all(&self) -> Result<usize, BackupError> {
        let records = self.list();
        let count = records.len();
        for record in &records {
            self.purge(record)?;
        }
        Ok(count)
    }
}

/// First free sibling of `live` with the given name; same-second collisions
/// get a monotonic `-N` suffix instead of clobbering an earlier entry.
fn unique_sibling(live: &Path, base: &str) -> PathBuf {
    let parent = live.parent().unwrap_or_else(|| Path::new("."));
    let mut candidate = parent.join(base);
    let mut n = 1u32;
    while candidate.exists() {
        candidate = parent.join(format!("{base}-{n}"));
        n += 1;
    }
    candidate
}

fn backup_name(live: &Path, kind: BackupKind, timestamp: &str) -> String {
    let stem = live
        .file_name()
        .map_or_else(|| "backup".to_string(), |n| n.to_string_lossy().to_string());
    format!("{stem}.backup.{}.{timestamp}", kind.label())
}

/// Extract the timestamp from a backup directory name, if it is one of ours
/// for the given kind.
fn record_timestamp(path: &Path, kind: BackupKind) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    let marker = format!(".backup.{}.", kind.label());
    let idx = name.find(&marker)?;
    Some(name[idx + marker.len()..].to_string())
}

fn scan_siblings(live: &Path, kind: BackupKind) -> Vec<BackupRecord> {
    let Some(parent) = live.parent() else {
        return Vec::new();
    };
    let stem = live
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let prefix = format!("{stem}.backup.{}.", kind.label());

    let Ok(entries) = std::fs::read_dir(parent) else {
        return Vec::new();
    };

    entries
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            let timestamp = name.strip_prefix(&prefix)?.to_string();
            Some(BackupRecord {
                kind,
                path: entry.path(),
                timestamp,
            })
        })
        .collect()
}
