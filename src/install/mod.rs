//! Artifact acquisition strategies.
//!
//! Three mutually exclusive methods: compile from source, download a
//! prebuilt portable binary, or delegate to the host package manager. A
//! failed method is never retried with another method; the caller picks
//! exactly one per invocation.
pub mod github;
pub mod package;
pub mod prebuilt;
pub mod source;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::MethodArg;
use crate::error::InstallError;
use crate::exec::Executor;

/// Acquisition method, resolved from the CLI flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Source,
    Appimage,
    Package,
}

impl From<MethodArg> for Method {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Source => Self::Source,
            MethodArg::Appimage => Self::Appimage,
            MethodArg::Package => Self::Package,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => write!(f, "source"),
            Self::Appimage => write!(f, "appimage"),
            Self::Package => write!(f, "package"),
        }
    }
}

/// Which upstream version to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelector {
    /// Latest stable release.
    Stable,
    /// Rolling prerelease.
    Nightly,
    /// An explicit upstream tag, verbatim.
    Tag(String),
}

impl VersionSelector {
    /// Parse the `--release` flag value.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "stable" => Self::Stable,
            "nightly" => Self::Nightly,
            tag => Self::Tag(tag.to_string()),
        }
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stable => write!(f, "stable"),
            Self::Nightly => write!(f, "nightly"),
            Self::Tag(tag) => write!(f, "{tag}"),
        }
    }
}

/// Candidate install locations scanned for the PATH diagnostic.
fn candidate_paths(binary: &str, prefix: &Path, home: &Path) -> Vec<PathBuf> {
    vec![
        prefix.join("bin").join(binary),
        home.join(".local/bin").join(binary),
        PathBuf::from("/usr/local/bin").join(binary),
        PathBuf::from("/usr/bin").join(binary),
    ]
}

/// Postcondition: the binary resolves on PATH.
///
/// When it does not, known install locations that do exist on disk are
/// reported as advisory diagnostics. The caller treats this as fatal but
/// must not mutate PATH or retry.
///
/// # Errors
///
/// Returns [`InstallError::NotOnPath`] when the lookup fails.
pub fn verify_on_path(
    executor: &dyn Executor,
    binary: &str,
    prefix: &Path,
    home: &Path,
) -> Result<(), InstallError> {
    if executor.which(binary) {
        return Ok(());
    }
    let candidates = candidate_paths(binary, prefix, home)
        .into_iter()
        .filter(|p| p.is_file())
        .collect();
    Err(InstallError::NotOnPath {
        binary: binary.to_string(),
        candidates,
    })
}

/// Scratch directory for source builds.
#[must_use]
pub fn build_dir(name: &str, home: &Path) -> PathBuf {
    std::env::var("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home.join(".cache"))
        .join("provision/build")
        .join(name)
}
