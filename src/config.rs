//! Provisioning manifest (`provision.toml`) loading and root resolution.
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use serde::Deserialize;

/// Manifest file name expected at the repository root.
pub const MANIFEST_NAME: &str = "provision.toml";

/// Parsed provisioning manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    pub artifact: ArtifactConfig,
    pub config: ConfigSection,
    #[serde(default)]
    pub packages: PackagesSection,
}

/// The program this repository provisions.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactConfig {
    /// Human-readable name (used in log lines and build paths).
    pub name: String,
    /// Executable name expected on PATH after install.
    pub binary: String,
    /// Upstream repository URL (clone and release-download base).
    pub repo: String,
    /// Install prefix for source builds. Tilde is expanded.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Release asset file name for the prebuilt method.
    pub appimage_asset: Option<String>,
    /// Extra apt repository (e.g. a PPA) added before package installs.
    pub apt_repository: Option<String>,
}

fn default_prefix() -> String {
    "/usr/local".to_string()
}

/// Managed configuration directory description.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSection {
    /// Directory inside the repository holding the configuration.
    pub source: String,
    /// Live target path the link is created at. Tilde is expanded.
    pub target: String,
    /// File that must exist inside `source` for a deploy to proceed.
    #[serde(default = "default_entry_point")]
    pub entry_point: String,
    /// State directory snapshotted by data backups. Tilde is expanded.
    pub data_dir: Option<String>,
    /// Headless invocation run after a successful deploy (e.g. plugin sync).
    #[serde(default)]
    pub sync_args: Vec<String>,
}

fn default_entry_point() -> String {
    "init.lua".to_string()
}

/// Dependency package lists, keyed by package manager name per tier.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackagesSection {
    #[serde(default)]
    pub build: PackageTable,
    #[serde(default)]
    pub runtime: PackageTable,
    #[serde(default)]
    pub optional: PackageTable,
}

/// Package names for one tier, one list per manager.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageTable {
    #[serde(default)]
    pub apt: Vec<String>,
    #[serde(default)]
    pub pacman: Vec<String>,
    #[serde(default)]
    pub dnf: Vec<String>,
    #[serde(default)]
    pub brew: Vec<String>,
}

impl PackageTable {
    /// Package list for the given manager. Managers outside the supported
    /// set have no curated lists.
    #[must_use]
    pub fn for_manager(&self, manager: crate::probe::PackageManager) -> &[String] {
        use crate::probe::PackageManager;
        match manager {
            PackageManager::Apt => &self.apt,
            PackageManager::Pacman => &self.pacman,
            PackageManager::Dnf => &self.dnf,
            PackageManager::Brew => &self.brew,
            _ => &[],
        }
    }
}

impl ToolConfig {
    /// Load and parse the manifest from a repository root.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or fails to parse.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(MANIFEST_NAME);
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Absolute path of the managed config source inside the repository.
    #[must_use]
    pub fn source_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.config.source)
    }

    /// Absolute live target path, with tilde expanded.
    #[must_use]
    pub fn target_dir(&self, home: &Path) -> PathBuf {
        expand_tilde(&self.config.target, home)
    }

    /// Absolute data directory path, with tilde expanded.
    #[must_use]
    pub fn data_dir(&self, home: &Path) -> Option<PathBuf> {
        self.config.data_dir.as_deref().map(|d| expand_tilde(d, home))
    }

    /// Install prefix for source builds, with tilde expanded.
    #[must_use]
    pub fn prefix_dir(&self, home: &Path) -> PathBuf {
        expand_tilde(&self.artifact.prefix, home)
    }
}

/// Expand a leading `~/` (or bare `~`) to the home directory.
#[must_use]
pub fn expand_tilde(path: &str, home: &Path) -> PathBuf {
    if path == "~" {
        home.to_path_buf()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// Resolve the provisioning repository root.
///
/// Resolution order: `--root` flag, then `PROVISION_ROOT`, then the
/// executable's ancestor directories, then the current directory. The
/// resolved directory must contain the manifest.
///
/// # Errors
///
/// Returns an error if no candidate directory contains `provision.toml`.
pub fn resolve_root(flag: Option<&Path>) -> Result<PathBuf> {
    if let Some(root) = flag {
        if root.join(MANIFEST_NAME).is_file() {
            return Ok(root.to_path_buf());
        }
        bail!("--root {} does not contain {MANIFEST_NAME}", root.display());
    }

    if let Ok(env_root) = std::env::var("PROVISION_ROOT") {
        let root = PathBuf::from(env_root);
        if root.join(MANIFEST_NAME).is_file() {
            return Ok(root);
        }
        bail!(
            "PROVISION_ROOT {} does not contain {MANIFEST_NAME}",
            root.display()
        );
    }

    // Walk up from the executable (useful when the binary lives in the repo)
    if let Ok(exe) = std::env::current_exe() {
        let mut dir = exe.as_path();
        while let Some(parent) = dir.parent() {
            if parent.join(MANIFEST_NAME).is_file() {
                return Ok(parent.to_path_buf());
            }
            dir = parent;
        }
    }

    let cwd = std::env::current_dir().context("failed to resolve current directory")?;
    if cwd.join(MANIFEST_NAME).is_file() {
        return Ok(cwd);
    }

    bail!("could not locate a provisioning repository (no {MANIFEST_NAME} found)")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::PackageManager;

    const MANIFEST: &str = r#"
[artifact]
name = "neovim"
binary = "nvim"
repo = "https://github.com/neovim/neovim"
prefix = "~/.local"
appimage_asset = "nvim-linux-x86_64.appimage"
apt_repository = "ppa:neovim-ppa/unstable"

[config]
source = "nvim"
target = "~/.config/nvim"
entry_point = "init.lua"
data_dir = "~/.local/share/nvim"
sync_args = ["--headless", "+PlugInstall", "+qall"]

[packages.build]
apt = ["ninja-build", "gettext", "cmake"]
pacman = ["base-devel", "cmake"]

[packages.runtime]
apt = ["ripgrep", "fd-find"]
pacman = ["ripgrep", "fd"]

[packages.optional]
apt = ["fzf"]
"#;

    fn write_manifest(dir: &Path) {
        std::fs::write(dir.join(MANIFEST_NAME), MANIFEST).unwrap();
    }

    #[test]
    fn load_full_manifest() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path());
        let config = ToolConfig::load(dir.path()).unwrap();
        assert_eq!(config.artifact.name, "neovim");
        assert_eq!(config.artifact.binary, "nvim");
        assert_eq!(
            config.artifact.appimage_asset.as_deref(),
            Some("nvim-linux-x86_64.appimage")
        );
        assert_eq!(config.config.entry_point, "init.lua");
        assert_eq!(config.packages.build.apt.len(), 3);
        assert_eq!(config.packages.optional.apt, vec!["fzf".to_string()]);
    }

    #[test]
    fn load_missing_manifest_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ToolConfig::load(dir.path()).is_err());
    }

    #[test]
    fn load_rejects_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_NAME),
            "[artifact]\nname = \"x\"\nbinary = \"x\"\nrepo = \"r\"\nbogus = 1\n\
             [config]\nsource = \"s\"\ntarget = \"t\"\n",
        )
        .unwrap();
        assert!(ToolConfig::load(dir.path()).is_err());
    }

    #[test]
    fn minimal_manifest_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_NAME),
            "[artifact]\nname = \"x\"\nbinary = \"x\"\nrepo = \"r\"\n\
             [config]\nsource = \"s\"\ntarget = \"~/.config/x\"\n",
        )
        .unwrap();
        let config = ToolConfig::load(dir.path()).unwrap();
        assert_eq!(config.artifact.prefix, "/usr/local");
        assert_eq!(config.config.entry_point, "init.lua");
        assert!(config.config.sync_args.is_empty());
        assert!(config.packages.build.apt.is_empty());
    }

    #[test]
    fn expand_tilde_variants() {
        let home = Path::new("/home/u");
        assert_eq!(expand_tilde("~", home), PathBuf::from("/home/u"));
        assert_eq!(
            expand_tilde("~/.config/nvim", home),
            PathBuf::from("/home/u/.config/nvim")
        );
        assert_eq!(expand_tilde("/abs/path", home), PathBuf::from("/abs/path"));
    }

    #[test]
    fn package_table_for_manager() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path());
        let config = ToolConfig::load(dir.path()).unwrap();
        assert_eq!(
            config.packages.runtime.for_manager(PackageManager::Pacman),
            &["ripgrep".to_string(), "fd".to_string()]
        );
        assert!(
            config
                .packages
                .runtime
                .for_manager(PackageManager::Zypper)
                .is_empty()
        );
    }

    #[test]
    fn resolve_root_flag_requires_manifest() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_root(Some(dir.path())).is_err());
        write_manifest(dir.path());
        assert_eq!(resolve_root(Some(dir.path())).unwrap(), dir.path());
    }

    #[test]
    fn paths_expand_against_home() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path());
        let config = ToolConfig::load(dir.path()).unwrap();
        let home = Path::new("/home/u");
        assert_eq!(
            config.target_dir(home),
            PathBuf::from("/home/u/.config/nvim")
        );
        assert_eq!(
            config.data_dir(home),
            Some(PathBuf::from("/home/u/.local/share/nvim"))
        );
        assert_eq!(config.prefix_dir(home), PathBuf::from("/home/u/.local"));
        assert_eq!(config.source_dir(Path::new("/repo")), PathBuf::from("/repo/nvim"));
    }
}
