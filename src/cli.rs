use clap::{Parser, Subcommand, ValueEnum};

/// Top-level CLI entry point for the provisioning engine.
#[derive(Parser, Debug)]
#[command(
    name = "provision",
    about = "Idempotent environment provisioning: probe, plan, install, link, back up",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Override the provisioning repository root directory
    #[arg(long, global = true)]
    pub root: Option<std::path::PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install dependencies, the artifact, and the config link
    Install(InstallOpts),
    /// Re-install the artifact only (config and dependencies untouched)
    Update(UpdateOpts),
    /// Remove the installed artifact and config link
    Uninstall(UninstallOpts),
    /// Manage timestamped config/data backups
    Backup(BackupOpts),
    /// Run health checks on the provisioned environment
    Doctor,
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the persistent log file of this invocation.
    #[must_use]
    pub fn log_name(&self) -> &'static str {
        match self {
            Self::Install(_) => "install",
            Self::Update(_) => "update",
            Self::Uninstall(_) => "uninstall",
            Self::Backup(_) => "backup",
            Self::Doctor => "doctor",
            Self::Version => "version",
        }
    }
}

/// Artifact acquisition strategy. Strategies are mutually exclusive; a failed
/// install never falls back to another strategy mid-flight.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodArg {
    /// Shallow-clone the upstream repository and compile
    Source,
    /// Download a portable self-contained binary
    Appimage,
    /// Delegate to the host package manager
    Package,
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct InstallOpts {
    /// Only install dependency packages
    #[arg(long, conflicts_with_all = ["artifact_only", "config_only"])]
    pub deps_only: bool,

    /// Only install the artifact
    #[arg(long, conflicts_with = "config_only")]
    pub artifact_only: bool,

    /// Only deploy the config link
    #[arg(long)]
    pub config_only: bool,

    /// Acquisition method
    #[arg(long, value_enum, default_value = "source")]
    pub method: MethodArg,

    /// Version selector: stable, nightly, or an explicit tag
    #[arg(long, default_value = "stable")]
    pub release: String,

    /// Skip confirmation prompts
    #[arg(short, long)]
    pub force: bool,
}

/// Options for the `update` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct UpdateOpts {
    /// Acquisition method
    #[arg(long, value_enum, default_value = "source")]
    pub method: MethodArg,

    /// Version selector: stable, nightly, or an explicit tag
    #[arg(long, default_value = "stable")]
    pub release: String,
}

/// Options for the `uninstall` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct UninstallOpts {
    /// Only remove the artifact
    #[arg(long, conflicts_with = "config_only")]
    pub artifact_only: bool,

    /// Only remove the config link
    #[arg(long)]
    pub config_only: bool,

    /// Also delete all backups
    #[arg(long)]
    pub purge_backups: bool,

    /// Skip confirmation prompts
    #[arg(short, long)]
    pub force: bool,
}

/// Backup target selector for `backup create`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupKindArg {
    Config,
    Data,
    All,
}

/// Options for the `backup` subcommand group.
#[derive(Parser, Debug, Clone)]
pub struct BackupOpts {
    #[command(subcommand)]
    pub action: BackupAction,
}

/// Backup subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum BackupAction {
    /// List all known backups
    List,
    /// Snapshot the live config/data directories
    Create {
        /// Which directories to snapshot
        #[arg(long, value_enum, default_value = "all")]
        kind: BackupKindArg,
    },
    /// Restore a backup (by timestamp, or the latest)
    Restore {
        /// Timestamp of the backup to restore, or "latest"
        #[arg(default_value = "latest")]
        timestamp: String,
    },
    /// Permanently delete backups
    Clean {
        /// Delete every backup, not just the oldest
        #[arg(long)]
        all: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}
