//! Dependency install planning and execution.
//!
//! A plan is data: an ordered list of package-manager invocations derived
//! from the probed [`Environment`](crate::probe::Environment) and the
//! manifest's package lists. Building a plan never touches the host;
//! [`execute_plan`] is the only function here with side effects.
use std::fmt;

use crate::config::PackagesSection;
use crate::error::PlanError;
use crate::exec::Executor;
use crate::logging::Logger;
use crate::probe::{Environment, PackageManager};

/// Dependency tier. Tiers differ in failure policy, not just content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Compiler toolchain needed for source builds. Installed atomically;
    /// any failure aborts the tier.
    Build,
    /// Tools the artifact shells out to at runtime. Installed per package;
    /// failures degrade to warnings.
    Runtime,
    /// Nice-to-haves. Same policy as runtime.
    Optional,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build => write!(f, "build"),
            Self::Runtime => write!(f, "runtime"),
            Self::Optional => write!(f, "optional"),
        }
    }
}

/// A single planned invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStep {
    /// Refresh the manager's package index.
    UpdateIndex { command: Vec<String> },
    /// Install one or more packages.
    InstallPackages {
        command: Vec<String>,
        packages: Vec<String>,
    },
}

impl PlanStep {
    /// Full argv for this step (command prefix plus packages).
    #[must_use]
    pub fn argv(&self) -> Vec<String> {
        match self {
            Self::UpdateIndex { command } => command.clone(),
            Self::InstallPackages { command, packages } => {
                let mut argv = command.clone();
                argv.extend(packages.iter().cloned());
                argv
            }
        }
    }
}

/// An ordered, inspectable dependency install plan.
#[derive(Debug, Clone)]
pub struct InstallPlan {
    pub tier: Tier,
    pub manager: PackageManager,
    pub steps: Vec<PlanStep>,
}

impl InstallPlan {
    /// True when the plan performs no work.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self
            .steps
            .iter()
            .any(|s| matches!(s, PlanStep::InstallPackages { .. }))
    }
}

/// Outcome counters from executing a plan.
#[derive(Debug, Default)]
pub struct PlanReport {
    pub installed: usize,
    pub warnings: Vec<String>,
}

impl PackageManager {
    /// Command prefix that installs packages non-interactively.
    #[must_use]
    pub fn install_command(self) -> Option<Vec<String>> {
        let argv: &[&str] = match self {
            Self::Apt => &["sudo", "apt-get", "install", "-y"],
            Self::Pacman => &["sudo", "pacman", "-S", "--needed", "--noconfirm"],
            Self::Dnf => &["sudo", "dnf", "install", "-y"],
            Self::Yum => &["sudo", "yum", "install", "-y"],
            Self::Zypper => &["sudo", "zypper", "--non-interactive", "install"],
            Self::Apk => &["sudo", "apk", "add"],
            Self::Brew => &["brew", "install"],
            Self::Unknown => return None,
        };
        Some(argv.iter().map(ToString::to_string).collect())
    }

    /// Command that refreshes the package index, where the manager needs a
    /// separate step for it.
    #[must_use]
    pub fn update_index_command(self) -> Option<Vec<String>> {
        let argv: &[&str] = match self {
            Self::Apt => &["sudo", "apt-get", "update"],
            Self::Pacman => &["sudo", "pacman", "-Sy"],
            Self::Apk => &["sudo", "apk", "update"],
            Self::Brew => &["brew", "update"],
            // dnf/yum/zypper refresh their metadata on install
            Self::Dnf | Self::Yum | Self::Zypper | Self::Unknown => return None,
        };
        Some(argv.iter().map(ToString::to_string).collect())
    }

    /// Command prefix that removes packages non-interactively.
    #[must_use]
    pub fn remove_command(self) -> Option<Vec<String>> {
        let argv: &[&str] = match self {
            Self::Apt => &["sudo", "apt-get", "remove", "-y"],
            Self::Pacman => &["sudo", "pacman", "-R", "--noconfirm"],
            Self::Dnf => &["sudo", "dnf", "remove", "-y"],
            Self::Yum => &["sudo", "yum", "remove", "-y"],
            Self::Zypper => &["sudo", "zypper", "--non-interactive", "remove"],
            Self::Apk => &["sudo", "apk", "del"],
            Self::Brew => &["brew", "uninstall"],
            Self::Unknown => return None,
        };
        Some(argv.iter().map(ToString::to_string).collect())
    }
}

/// Build the install plan for one tier.
///
/// Produces an empty plan when the host manager is unknown or the manifest
/// lists nothing for this manager and tier. The index refresh step is only
/// included when there are packages to install.
#[must_use]
pub fn build_plan(env: &Environment, tier: Tier, packages: &PackagesSection) -> InstallPlan {
    let manager = env.package_manager;
    let table = match tier {
        Tier::Build => &packages.build,
        Tier::Runtime => &packages.runtime,
        Tier::Optional => &packages.optional,
    };
    let wanted: Vec<String> = table.for_manager(manager).to_vec();

    let mut steps = Vec::new();
    if !wanted.is_empty()
        && let Some(command) = manager.install_command()
    {
        if let Some(update) = manager.update_index_command() {
            steps.push(PlanStep::UpdateIndex { command: update });
        }
        steps.push(PlanStep::InstallPackages {
            command,
            packages: wanted,
        });
    }

    InstallPlan {
        tier,
        manager,
        steps,
    }
}

/// Execute a plan against the host.
///
/// Build tier: one atomic invocation, failure is fatal. Runtime and
/// optional tiers: one invocation per package, failures become warnings.
///
/// # Errors
///
/// Returns [`PlanError::BuildTierFailed`] when the build tier's atomic
/// invocation fails. Index refresh failures are warnings for every tier.
pub fn execute_plan(
    plan: &InstallPlan,
    executor: &dyn Executor,
    log: &Logger,
) -> Result<PlanReport, PlanError> {
    let mut report = PlanReport::default();

    for step in &plan.steps {
        match step {
            PlanStep::UpdateIndex { command } => {
                log.debug(&format!("refreshing package index: {}", command.join(" ")));
                if let Err(e) = run_argv(executor, command) {
                    // A stale index is survivable; the install step decides.
                    report
                        .warnings
                        .push(format!("package index refresh failed: {e}"));
                    log.warn(&format!("package index refresh failed: {e}"));
                }
            }
            PlanStep::InstallPackages { command, packages } => match plan.tier {
                Tier::Build => {
                    let mut argv = command.clone();
                    argv.extend(packages.iter().cloned());
                    log.debug(&format!("installing {} packages atomically", packages.len()));
                    run_argv(executor, &argv)
                        .map_err(|e| PlanError::BuildTierFailed(e.to_string()))?;
                    report.installed += packages.len();
                }
                Tier::Runtime | Tier::Optional => {
                    for package in packages {
                        let mut argv = command.clone();
                        argv.push(package.clone());
                        match run_argv(executor, &argv) {
                            Ok(()) => report.installed += 1,
                            Err(e) => {
                                let warning = format!("could not install '{package}': {e}");
                                log.warn(&warning);
                                report.warnings.push(warning);
                            }
                        }
                    }
                }
            },
        }
    }

    Ok(report)
}

fn run_argv(executor: &dyn Executor, argv: &[String]) -> anyhow::Result<()> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| anyhow::anyhow!("empty command"))?;
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    executor.run(program, &args)?;
    Ok(())
}
