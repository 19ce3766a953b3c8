//! Source-build acquisition: shallow clone, make, make install.
use std::path::Path;

use crate::config::ToolConfig;
use crate::error::InstallError;
use crate::exec::Executor;
use crate::install::{build_dir, package, prebuilt, verify_on_path};
use crate::logging::Logger;
use crate::probe::Environment;

/// Clone the upstream repository and build it.
///
/// `git_ref` of `None` builds the default branch tip (nightly). Any
/// previous installation is removed first across all three origins
/// (package-manager record, prior prefix install, prior portable binary)
/// so stale copies cannot shadow the new one on PATH; those removals are
/// best effort. The scratch directory is recreated for every build so a
/// previous partial clone can never poison the next one, and a failed
/// clone removes it again before returning.
///
/// # Errors
///
/// Returns [`InstallError::MethodUnavailable`] when git or make is missing,
/// [`InstallError::Network`] when the clone fails, and
/// [`InstallError::BuildFailed`] when compilation or installation fails.
/// The PATH postcondition failure surfaces as [`InstallError::NotOnPath`].
pub fn install(
    config: &ToolConfig,
    git_ref: Option<&str>,
    env: &Environment,
    home: &Path,
    executor: &dyn Executor,
    log: &Logger,
) -> Result<(), InstallError> {
    for tool in ["git", "make"] {
        if !executor.which(tool) {
            return Err(InstallError::MethodUnavailable {
                method: "source".to_string(),
                reason: format!("'{tool}' is not installed"),
            });
        }
    }

    // Clear earlier installs regardless of how they got there
    let _ = remove(config, home, log);
    let _ = prebuilt::remove(config, home, log);
    let _ = package::remove(config, env, executor, log);

    let scratch = build_dir(&config.artifact.name, home);
    if scratch.exists() {
        let _ = std::fs::remove_dir_all(&scratch);
    }
    if let Some(parent) = scratch.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    log.stage(&format!(
        "Building {} {} from source",
        config.artifact.name,
        git_ref.unwrap_or("(default branch)")
    ));
    log.debug(&format!("scratch directory: {}", scratch.display()));

    let scratch_str = scratch.to_string_lossy();
    let mut args = vec!["clone", "--depth", "1"];
    if let Some(git_ref) = git_ref {
        args.extend(["--branch", git_ref]);
    }
    args.push(&config.artifact.repo);
    args.push(&scratch_str);
    let clone = executor.run("git", &args);
    if let Err(e) = clone {
        // A partial clone is worse than no clone
        let _ = std::fs::remove_dir_all(&scratch);
        return Err(InstallError::Network {
            operation: "git clone".to_string(),
            detail: e.to_string(),
        });
    }

    log.info("compiling (this can take a while)");
    executor
        .run_in(&scratch, "make", &["CMAKE_BUILD_TYPE=Release"])
        .map_err(|e| InstallError::BuildFailed(e.to_string()))?;

    let prefix = config.prefix_dir(home);
    let prefix_arg = format!("CMAKE_INSTALL_PREFIX={}", prefix.display());
    executor
        .run_in(&scratch, "make", &[&prefix_arg, "install"])
        .map_err(|e| InstallError::BuildFailed(e.to_string()))?;

    verify_on_path(executor, &config.artifact.binary, &prefix, home)
}

/// Best-effort removal of a source-build installation.
///
/// Returns warnings instead of failing; absence of any piece is fine.
#[must_use]
pub fn remove(config: &ToolConfig, home: &Path, log: &Logger) -> Vec<String> {
    let prefix = config.prefix_dir(home);
    let binary = prefix.join("bin").join(&config.artifact.binary);
    let share = prefix.join("share").join(&config.artifact.binary);
    let lib = prefix.join("lib").join(&config.artifact.binary);

    let mut warnings = Vec::new();
    if binary.is_file()
        && let Err(e) = std::fs::remove_file(&binary)
    {
        warnings.push(format!("could not remove {}: {e}", binary.display()));
    }
    for dir in [&share, &lib] {
        if dir.is_dir()
            && let Err(e) = std::fs::remove_dir_all(dir)
        {
            warnings.push(format!("could not remove {}: {e}", dir.display()));
        }
    }

    let scratch = build_dir(&config.artifact.name, home);
    if scratch.exists() {
        let _ = std::fs::remove_dir_all(&scratch);
    }

    for warning in &warnings {
        log.warn(warning);
    }
    warnings
}
