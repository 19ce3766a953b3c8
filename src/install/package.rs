//! Package-manager acquisition: delegate the artifact install to the host.
use std::path::Path;

use crate::config::ToolConfig;
use crate::error::InstallError;
use crate::exec::Executor;
use crate::install::verify_on_path;
use crate::logging::Logger;
use crate::probe::{Environment, PackageManager};

/// Install the artifact through the host package manager.
///
/// On apt hosts a configured extra repository (typically a PPA carrying
/// newer builds) is added first; failure to add it degrades to a warning
/// and the distro's own version is installed instead.
///
/// # Errors
///
/// Returns [`InstallError::MethodUnavailable`] when the host has no
/// supported manager, [`InstallError::BuildFailed`] when the install
/// invocation exits nonzero, and [`InstallError::NotOnPath`] when the
/// binary does not resolve afterwards (the package may ship the binary
/// under a different name). The version selector is ignored by design;
/// the repository decides the version, and a warning says so.
pub fn install(
    config: &ToolConfig,
    env: &Environment,
    home: &Path,
    executor: &dyn Executor,
    log: &Logger,
) -> Result<(), InstallError> {
    let Some(install_command) = env.package_manager.install_command() else {
        return Err(InstallError::MethodUnavailable {
            method: "package".to_string(),
            reason: format!("no supported package manager (detected: {})", env.package_manager),
        });
    };

    if env.package_manager == PackageManager::Apt
        && let Some(repository) = config.artifact.apt_repository.as_deref()
    {
        log.debug(&format!("adding apt repository {repository}"));
        if let Err(e) = executor.run("sudo", &["add-apt-repository", "-y", repository]) {
            log.warn(&format!(
                "could not add {repository} ({e}); falling back to the distro package"
            ));
        }
    }

    if let Some(update) = env.package_manager.update_index_command() {
        let args: Vec<&str> = update.iter().skip(1).map(String::as_str).collect();
        if let Err(e) = executor.run(&update[0], &args) {
            log.warn(&format!("package index refresh failed: {e}"));
        }
    }

    log.stage(&format!(
        "Installing {} via {}",
        config.artifact.name, env.package_manager
    ));
    let mut argv = install_command;
    argv.push(config.artifact.name.clone());
    let args: Vec<&str> = argv.iter().skip(1).map(String::as_str).collect();
    executor
        .run(&argv[0], &args)
        .map_err(|e| InstallError::BuildFailed(e.to_string()))?;

    verify_on_path(executor, &config.artifact.binary, &config.prefix_dir(home), home)
}

/// Remove the artifact through the host package manager, best effort.
#[must_use]
pub fn remove(
    config: &ToolConfig,
    env: &Environment,
    executor: &dyn Executor,
    log: &Logger,
) -> Vec<String> {
    let Some(remove_command) = env.package_manager.remove_command() else {
        return Vec::new();
    };
    let mut argv = remove_command;
    argv.push(config.artifact.name.clone());
    let args: Vec<&str> = argv.iter().skip(1).map(String::as_str).collect();
    match executor.run_unchecked(&argv[0], &args) {
        Ok(result) if result.success => Vec::new(),
        Ok(result) => {
            // Not installed via the manager is the common case, keep quiet
            log.debug(&format!(
                "package removal skipped: {}",
                result.stderr.trim()
            ));
            Vec::new()
        }
        Err(e) => {
            let warning = format!("package removal failed: {e}");
            log.warn(&warning);
            vec![warning]
        }
    }
}
