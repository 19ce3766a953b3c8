//! `provision install`: dependencies, artifact, config link, plugin sync.
use anyhow::{Result, bail};

use crate::cli::{GlobalOpts, InstallOpts};
use crate::install::{Method, VersionSelector};
use crate::logging::Logger;
use crate::plan::Tier;
use crate::tasks::{self, Task};

/// Assemble the ordered task list for this invocation's subset flags.
fn task_list(opts: &InstallOpts) -> Vec<Box<dyn Task>> {
    let method = Method::from(opts.method);
    let selector = VersionSelector::parse(&opts.release);

    let deps = !opts.artifact_only && !opts.config_only;
    let artifact = !opts.deps_only && !opts.config_only;
    let config = !opts.deps_only && !opts.artifact_only;

    let mut list: Vec<Box<dyn Task>> = Vec::new();
    if deps {
        list.push(Box::new(tasks::dependencies::InstallDependencies::new(
            Tier::Build,
            method,
        )));
        list.push(Box::new(tasks::dependencies::InstallDependencies::new(
            Tier::Runtime,
            method,
        )));
        list.push(Box::new(tasks::dependencies::InstallDependencies::new(
            Tier::Optional,
            method,
        )));
    }
    if artifact {
        list.push(Box::new(tasks::artifact::InstallArtifact::new(
            method, selector,
        )));
    }
    if config {
        list.push(Box::new(tasks::config_link::DeployConfig));
        list.push(Box::new(tasks::sync::SyncPlugins));
    }
    list
}

/// Run the install command.
///
/// # Errors
///
/// Returns an error when the repository cannot be resolved or any task
/// fails. Later tasks do not run after a failure.
pub fn run(global: &GlobalOpts, opts: &InstallOpts, log: &Logger) -> Result<()> {
    let ctx = super::build_context(global, opts.force, log)?;
    log.stage(&format!("Provisioning {}", ctx.config.artifact.name));

    let list = task_list(opts);
    let ok = tasks::execute_all(&list, &ctx, log);
    log.print_summary();

    if !ok {
        bail!("install finished with failures");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser as _;

    fn opts(args: &[&str]) -> InstallOpts {
        let mut argv = vec!["provision", "install"];
        argv.extend(args);
        match crate::cli::Cli::parse_from(argv).command {
            crate::cli::Command::Install(opts) => opts,
            _ => unreachable!(),
        }
    }

    fn names(list: &[Box<dyn Task>]) -> Vec<String> {
        list.iter().map(|t| t.name()).collect()
    }

    #[test]
    fn full_install_orders_deps_artifact_config() {
        let list = task_list(&opts(&[]));
        assert_eq!(
            names(&list),
            vec![
                "build dependencies",
                "runtime dependencies",
                "optional dependencies",
                "install artifact (source)",
                "deploy config",
                "sync plugins",
            ]
        );
    }

    #[test]
    fn deps_only_excludes_artifact_and_config() {
        let list = task_list(&opts(&["--deps-only"]));
        assert_eq!(list.len(), 3);
        assert!(names(&list).iter().all(|n| n.contains("dependencies")));
    }

    #[test]
    fn artifact_only_is_a_single_task() {
        let list = task_list(&opts(&["--artifact-only", "--method", "appimage"]));
        assert_eq!(names(&list), vec!["install artifact (appimage)"]);
    }

    #[test]
    fn config_only_deploys_and_syncs() {
        let list = task_list(&opts(&["--config-only"]));
        assert_eq!(names(&list), vec!["deploy config", "sync plugins"]);
    }
}
