//! Artifact installation task.
use anyhow::Result;

use crate::install::{Method, VersionSelector, github, package, prebuilt, source};
use crate::logging::Logger;
use crate::tasks::{Context, Task, TaskResult};

/// Installs the artifact with exactly one acquisition method. A failing
/// method is fatal; there is no fallback to another method mid-flight.
pub struct InstallArtifact {
    method: Method,
    selector: VersionSelector,
}

impl InstallArtifact {
    #[must_use]
    pub fn new(method: Method, selector: VersionSelector) -> Self {
        Self { method, selector }
    }
}

impl Task for InstallArtifact {
    fn name(&self) -> String {
        format!("install artifact ({})", self.method)
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context, log: &Logger) -> Result<TaskResult> {
        let binary = &ctx.config.artifact.binary;
        if ctx.executor.which(binary) && !ctx.force {
            return Ok(TaskResult::Noop(format!(
                "'{binary}' already installed (use --force to reinstall)"
            )));
        }

        match self.method {
            Method::Source => {
                // Nightly builds the default branch tip, not a tag
                let git_ref = match &self.selector {
                    VersionSelector::Nightly => None,
                    _ => Some(github::resolve_ref(
                        &ctx.config.artifact.repo,
                        &self.selector,
                        log,
                    )),
                };
                source::install(
                    &ctx.config,
                    git_ref.as_deref(),
                    &ctx.env,
                    &ctx.home,
                    ctx.executor.as_ref(),
                    log,
                )?;
            }
            Method::Appimage => {
                let tag = github::resolve_ref(&ctx.config.artifact.repo, &self.selector, log);
                prebuilt::install(&ctx.config, &tag, &ctx.home, ctx.executor.as_ref(), log)?;
            }
            Method::Package => {
                if self.selector != VersionSelector::Stable {
                    // The repository decides the version for this method
                    log.warn(&format!(
                        "--release {} is ignored with --method package",
                        self.selector
                    ));
                }
                package::install(&ctx.config, &ctx.env, &ctx.home, ctx.executor.as_ref(), log)?;
            }
        }
        Ok(TaskResult::Done)
    }
}
