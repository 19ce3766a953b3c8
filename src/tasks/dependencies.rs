//! Dependency tier installation tasks.
use anyhow::Result;

use crate::install::Method;
use crate::logging::Logger;
use crate::plan::{Tier, build_plan, execute_plan};
use crate::tasks::{Context, Task, TaskResult};

/// Installs one dependency tier via the host package manager.
pub struct InstallDependencies {
    tier: Tier,
    /// Acquisition method of this invocation; build deps only matter for
    /// source builds.
    method: Method,
}

impl InstallDependencies {
    #[must_use]
    pub fn new(tier: Tier, method: Method) -> Self {
        Self { tier, method }
    }
}

impl Task for InstallDependencies {
    fn name(&self) -> String {
        format!("{} dependencies", self.tier)
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        // The compiler toolchain is only needed when building from source
        !(self.tier == Tier::Build && self.method != Method::Source)
    }

    fn run(&self, ctx: &Context, log: &Logger) -> Result<TaskResult> {
        let plan = build_plan(&ctx.env, self.tier, &ctx.config.packages);

        if plan.is_empty() {
            if ctx.env.is_supported() {
                return Ok(TaskResult::Noop("nothing to install".to_string()));
            }
            // Unsupported host: dependencies become the user's job
            return Ok(TaskResult::Skipped(format!(
                "no supported package manager (detected: {}); install dependencies manually",
                ctx.env.package_manager
            )));
        }

        let report = execute_plan(&plan, ctx.executor.as_ref(), log)?;
        if report.warnings.is_empty() {
            Ok(TaskResult::Done)
        } else {
            Ok(TaskResult::Noop(format!(
                "{} installed, {} failed",
                report.installed,
                report.warnings.len()
            )))
        }
    }
}
