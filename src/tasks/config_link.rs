//! Config deployment task.
use anyhow::Result;

use crate::logging::Logger;
use crate::resources::config_link::ConfigLinkResource;
use crate::resources::{Resource as _, ResourceChange};
use crate::tasks::{Context, Task, TaskResult};

/// Links the live config path to the repository's config source.
pub struct DeployConfig;

impl DeployConfig {
    fn resource(ctx: &Context) -> ConfigLinkResource {
        ConfigLinkResource::new(
            ctx.source_dir(),
            ctx.target_dir(),
            ctx.config.config.entry_point.clone(),
            ctx.ledger(),
        )
    }
}

impl Task for DeployConfig {
    fn name(&self) -> String {
        "deploy config".to_string()
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context, log: &Logger) -> Result<TaskResult> {
        let resource = Self::resource(ctx);
        log.debug(&resource.describe());
        match resource.apply()? {
            ResourceChange::Applied => Ok(TaskResult::Done),
            ResourceChange::AlreadyCorrect => {
                Ok(TaskResult::Noop("already linked".to_string()))
            }
            ResourceChange::Skipped { reason } => Ok(TaskResult::Skipped(reason)),
        }
    }
}
