//! Post-deploy plugin synchronization.
use anyhow::Result;

use crate::logging::Logger;
use crate::tasks::{Context, Task, TaskResult};

/// Runs the artifact headlessly once after a deploy so plugins are fetched
/// ahead of the first interactive start. Strictly fire-and-forget: failures
/// are warnings, never errors, since the user can run the sync themselves.
pub struct SyncPlugins;

impl Task for SyncPlugins {
    fn name(&self) -> String {
        "sync plugins".to_string()
    }

    fn should_run(&self, ctx: &Context) -> bool {
        !ctx.config.config.sync_args.is_empty()
    }

    fn run(&self, ctx: &Context, log: &Logger) -> Result<TaskResult> {
        let binary = &ctx.config.artifact.binary;
        if !ctx.executor.which(binary) {
            return Ok(TaskResult::Skipped(format!("'{binary}' is not on PATH")));
        }

        let args: Vec<&str> = ctx
            .config
            .config
            .sync_args
            .iter()
            .map(String::as_str)
            .collect();
        match ctx.executor.run_unchecked(binary, &args) {
            Ok(result) if result.success => Ok(TaskResult::Done),
            Ok(result) => {
                log.warn(&format!(
                    "plugin sync exited {}; run it manually if needed",
                    result.code.unwrap_or(-1)
                ));
                Ok(TaskResult::Noop("sync failed (non-fatal)".to_string()))
            }
            Err(e) => {
                log.warn(&format!("plugin sync could not start: {e}"));
                Ok(TaskResult::Noop("sync failed (non-fatal)".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::resources::test_helpers::MockExecutor;

    fn ctx_with_sync(executor: MockExecutor) -> Context {
        let mut ctx = Context::for_tests(false);
        ctx.config.config.sync_args =
            vec!["--headless".to_string(), "+PlugInstall".to_string(), "+qall".to_string()];
        ctx.executor = Arc::new(executor);
        ctx
    }

    #[test]
    fn not_applicable_without_sync_args() {
        let ctx = Context::for_tests(false);
        assert!(!SyncPlugins.should_run(&ctx));
    }

    #[test]
    fn skipped_when_binary_missing() {
        let ctx = ctx_with_sync(MockExecutor::new(vec![]));
        let log = Logger::new(false, "test-sync");
        assert!(matches!(
            SyncPlugins.run(&ctx, &log).unwrap(),
            TaskResult::Skipped(_)
        ));
    }

    #[test]
    fn runs_the_configured_invocation() {
        let executor =
            Arc::new(MockExecutor::new(vec![(true, String::new())]).with_which(&["nvim"]));
        let mut ctx = ctx_with_sync(MockExecutor::new(vec![]));
        ctx.executor = executor.clone();
        let log = Logger::new(false, "test-sync");
        assert_eq!(SyncPlugins.run(&ctx, &log).unwrap(), TaskResult::Done);
        assert_eq!(executor.calls(), vec!["nvim --headless +PlugInstall +qall"]);
    }

    #[test]
    fn sync_failure_is_never_fatal() {
        let executor =
            MockExecutor::new(vec![(false, "plugin host crashed".to_string())]).with_which(&["nvim"]);
        let ctx = ctx_with_sync(executor);
        let log = Logger::new(false, "test-sync");
        assert!(matches!(
            SyncPlugins.run(&ctx, &log).unwrap(),
            TaskResult::Noop(_)
        ));
    }
}
