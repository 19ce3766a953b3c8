//! Provisioning task orchestration.
//!
//! Commands assemble an ordered list of tasks and run them through
//! [`execute`], which handles applicability, dry-run short-circuiting, and
//! summary bookkeeping so individual tasks only implement their own work.
pub mod artifact;
pub mod config_link;
pub mod context;
pub mod dependencies;
pub mod sync;

use anyhow::Result;

use crate::logging::{Logger, TaskStatus};
pub use context::Context;

/// What a task's run accomplished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// The host was changed.
    Done,
    /// Nothing needed changing.
    Noop(String),
    /// The task decided not to act.
    Skipped(String),
}

/// One unit of provisioning work.
pub trait Task {
    /// Name shown in log lines and the summary.
    fn name(&self) -> String;

    /// Whether this task applies to the current invocation at all.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Perform the work.
    ///
    /// # Errors
    ///
    /// Returns an error when the task fails; the runner records the failure
    /// and continues or aborts per the command's policy.
    fn run(&self, ctx: &Context, log: &Logger) -> Result<TaskResult>;
}

/// Run one task, recording its outcome. Returns `false` on failure.
pub fn execute(task: &dyn Task, ctx: &Context, log: &Logger) -> bool {
    let name = task.name();

    if !task.should_run(ctx) {
        log.record_task(&name, TaskStatus::NotApplicable, None);
        return true;
    }

    if ctx.dry_run {
        log.dry_run(&name);
        log.record_task(&name, TaskStatus::DryRun, None);
        return true;
    }

    match task.run(ctx, log) {
        Ok(TaskResult::Done) => {
            log.record_task(&name, TaskStatus::Ok, None);
            true
        }
        Ok(TaskResult::Noop(message)) => {
            log.record_task(&name, TaskStatus::Ok, Some(&message));
            true
        }
        Ok(TaskResult::Skipped(reason)) => {
            log.info(&format!("{name}: {reason}"));
            log.record_task(&name, TaskStatus::Skipped, Some(&reason));
            true
        }
        Err(e) => {
            log.error(&format!("{name}: {e:#}"));
            log.record_task(&name, TaskStatus::Failed, Some(&e.to_string()));
            false
        }
    }
}

/// Run tasks in order. Stops at the first failure and returns `false`.
pub fn execute_all(tasks: &[Box<dyn Task>], ctx: &Context, log: &Logger) -> bool {
    for task in tasks {
        if !execute(task.as_ref(), ctx, log) {
            return false;
        }
    }
    true
}


#[cfg(test)]
mod tests {
    use super::test_helpers::FixedTask;
    use super::*;
    use crate::logging::TaskStatus;

    #[test]
    fn inapplicable_task_records_not_applicable() {
        let ctx = Context::for_tests(false);
        let log = Logger::new(false, "test-tasks");
        let task = FixedTask {
            task_name: "build deps",
            applicable: false,
            result: || Ok(TaskResult::Done),
        };
        assert!(execute(&task, &ctx, &log));
        assert_eq!(log.task_entries()[0].status, TaskStatus::NotApplicable);
    }

    #[test]
    fn dry_run_short_circuits_before_run() {
        let ctx = Context::for_tests(true);
        let log = Logger::new(false, "test-tasks");
        let task = FixedTask {
            task_name: "install artifact",
            applicable: true,
            result: || panic!("run must not be called in dry-run"),
        };
        assert!(execute(&task, &ctx, &log));
        assert_eq!(log.task_entries()[0].status, TaskStatus::DryRun);
    }

    #[test]
    fn failure_is_recorded_and_reported() {
        let ctx = Context::for_tests(false);
        let log = Logger::new(false, "test-tasks");
        let task = FixedTask {
            task_name: "deploy config",
            applicable: true,
            result: || anyhow::bail!("disk full"),
        };
        assert!(!execute(&task, &ctx, &log));
        assert!(log.has_failures());
    }

    #[test]
    fn execute_all_stops_at_first_failure() {
        let ctx = Context::for_tests(false);
        let log = Logger::new(false, "test-tasks");
        let tasks: Vec<Box<dyn Task>> = vec![
            Box::new(FixedTask {
                task_name: "a",
                applicable: true,
                result: || Ok(TaskResult::Done),
            }),
            Box::new(FixedTask {
                task_name: "b",
                applicable: true,
                result: || anyhow::bail!("boom"),
            }),
            Box::new(FixedTask {
                task_name: "c",
                applicable: true,
                result: || Ok(TaskResult::Done),
            }),
        ];
        assert!(!execute_all(&tasks, &ctx, &log));
        assert_eq!(log.task_entries().len(), 2, "task c must not run");
    }

    #[test]
    fn skip_reason_lands_in_summary() {
        let ctx = Context::for_tests(false);
        let log = Logger::new(false, "test-tasks");
        let task = FixedTask {
            task_name: "optional deps",
            applicable: true,
            result: || Ok(TaskResult::Skipped("no package manager".to_string())),
        };
        assert!(execute(&task, &ctx, &log));
        let entry = &log.task_entries()[0];
        assert_eq!(entry.status, TaskStatus::Skipped);
        assert_eq!(entry.message.as_deref(), Some("no package manager"));
    }
}
