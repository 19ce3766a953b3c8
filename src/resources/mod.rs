//! Idempotent resource primitives.
//!
//! A resource is something on the host with a desired state. Applying a
//! resource inspects the current state first and only changes what is
//! wrong, so applying twice is the same as applying once.
pub mod config_link;

use anyhow::Result;

/// Observed state of a resource relative to its desired state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Nothing exists where the resource should be.
    Missing,
    /// The resource already matches the desired state.
    Correct,
    /// Something exists but does not match.
    Incorrect {
        /// Human-readable description of what is there now.
        current: String,
    },
    /// The resource cannot be applied at all (broken precondition).
    Invalid { reason: String },
}

/// What applying a resource actually did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// The host was modified to reach the desired state.
    Applied,
    /// No change was needed.
    AlreadyCorrect,
    /// The resource chose not to act.
    Skipped { reason: String },
}

/// An idempotent check-then-apply primitive.
pub trait Resource {
    /// Short human-readable description for log lines.
    fn describe(&self) -> String;

    /// Inspect the host without modifying it.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot be inspected.
    fn current_state(&self) -> Result<ResourceState>;

    /// Bring the host to the desired state.
    ///
    /// # Errors
    ///
    /// Returns an error if the change fails or a precondition is broken.
    fn apply(&self) -> Result<ResourceChange>;
}
