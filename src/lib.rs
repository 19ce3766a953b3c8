//! Idempotent environment-provisioning engine.
//!
//! Installs and configures a target artifact (canonically a text editor) on a
//! Linux or macOS host: probes the operating system and package manager,
//! installs tiered dependency packages, acquires the artifact via one of
//! three strategies (source build, portable binary, system package), deploys
//! a managed configuration directory as a symlink, and keeps timestamped
//! backups of anything it displaces.
//!
//! The public API is organised into layers:
//!
//! - **[`probe`]** — read-only host inspection producing an [`probe::Environment`]
//! - **[`plan`]** — package-manager capability table and tiered install plans
//! - **[`install`]** — artifact acquisition strategies
//! - **[`resources`]** — idempotent `check + apply` primitives
//! - **[`backup`]** — the ledger of timestamped config/data snapshots
//! - **[`tasks`]** — named units of work wired to the above
//! - **[`commands`]** — top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod backup;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod install;
pub mod logging;
pub mod plan;
pub mod probe;
pub mod resources;
pub mod tasks;
