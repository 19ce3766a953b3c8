//! `provision update`: re-acquire the artifact, leave everything else alone.
use anyhow::{Result, bail};

use crate::cli::{GlobalOpts, UpdateOpts};
use crate::install::{Method, VersionSelector};
use crate::logging::Logger;
use crate::tasks;

/// Run the update command. Equivalent to a forced artifact-only install:
/// dependencies and the config link are not touched.
///
/// # Errors
///
/// Returns an error when the repository cannot be resolved or the
/// reinstall fails.
pub fn run(global: &GlobalOpts, opts: &UpdateOpts, log: &Logger) -> Result<()> {
    // force: an update must reinstall over the existing binary
    let ctx = super::build_context(global, true, log)?;
    log.stage(&format!("Updating {}", ctx.config.artifact.name));

    let task = tasks::artifact::InstallArtifact::new(
        Method::from(opts.method),
        VersionSelector::parse(&opts.release),
    );
    let ok = tasks::execute(&task, &ctx, log);
    log.print_summary();

    if !ok {
        bail!("update failed");
    }
    Ok(())
}
