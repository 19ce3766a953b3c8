//! Prebuilt portable-binary acquisition.
//!
//! Downloads the configured release asset into `~/.local/bin` and fronts it
//! with a small wrapper script carrying the stable binary name, so the
//! asset file name (which encodes version and platform) stays an
//! implementation detail.
use std::io::Write as _;
use std::os::unix::fs::PermissionsExt as _;
use std::path::{Path, PathBuf};

use crate::config::ToolConfig;
use crate::error::InstallError;
use crate::exec::Executor;
use crate::install::{github, verify_on_path};
use crate::logging::Logger;

/// Wrapper script fronting the downloaded asset.
#[must_use]
pub fn wrapper_script(asset_path: &Path) -> String {
    format!("#!/bin/sh\nexec \"{}\" \"$@\"\n", asset_path.display())
}

fn bin_dir(home: &Path) -> PathBuf {
    home.join(".local/bin")
}

/// Download and install the prebuilt asset for the given release tag.
///
/// # Errors
///
/// Returns [`InstallError::MethodUnavailable`] when no asset is configured,
/// [`InstallError::Network`] when the download fails, and
/// [`InstallError::NotOnPath`] when the wrapper does not resolve afterwards.
pub fn install(
    config: &ToolConfig,
    tag: &str,
    home: &Path,
    executor: &dyn Executor,
    log: &Logger,
) -> Result<(), InstallError> {
    let Some(asset) = config.artifact.appimage_asset.as_deref() else {
        return Err(InstallError::MethodUnavailable {
            method: "appimage".to_string(),
            reason: "no release asset configured for this artifact".to_string(),
        });
    };

    let url = github::asset_url(&config.artifact.repo, tag, asset);
    let bin = bin_dir(home);
    std::fs::create_dir_all(&bin).map_err(|e| {
        InstallError::BuildFailed(format!("could not create {}: {e}", bin.display()))
    })?;

    let asset_path = bin.join(format!("{}.appimage", config.artifact.binary));
    log.stage(&format!("Downloading {} {tag}", config.artifact.name));
    log.debug(&format!("{url} -> {}", asset_path.display()));
    download(&url, &asset_path)?;
    make_executable(&asset_path)?;

    let wrapper_path = bin.join(&config.artifact.binary);
    write_wrapper(&wrapper_path, &asset_path)?;

    // The wrapper lands in <home>/.local/bin, so that is the prefix the
    // advisory diagnostic should probe
    verify_on_path(executor, &config.artifact.binary, &home.join(".local"), home)
}

fn download(url: &str, destination: &Path) -> Result<(), InstallError> {
    let network_err = |detail: String| InstallError::Network {
        operation: "release download".to_string(),
        detail,
    };

    let response = ureq::get(url)
        .header("User-Agent", "provision")
        .call()
        .map_err(|e| network_err(e.to_string()))?;

    // Write to a temp name first so an interrupted download never leaves a
    // half-written file under the final name
    let partial = destination.with_extension("partial");
    let result = (|| -> std::io::Result<()> {
        let mut reader = response.into_body().into_reader();
        let mut file = std::fs::File::create(&partial)?;
        std::io::copy(&mut reader, &mut file)?;
        file.flush()?;
        Ok(())
    })();
    if let Err(e) = result {
        let _ = std::fs::remove_file(&partial);
        return Err(network_err(e.to_string()));
    }
    std::fs::rename(&partial, destination).map_err(|e| network_err(e.to_string()))
}

fn make_executable(path: &Path) -> Result<(), InstallError> {
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).map_err(|e| {
        InstallError::BuildFailed(format!("chmod {} failed: {e}", path.display()))
    })
}

fn write_wrapper(wrapper_path: &Path, asset_path: &Path) -> Result<(), InstallError> {
    std::fs::write(wrapper_path, wrapper_script(asset_path)).map_err(|e| {
        InstallError::BuildFailed(format!("could not write {}: {e}", wrapper_path.display()))
    })?;
    make_executable(wrapper_path)
}

/// Best-effort removal of a prebuilt installation.
#[must_use]
pub fn remove(config: &ToolConfig, home: &Path, log: &Logger) -> Vec<String> {
    let bin = bin_dir(home);
    let mut warnings = Vec::new();
    for path in [
        bin.join(format!("{}.appimage", config.artifact.binary)),
        bin.join(&config.artifact.binary),
    ] {
        if path.is_file()
            && let Err(e) = std::fs::remove_file(&path)
        {
            let warning = format!("could not remove {}: {e}", path.display());
            log.warn(&warning);
            warnings.push(warning);
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_asset(asset: Option<&str>) -> ToolConfig {
        let dir = tempfile::tempdir().unwrap();
        let asset_line = asset.map_or(String::new(), |a| format!("appimage_asset = \"{a}\"\n"));
        std::fs::write(
            dir.path().join("provision.toml"),
            format!(
                "[artifact]\nname = \"neovim\"\nbinary = \"nvim\"\n\
                 repo = \"https://github.com/neovim/neovim\"\n{asset_line}\
                 [config]\nsource = \"nvim\"\ntarget = \"~/.config/nvim\"\n"
            ),
        )
        .unwrap();
        ToolConfig::load(dir.path()).unwrap()
    }

    #[test]
    fn no_asset_configured_is_method_unavailable() {
        let tmp = tempfile::tempdir().unwrap();
        let executor = crate::resources::test_helpers::StaticWhichExecutor::new(&[]);
        let log = Logger::new(false, "test-prebuilt");
        let err = install(&config_with_asset(None), "v0.10.4", tmp.path(), &executor, &log)
            .unwrap_err();
        assert!(matches!(
            err,
            InstallError::MethodUnavailable { ref method, .. } if method == "appimage"
        ));
    }

    #[test]
    fn blocked_install_directory_is_a_local_failure_not_network() {
        let tmp = tempfile::tempdir().unwrap();
        // A file where .local should be makes the mkdir fail before any
        // download is attempted
        std::fs::write(tmp.path().join(".local"), "in the way").unwrap();

        let executor = crate::resources::test_helpers::StaticWhichExecutor::new(&[]);
        let log = Logger::new(false, "test-prebuilt");
        let err = install(
            &config_with_asset(Some("x.appimage")),
            "v0.10.4",
            tmp.path(),
            &executor,
            &log,
        )
        .unwrap_err();
        assert!(matches!(err, InstallError::BuildFailed(_)), "got {err:?}");
    }

    #[test]
    fn wrapper_script_execs_the_asset() {
        let script = wrapper_script(Path::new("/home/u/.local/bin/nvim.appimage"));
        assert!(script.starts_with("#!/bin/sh\n"));
        assert!(script.contains("exec \"/home/u/.local/bin/nvim.appimage\" \"$@\""));
    }

    #[test]
    fn wrapper_is_written_executable() {
        let tmp = tempfile::tempdir().unwrap();
        let wrapper = tmp.path().join("nvim");
        let asset = tmp.path().join("nvim.appimage");
        write_wrapper(&wrapper, &asset).unwrap();

        let mode = wrapper.metadata().unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111, "wrapper must be executable");
        let content = std::fs::read_to_string(&wrapper).unwrap();
        assert!(content.contains("nvim.appimage"));
    }

    #[test]
    fn remove_deletes_asset_and_wrapper() {
        let tmp = tempfile::tempdir().unwrap();
        let bin = tmp.path().join(".local/bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join("nvim.appimage"), "").unwrap();
        std::fs::write(bin.join("nvim"), "").unwrap();

        let log = Logger::new(false, "test-prebuilt");
        let warnings = remove(&config_with_asset(Some("x.appimage")), tmp.path(), &log);
        assert!(warnings.is_empty());
        assert!(!bin.join("nvim.appimage").exists());
        assert!(!bin.join("nvim").exists());
    }

    #[test]
    fn remove_of_absent_files_is_silent() {
        let tmp = tempfile::tempdir().unwrap();
        let log = Logger::new(false, "test-prebuilt");
        assert!(remove(&config_with_asset(Some("x.appimage")), tmp.path(), &log).is_empty());
    }
}
