//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Result, bail};
use provision_cli::backup::Ledger;
use provision_cli::config::ToolConfig;
use provision_cli::exec::{ExecResult, Executor};
use provision_cli::resources::config_link::ConfigLinkResource;

/// A throwaway provisioning repository with a manifest, a config source
/// directory, and a fake home directory.
pub struct TestRepo {
    _tmp: tempfile::TempDir,
    pub root: PathBuf,
    pub home: PathBuf,
}

impl TestRepo {
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("tempdir");
        let root = tmp.path().join("repo");
        let home = tmp.path().join("home");
        std::fs::create_dir_all(root.join("nvim/lua")).unwrap();
        std::fs::create_dir_all(&home).unwrap();
        std::fs::write(root.join("nvim/init.lua"), "-- entry point\n").unwrap();
        std::fs::write(root.join("nvim/lua/options.lua"), "-- options\n").unwrap();
        std::fs::write(
            root.join("provision.toml"),
            r#"[artifact]
name = "neovim"
binary = "nvim"
repo = "https://github.com/neovim/neovim"
prefix = "~/.local"
appimage_asset = "nvim-linux-x86_64.appimage"

[config]
source = "nvim"
target = "~/.config/nvim"
entry_point = "init.lua"
data_dir = "~/.local/share/nvim"

[packages.build]
apt = ["ninja-build", "gettext", "cmake"]

[packages.runtime]
apt = ["ripgrep", "fd-find"]
"#,
        )
        .unwrap();
        Self {
            _tmp: tmp,
            root,
            home,
        }
    }

    pub fn config(&self) -> ToolConfig {
        ToolConfig::load(&self.root).expect("manifest loads")
    }

    /// Repository-side config source directory.
    pub fn source(&self) -> PathBuf {
        self.root.join("nvim")
    }

    /// Live config target path under the fake home.
    pub fn target(&self) -> PathBuf {
        self.home.join(".config/nvim")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.home.join(".local/share/nvim")
    }

    pub fn ledger(&self) -> Ledger {
        Ledger::new(self.target(), Some(self.data_dir()))
    }

    pub fn link_resource(&self) -> ConfigLinkResource {
        ConfigLinkResource::new(
            self.source(),
            self.target(),
            "init.lua".to_string(),
            self.ledger(),
        )
    }

    /// Backup directories currently next to the live target.
    pub fn config_backups(&self) -> Vec<PathBuf> {
        let parent = self.target().parent().unwrap().to_path_buf();
        let Ok(entries) = std::fs::read_dir(&parent) else {
            return Vec::new();
        };
        entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().contains(".backup."))
                    .unwrap_or(false)
            })
            .collect()
    }
}

/// Scripted [`Executor`] for integration tests: canned `(success, stdout)`
/// responses in order, every call recorded.
pub struct ScriptedExecutor {
    responses: Mutex<Vec<(bool, String)>>,
    calls: Mutex<Vec<String>>,
    available: Vec<String>,
}

impl ScriptedExecutor {
    pub fn new(responses: Vec<(bool, String)>) -> Self {
        let mut responses = responses;
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            calls: Mutex::new(Vec::new()),
            available: Vec::new(),
        }
    }

    pub fn with_which(mut self, programs: &[&str]) -> Self {
        self.available = programs.iter().map(ToString::to_string).collect();
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, program: &str, args: &[&str]) -> (bool, String) {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.calls.lock().unwrap().push(line);
        self.responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or((true, String::new()))
    }
}

impl Executor for ScriptedExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let (success, stdout) = self.record(program, args);
        if !success {
            bail!("{program} failed: {stdout}");
        }
        Ok(ExecResult {
            stdout,
            stderr: String::new(),
            success: true,
            code: Some(0),
        })
    }

    fn run_in(&self, _dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult> {
        self.run(program, args)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let (success, stdout) = self.record(program, args);
        Ok(ExecResult {
            stdout: stdout.clone(),
            stderr: if success { String::new() } else { stdout },
            success,
            code: Some(i32::from(!success)),
        })
    }

    fn which(&self, program: &str) -> bool {
        self.available.iter().any(|p| p == program)
    }
}
