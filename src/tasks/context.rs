//! Shared state passed to every task.
use std::path::PathBuf;
use std::sync::Arc;

use crate::backup::Ledger;
use crate::config::ToolConfig;
use crate::exec::Executor;
use crate::probe::Environment;

/// Everything a task needs about the current invocation.
pub struct Context {
    pub config: ToolConfig,
    /// Provisioning repository root.
    pub root: PathBuf,
    pub env: Environment,
    pub executor: Arc<dyn Executor>,
    pub dry_run: bool,
    pub force: bool,
    pub home: PathBuf,
}

impl Context {
    /// Backup ledger over this invocation's config and data paths.
    #[must_use]
    pub fn ledger(&self) -> Ledger {
        Ledger::new(self.config.target_dir(&self.home), self.config.data_dir(&self.home))
    }

    /// Repository-side config source directory.
    #[must_use]
    pub fn source_dir(&self) -> PathBuf {
        self.config.source_dir(&self.root)
    }

    /// Live config target path.
    #[must_use]
    pub fn target_dir(&self) -> PathBuf {
        self.config.target_dir(&self.home)
    }

    /// Minimal context for unit tests: a throwaway repo with one config
    /// file, an apt environment, and a silent mock executor.
    #[cfg(test)]
    #[must_use]
    pub fn for_tests(dry_run: bool) -> Self {
        use crate::probe::PackageManager;
        use crate::resources::test_helpers::MockExecutor;

        let dir = tempfile::tempdir().unwrap().keep();
        std::fs::create_dir_all(dir.join("nvim")).unwrap();
        std::fs::write(dir.join("nvim/init.lua"), "-- init").unwrap();
        std::fs::write(
            dir.join("provision.toml"),
            "[artifact]\nname = \"neovim\"\nbinary = \"nvim\"\n\
             repo = \"https://github.com/neovim/neovim\"\nprefix = \"~/.local\"\n\
             [config]\nsource = \"nvim\"\ntarget = \"~/.config/nvim\"\n",
        )
        .unwrap();
        let config = ToolConfig::load(&dir).unwrap();
        let home = dir.join("home");
        std::fs::create_dir_all(&home).unwrap();

        Self {
            config,
            root: dir,
            env: Environment::with_manager(PackageManager::Apt),
            executor: Arc::new(MockExecutor::new(vec![])),
            dry_run,
            force: false,
            home,
        }
    }
}
