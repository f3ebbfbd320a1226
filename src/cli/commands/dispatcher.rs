//! Command dispatching.
//!
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandContext`] for the validated configuration commands share
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::config::{load_config, ComponentConfigs};
use crate::error::Result;
use crate::remote::HttpSource;
use crate::ui::UserInterface;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command, reporting through `ui`.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug, PartialEq, Eq)]
pub struct CommandResult {
    pub success: bool,

    /// Process exit code (0 for success).
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Validated configuration shared by every command.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub components: ComponentConfigs,
}

impl CommandContext {
    /// Load and validate configuration, applying a `--store-dir` override.
    pub fn load(root: &Path, config: Option<&Path>, store_dir: Option<&Path>) -> Result<Self> {
        let mut components = load_config(root, config)?.validate()?;
        if let Some(dir) = store_dir {
            components.store_dir = dir.to_path_buf();
        }
        tracing::debug!(store_dir = %components.store_dir.display(), "configuration loaded");
        Ok(Self { components })
    }

    pub fn from_components(components: ComponentConfigs) -> Self {
        Self { components }
    }

    pub fn store_dir(&self) -> &Path {
        &self.components.store_dir
    }

    /// HTTP source built from the remote settings.
    pub fn http_source(&self) -> Result<HttpSource> {
        Ok(HttpSource::new(&self.components.http)?)
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    root: PathBuf,
}

impl CommandDispatcher {
    /// Create a dispatcher that discovers configuration under `root`.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn context(&self, cli: &Cli) -> Result<CommandContext> {
        CommandContext::load(&self.root, cli.config.as_deref(), cli.store_dir.as_deref())
    }

    /// Route the CLI subcommand to its implementation and execute it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Commands::Locate(args) => {
                let cmd = super::locate::LocateCommand::new(self.context(cli)?, args.clone());
                cmd.execute(ui)
            }
            Commands::Symbols(args) => {
                let cmd = super::symbols::SymbolsCommand::new(self.context(cli)?, args.clone());
                cmd.execute(ui)
            }
            Commands::Cache(args) => {
                let cmd = super::cache::CacheCommand::new(self.context(cli)?, args.clone());
                cmd.execute(ui)
            }
            Commands::Completions(args) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
        }
    }
}
