//! CLI command implementations

pub mod analyze;
pub mod completions;
pub mod new;
pub mod pareto;
pub mod report;
pub mod row;
pub mod setup;
pub mod show;
pub mod tol;
pub mod transfer;

use std::path::PathBuf;

use miette::{IntoDiagnostic, Result};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::entities::stackup::Stackup;
use crate::store;

/// What every command needs: configuration, target file and output format
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    pub path: PathBuf,
    pub format: OutputFormat,
}

impl Context {
    /// Resolve configuration and the stack file path
    pub fn from_global(global: &GlobalOpts) -> Result<Self> {
        let config = Config::load().into_diagnostic()?;
        let path = global.file.clone().unwrap_or_else(|| config.stack_file());
        tracing::debug!(path = %path.display(), format = ?global.format, "resolved context");
        Ok(Self {
            config,
            path,
            format: global.format,
        })
    }

    pub fn precision(&self) -> usize {
        self.config.precision()
    }

    /// Load the stack file
    pub fn load(&self) -> Result<Stackup> {
        if !self.path.exists() {
            return Err(miette::miette!(
                help = "create one with `tolstack new` or pass --file",
                "stack file {} not found",
                self.path.display()
            ));
        }
        Ok(store::load_stack(&self.path)?)
    }

    /// Load the stack file, or start a fresh stack if it does not exist yet
    pub fn load_or_new(&self) -> Result<Stackup> {
        if self.path.exists() {
            self.load()
        } else {
            Ok(Stackup::new(self.default_title(), self.config.analyst()))
        }
    }

    /// Save the stack file
    pub fn save(&self, stackup: &mut Stackup) -> Result<()> {
        Ok(store::save_stack(&self.path, stackup)?)
    }

    /// Title derived from the file name
    pub fn default_title(&self) -> String {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("stack")
            .to_string()
    }
}
