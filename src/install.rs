//! Running (or planning) a single `brew install`.
//!
//! An install is attempted at most twice. A bottle attempt that fails is
//! retried once as a source build (`--build-bottle`); a source build that
//! fails ends the run, since every later formula in the stack may link
//! against the one that failed.

use crate::error::{Result, StackError};
use crate::options::{BUILD_BOTTLE, OptionSet, PLANNING_FLAGS};
use crate::registry::InstalledSet;
use crate::report::{Event, InstallCommand, Trace};
use crate::request::TopLevelFlags;
use std::path::PathBuf;
use std::process::Command;

/// Performs real installs.
pub trait Installer {
    /// Install `formula` with `args`. `Ok(false)` means the install ran and failed.
    fn run_install(&self, formula: &str, args: &OptionSet) -> Result<bool>;
}

/// Delegates to `brew install`.
#[derive(Debug, Clone)]
pub struct BrewInstaller {
    brew: PathBuf,
    developer_mode: bool,
}

impl BrewInstaller {
    pub fn new(brew: impl Into<PathBuf>, developer_mode: bool) -> Self {
        Self {
            brew: brew.into(),
            developer_mode,
        }
    }
}

impl Installer for BrewInstaller {
    fn run_install(&self, formula: &str, args: &OptionSet) -> Result<bool> {
        let mut command = Command::new(&self.brew);
        command.arg("install").args(args.iter()).arg(formula);
        // brew only reports a failed pour as an error in developer mode
        if self.developer_mode {
            command.env("HOMEBREW_DEVELOPER", "1");
        }

        tracing::debug!("running {:?}", command);
        let status = command.status().map_err(|e| {
            anyhow::anyhow!("Failed to run {}: {}", self.brew.display(), e)
        })?;
        Ok(status.success())
    }
}

/// How an attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// Dry run: recorded, nothing installed
    Planned,
    Poured,
    /// Built from source, `retried` if a bottle attempt failed first
    Built { retried: bool },
}

pub struct Executor<'a, I> {
    installer: &'a I,
}

impl<'a, I: Installer> Executor<'a, I> {
    pub fn new(installer: &'a I) -> Self {
        Self { installer }
    }

    /// Install `formula` (a tap-qualified identity) with `options`.
    pub fn attempt(
        &self,
        formula: &str,
        options: &OptionSet,
        require_source: bool,
        flags: &TopLevelFlags,
        registry: &mut InstalledSet,
        trace: &mut Trace,
    ) -> Result<Attempt> {
        let mut args = options.without(PLANNING_FLAGS);
        if require_source {
            args.insert(BUILD_BOTTLE);
        }
        let command = InstallCommand {
            formula: formula.to_string(),
            args,
        };
        trace.record(Event::Install(command.clone()));

        if flags.dry_run {
            registry.mark_handled(formula);
            return Ok(Attempt::Planned);
        }

        if self.installer.run_install(formula, &command.args)? {
            return Ok(if command.is_source_build() {
                Attempt::Built { retried: false }
            } else {
                Attempt::Poured
            });
        }

        if command.is_source_build() {
            return Err(StackError::SourceBuildFailed(formula.to_string()));
        }

        tracing::warn!("bottle install failed for {}", formula);
        trace.record(Event::BottleFailed(formula.to_string()));
        let mut args = command.args;
        args.insert(BUILD_BOTTLE);
        let retry = InstallCommand {
            formula: formula.to_string(),
            args,
        };
        trace.record(Event::Install(retry.clone()));

        if self.installer.run_install(formula, &retry.args)? {
            return Ok(Attempt::Built { retried: true });
        }
        Err(StackError::SourceBuildFailed(formula.to_string()))
    }
}
