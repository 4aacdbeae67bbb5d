//! Library interface for brew-stack
//!
//! Installs a formula together with its whole dependency stack, one
//! `brew install` per formula, dependencies first. Each formula is poured from
//! a bottle when possible and built as a bottle (`--build-bottle`) otherwise,
//! which makes the result suitable for creating portable Homebrew prefixes.
//! `--dry` prints the ordered install commands instead of running them.

pub mod api;
pub mod bottle;
pub mod catalog;
pub mod cellar;
pub mod cli;
pub mod colors;
pub mod config;
pub mod error;
pub mod formula;
pub mod install;
pub mod options;
pub mod platform;
pub mod registry;
pub mod report;
pub mod request;
pub mod walker;

// Re-export commonly used types
pub use bottle::BottlePolicy;
pub use catalog::{Catalog, HomebrewCatalog, MemoryCatalog};
pub use error::{Result, StackError};
pub use formula::{DependencyRef, Formula};
pub use install::{BrewInstaller, Installer};
pub use options::OptionSet;
pub use registry::InstalledSet;
pub use request::{InstallRequest, TopLevelFlags};
pub use walker::Walker;
