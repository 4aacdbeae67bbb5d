//! The install context carried from one level of the walk to the next.

use crate::formula::{DependencyRef, Formula};
use crate::options::{OptionSet, dependency_options};

/// Switches that control the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopLevelFlags {
    pub dry_run: bool,
    /// With `dry_run`, list installed formulae too
    pub list_all: bool,
    pub ignore_dependencies: bool,
    pub only_dependencies: bool,
    pub force_bottle: bool,
    pub build_from_source: bool,
    pub build_bottle: bool,
}

impl TopLevelFlags {
    /// Read the request switches from the install options.
    pub fn from_options(options: &OptionSet, dry_run: bool, list_all: bool) -> Self {
        Self {
            dry_run,
            list_all,
            ignore_dependencies: options.contains("--ignore-dependencies"),
            only_dependencies: options.contains("--only-dependencies"),
            force_bottle: options.contains("--force-bottle"),
            build_from_source: options.contains("--build-from-source"),
            build_bottle: options.contains("--build-bottle"),
        }
    }

    /// Flags for a dependency's request.
    ///
    /// Planning switches carry over. The others describe how the user wants
    /// the requested formula handled and are reset, so every dependency
    /// resolves its own full subtree.
    pub fn for_dependency(&self) -> Self {
        Self {
            dry_run: self.dry_run,
            list_all: self.list_all,
            ..Self::default()
        }
    }

    /// `--dry --all`: installed formulae are planned as if missing.
    pub fn lists_installed(&self) -> bool {
        self.dry_run && self.list_all
    }
}

/// One node of the walk.
#[derive(Debug, Clone)]
pub struct InstallRequest {
    pub formula: Formula,
    pub options: OptionSet,
    pub flags: TopLevelFlags,
}

impl InstallRequest {
    pub fn new(formula: Formula, options: OptionSet, flags: TopLevelFlags) -> Self {
        let formula = formula.with_used_options(&options);
        Self {
            formula,
            options,
            flags,
        }
    }

    /// Build the request for `dependency` of this request's formula.
    pub fn for_dependency(&self, formula: Formula, dependency: &DependencyRef) -> Self {
        let options = dependency_options(
            &self.options,
            &self.formula.used_options,
            &dependency.options,
        );
        Self::new(formula, options, self.flags.for_dependency())
    }
}
