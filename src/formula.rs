//! Formula metadata as seen by the stack walker.
//!
//! A [`Formula`] is produced by a [`Catalog`](crate::catalog::Catalog) lookup
//! and stays read-only for the rest of the walk. It carries only what the
//! walker and the bottle policy need: the formula's own (non-transitive)
//! dependencies, its build options, whether it is installed, and whether a
//! bottle for the current platform may be poured.

use crate::options::OptionSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Tap that holds the core formulae. Its formulae are known by short name.
pub const CORE_TAP: &str = "homebrew/core";

/// How a formula uses one of its dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    Runtime,
    Build,
    /// Installed unless disabled with `--without-<name>`
    Recommended,
    /// Installed only when enabled with `--with-<name>`
    Optional,
}

/// A declared edge from a formula to one of its own dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRef {
    pub name: String,
    /// Flags the formula requires of this dependency
    pub options: OptionSet,
    pub kind: DependencyKind,
}

impl DependencyRef {
    pub fn new(name: impl Into<String>, kind: DependencyKind) -> Self {
        Self {
            name: name.into(),
            options: OptionSet::new(),
            kind,
        }
    }

    pub fn runtime(name: impl Into<String>) -> Self {
        Self::new(name, DependencyKind::Runtime)
    }

    pub fn with_options<S: Into<String>>(mut self, options: impl IntoIterator<Item = S>) -> Self {
        self.options = options.into_iter().collect();
        self
    }
}

impl fmt::Display for DependencyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.options.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} {}", self.name, self.options)
        }
    }
}

/// Cellar a bottle was built for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellarSpec {
    /// `:any` - relocatable
    Any,
    /// `:any_skip_relocation` - needs no relocation at all
    AnySkipRelocation,
    /// Hardcoded Cellar path
    Path(PathBuf),
}

impl CellarSpec {
    /// Parse the `cellar` field of a bottle file entry.
    pub fn parse(raw: &str) -> Self {
        match raw.trim_start_matches(':') {
            "any" => Self::Any,
            "any_skip_relocation" => Self::AnySkipRelocation,
            _ => Self::Path(PathBuf::from(raw)),
        }
    }

    pub fn is_compatible_with(&self, cellar: &Path) -> bool {
        match self {
            Self::Any | Self::AnySkipRelocation => true,
            Self::Path(path) => path == cellar,
        }
    }
}

impl fmt::Display for CellarSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, ":any"),
            Self::AnySkipRelocation => write!(f, ":any_skip_relocation"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Bottle available for the current platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bottle {
    pub cellar: CellarSpec,
    /// Result of the environment's pour precheck (`pour_bottle_only_if`)
    pub pour_allowed: bool,
}

/// A non-formula requirement such as `xcode` or `macos`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub optional: bool,
    /// Whether a bottle may be poured while this requirement applies
    pub pour_bottle: bool,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formula {
    pub name: String,
    pub tap: Option<String>,
    pub version: Option<String>,
    pub dependencies: Vec<DependencyRef>,
    /// Build options the formula recognizes
    pub build_options: OptionSet,
    /// Build options selected for this install
    pub used_options: OptionSet,
    pub installed: bool,
    pub bottle: Option<Bottle>,
    pub requirements: Vec<Requirement>,
    /// A locally cached or externally provided bottle exists for this formula
    pub provided_bottle: bool,
    pub local_bottle_path: Option<PathBuf>,
}

impl Formula {
    /// A core formula with no dependencies, options, or bottle.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tap: None,
            version: None,
            dependencies: Vec::new(),
            build_options: OptionSet::new(),
            used_options: OptionSet::new(),
            installed: false,
            bottle: None,
            requirements: Vec::new(),
            provided_bottle: false,
            local_bottle_path: None,
        }
    }

    /// Tap-qualified name, unique across a run.
    ///
    /// Core formulae keep their short name; tap formulae become
    /// `user/repo/name` with any `homebrew-` prefix dropped from `repo`.
    pub fn identity(&self) -> String {
        match self.tap.as_deref() {
            None | Some(CORE_TAP) => self.name.clone(),
            Some(tap) => match tap.split_once('/') {
                Some((user, repo)) => format!(
                    "{}/{}/{}",
                    user,
                    repo.strip_prefix("homebrew-").unwrap_or(repo),
                    self.name
                ),
                None => format!("{}/{}", tap, self.name),
            },
        }
    }

    /// Select the build options requested for this install.
    pub fn with_used_options(mut self, requested: &OptionSet) -> Self {
        self.used_options = requested.intersection(&self.build_options);
        self
    }

    /// Dependencies that apply to the selected build options, in declared order.
    pub fn active_dependencies(&self) -> impl Iterator<Item = &DependencyRef> {
        self.dependencies.iter().filter(|dep| match dep.kind {
            DependencyKind::Runtime | DependencyKind::Build => true,
            DependencyKind::Recommended => !self
                .used_options
                .contains(&format!("--without-{}", dep.name)),
            DependencyKind::Optional => self.used_options.contains(&format!("--with-{}", dep.name)),
        })
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identity())
    }
}
