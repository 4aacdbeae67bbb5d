//! Option flag sets and the rules for passing them down to dependencies.
//!
//! Install options are plain command-line flags (`--with-x`, `--HEAD`, ...)
//! forwarded to `brew install`. When the stack descends from a formula into
//! one of its dependencies, the parent's flags are filtered before they reach
//! the child:
//!
//! - flags that select one of the parent's own build options are dropped,
//! - flags that only make sense for the requested formula are dropped
//!   (see [`DEPENDENCY_DENYLIST`]),
//! - the dependency's own required flags are added last.
//!
//! # Examples
//!
//! ```
//! use brew_stack::options::{OptionSet, dependency_options};
//!
//! let parent: OptionSet = ["--with-x", "--build-bottle", "--HEAD"].into_iter().collect();
//! let parent_build = OptionSet::new();
//! let child = dependency_options(&parent, &parent_build, &OptionSet::new());
//!
//! assert_eq!(child.to_string(), "--with-x");
//! ```

use std::fmt;

/// Flag that asks `brew install` to build from source as a bottle.
pub const BUILD_BOTTLE: &str = "--build-bottle";

/// Flags that only control planning and never reach `brew install`.
pub const PLANNING_FLAGS: &[&str] = &["--dry", "--all"];

/// Flags stripped from inherited options before recursing into a dependency.
pub const DEPENDENCY_DENYLIST: &[&str] = &[
    // dependency management
    "--ignore-dependencies",
    "--only-dependencies",
    // source vs. binary
    "--build-from-source",
    "--force-bottle",
    "--build-bottle",
    // version channel
    "--devel",
    "--HEAD",
];

/// Ordered set of option flags without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet(Vec<String>);

impl OptionSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.0.iter().any(|f| f == flag)
    }

    /// Append `flag` unless it is already present. Returns true if added.
    pub fn insert(&mut self, flag: impl Into<String>) -> bool {
        let flag = flag.into();
        if self.contains(&flag) {
            return false;
        }
        self.0.push(flag);
        true
    }

    /// Remove `flag`. Returns true if it was present.
    pub fn remove(&mut self, flag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|f| f != flag);
        before != self.0.len()
    }

    /// Flags of `self` followed by the flags of `other` not already present.
    pub fn union(&self, other: &OptionSet) -> OptionSet {
        let mut merged = self.clone();
        for flag in other {
            merged.insert(flag);
        }
        merged
    }

    /// Flags of `self` that are not in `other`.
    pub fn difference(&self, other: &OptionSet) -> OptionSet {
        self.iter().filter(|f| !other.contains(f)).collect()
    }

    /// Flags of `self` that are also in `other`, in the order of `self`.
    pub fn intersection(&self, other: &OptionSet) -> OptionSet {
        self.iter().filter(|f| other.contains(f)).collect()
    }

    /// Flags of `self` minus every flag in `flags`.
    pub fn without(&self, flags: &[&str]) -> OptionSet {
        self.iter().filter(|f| !flags.contains(f)).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl<S: Into<String>> FromIterator<S> for OptionSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut set = OptionSet::new();
        for flag in iter {
            set.insert(flag);
        }
        set
    }
}

impl<'a> IntoIterator for &'a OptionSet {
    type Item = &'a str;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, String>, fn(&'a String) -> &'a str>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().map(String::as_str as fn(&'a String) -> &'a str)
    }
}

impl fmt::Display for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

/// Compute the options passed to a dependency of a formula.
///
/// `parent` is the formula's own option list, `parent_build` the subset of it
/// that selected the formula's build options, and `dependency` the flags the
/// formula requires of this dependency.
///
/// The denylist is applied to the inherited flags only, so a dependency that
/// explicitly requires e.g. `--build-bottle` still gets it.
pub fn dependency_options(
    parent: &OptionSet,
    parent_build: &OptionSet,
    dependency: &OptionSet,
) -> OptionSet {
    parent
        .difference(parent_build)
        .without(DEPENDENCY_DENYLIST)
        .union(dependency)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(flags: &[&str]) -> OptionSet {
        flags.iter().copied().collect()
    }

    #[test]
    fn test_insert_keeps_order_and_skips_duplicates() {
        let mut options = set(&["--a", "--b"]);
        assert!(!options.insert("--a"));
        assert!(options.insert("--c"));
        assert_eq!(options.as_slice(), ["--a", "--b", "--c"]);
    }

    #[test]
    fn test_from_iter_dedups() {
        let options = set(&["--a", "--a", "--b", "--a"]);
        assert_eq!(options.len(), 2);
        assert_eq!(options.to_string(), "--a --b");
    }

    #[test]
    fn test_strips_denylist_from_inherited_flags() {
        let parent = set(&["--with-x", "--build-bottle", "--HEAD"]);
        let child = dependency_options(&parent, &OptionSet::new(), &OptionSet::new());
        assert!(!child.contains("--build-bottle"));
        assert!(!child.contains("--HEAD"));
        assert!(child.contains("--with-x"));
    }

    #[test]
    fn test_parent_build_options_do_not_leak() {
        let parent = set(&["--with-x", "--build-bottle", "--HEAD"]);
        let parent_build = set(&["--with-x"]);
        let child = dependency_options(&parent, &parent_build, &OptionSet::new());
        assert!(child.is_empty());
    }

    #[test]
    fn test_every_denylisted_flag_is_stripped() {
        let parent: OptionSet = DEPENDENCY_DENYLIST.iter().copied().collect();
        let child = dependency_options(&parent, &OptionSet::new(), &OptionSet::new());
        assert!(child.is_empty());
    }

    #[test]
    fn test_dependency_may_request_build_bottle_itself() {
        let parent = set(&["--build-bottle"]);
        let required = set(&["--build-bottle", "--with-python"]);
        let child = dependency_options(&parent, &OptionSet::new(), &required);
        assert_eq!(child.as_slice(), ["--build-bottle", "--with-python"]);
    }

    #[test]
    fn test_dependency_flags_are_not_duplicated() {
        let parent = set(&["--with-x", "--verbose"]);
        let required = set(&["--verbose", "--with-y"]);
        let child = dependency_options(&parent, &OptionSet::new(), &required);
        assert_eq!(child.as_slice(), ["--with-x", "--verbose", "--with-y"]);
    }

    #[test]
    fn test_planning_flags_are_inherited() {
        let parent = set(&["--dry", "--all", "--force-bottle"]);
        let child = dependency_options(&parent, &OptionSet::new(), &OptionSet::new());
        assert_eq!(child.as_slice(), ["--dry", "--all"]);
    }

    #[test]
    fn test_intersection_follows_self_order() {
        let requested = set(&["--with-b", "--verbose", "--with-a"]);
        let available = set(&["--with-a", "--with-b"]);
        assert_eq!(
            requested.intersection(&available).as_slice(),
            ["--with-b", "--with-a"]
        );
    }
}
