//! Formulae handled during one dry run.
//!
//! A dry run installs nothing, so the Cellar cannot tell the walker what it
//! has already planned. [`InstalledSet`] fills that gap: the executor records
//! every planned identity, and the walker consults it to keep diamond and
//! cyclic dependencies from being planned twice. Real installs are tracked by
//! the Cellar itself.

use std::collections::HashSet;

/// Identities handled so far, in the order they were handled.
#[derive(Debug, Default)]
pub struct InstalledSet {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl InstalledSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.seen.contains(identity)
    }

    /// Record `identity`. Returns false if it was already recorded.
    pub fn mark_handled(&mut self, identity: &str) -> bool {
        if !self.seen.insert(identity.to_string()) {
            return false;
        }
        self.order.push(identity.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}
