//! The recursive stack walk.
//!
//! Every formula is installed only after all of its own dependencies have
//! been installed (post-order, depth first). Dependencies are handed
//! `brew install` one at a time, in dependency order, so a dependency that has
//! to be built from source is in place before anything links against it.
//!
//! ```text
//! walk(A)
//!  ├─ walk(B)
//!  │   └─ walk(Z)  -> brew install Z
//!  │               -> brew install B
//!  ├─ walk(C)      (Z already handled, skipped)
//!  │               -> brew install C
//!  └─              -> brew install A
//! ```
//!
//! A formula is skipped when it is installed (unless `--dry --all`), when a
//! dry run has already planned it, or when it is already on the current walk
//! path (a dependency cycle).

use crate::bottle::BottlePolicy;
use crate::catalog::Catalog;
use crate::error::Result;
use crate::formula::Formula;
use crate::install::{Executor, Installer};
use crate::registry::InstalledSet;
use crate::report::{Event, Trace};
use crate::request::{InstallRequest, TopLevelFlags};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    Installed,
    Handled,
    Cycle,
}

pub struct Walker<'a, C, I> {
    catalog: &'a C,
    executor: Executor<'a, I>,
    policy: BottlePolicy,
    registry: &'a mut InstalledSet,
    trace: Trace,
    /// Installed formulae, read once per dry run
    installed: Option<HashSet<String>>,
    /// Identities currently being walked, outermost first
    path: Vec<String>,
}

impl<'a, C: Catalog, I: Installer> Walker<'a, C, I> {
    pub fn new(
        catalog: &'a C,
        installer: &'a I,
        policy: BottlePolicy,
        registry: &'a mut InstalledSet,
    ) -> Self {
        Self {
            catalog,
            executor: Executor::new(installer),
            policy,
            registry,
            trace: Trace::new(),
            installed: None,
            path: Vec::new(),
        }
    }

    pub fn with_trace(mut self, trace: Trace) -> Self {
        self.trace = trace;
        self
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn into_trace(self) -> Trace {
        self.trace
    }

    pub fn registry(&self) -> &InstalledSet {
        &*self.registry
    }

    /// Walk a top-level request.
    ///
    /// A dry run changes nothing on disk, so the installed formulae are read
    /// once up front instead of on every lookup.
    pub async fn run(&mut self, request: InstallRequest) -> Result<()> {
        if request.flags.dry_run && self.installed.is_none() {
            self.installed = Some(self.catalog.list_installed().await?);
        }
        self.walk(request).await
    }

    /// Install the dependencies of `request.formula`, then the formula itself.
    pub async fn walk(&mut self, request: InstallRequest) -> Result<()> {
        let identity = request.formula.identity();
        let flags = request.flags;
        tracing::debug!("walking {} [{}]", identity, request.options);
        self.path.push(identity.clone());

        if !flags.ignore_dependencies {
            if flags.dry_run {
                self.report_plan(&request, &identity).await?;
            }

            for dep in request.formula.active_dependencies() {
                let dep_formula = self.catalog.lookup_formula(&dep.name).await?;
                match self.skip_reason(&dep_formula, &flags) {
                    Some(Skip::Installed) => {
                        self.trace
                            .record(Event::AlreadyInstalled(dep_formula.identity()));
                    }
                    Some(Skip::Handled) => {}
                    Some(Skip::Cycle) => {
                        tracing::warn!("dependency cycle: {} -> {}", identity, dep.name);
                        self.trace.record(Event::CycleSkipped {
                            formula: identity.clone(),
                            dependency: dep_formula.identity(),
                        });
                    }
                    None => {
                        let child = request.for_dependency(dep_formula, dep);
                        Box::pin(self.walk(child)).await?;
                    }
                }
            }
        }

        if !flags.only_dependencies {
            self.install(&request, &identity)?;
        }

        self.path.pop();
        Ok(())
    }

    fn install(&mut self, request: &InstallRequest, identity: &str) -> Result<()> {
        let flags = &request.flags;
        let installed = (self.is_installed(&request.formula) && !flags.lists_installed())
            || (flags.dry_run && self.registry.contains(identity));
        if installed {
            self.trace
                .record(Event::AlreadyInstalled(identity.to_string()));
            return Ok(());
        }

        let require_source =
            flags.build_from_source || !self.policy.can_use_bottle(&request.formula, flags);
        let attempt = self.executor.attempt(
            identity,
            &request.options,
            require_source,
            flags,
            &mut *self.registry,
            &mut self.trace,
        )?;
        tracing::debug!("{}: {:?}", identity, attempt);
        Ok(())
    }

    /// Report build options and the dependencies this node will visit.
    async fn report_plan(&mut self, request: &InstallRequest, identity: &str) -> Result<()> {
        let formula = &request.formula;
        if !formula.used_options.is_empty() {
            self.trace.record(Event::BuildOptions {
                formula: identity.to_string(),
                used: formula.used_options.clone(),
                available: formula.build_options.clone(),
            });
        }

        let mut dependencies = Vec::new();
        for dep in formula.active_dependencies() {
            let dep_formula = self.catalog.lookup_formula(&dep.name).await?;
            if self.skip_reason(&dep_formula, &request.flags).is_none() {
                dependencies.push(dep.to_string());
            }
        }
        if !dependencies.is_empty() {
            self.trace.record(Event::Dependencies {
                formula: identity.to_string(),
                dependencies,
            });
        }
        Ok(())
    }

    fn skip_reason(&self, dep: &Formula, flags: &TopLevelFlags) -> Option<Skip> {
        let identity = dep.identity();
        if self.is_installed(dep) && !flags.lists_installed() {
            Some(Skip::Installed)
        } else if flags.dry_run && self.registry.contains(&identity) {
            Some(Skip::Handled)
        } else if self.path.contains(&identity) {
            Some(Skip::Cycle)
        } else {
            None
        }
    }

    fn is_installed(&self, formula: &Formula) -> bool {
        match &self.installed {
            Some(installed) => installed.contains(&formula.name),
            None => formula.installed,
        }
    }
}
