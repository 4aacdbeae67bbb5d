//! Where formula metadata comes from.
//!
//! The walker only needs two questions answered: "what is this formula?" and
//! "what is installed?". [`HomebrewCatalog`] answers them from the Homebrew
//! API and the local Cellar; [`MemoryCatalog`] answers them from a table,
//! which is what tests and benchmarks use.
//!
//! Installed state is read fresh on every lookup. A real install changes the
//! Cellar immediately and the next visit of the same formula must see it.

use crate::api::{BrewApi, FormulaInfo};
use crate::cellar;
use crate::config::StackConfig;
use crate::error::{Result, StackError};
use crate::formula::{Bottle, CellarSpec, DependencyKind, DependencyRef, Formula, Requirement};
use crate::platform;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

#[allow(async_fn_in_trait)]
pub trait Catalog {
    /// Look up a formula by short or tap-qualified name.
    async fn lookup_formula(&self, name: &str) -> Result<Formula>;

    /// Short names of every installed formula.
    async fn list_installed(&self) -> Result<HashSet<String>>;
}

/// Bottle file name as Homebrew stores it, e.g. `wget--1.24.5.arm64_sonoma.bottle.tar.gz`.
pub fn bottle_filename(name: &str, version: &str, tag: &str, rebuild: u32) -> String {
    if rebuild > 0 {
        format!("{}--{}.{}.bottle.{}.tar.gz", name, version, tag, rebuild)
    } else {
        format!("{}--{}.{}.bottle.tar.gz", name, version, tag)
    }
}

/// Catalog backed by the Homebrew API and the local Cellar.
pub struct HomebrewCatalog {
    api: BrewApi,
    prefix: PathBuf,
    cellar: PathBuf,
    cache: PathBuf,
    bottle_dir: Option<PathBuf>,
    tag: String,
}

impl HomebrewCatalog {
    pub fn new(api: BrewApi, config: &StackConfig) -> Result<Self> {
        Ok(Self {
            api,
            prefix: config.prefix.clone(),
            cellar: config.cellar.clone(),
            cache: config.cache.clone(),
            bottle_dir: config.bottle_dir.clone(),
            tag: platform::detect_bottle_tag()?,
        })
    }

    /// Combine a definition with the state of this machine.
    pub fn to_formula(&self, info: &FormulaInfo) -> Result<Formula> {
        let version = info.pkg_version();
        let rebuild = info.bottle.stable.as_ref().map_or(0, |b| b.rebuild);
        let find_bottle = |dir: &Path| {
            let version = version.as_deref()?;
            platform::bottle_tag_candidates(&self.tag)
                .into_iter()
                .map(|tag| dir.join(bottle_filename(&info.name, version, tag, rebuild)))
                .find(|path| path.exists())
        };

        Ok(Formula {
            name: info.name.clone(),
            tap: info.tap.clone(),
            version: version.clone(),
            dependencies: dependency_refs(info),
            build_options: info.options.iter().map(|o| o.option.as_str()).collect(),
            used_options: Default::default(),
            installed: cellar::is_installed(&self.cellar, &info.name)?,
            bottle: self.platform_bottle(info),
            requirements: info
                .requirements
                .iter()
                .map(|req| Requirement {
                    name: req.name.clone(),
                    optional: req.contexts.iter().any(|c| c == "optional"),
                    pour_bottle: req.pour_bottle,
                })
                .collect(),
            provided_bottle: self
                .bottle_dir
                .as_deref()
                .and_then(find_bottle)
                .is_some(),
            local_bottle_path: find_bottle(&self.cache),
        })
    }

    fn platform_bottle(&self, info: &FormulaInfo) -> Option<Bottle> {
        let files = &info.bottle.stable.as_ref()?.files;
        let file = platform::bottle_tag_candidates(&self.tag)
            .into_iter()
            .find_map(|tag| files.get(tag))?;

        Some(Bottle {
            cellar: CellarSpec::parse(&file.cellar),
            pour_allowed: self.pour_precheck(info.pour_bottle_only_if.as_deref()),
        })
    }

    fn pour_precheck(&self, condition: Option<&str>) -> bool {
        match condition {
            None => true,
            Some("default_prefix") => self.prefix == cellar::default_prefix(),
            Some("clt_installed") => platform::clt_installed(),
            Some(other) => {
                tracing::debug!("unknown pour_bottle_only_if condition: {}", other);
                false
            }
        }
    }
}

impl Catalog for HomebrewCatalog {
    async fn lookup_formula(&self, name: &str) -> Result<Formula> {
        let info = self.api.fetch_formula(name).await?;
        self.to_formula(&info)
    }

    async fn list_installed(&self) -> Result<HashSet<String>> {
        Ok(cellar::list_installed(&self.cellar)?)
    }
}

fn dependency_refs(info: &FormulaInfo) -> Vec<DependencyRef> {
    let groups = [
        (&info.build_dependencies, DependencyKind::Build),
        (&info.dependencies, DependencyKind::Runtime),
        (&info.recommended_dependencies, DependencyKind::Recommended),
        (&info.optional_dependencies, DependencyKind::Optional),
    ];

    let mut refs: Vec<DependencyRef> = Vec::new();
    for (names, kind) in groups {
        for name in names {
            if !refs.iter().any(|r| &r.name == name) {
                refs.push(DependencyRef::new(name.clone(), kind));
            }
        }
    }
    refs
}

/// Catalog held in memory.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    formulae: RefCell<HashMap<String, Formula>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a formula, keyed by its identity.
    pub fn insert(&self, formula: Formula) {
        self.formulae
            .borrow_mut()
            .insert(formula.identity(), formula);
    }

    pub fn with(self, formula: Formula) -> Self {
        self.insert(formula);
        self
    }

    /// Flag `name` as installed, as a real install would.
    pub fn mark_installed(&self, name: &str) {
        self.find_mut(name, |formula| formula.installed = true);
    }

    fn find_mut<T>(&self, name: &str, f: impl FnOnce(&mut Formula) -> T) -> Option<T> {
        let mut formulae = self.formulae.borrow_mut();
        if formulae.contains_key(name) {
            return formulae.get_mut(name).map(f);
        }
        formulae.values_mut().find(|formula| formula.name == name).map(f)
    }
}

impl Catalog for MemoryCatalog {
    async fn lookup_formula(&self, name: &str) -> Result<Formula> {
        self.find_mut(name, |formula| formula.clone())
            .ok_or_else(|| StackError::FormulaNotFound(name.to_string()))
    }

    async fn list_installed(&self) -> Result<HashSet<String>> {
        Ok(self
            .formulae
            .borrow()
            .values()
            .filter(|f| f.installed)
            .map(|f| f.name.clone())
            .collect())
    }
}
