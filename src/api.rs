//! Homebrew formula definitions with in-memory caching.
//!
//! Core formulae come from Homebrew's public JSON API. Tap formulae
//! (`user/repo/name`) are not published there, so they are read from the
//! local `brew info --json=v2` output, which uses the same schema.
//!
//! Definitions are cached for the lifetime of a [`BrewApi`]: a stack visits
//! shared dependencies many times, but their definitions never change during
//! a run. Installed state is *not* part of what is cached here; see
//! [`crate::catalog`].
//!
//! # Examples
//!
//! ```no_run
//! use brew_stack::api::BrewApi;
//! use brew_stack::config::StackConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let api = BrewApi::new(&StackConfig::from_env())?;
//!     let info = api.fetch_formula("openslide").await?;
//!     println!("Dependencies: {:?}", info.dependencies);
//!     Ok(())
//! }
//! ```

use crate::config::StackConfig;
use crate::error::{Result, StackError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Versions {
    #[serde(default)]
    pub stable: Option<String>,
    #[serde(default)]
    pub head: Option<String>,
    #[serde(default)]
    pub bottle: bool,
}

/// A build option, e.g. `--with-docs`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormulaOption {
    pub option: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementInfo {
    pub name: String,
    /// Tags such as `build` or `optional`
    #[serde(default)]
    pub contexts: Vec<String>,
    #[serde(default = "default_true")]
    pub pour_bottle: bool,
}

fn default_true() -> bool {
    true
}

/// Bottle file metadata for a specific platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BottleFile {
    pub cellar: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BottleData {
    #[serde(default)]
    pub rebuild: u32,
    #[serde(default)]
    pub root_url: Option<String>,
    #[serde(default)]
    pub files: HashMap<String, BottleFile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BottleSpecs {
    #[serde(default)]
    pub stable: Option<BottleData>,
}

/// Formula definition as published by `formula.json` / `brew info --json=v2`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormulaInfo {
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub tap: Option<String>,
    #[serde(default)]
    pub versions: Versions,
    #[serde(default)]
    pub revision: u32,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub build_dependencies: Vec<String>,
    #[serde(default)]
    pub recommended_dependencies: Vec<String>,
    #[serde(default)]
    pub optional_dependencies: Vec<String>,
    #[serde(default)]
    pub options: Vec<FormulaOption>,
    #[serde(default)]
    pub requirements: Vec<RequirementInfo>,
    #[serde(default)]
    pub bottle: BottleSpecs,
    #[serde(default)]
    pub pour_bottle_only_if: Option<String>,
}

impl FormulaInfo {
    /// Version as it appears in the Cellar and in bottle file names
    pub fn pkg_version(&self) -> Option<String> {
        let stable = self.versions.stable.as_ref()?;
        Some(if self.revision > 0 {
            format!("{}_{}", stable, self.revision)
        } else {
            stable.clone()
        })
    }
}

#[derive(Debug, Deserialize)]
struct BrewInfoOutput {
    #[serde(default)]
    formulae: Vec<FormulaInfo>,
}

/// Whether `name` is tap-qualified (`user/repo/name`) outside of homebrew/core.
pub fn is_tap_formula(name: &str) -> bool {
    name.matches('/').count() == 2 && !name.starts_with("homebrew/core/")
}

/// Homebrew formula client with in-memory caching
#[derive(Clone)]
pub struct BrewApi {
    client: reqwest::Client,
    domain: String,
    brew: PathBuf,
    formula_cache: moka::future::Cache<String, FormulaInfo>,
}

impl BrewApi {
    pub fn new(config: &StackConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(format!("brew-stack/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            domain: config.api_domain.clone(),
            brew: config.brew.clone(),
            formula_cache: moka::future::Cache::new(1000),
        })
    }

    /// Fetch the definition of `name` (cached after the first call).
    ///
    /// # Errors
    ///
    /// Returns [`StackError::FormulaNotFound`] if no such formula exists.
    pub async fn fetch_formula(&self, name: &str) -> Result<FormulaInfo> {
        let name = name.strip_prefix("homebrew/core/").unwrap_or(name);
        if let Some(cached) = self.formula_cache.get(name).await {
            return Ok(cached);
        }

        let info = if is_tap_formula(name) {
            self.brew_info(name)?
        } else {
            self.fetch_from_api(name).await?
        };

        self.formula_cache
            .insert(name.to_string(), info.clone())
            .await;
        Ok(info)
    }

    async fn fetch_from_api(&self, name: &str) -> Result<FormulaInfo> {
        let url = format!("{}/formula/{}.json", self.domain, name);
        tracing::debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StackError::FormulaNotFound(name.to_string()));
        }

        Ok(response.error_for_status()?.json().await?)
    }

    fn brew_info(&self, name: &str) -> Result<FormulaInfo> {
        tracing::debug!("brew info --json=v2 {}", name);
        let output = Command::new(&self.brew)
            .args(["info", "--json=v2", "--formula", name])
            .output()
            .map_err(|e| anyhow::anyhow!("Failed to run {}: {}", self.brew.display(), e))?;

        if !output.status.success() {
            return Err(StackError::FormulaNotFound(name.to_string()));
        }

        parse_brew_info(&output.stdout, name)
    }
}

/// Extract the definition of `name` from `brew info --json=v2` output.
pub fn parse_brew_info(json: &[u8], name: &str) -> Result<FormulaInfo> {
    let output: BrewInfoOutput = serde_json::from_slice(json)?;
    output
        .formulae
        .into_iter()
        .next()
        .ok_or_else(|| StackError::FormulaNotFound(name.to_string()))
}
