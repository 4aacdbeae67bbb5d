//! Settings read from the environment.
//!
//! | Variable | Default |
//! |---|---|
//! | `HOMEBREW_PREFIX` | `/opt/homebrew`, `/usr/local` or `/home/linuxbrew/.linuxbrew` |
//! | `HOMEBREW_CELLAR` | `<prefix>/Cellar` |
//! | `HOMEBREW_BREW_FILE` | `brew` on `PATH` |
//! | `HOMEBREW_API_DOMAIN` | `https://formulae.brew.sh/api` |
//! | `HOMEBREW_CACHE` | `~/Library/Caches/Homebrew` or `~/.cache/Homebrew` |
//! | `BREW_STACK_BOTTLE_DIR` | unset |
//! | `BREW_STACK_DEVELOPER` | on |

use crate::cellar;
use std::path::PathBuf;

pub const DEFAULT_API_DOMAIN: &str = "https://formulae.brew.sh/api";

#[derive(Debug, Clone)]
pub struct StackConfig {
    pub prefix: PathBuf,
    pub cellar: PathBuf,
    /// `brew` executable used for installs and tap formula lookups
    pub brew: PathBuf,
    pub api_domain: String,
    /// Where downloaded bottles are kept
    pub cache: PathBuf,
    /// Directory of prebuilt bottles that always take precedence
    pub bottle_dir: Option<PathBuf>,
    /// Make `brew` fail loudly when a bottle does not pour
    pub developer_mode: bool,
}

impl StackConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let prefix = var("HOMEBREW_PREFIX")
            .map(PathBuf::from)
            .unwrap_or_else(cellar::default_prefix);
        let cellar = var("HOMEBREW_CELLAR")
            .map(PathBuf::from)
            .unwrap_or_else(|| prefix.join("Cellar"));
        let cache = var("HOMEBREW_CACHE")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_cache(var("HOME")));
        let developer_mode = var("BREW_STACK_DEVELOPER")
            .map(|v| !matches!(v.as_str(), "0" | "false" | "no"))
            .unwrap_or(true);

        Self {
            prefix,
            cellar,
            brew: var("HOMEBREW_BREW_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("brew")),
            api_domain: var("HOMEBREW_API_DOMAIN")
                .map(|d| d.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_DOMAIN.to_string()),
            cache,
            bottle_dir: var("BREW_STACK_BOTTLE_DIR").map(PathBuf::from),
            developer_mode,
        }
    }
}

fn default_cache(home: Option<String>) -> PathBuf {
    let home = PathBuf::from(home.unwrap_or_else(|| ".".to_string()));
    if cfg!(target_os = "macos") {
        home.join("Library/Caches/Homebrew")
    } else {
        home.join(".cache/Homebrew")
    }
}
