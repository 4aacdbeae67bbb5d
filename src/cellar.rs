//! Homebrew Cellar - which formulae are installed

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Default Homebrew prefix for this platform
pub fn default_prefix() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        PathBuf::from("/home/linuxbrew/.linuxbrew")
    }
    #[cfg(all(not(target_os = "linux"), target_arch = "aarch64"))]
    {
        PathBuf::from("/opt/homebrew")
    }
    #[cfg(all(not(target_os = "linux"), not(target_arch = "aarch64")))]
    {
        PathBuf::from("/usr/local")
    }
}

/// Names of all formulae with at least one installed version
pub fn list_installed(cellar: &Path) -> Result<HashSet<String>> {
    if !cellar.exists() {
        return Ok(HashSet::new());
    }

    let mut installed = HashSet::new();
    for entry in fs::read_dir(cellar)
        .with_context(|| format!("Failed to read Cellar: {}", cellar.display()))?
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        if has_version(&entry.path())? {
            installed.insert(name);
        }
    }

    Ok(installed)
}

/// Whether `formula` has an installed version in the Cellar
pub fn is_installed(cellar: &Path, formula: &str) -> Result<bool> {
    let rack = cellar.join(formula);
    if !rack.is_dir() {
        return Ok(false);
    }
    has_version(&rack)
}

// An empty rack is left behind by `brew uninstall` of the last version
fn has_version(rack: &Path) -> Result<bool> {
    if !rack.is_dir() {
        return Ok(false);
    }
    for entry in fs::read_dir(rack)
        .with_context(|| format!("Failed to read {}", rack.display()))?
    {
        let entry = entry?;
        if !entry.file_name().to_string_lossy().starts_with('.') && entry.path().is_dir() {
            return Ok(true);
        }
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cellar_with(racks: &[(&str, Vec<&str>)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, versions) in racks {
            fs::create_dir_all(dir.path().join(name)).unwrap();
            for version in versions {
                fs::create_dir_all(dir.path().join(name).join(version)).unwrap();
            }
        }
        dir
    }

    #[test]
    fn test_list_installed_skips_empty_and_hidden() {
        let cellar = cellar_with(&[
            ("zlib", vec!["1.3.1"]),
            ("libpng", vec!["1.6.43", "1.6.44"]),
            ("empty", vec![]),
            (".keepme", vec!["1.0"]),
            ("hidden-only", vec![".tmp"]),
        ]);

        let installed = list_installed(cellar.path()).unwrap();
        let mut names: Vec<_> = installed.into_iter().collect();
        names.sort();
        assert_eq!(names, ["libpng", "zlib"]);
    }

    #[test]
    fn test_missing_cellar_is_empty() {
        let dir = TempDir::new().unwrap();
        let installed = list_installed(&dir.path().join("Cellar")).unwrap();
        assert!(installed.is_empty());
    }

    #[test]
    fn test_is_installed() {
        let cellar = cellar_with(&[("zlib", vec!["1.3.1"]), ("empty", vec![])]);
        assert!(is_installed(cellar.path(), "zlib").unwrap());
        assert!(!is_installed(cellar.path(), "empty").unwrap());
        assert!(!is_installed(cellar.path(), "missing").unwrap());
    }

    #[test]
    fn test_default_prefix_is_absolute() {
        assert!(default_prefix().is_absolute());
    }
}
