//! Platform detection for picking the bottle that fits this machine.
//!
//! Bottles are tagged `<arch>_<os>` (`arm64_sequoia`, `x86_64_linux`, ...).
//! Formulae whose bottle works everywhere publish a single `all` bottle.

#[cfg(target_os = "macos")]
use anyhow::Context;
use anyhow::Result;
#[cfg(target_os = "macos")]
use std::process::Command;

/// Tag for universal bottles.
pub const UNIVERSAL_TAG: &str = "all";

/// Bottle tag for this machine, e.g. `arm64_sonoma`.
pub fn detect_bottle_tag() -> Result<String> {
    // Homebrew uses "arm64" not "aarch64"
    let arch = match std::env::consts::ARCH {
        "aarch64" => "arm64",
        other => other,
    };

    #[cfg(target_os = "macos")]
    {
        let version = macos_version()?;
        Ok(format!("{}_{}", arch, macos_name(&version)))
    }

    #[cfg(target_os = "linux")]
    {
        Ok(format!("{}_linux", arch))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        let _ = arch;
        anyhow::bail!("Unsupported platform")
    }
}

/// Tags to look for in a formula's bottle files, best match first.
pub fn bottle_tag_candidates(tag: &str) -> [&str; 2] {
    [tag, UNIVERSAL_TAG]
}

/// Whether the Command Line Tools are present, for `pour_bottle_only_if: clt_installed`.
pub fn clt_installed() -> bool {
    #[cfg(target_os = "macos")]
    {
        std::path::Path::new("/Library/Developer/CommandLineTools/usr/bin/clang").exists()
    }

    #[cfg(not(target_os = "macos"))]
    {
        true
    }
}

#[cfg(target_os = "macos")]
fn macos_version() -> Result<String> {
    let output = Command::new("sw_vers")
        .arg("-productVersion")
        .output()
        .context("Failed to run sw_vers")?;

    Ok(String::from_utf8(output.stdout)
        .context("Invalid UTF-8 in sw_vers output")?
        .trim()
        .to_string())
}

#[cfg(target_os = "macos")]
fn macos_name(version: &str) -> &'static str {
    let major: u32 = version
        .split('.')
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);

    match major {
        16 | 26 => "tahoe",
        15 => "sequoia",
        14 => "sonoma",
        13 => "ventura",
        12 => "monterey",
        11 => "big_sur",
        _ => "sonoma",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_bottle_tag() {
        let tag = detect_bottle_tag().unwrap();
        #[cfg(target_arch = "aarch64")]
        assert!(tag.starts_with("arm64_"));
        #[cfg(target_arch = "x86_64")]
        assert!(tag.starts_with("x86_64_"));
        #[cfg(target_os = "linux")]
        assert!(tag.ends_with("_linux"));
    }

    #[test]
    fn test_candidates_fall_back_to_universal() {
        assert_eq!(bottle_tag_candidates("arm64_sonoma"), ["arm64_sonoma", "all"]);
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn test_macos_names() {
        assert_eq!(macos_name("15.1"), "sequoia");
        assert_eq!(macos_name("14.0"), "sonoma");
        assert_eq!(macos_name("26.0"), "tahoe");
    }
}
