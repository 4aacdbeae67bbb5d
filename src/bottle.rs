//! Deciding whether a formula may be poured from a bottle.
//!
//! The rules are evaluated in a fixed order and the first one that applies
//! decides:
//!
//! 1. the catalog already has a cached or provided bottle: pour
//! 2. `--force-bottle` and the formula has a bottle: pour
//! 3. `--build-from-source` or `--build-bottle`: build
//! 4. non-default build options were selected: build
//! 5. a bottle artifact is already on disk: pour
//! 6. no bottle for this platform, or the pour precheck fails: build
//! 7. a non-optional requirement refuses bottles: build, with a warning
//! 8. the bottle's Cellar does not match ours: build, with a warning
//! 9. otherwise: pour

use crate::colors;
use crate::formula::{CellarSpec, Formula};
use crate::request::TopLevelFlags;
use std::fmt;
use std::path::PathBuf;

/// Why a formula with a bottle still has to be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BottleBlock {
    Requirement { formula: String, requirement: String },
    Cellar { formula: String, cellar: CellarSpec },
}

impl fmt::Display for BottleBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Requirement {
                formula,
                requirement,
            } => write!(f, "Bottle for {} blocked by {} requirement", formula, requirement),
            Self::Cellar { formula, cellar } => {
                write!(f, "Cellar of {}'s bottle is {}", formula, cellar)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BottleDecision {
    Pour,
    Build,
    Blocked(BottleBlock),
}

impl BottleDecision {
    pub fn can_pour(&self) -> bool {
        matches!(self, Self::Pour)
    }
}

/// Bottle rules for one Cellar.
#[derive(Debug, Clone)]
pub struct BottlePolicy {
    cellar: PathBuf,
}

impl BottlePolicy {
    pub fn new(cellar: impl Into<PathBuf>) -> Self {
        Self {
            cellar: cellar.into(),
        }
    }

    pub fn evaluate(&self, formula: &Formula, flags: &TopLevelFlags) -> BottleDecision {
        if formula.provided_bottle {
            return BottleDecision::Pour;
        }
        if flags.force_bottle && formula.bottle.is_some() {
            return BottleDecision::Pour;
        }
        if flags.build_from_source || flags.build_bottle {
            return BottleDecision::Build;
        }
        if !formula.used_options.is_empty() {
            return BottleDecision::Build;
        }
        if formula.local_bottle_path.is_some() {
            return BottleDecision::Pour;
        }

        let bottle = match &formula.bottle {
            Some(bottle) if bottle.pour_allowed => bottle,
            _ => return BottleDecision::Build,
        };

        if let Some(req) = formula
            .requirements
            .iter()
            .find(|req| !req.optional && !req.pour_bottle)
        {
            return BottleDecision::Blocked(BottleBlock::Requirement {
                formula: formula.identity(),
                requirement: req.to_string(),
            });
        }

        if !bottle.cellar.is_compatible_with(&self.cellar) {
            return BottleDecision::Blocked(BottleBlock::Cellar {
                formula: formula.identity(),
                cellar: bottle.cellar.clone(),
            });
        }

        BottleDecision::Pour
    }

    /// [`evaluate`](Self::evaluate), warning when an existing bottle is blocked.
    pub fn can_use_bottle(&self, formula: &Formula, flags: &TopLevelFlags) -> bool {
        let decision = self.evaluate(formula, flags);
        if let BottleDecision::Blocked(block) = &decision {
            tracing::debug!("{:?}", block);
            colors::warning(&block.to_string());
        }
        decision.can_pour()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::{Bottle, Requirement};
    use std::path::Path;

    const CELLAR: &str = "/opt/homebrew/Cellar";

    fn policy() -> BottlePolicy {
        BottlePolicy::new(CELLAR)
    }

    fn bottled(name: &str) -> Formula {
        let mut formula = Formula::new(name);
        formula.bottle = Some(Bottle {
            cellar: CellarSpec::Any,
            pour_allowed: true,
        });
        formula
    }

    fn requirement(name: &str, optional: bool, pour_bottle: bool) -> Requirement {
        Requirement {
            name: name.to_string(),
            optional,
            pour_bottle,
        }
    }

    #[test]
    fn test_plain_bottle_is_poured() {
        let decision = policy().evaluate(&bottled("wget"), &TopLevelFlags::default());
        assert_eq!(decision, BottleDecision::Pour);
    }

    #[test]
    fn test_provided_bottle_wins_over_source_flags() {
        let mut formula = Formula::new("cryptopp");
        formula.provided_bottle = true;
        formula.used_options = ["--with-x"].into_iter().collect();
        let flags = TopLevelFlags {
            build_from_source: true,
            ..TopLevelFlags::default()
        };
        assert!(policy().evaluate(&formula, &flags).can_pour());
    }

    #[test]
    fn test_force_bottle_needs_a_bottle() {
        let flags = TopLevelFlags {
            force_bottle: true,
            build_bottle: true,
            ..TopLevelFlags::default()
        };
        assert!(policy().evaluate(&bottled("wget"), &flags).can_pour());
        assert_eq!(
            policy().evaluate(&Formula::new("wget"), &flags),
            BottleDecision::Build
        );
    }

    #[test]
    fn test_force_bottle_ignores_pour_precheck() {
        let mut formula = bottled("wget");
        formula.bottle = Some(Bottle {
            cellar: CellarSpec::Path("/usr/local/Cellar".into()),
            pour_allowed: false,
        });
        let flags = TopLevelFlags {
            force_bottle: true,
            ..TopLevelFlags::default()
        };
        assert!(policy().evaluate(&formula, &flags).can_pour());
    }

    #[test]
    fn test_source_flags_build() {
        for flags in [
            TopLevelFlags {
                build_from_source: true,
                ..TopLevelFlags::default()
            },
            TopLevelFlags {
                build_bottle: true,
                ..TopLevelFlags::default()
            },
        ] {
            assert_eq!(
                policy().evaluate(&bottled("wget"), &flags),
                BottleDecision::Build
            );
        }
    }

    #[test]
    fn test_used_options_build_even_with_local_bottle() {
        let mut formula = bottled("qt");
        formula.used_options = ["--with-docs"].into_iter().collect();
        formula.local_bottle_path = Some("/tmp/qt--5.5.0.arm64_sonoma.bottle.tar.gz".into());
        assert_eq!(
            policy().evaluate(&formula, &TopLevelFlags::default()),
            BottleDecision::Build
        );
    }

    #[test]
    fn test_local_bottle_path_pours_without_metadata() {
        let mut formula = Formula::new("qt");
        formula.local_bottle_path = Some("/tmp/qt--5.5.0.arm64_sonoma.bottle.tar.gz".into());
        assert!(policy().evaluate(&formula, &TopLevelFlags::default()).can_pour());
    }

    #[test]
    fn test_missing_bottle_or_failed_precheck_builds() {
        let flags = TopLevelFlags::default();
        assert_eq!(
            policy().evaluate(&Formula::new("libav"), &flags),
            BottleDecision::Build
        );

        let mut formula = bottled("libav");
        formula.bottle = Some(Bottle {
            cellar: CellarSpec::Any,
            pour_allowed: false,
        });
        assert_eq!(policy().evaluate(&formula, &flags), BottleDecision::Build);
    }

    #[test]
    fn test_blocking_requirement() {
        let mut formula = bottled("openslide");
        formula.requirements = vec![
            requirement("x11", true, false),
            requirement("xcode", false, true),
            requirement("java", false, false),
        ];
        let decision = policy().evaluate(&formula, &TopLevelFlags::default());
        assert_eq!(
            decision,
            BottleDecision::Blocked(BottleBlock::Requirement {
                formula: "openslide".to_string(),
                requirement: "java".to_string(),
            })
        );
        if let BottleDecision::Blocked(block) = decision {
            assert_eq!(
                block.to_string(),
                "Bottle for openslide blocked by java requirement"
            );
        }
    }

    #[test]
    fn test_optional_requirement_does_not_block() {
        let mut formula = bottled("openslide");
        formula.requirements = vec![requirement("x11", true, false)];
        assert!(policy().evaluate(&formula, &TopLevelFlags::default()).can_pour());
    }

    #[test]
    fn test_incompatible_cellar_blocks() {
        let mut formula = bottled("qca");
        formula.bottle = Some(Bottle {
            cellar: CellarSpec::Path("/usr/local/Cellar".into()),
            pour_allowed: true,
        });
        let decision = policy().evaluate(&formula, &TopLevelFlags::default());
        match &decision {
            BottleDecision::Blocked(block) => {
                assert_eq!(block.to_string(), "Cellar of qca's bottle is /usr/local/Cellar")
            }
            other => panic!("expected blocked decision, got {:?}", other),
        }

        let same = BottlePolicy::new(Path::new("/usr/local/Cellar"));
        assert!(same.evaluate(&formula, &TopLevelFlags::default()).can_pour());
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let mut formula = bottled("qca");
        formula.requirements = vec![requirement("java", false, false)];
        let flags = TopLevelFlags::default();

        let first = policy().evaluate(&formula, &flags);
        let second = policy().evaluate(&formula, &flags);
        assert_eq!(first, second);
        assert_eq!(format!("{:?}", first), format!("{:?}", second));
        assert!(!policy().can_use_bottle(&formula, &flags));
        assert!(!policy().can_use_bottle(&formula, &flags));
    }
}
