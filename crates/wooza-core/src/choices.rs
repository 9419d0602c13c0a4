//! Enumerations a plan is validated against.
//!
//! Loaded once at startup (compiled-in defaults, optionally replaced from the
//! config file) and shared read-only afterwards.

use std::collections::BTreeSet;

/// Plan types accepted by default. Stored lower-case.
pub const DEFAULT_PLAN_TYPES: &[&str] = &["pré", "pós", "controle"];

/// Brazilian area codes (DDD) accepted by default.
pub const DEFAULT_DDDS: &[i32] = &[
    11, 12, 13, 14, 15, 16, 17, 18, 19, //
    21, 22, 24, 27, 28, //
    31, 32, 33, 34, 35, 37, 38, //
    41, 42, 43, 44, 45, 46, 47, 48, 49, //
    51, 53, 54, 55, //
    61, 62, 63, 64, 65, 66, 67, 68, 69, //
    71, 73, 74, 75, 77, 79, //
    81, 82, 83, 84, 85, 86, 87, 88, 89, //
    91, 92, 93, 94, 95, 96, 97, 98, 99,
];

/// Valid plan types and area codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choices {
    plan_types: BTreeSet<String>,
    ddds: BTreeSet<i32>,
}

impl Choices {
    /// Build a set of choices. Plan types are lower-cased.
    pub fn new<S, I, D>(plan_types: I, ddds: D) -> Self
    where
        S: AsRef<str>,
        I: IntoIterator<Item = S>,
        D: IntoIterator<Item = i32>,
    {
        Self {
            plan_types: plan_types
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .collect(),
            ddds: ddds.into_iter().collect(),
        }
    }

    /// Case-insensitive membership test for a plan type.
    pub fn is_plan_type(&self, value: &str) -> bool {
        self.plan_types.contains(&value.to_lowercase())
    }

    pub fn is_ddd(&self, value: i64) -> bool {
        i32::try_from(value).is_ok_and(|v| self.ddds.contains(&v))
    }

    pub fn plan_types(&self) -> impl Iterator<Item = &str> {
        self.plan_types.iter().map(String::as_str)
    }

    pub fn ddds(&self) -> impl Iterator<Item = i32> + '_ {
        self.ddds.iter().copied()
    }
}

impl Default for Choices {
    fn default() -> Self {
        Self::new(DEFAULT_PLAN_TYPES.iter(), DEFAULT_DDDS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_types_ignore_case() {
        let choices = Choices::default();
        assert!(choices.is_plan_type("Pós"));
        assert!(choices.is_plan_type("CONTROLE"));
        assert!(choices.is_plan_type("pré"));
        assert!(!choices.is_plan_type("Limitado"));
    }

    #[test]
    fn default_ddds_skip_unassigned_codes() {
        let choices = Choices::default();
        assert!(choices.is_ddd(21));
        assert!(choices.is_ddd(99));
        for unassigned in [10, 20, 23, 25, 26, 29, 30, 36, 39, 50, 52, 70, 72, 76, 78, 90] {
            assert!(!choices.is_ddd(unassigned), "{unassigned} should be rejected");
        }
        assert_eq!(choices.ddds().count(), 67);
    }

    #[test]
    fn out_of_range_ddd_is_rejected() {
        assert!(!Choices::default().is_ddd(i64::from(i32::MAX) + 21));
    }

    #[test]
    fn custom_choices_are_normalized() {
        let choices = Choices::new(["  Ilimitado "], [21]);
        assert!(choices.is_plan_type("ilimitado"));
        assert!(!choices.is_plan_type("pós"));
        assert_eq!(choices.plan_types().collect::<Vec<_>>(), vec!["ilimitado"]);
        assert_eq!(choices.ddds().collect::<Vec<_>>(), vec![21]);
    }
}
