//! Property-test run profile read from the environment.
//!
//! `PROPTEST_CASES` overrides the number of cases per property and
//! `OPFOREST_PBT_FORK` toggles forked execution. An override that does not
//! parse is reported with `warn!` and the suite default is kept.

use std::env;

/// Environment variable controlling proptest case counts.
pub const PROPTEST_CASES_ENV_KEY: &str = "PROPTEST_CASES";
/// Environment variable controlling proptest process forking.
pub const OPFOREST_PBT_FORK_ENV_KEY: &str = "OPFOREST_PBT_FORK";

/// Case count and fork mode for one property suite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProptestRunProfile {
    cases: u32,
    fork: bool,
}

impl ProptestRunProfile {
    /// Reads overrides from the process environment.
    ///
    /// # Examples
    ///
    /// ```
    /// use opforest_test_support::ci::property_test_profile::ProptestRunProfile;
    ///
    /// let profile = ProptestRunProfile::load(64, false);
    /// assert!(profile.cases() > 0);
    /// ```
    #[must_use]
    pub fn load(default_cases: u32, default_fork: bool) -> Self {
        Self::from_lookup(default_cases, default_fork, |key| env::var(key).ok())
    }

    /// Reads overrides through `lookup`, which maps a variable name to its
    /// raw value.
    ///
    /// # Examples
    ///
    /// ```
    /// use opforest_test_support::ci::property_test_profile::{
    ///     PROPTEST_CASES_ENV_KEY, ProptestRunProfile,
    /// };
    ///
    /// let profile = ProptestRunProfile::from_lookup(64, false, |key| {
    ///     (key == PROPTEST_CASES_ENV_KEY).then(|| "512".to_owned())
    /// });
    /// assert_eq!(profile.cases(), 512);
    /// assert!(!profile.fork());
    /// ```
    #[must_use]
    pub fn from_lookup(
        default_cases: u32,
        default_fork: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        Self {
            cases: override_or(
                PROPTEST_CASES_ENV_KEY,
                lookup(PROPTEST_CASES_ENV_KEY),
                default_cases,
                parse_cases,
            ),
            fork: override_or(
                OPFOREST_PBT_FORK_ENV_KEY,
                lookup(OPFOREST_PBT_FORK_ENV_KEY),
                default_fork,
                parse_switch,
            ),
        }
    }

    /// Number of cases to run per property.
    #[must_use]
    pub fn cases(&self) -> u32 {
        self.cases
    }

    /// Whether proptest should fork a subprocess per case.
    #[must_use]
    pub fn fork(&self) -> bool {
        self.fork
    }
}

fn override_or<T>(
    key: &str,
    raw: Option<String>,
    default: T,
    parse: fn(&str) -> Option<T>,
) -> T {
    let Some(raw) = raw else {
        return default;
    };
    parse(raw.trim()).unwrap_or_else(|| {
        tracing::warn!(env = key, raw = %raw, "ignoring unparseable property-test override");
        default
    })
}

fn parse_cases(raw: &str) -> Option<u32> {
    raw.parse::<u32>().ok().filter(|&cases| cases > 0)
}

fn parse_switch(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn profile_with(cases: Option<&str>, fork: Option<&str>) -> ProptestRunProfile {
        ProptestRunProfile::from_lookup(64, false, |key| match key {
            PROPTEST_CASES_ENV_KEY => cases.map(str::to_owned),
            OPFOREST_PBT_FORK_ENV_KEY => fork.map(str::to_owned),
            _ => None,
        })
    }

    #[test]
    fn defaults_apply_without_overrides() {
        assert_eq!(
            profile_with(None, None),
            ProptestRunProfile {
                cases: 64,
                fork: false
            }
        );
    }

    #[rstest]
    #[case("1", 1)]
    #[case(" 2048 ", 2048)]
    #[case("0", 64)]
    #[case("-3", 64)]
    #[case("many", 64)]
    fn case_overrides_must_be_positive(#[case] raw: &str, #[case] expected: u32) {
        assert_eq!(profile_with(Some(raw), None).cases(), expected);
    }

    #[rstest]
    #[case("ON", true)]
    #[case("yes", true)]
    #[case("1", true)]
    #[case("off", false)]
    #[case("0", false)]
    #[case("sometimes", false)]
    #[case("", false)]
    fn fork_overrides_accept_common_switch_words(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(profile_with(None, Some(raw)).fork(), expected);
    }
}
