//! Configuration types deserialized from `tessera.toml`.

use serde::Deserialize;

/// Default number of optimization passes.
pub const DEFAULT_PASSES: u32 = 1;

/// Default relative-improvement tolerance for early termination.
pub const DEFAULT_TOLERANCE: f64 = 0.01;

/// Default pin count above which a net is ignored by the optimizer.
pub const DEFAULT_SKIP_NETS_LARGER_THAN: usize = 100;

/// Default random seed.
pub const DEFAULT_SEED: u64 = 1;

/// The top-level configuration parsed from `tessera.toml`.
#[derive(Debug, Default, Deserialize)]
pub struct TesseraConfig {
    /// Detailed-placement optimizer settings.
    #[serde(default)]
    pub optimize: OptimizeConfig,
}

/// Settings for the local-search optimizer.
#[derive(Debug, Clone, Deserialize)]
pub struct OptimizeConfig {
    /// Maximum number of full passes over the candidates.
    #[serde(default = "default_passes")]
    pub passes: u32,
    /// Stop when the relative change of one pass falls within this tolerance.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Nets with more pins than this are ignored.
    #[serde(default = "default_skip_nets")]
    pub skip_nets_larger_than: usize,
    /// Seed for the shared random source.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// How far a candidate may be relocated vertically.
    #[serde(default)]
    pub scope: SearchScope,
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            passes: DEFAULT_PASSES,
            tolerance: DEFAULT_TOLERANCE,
            skip_nets_larger_than: DEFAULT_SKIP_NETS_LARGER_THAN,
            seed: DEFAULT_SEED,
            scope: SearchScope::default(),
        }
    }
}

fn default_passes() -> u32 {
    DEFAULT_PASSES
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_skip_nets() -> usize {
    DEFAULT_SKIP_NETS_LARGER_THAN
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

/// Target-row search scope.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    /// Any row nearest the optimal region (long-range relocation).
    #[default]
    Unrestricted,
    /// At most two rows away from the candidate's current row.
    RowWindow,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    #[test]
    fn scope_all_variants() {
        for (input, expected) in [
            ("unrestricted", SearchScope::Unrestricted),
            ("row_window", SearchScope::RowWindow),
        ] {
            let toml = format!(
                r#"
[optimize]
scope = "{input}"
"#
            );
            let config = load_config_from_str(&toml).unwrap();
            assert_eq!(config.optimize.scope, expected);
        }
    }

    #[test]
    fn unknown_scope_is_parse_error() {
        let toml = r#"
[optimize]
scope = "diagonal"
"#;
        assert!(load_config_from_str(toml).is_err());
    }

    #[test]
    fn defaults_match_constants() {
        let opt = OptimizeConfig::default();
        assert_eq!(opt.passes, DEFAULT_PASSES);
        assert_eq!(opt.tolerance, DEFAULT_TOLERANCE);
        assert_eq!(opt.skip_nets_larger_than, 100);
        assert_eq!(opt.seed, DEFAULT_SEED);
        assert_eq!(opt.scope, SearchScope::Unrestricted);
    }
}
