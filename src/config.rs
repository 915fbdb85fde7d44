use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::diagnostics::DiagnosticsConfig;
use crate::scheduler::{RoundRobinMode, ScheduleOptions};

#[derive(Debug, Clone, Default)]
pub struct ToolkitConfig {
    pub schedule: ScheduleOptions,
    pub diagnostics: DiagnosticsConfig,
}

impl ToolkitConfig {
    /// Reads overrides from the process environment. Missing or unparsable values fall
    /// back to defaults; numeric values are clamped to sane ranges.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ToolkitConfig::from_env`] with variables resolved by `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };
        let defaults = DiagnosticsConfig::default();

        let schedule = ScheduleOptions {
            mode: if vars.flag("LEAGUE_DOUBLE_ROUND_ROBIN").unwrap_or(false) {
                RoundRobinMode::Double
            } else {
                RoundRobinMode::Single
            },
            round_interval_days: vars.parse::<i64>("LEAGUE_ROUND_INTERVAL_DAYS")
                .unwrap_or(7)
                .clamp(1, 60),
        };

        let diagnostics = DiagnosticsConfig {
            output_dir: vars.opt("DIAG_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            min_rest_days: vars.parse::<i64>("DIAG_MIN_REST_DAYS")
                .unwrap_or(defaults.min_rest_days)
                .clamp(0, 30),
            max_venue_streak: vars.parse::<usize>("DIAG_MAX_VENUE_STREAK")
                .unwrap_or(defaults.max_venue_streak)
                .max(1),
            max_home_away_imbalance: vars.parse::<usize>("DIAG_MAX_HOME_AWAY_IMBALANCE")
                .unwrap_or(defaults.max_home_away_imbalance),
            congestion_window_days: vars.parse::<i64>("DIAG_CONGESTION_WINDOW_DAYS")
                .unwrap_or(defaults.congestion_window_days)
                .clamp(1, 90),
            congestion_max_matches: vars.parse::<usize>("DIAG_CONGESTION_MAX_MATCHES")
                .unwrap_or(defaults.congestion_max_matches)
                .max(1),
            workload_window_days: vars.parse::<i64>("DIAG_WORKLOAD_WINDOW_DAYS")
                .unwrap_or(defaults.workload_window_days)
                .clamp(1, 365),
            form_window: vars.parse::<usize>("DIAG_FORM_WINDOW")
                .unwrap_or(defaults.form_window)
                .clamp(1, 20),
            trend_threshold: vars.parse::<f64>("DIAG_TREND_THRESHOLD")
                .unwrap_or(defaults.trend_threshold)
                .clamp(0.0, 3.0),
            max_paths: vars.parse::<usize>("DIAG_MAX_PATHS")
                .unwrap_or(defaults.max_paths)
                .clamp(1, 1 << 20),
            testgen_seed: vars.parse::<u64>("DIAG_TESTGEN_SEED").unwrap_or(defaults.testgen_seed),
        };

        Self {
            schedule,
            diagnostics,
        }
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn opt(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|val| !val.trim().is_empty())
    }

    fn parse<T: FromStr>(&self, key: &str) -> Option<T> {
        self.opt(key).and_then(|val| val.trim().parse::<T>().ok())
    }

    fn flag(&self, key: &str) -> Option<bool> {
        let raw = self.opt(key)?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ToolkitConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ToolkitConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn no_variables_gives_defaults() {
        let cfg = config_from(&[]);
        assert_eq!(cfg.schedule, ScheduleOptions::default());
        assert_eq!(cfg.diagnostics, DiagnosticsConfig::default());
    }

    #[test]
    fn flags_accept_common_spellings() {
        for (raw, mode) in [
            (" Yes ", RoundRobinMode::Double),
            ("on", RoundRobinMode::Double),
            ("0", RoundRobinMode::Single),
            ("maybe", RoundRobinMode::Single),
        ] {
            let cfg = config_from(&[("LEAGUE_DOUBLE_ROUND_ROBIN", raw)]);
            assert_eq!(cfg.schedule.mode, mode, "{raw}");
        }
    }

    #[test]
    fn numbers_are_parsed_and_clamped() {
        let cfg = config_from(&[
            ("LEAGUE_ROUND_INTERVAL_DAYS", " 3 "),
            ("DIAG_FORM_WINDOW", "100"),
            ("DIAG_TREND_THRESHOLD", "-1"),
            ("DIAG_MIN_REST_DAYS", "twelve"),
            ("DIAG_OUTPUT_DIR", "   "),
            ("DIAG_TESTGEN_SEED", "7"),
        ]);
        assert_eq!(cfg.schedule.round_interval_days, 3);
        assert_eq!(cfg.diagnostics.form_window, 20);
        assert_eq!(cfg.diagnostics.trend_threshold, 0.0);
        assert_eq!(cfg.diagnostics.min_rest_days, 3);
        assert_eq!(cfg.diagnostics.output_dir, PathBuf::from("diagnostics_output"));
        assert_eq!(cfg.diagnostics.testgen_seed, 7);
    }
}
