//! Read-only analyses over a season snapshot, plus the symbolic path extractor.
//!
//! Every analyzer is a pure function of an [`AnalysisSnapshot`] and the configured
//! thresholds. The engine methods add optional persistence on top: with
//! `save_results` the output is written through [`ResultSink`]; a failed write is
//! logged and never fails the analysis.

pub mod anomalies;
pub mod compliance;
pub mod congestion;
pub mod sink;
pub mod summary;
pub mod symbolic;
pub mod testgen;
pub mod trends;
pub mod workload;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::snapshot::AnalysisSnapshot;

pub use anomalies::{Anomaly, AnomalyKind};
pub use compliance::{RuleKind, RuleViolation};
pub use congestion::CongestionZone;
pub use sink::ResultSink;
pub use summary::{MatchLine, SeasonStatistics, SeasonSummary};
pub use symbolic::PathReport;
pub use testgen::{CaseCategory, HarnessSummary, ParamKind, TestCase, TestDataSet};
pub use trends::{TeamTrend, Trend};
pub use workload::TeamWorkload;

#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticsConfig {
    pub output_dir: PathBuf,
    /// Fewer days than this between two matches of one team is a violation.
    pub min_rest_days: i64,
    pub max_venue_streak: usize,
    /// Allowed |home - away| per team within one leg.
    pub max_home_away_imbalance: usize,
    pub congestion_window_days: i64,
    /// More matches than this inside one congestion window is a zone.
    pub congestion_max_matches: usize,
    pub workload_window_days: i64,
    pub form_window: usize,
    /// Minimum gap between recent and season points-per-game to call a trend.
    pub trend_threshold: f64,
    pub max_paths: usize,
    pub testgen_seed: u64,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("diagnostics_output"),
            min_rest_days: 3,
            max_venue_streak: 3,
            max_home_away_imbalance: 1,
            congestion_window_days: 7,
            congestion_max_matches: 1,
            workload_window_days: 14,
            form_window: 5,
            trend_threshold: 0.5,
            max_paths: symbolic::DEFAULT_MAX_PATHS,
            testgen_seed: 42,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsReport {
    pub anomalies: Vec<Anomaly>,
    pub workload: Vec<TeamWorkload>,
    pub congestion: Vec<CongestionZone>,
    pub violations: Vec<RuleViolation>,
    pub trends: Vec<TeamTrend>,
    pub summary: SeasonSummary,
}

#[derive(Debug, Clone)]
pub struct DiagnosticsEngine {
    config: DiagnosticsConfig,
    sink: ResultSink,
}

impl Default for DiagnosticsEngine {
    fn default() -> Self {
        Self::new(DiagnosticsConfig::default())
    }
}

impl DiagnosticsEngine {
    pub fn new(config: DiagnosticsConfig) -> Self {
        let sink = ResultSink::new(config.output_dir.clone());
        Self { config, sink }
    }

    pub fn config(&self) -> &DiagnosticsConfig {
        &self.config
    }

    pub fn detect_scheduling_anomalies(&self, snapshot: &AnalysisSnapshot<'_>, save_results: bool) -> Vec<Anomaly> {
        let out = anomalies::detect_scheduling_anomalies(snapshot);
        self.persist("scheduling_anomalies", &out, save_results);
        out
    }

    pub fn analyse_team_workload(&self, snapshot: &AnalysisSnapshot<'_>, save_results: bool) -> Vec<TeamWorkload> {
        let out = workload::analyse_team_workload(snapshot, self.config.workload_window_days);
        self.persist("team_workload", &out, save_results);
        out
    }

    pub fn identify_fixture_congestion(
        &self,
        snapshot: &AnalysisSnapshot<'_>,
        save_results: bool,
    ) -> Vec<CongestionZone> {
        let out = congestion::identify_fixture_congestion(
            snapshot,
            self.config.congestion_window_days,
            self.config.congestion_max_matches,
        );
        self.persist("fixture_congestion", &out, save_results);
        out
    }

    pub fn check_rule_compliance(&self, snapshot: &AnalysisSnapshot<'_>, save_results: bool) -> Vec<RuleViolation> {
        let out = compliance::check_rule_compliance(snapshot, &self.config);
        self.persist("rule_compliance", &out, save_results);
        out
    }

    pub fn predict_outcome_trends(&self, snapshot: &AnalysisSnapshot<'_>, save_results: bool) -> Vec<TeamTrend> {
        let out = trends::predict_outcome_trends(
            snapshot,
            self.config.form_window,
            self.config.trend_threshold,
        );
        self.persist("outcome_trends", &out, save_results);
        out
    }

    pub fn generate_season_summary(&self, snapshot: &AnalysisSnapshot<'_>, save_results: bool) -> SeasonSummary {
        let out = summary::generate_season_summary(snapshot);
        self.persist("season_summary", &out, save_results);
        out
    }

    pub fn generate_test_data(
        &self,
        function_name: &str,
        params: &BTreeMap<String, ParamKind>,
        save_results: bool,
    ) -> TestDataSet {
        let out = testgen::generate_test_data(function_name, params, self.config.testgen_seed);
        self.persist(&format!("test_data_{}", file_stem(function_name)), &out, save_results);
        out
    }

    /// Fails only when the function is missing or its layout cannot be parsed;
    /// unsupported constructs come back as a zeroed report.
    pub fn extract_symbolic_paths(
        &self,
        source: &str,
        function_name: &str,
        save_results: bool,
    ) -> Result<PathReport> {
        let out = symbolic::extract_symbolic_paths_with_limit(source, function_name, self.config.max_paths)?;
        self.persist(&format!("symbolic_paths_{}", file_stem(function_name)), &out, save_results);
        Ok(out)
    }

    /// Runs the six snapshot analyzers in parallel over the same borrowed snapshot.
    pub fn run_all(&self, snapshot: &AnalysisSnapshot<'_>, save_results: bool) -> DiagnosticsReport {
        let cfg = &self.config;
        let ((anomalies, workload), ((congestion, violations), (trends, summary))) = rayon::join(
            || {
                rayon::join(
                    || anomalies::detect_scheduling_anomalies(snapshot),
                    || workload::analyse_team_workload(snapshot, cfg.workload_window_days),
                )
            },
            || {
                rayon::join(
                    || {
                        rayon::join(
                            || {
                                congestion::identify_fixture_congestion(
                                    snapshot,
                                    cfg.congestion_window_days,
                                    cfg.congestion_max_matches,
                                )
                            },
                            || compliance::check_rule_compliance(snapshot, cfg),
                        )
                    },
                    || {
                        rayon::join(
                            || trends::predict_outcome_trends(snapshot, cfg.form_window, cfg.trend_threshold),
                            || summary::generate_season_summary(snapshot),
                        )
                    },
                )
            },
        );

        let report = DiagnosticsReport {
            anomalies,
            workload,
            congestion,
            violations,
            trends,
            summary,
        };
        info!(
            anomalies = report.anomalies.len(),
            congestion = report.congestion.len(),
            violations = report.violations.len(),
            played = report.summary.matches_played,
            "diagnostics run complete"
        );
        self.persist("diagnostics_report", &report, save_results);
        report
    }

    fn persist<T: Serialize>(&self, name: &str, value: &T, save_results: bool) {
        if !save_results {
            return;
        }
        match self.sink.save(name, value) {
            Ok(path) => info!(path = %path.display(), "diagnostics saved"),
            Err(err) => warn!("failed to save {name}: {err:#}"),
        }
    }
}

fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() { "unnamed".to_string() } else { stem }
}
