//! Seeded synthetic inputs for exercising validation functions.
//!
//! Each parameter gets a handful of valid values, a few boundary values that a
//! correct validator still accepts, and invalid values (wrong type, empty,
//! malformed) it must reject. Cases are keyed by parameter name so a caller can
//! feed them straight into a predicate with [`run_test_harness`].

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::LeagueError;
use crate::scheduler::DATE_FORMAT;

const VALID_CASES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    String,
    Int,
    Float,
    Bool,
    Date,
}

impl FromStr for ParamKind {
    type Err = LeagueError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "string" | "str" | "text" => Ok(ParamKind::String),
            "int" | "integer" => Ok(ParamKind::Int),
            "float" | "number" | "decimal" => Ok(ParamKind::Float),
            "bool" | "boolean" => Ok(ParamKind::Bool),
            "date" => Ok(ParamKind::Date),
            other => Err(LeagueError::validation(format!("unknown parameter type '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseCategory {
    Valid,
    Boundary,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestCase {
    pub id: usize,
    pub name: String,
    pub category: CaseCategory,
    pub inputs: Map<String, Value>,
    pub expect_valid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestDataSet {
    pub function_name: String,
    pub parameters: BTreeMap<String, ParamKind>,
    pub cases: Vec<TestCase>,
    pub total_generated: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarnessSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    /// Names of cases where the predicate disagreed with `expect_valid`.
    pub failures: Vec<String>,
}

pub fn generate_test_data(function_name: &str, params: &BTreeMap<String, ParamKind>, seed: u64) -> TestDataSet {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut cases = Vec::new();

    let valid_rows: Vec<Map<String, Value>> = (0..VALID_CASES)
        .map(|_| {
            params
                .iter()
                .map(|(name, kind)| (name.clone(), valid_value(*kind, &mut rng)))
                .collect()
        })
        .collect();
    // Boundary and invalid cases vary one parameter against this row.
    let baseline = valid_rows.first().cloned().unwrap_or_default();

    for (i, inputs) in valid_rows.into_iter().enumerate() {
        push_case(&mut cases, format!("valid_{}", i + 1), CaseCategory::Valid, inputs, true);
    }
    for (name, kind) in params {
        for (i, value) in boundary_values(*kind).into_iter().enumerate() {
            let mut inputs = baseline.clone();
            inputs.insert(name.clone(), value);
            push_case(&mut cases, format!("boundary_{name}_{}", i + 1), CaseCategory::Boundary, inputs, true);
        }
        for (i, value) in invalid_values(*kind).into_iter().enumerate() {
            let mut inputs = baseline.clone();
            inputs.insert(name.clone(), value);
            push_case(&mut cases, format!("invalid_{name}_{}", i + 1), CaseCategory::Invalid, inputs, false);
        }
    }

    debug!(function = function_name, cases = cases.len(), seed, "test data generated");
    TestDataSet {
        function_name: function_name.to_string(),
        parameters: params.clone(),
        total_generated: cases.len(),
        cases,
    }
}

/// Runs every case through `predicate` and compares its verdict with the
/// case's expectation.
pub fn run_test_harness<F>(data: &TestDataSet, predicate: F) -> HarnessSummary
where
    F: Fn(&Map<String, Value>) -> bool,
{
    let failures: Vec<String> = data
        .cases
        .iter()
        .filter(|case| predicate(&case.inputs) != case.expect_valid)
        .map(|case| case.name.clone())
        .collect();
    HarnessSummary {
        total: data.cases.len(),
        passed: data.cases.len() - failures.len(),
        failed: failures.len(),
        failures,
    }
}

fn push_case(cases: &mut Vec<TestCase>, name: String, category: CaseCategory, inputs: Map<String, Value>, expect_valid: bool) {
    cases.push(TestCase {
        id: cases.len() + 1,
        name,
        category,
        inputs,
        expect_valid,
    });
}

fn valid_value(kind: ParamKind, rng: &mut StdRng) -> Value {
    match kind {
        ParamKind::String => {
            let len = rng.gen_range(3..=12);
            let s: String = (0..len).map(|_| char::from(rng.sample(Alphanumeric))).collect();
            json!(s)
        }
        ParamKind::Int => json!(rng.gen_range(1..=1000i64)),
        ParamKind::Float => json!((rng.gen_range(0.0..100.0f64) * 100.0).round() / 100.0),
        ParamKind::Bool => json!(rng.gen_bool(0.5)),
        ParamKind::Date => {
            let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
            let date = base + Duration::days(rng.gen_range(0..366));
            json!(date.format(DATE_FORMAT).to_string())
        }
    }
}

fn boundary_values(kind: ParamKind) -> Vec<Value> {
    match kind {
        ParamKind::String => vec![json!("a"), json!("x".repeat(255))],
        ParamKind::Int => vec![json!(0), json!(i32::MAX)],
        ParamKind::Float => vec![json!(0.0), json!(1.0e9)],
        ParamKind::Bool => vec![json!(true), json!(false)],
        ParamKind::Date => vec![json!("2024-02-29"), json!("1970-01-01"), json!("9999-12-31")],
    }
}

fn invalid_values(kind: ParamKind) -> Vec<Value> {
    match kind {
        ParamKind::String => vec![json!(""), json!("   "), Value::Null, json!(42)],
        ParamKind::Int => vec![json!("42"), json!(1.5), Value::Null],
        ParamKind::Float => vec![json!("abc"), json!(true), Value::Null],
        ParamKind::Bool => vec![json!("yes"), json!(1), Value::Null],
        ParamKind::Date => vec![json!("2024-13-01"), json!("2023-02-29"), json!("not-a-date"), Value::Null],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team_params() -> BTreeMap<String, ParamKind> {
        BTreeMap::from([
            ("name".to_string(), ParamKind::String),
            ("stadium".to_string(), ParamKind::String),
        ])
    }

    fn non_blank(inputs: &Map<String, Value>, key: &str) -> bool {
        inputs
            .get(key)
            .and_then(Value::as_str)
            .is_some_and(|s| !s.trim().is_empty())
    }

    #[test]
    fn parses_kind_aliases() {
        assert_eq!("Integer".parse::<ParamKind>().unwrap(), ParamKind::Int);
        assert_eq!(" str ".parse::<ParamKind>().unwrap(), ParamKind::String);
        assert!("tuple".parse::<ParamKind>().is_err());
    }

    #[test]
    fn same_seed_same_cases() {
        let a = generate_test_data("validate_team", &team_params(), 7);
        let b = generate_test_data("validate_team", &team_params(), 7);
        let c = generate_test_data("validate_team", &team_params(), 8);
        assert_eq!(a, b);
        assert_ne!(a.cases[0].inputs, c.cases[0].inputs);
    }

    #[test]
    fn counts_cases_per_category() {
        let data = generate_test_data("validate_team", &team_params(), 42);
        assert_eq!(data.total_generated, 3 + 2 * 2 + 2 * 4);
        let invalid = data.cases.iter().filter(|c| c.category == CaseCategory::Invalid).count();
        assert_eq!(invalid, 8);
        assert!(data.cases.iter().enumerate().all(|(i, c)| c.id == i + 1));
    }

    #[test]
    fn harness_scores_a_matching_validator() {
        let data = generate_test_data("validate_team", &team_params(), 42);
        let summary = run_test_harness(&data, |inputs| non_blank(inputs, "name") && non_blank(inputs, "stadium"));
        assert_eq!(summary.failed, 0, "{:?}", summary.failures);
        assert_eq!(summary.passed, data.total_generated);

        let lax = run_test_harness(&data, |_| true);
        assert_eq!(lax.failed, 8);
    }

    #[test]
    fn valid_dates_parse() {
        let params = BTreeMap::from([("kickoff".to_string(), ParamKind::Date)]);
        let data = generate_test_data("schedule", &params, 1);
        for case in data.cases.iter().filter(|c| c.category == CaseCategory::Valid) {
            let raw = case.inputs["kickoff"].as_str().unwrap();
            assert!(NaiveDate::parse_from_str(raw, DATE_FORMAT).is_ok());
        }
    }
}
