//! Branch structure and execution paths of a single function body.

pub mod grammar;
pub mod paths;

use tracing::debug;

use crate::error::{LeagueError, Result};

pub use grammar::{FunctionAst, Stmt, parse_function};
pub use paths::{BranchPoint, ExecutionPath, ExtractionStatus, PathExit, PathReport, PathStep};

pub const DEFAULT_MAX_PATHS: usize = 1024;

pub fn extract_symbolic_paths(source: &str, function_name: &str) -> Result<PathReport> {
    extract_symbolic_paths_with_limit(source, function_name, DEFAULT_MAX_PATHS)
}

/// Complexity is `branches + 1` by syntactic count; enumeration stops after
/// `max_paths` paths and marks the report truncated.
pub fn extract_symbolic_paths_with_limit(
    source: &str,
    function_name: &str,
    max_paths: usize,
) -> Result<PathReport> {
    let Some(function) = parse_function(source, function_name)? else {
        return Err(LeagueError::not_found(format!(
            "function not found: '{}'",
            function_name.trim()
        )));
    };
    let report = paths::build_report(&function, max_paths);
    debug!(
        function = %report.function_name,
        branches = report.total_branches,
        paths = report.total_paths,
        truncated = report.truncated,
        "symbolic paths extracted"
    );
    Ok(report)
}
