use serde::Serialize;

use super::grammar::{FunctionAst, Stmt};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchPoint {
    pub condition: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathStep {
    pub condition: String,
    pub line: usize,
    pub outcome: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathExit {
    Return { line: usize, value: Option<String> },
    Raise { line: usize, value: Option<String> },
    FallThrough,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionPath {
    pub steps: Vec<PathStep>,
    pub exit: PathExit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionStatus {
    Analyzed,
    Unsupported { construct: String, line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathReport {
    pub function_name: String,
    pub status: ExtractionStatus,
    pub cyclomatic_complexity: usize,
    pub total_branches: usize,
    pub total_paths: usize,
    /// Set when enumeration stopped at the configured path limit.
    pub truncated: bool,
    pub branches: Vec<BranchPoint>,
    pub paths: Vec<ExecutionPath>,
}

impl PathReport {
    /// Zeroed report for bodies the grammar does not model.
    pub fn unsupported(function_name: &str, construct: &str, line: usize) -> Self {
        Self {
            function_name: function_name.to_string(),
            status: ExtractionStatus::Unsupported {
                construct: construct.to_string(),
                line,
            },
            cyclomatic_complexity: 0,
            total_branches: 0,
            total_paths: 0,
            truncated: false,
            branches: Vec::new(),
            paths: Vec::new(),
        }
    }

    pub fn is_analyzed(&self) -> bool {
        self.status == ExtractionStatus::Analyzed
    }
}

pub fn build_report(function: &FunctionAst, max_paths: usize) -> PathReport {
    if let Some((construct, line)) = function.first_unsupported() {
        return PathReport::unsupported(&function.name, construct, line);
    }

    let mut branches = Vec::new();
    collect_branches(&function.body, &mut branches);

    let mut walker = PathWalker {
        limit: max_paths.max(1),
        paths: Vec::new(),
        truncated: false,
    };
    walker.walk(vec![function.body.as_slice()], &mut Vec::new());

    PathReport {
        function_name: function.name.clone(),
        status: ExtractionStatus::Analyzed,
        cyclomatic_complexity: branches.len() + 1,
        total_branches: branches.len(),
        total_paths: walker.paths.len(),
        truncated: walker.truncated,
        branches,
        paths: walker.paths,
    }
}

/// Every conditional in source order, reachable or not.
fn collect_branches(stmts: &[Stmt], out: &mut Vec<BranchPoint>) {
    for stmt in stmts {
        if let Stmt::If {
            condition,
            line,
            then_body,
            else_body,
        } = stmt
        {
            out.push(BranchPoint {
                condition: condition.clone(),
                line: *line,
            });
            collect_branches(then_body, out);
            collect_branches(else_body, out);
        }
    }
}

struct PathWalker {
    limit: usize,
    paths: Vec<ExecutionPath>,
    truncated: bool,
}

impl PathWalker {
    /// Depth-first over a stack of pending statement runs; the taken side of a
    /// branch is explored before the not-taken side.
    fn walk<'s>(&mut self, mut pending: Vec<&'s [Stmt]>, steps: &mut Vec<PathStep>) {
        if self.truncated {
            return;
        }
        loop {
            let Some(run) = pending.pop() else {
                self.finish(steps, PathExit::FallThrough);
                return;
            };
            let Some((stmt, rest)) = run.split_first() else {
                continue;
            };
            if !rest.is_empty() {
                pending.push(rest);
            }
            match stmt {
                Stmt::Return { line, value } => {
                    self.finish(
                        steps,
                        PathExit::Return {
                            line: *line,
                            value: value.clone(),
                        },
                    );
                    return;
                }
                Stmt::Raise { line, value } => {
                    self.finish(
                        steps,
                        PathExit::Raise {
                            line: *line,
                            value: value.clone(),
                        },
                    );
                    return;
                }
                Stmt::If {
                    condition,
                    line,
                    then_body,
                    else_body,
                } => {
                    for (outcome, body) in [(true, then_body), (false, else_body)] {
                        let mut next = pending.clone();
                        next.push(body.as_slice());
                        steps.push(PathStep {
                            condition: condition.clone(),
                            line: *line,
                            outcome,
                        });
                        self.walk(next, steps);
                        steps.pop();
                    }
                    return;
                }
                Stmt::Simple { .. } | Stmt::Unsupported { .. } => {}
            }
        }
    }

    fn finish(&mut self, steps: &[PathStep], exit: PathExit) {
        if self.paths.len() >= self.limit {
            self.truncated = true;
            return;
        }
        self.paths.push(ExecutionPath {
            steps: steps.to_vec(),
            exit,
        });
    }
}
