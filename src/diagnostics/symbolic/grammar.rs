//! Indentation-structured conditional grammar read by the path extractor.
//!
//! ```text
//! function    := ["async"] "def" IDENT "(" ... ")" [ "->" ... ] ":" body
//! block       := statement+              one indentation level, deeper than its header
//! statement   := if_stmt | return_stmt | raise_stmt | with_stmt | def_stmt
//!              | unsupported_stmt | simple_stmt
//! if_stmt     := "if" COND ":" body ( "elif" COND ":" body )* [ "else" ":" body ]
//! body        := NEWLINE block | inline_stmt
//! return_stmt := "return" [EXPR]
//! raise_stmt  := "raise" [EXPR]
//! with_stmt   := "with" ... ":" body          body runs inline
//! def_stmt    := nested "def" / "class"       body skipped
//! unsupported := "for" | "while" | "try" | "except" | "finally" | "match" | "case"
//!                                      soft keywords only when followed by a header colon
//! simple_stmt := anything else; deeper-indented follow-on lines are continuation
//! ```
//!
//! Blank lines and `#` comments are skipped. Open brackets, open triple-quoted
//! strings and trailing backslashes join physical lines into one logical line.
//! Tabs advance to the next multiple of four columns. A header's colon is the
//! first `:` outside brackets and string literals.

use crate::error::{LeagueError, Result};

const TAB_WIDTH: usize = 4;
const UNSUPPORTED: &[&str] = &["for", "while", "try", "except", "finally", "match", "case"];
const SOFT_KEYWORDS: &[&str] = &["match", "case"];
const TRAILING_CLAUSES: &[&str] = &["elif", "else", "except", "finally", "case"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    If {
        condition: String,
        line: usize,
        then_body: Vec<Stmt>,
        else_body: Vec<Stmt>,
    },
    Return {
        line: usize,
        value: Option<String>,
    },
    Raise {
        line: usize,
        value: Option<String>,
    },
    Simple {
        line: usize,
    },
    Unsupported {
        construct: String,
        line: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionAst {
    pub name: String,
    pub line: usize,
    pub body: Vec<Stmt>,
}

impl FunctionAst {
    /// First construct outside the grammar, in source order.
    pub fn first_unsupported(&self) -> Option<(&str, usize)> {
        fn scan(stmts: &[Stmt]) -> Option<(&str, usize)> {
            for stmt in stmts {
                match stmt {
                    Stmt::Unsupported { construct, line } => return Some((construct.as_str(), *line)),
                    Stmt::If {
                        then_body,
                        else_body,
                        ..
                    } => {
                        if let Some(found) = scan(then_body).or_else(|| scan(else_body)) {
                            return Some(found);
                        }
                    }
                    _ => {}
                }
            }
            None
        }
        scan(&self.body)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LogicalLine {
    number: usize,
    indent: usize,
    text: String,
}

impl LogicalLine {
    fn keyword(&self) -> &str {
        leading_word(&self.text)
    }
}

/// Locates `function_name` in `source` and parses its body. `Ok(None)` when no
/// such function is defined.
pub fn parse_function(source: &str, function_name: &str) -> Result<Option<FunctionAst>> {
    let lines = logical_lines(source);
    let target = function_name.trim();
    let Some(start) = lines
        .iter()
        .position(|l| def_name(&l.text).is_some_and(|name| name == target))
    else {
        return Ok(None);
    };

    let header = &lines[start];
    let Some(colon) = find_header_colon(&header.text) else {
        return Err(LeagueError::parse(header.number, "function header is missing ':'"));
    };
    let inline = header.text[colon + 1..].trim().to_string();
    let (number, indent) = (header.number, header.indent);

    let mut parser = Parser {
        lines: &lines,
        pos: start + 1,
    };
    let body = parser.parse_body(indent, number, &inline)?;
    Ok(Some(FunctionAst {
        name: target.to_string(),
        line: number,
        body,
    }))
}

struct Parser<'a> {
    lines: &'a [LogicalLine],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a LogicalLine> {
        self.lines.get(self.pos)
    }

    fn parse_body(&mut self, parent_indent: usize, header_line: usize, inline: &str) -> Result<Vec<Stmt>> {
        if inline.is_empty() {
            self.parse_block(parent_indent, header_line)
        } else {
            Ok(vec![inline_stmt(inline, header_line)])
        }
    }

    fn parse_block(&mut self, parent_indent: usize, header_line: usize) -> Result<Vec<Stmt>> {
        let block_indent = match self.peek() {
            Some(line) if line.indent > parent_indent => line.indent,
            _ => return Err(LeagueError::parse(header_line, "expected an indented block")),
        };
        let mut out = Vec::new();
        while let Some(line) = self.peek() {
            if line.indent <= parent_indent {
                break;
            }
            if line.indent < block_indent {
                return Err(LeagueError::parse(line.number, "unindent does not match any outer level"));
            }
            if line.indent > block_indent {
                return Err(LeagueError::parse(line.number, "unexpected indent"));
            }
            self.parse_statement(block_indent, &mut out)?;
        }
        Ok(out)
    }

    fn parse_statement(&mut self, indent: usize, out: &mut Vec<Stmt>) -> Result<()> {
        let Some(line) = self.peek() else {
            return Ok(());
        };
        let mut keyword = line.keyword();
        let mut rest = line.text[keyword.len()..].trim_start();
        if keyword == "async" {
            keyword = leading_word(rest);
            rest = rest[keyword.len()..].trim_start();
        }

        match keyword {
            "if" => {
                out.push(self.parse_if(indent)?);
            }
            "elif" | "else" => {
                return Err(LeagueError::parse(
                    line.number,
                    format!("'{keyword}' without a matching 'if'"),
                ));
            }
            "return" | "raise" => {
                self.pos += 1;
                self.skip_deeper(indent);
                let value = (!rest.is_empty()).then(|| rest.to_string());
                out.push(if keyword == "return" {
                    Stmt::Return {
                        line: line.number,
                        value,
                    }
                } else {
                    Stmt::Raise {
                        line: line.number,
                        value,
                    }
                });
            }
            "with" => {
                let Some(colon) = find_header_colon(rest) else {
                    return Err(LeagueError::parse(line.number, "'with' header is missing ':'"));
                };
                self.pos += 1;
                let body = self.parse_body(indent, line.number, rest[colon + 1..].trim())?;
                out.extend(body);
            }
            "def" | "class" => {
                self.pos += 1;
                self.skip_deeper(indent);
                out.push(Stmt::Simple { line: line.number });
            }
            kw if opens_unsupported_block(kw, rest) => {
                self.pos += 1;
                self.skip_deeper(indent);
                while let Some(next) = self.peek() {
                    if next.indent != indent || !TRAILING_CLAUSES.contains(&next.keyword()) {
                        break;
                    }
                    self.pos += 1;
                    self.skip_deeper(indent);
                }
                out.push(Stmt::Unsupported {
                    construct: kw.to_string(),
                    line: line.number,
                });
            }
            _ => {
                self.pos += 1;
                self.skip_deeper(indent);
                out.push(Stmt::Simple { line: line.number });
            }
        }
        Ok(())
    }

    /// Handles the current `if` or `elif` line plus any trailing `elif`/`else`.
    fn parse_if(&mut self, indent: usize) -> Result<Stmt> {
        let Some(line) = self.peek() else {
            return Err(LeagueError::parse(0, "unexpected end of input"));
        };
        let rest = line.text[line.keyword().len()..].trim_start();
        let Some(colon) = find_header_colon(rest) else {
            return Err(LeagueError::parse(line.number, "conditional header is missing ':'"));
        };
        let condition = rest[..colon].trim();
        if condition.is_empty() {
            return Err(LeagueError::parse(line.number, "conditional has an empty condition"));
        }
        self.pos += 1;
        let then_body = self.parse_body(indent, line.number, rest[colon + 1..].trim())?;

        let mut else_body = Vec::new();
        if let Some(next) = self.peek().filter(|l| l.indent == indent) {
            match next.keyword() {
                "elif" => else_body.push(self.parse_if(indent)?),
                "else" => {
                    let tail = next.text["else".len()..].trim_start();
                    let Some(colon) = find_header_colon(tail).filter(|&c| tail[..c].trim().is_empty()) else {
                        return Err(LeagueError::parse(next.number, "malformed 'else' header"));
                    };
                    self.pos += 1;
                    else_body = self.parse_body(indent, next.number, tail[colon + 1..].trim())?;
                }
                _ => {}
            }
        }

        Ok(Stmt::If {
            condition: condition.to_string(),
            line: line.number,
            then_body,
            else_body,
        })
    }

    fn skip_deeper(&mut self, indent: usize) {
        while self.peek().is_some_and(|l| l.indent > indent) {
            self.pos += 1;
        }
    }
}

fn inline_stmt(text: &str, line: usize) -> Stmt {
    let keyword = leading_word(text);
    let rest = text[keyword.len()..].trim();
    let value = (!rest.is_empty()).then(|| rest.to_string());
    match keyword {
        "return" => Stmt::Return { line, value },
        "raise" => Stmt::Raise { line, value },
        kw if kw == "if" || opens_unsupported_block(kw, rest) => Stmt::Unsupported {
            construct: format!("inline {kw}"),
            line,
        },
        _ => Stmt::Simple { line },
    }
}

/// `match` and `case` are only keywords in block headers; `match(x)` or
/// `case = 1` are ordinary statements.
fn opens_unsupported_block(keyword: &str, rest: &str) -> bool {
    if !UNSUPPORTED.contains(&keyword) || rest.starts_with(['=', '.']) {
        return false;
    }
    if SOFT_KEYWORDS.contains(&keyword) {
        return find_header_colon(rest)
            .is_some_and(|colon| !rest[..colon].trim().is_empty() && rest[colon + 1..].trim().is_empty());
    }
    true
}

fn def_name(text: &str) -> Option<&str> {
    let text = text.strip_prefix("async").map(str::trim_start).unwrap_or(text);
    let rest = text.strip_prefix("def")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let name = leading_word(rest.trim_start());
    (!name.is_empty()).then_some(name)
}

fn leading_word(text: &str) -> &str {
    let end = text
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    &text[..end]
}

fn indent_width(raw: &str) -> usize {
    let mut width = 0;
    for c in raw.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width = (width / TAB_WIDTH + 1) * TAB_WIDTH,
            _ => break,
        }
    }
    width
}

/// Tracks string literals and bracket depth across physical lines. Triple-quoted
/// strings may span lines; single-quoted ones end with their line.
#[derive(Debug, Default)]
struct CodeScanner {
    quote: Option<&'static str>,
    depth: i32,
}

impl CodeScanner {
    fn in_string(&self) -> bool {
        self.quote.is_some()
    }

    /// Calls `visit` for each character outside string literals with the bracket
    /// depth before it; stops early when `visit` returns `false`.
    fn scan(&mut self, text: &str, mut visit: impl FnMut(usize, char, i32) -> bool) {
        let mut skip = 0;
        let mut escaped = false;
        for (idx, c) in text.char_indices() {
            if skip > 0 {
                skip -= 1;
                continue;
            }
            if let Some(delim) = self.quote {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if text[idx..].starts_with(delim) {
                    self.quote = None;
                    skip = delim.len() - 1;
                }
                continue;
            }
            if !visit(idx, c, self.depth) {
                return;
            }
            match c {
                '"' | '\'' => {
                    let delim = opening_delimiter(&text[idx..], c);
                    self.quote = Some(delim);
                    skip = delim.len() - 1;
                }
                '(' | '[' | '{' => self.depth += 1,
                ')' | ']' | '}' => self.depth -= 1,
                _ => {}
            }
        }
    }

    fn end_line(&mut self) {
        if matches!(self.quote, Some("\"" | "'")) {
            self.quote = None;
        }
        self.depth = self.depth.max(0);
    }
}

fn opening_delimiter(rest: &str, quote: char) -> &'static str {
    match quote {
        '"' if rest.starts_with("\"\"\"") => "\"\"\"",
        '"' => "\"",
        _ if rest.starts_with("'''") => "'''",
        _ => "'",
    }
}

fn find_header_colon(text: &str) -> Option<usize> {
    let mut found = None;
    CodeScanner::default().scan(text, |idx, c, depth| {
        if c == ':' && depth == 0 {
            found = Some(idx);
            false
        } else {
            true
        }
    });
    found
}

/// A logical line continues while brackets or a triple-quoted string are open,
/// or after a trailing backslash. Comments are cut at the first `#` outside a
/// string literal.
fn logical_lines(source: &str) -> Vec<LogicalLine> {
    let mut out: Vec<LogicalLine> = Vec::new();
    let mut scanner = CodeScanner::default();
    let mut continued = false;

    for (idx, raw) in source.lines().enumerate() {
        let joining = continued || scanner.depth > 0 || scanner.in_string();
        let trimmed = raw.trim();
        if !joining && (trimmed.is_empty() || trimmed.starts_with('#')) {
            continue;
        }

        let mut cut = trimmed.len();
        scanner.scan(trimmed, |i, c, _| {
            if c == '#' {
                cut = i;
                false
            } else {
                true
            }
        });
        let open_string = scanner.in_string();
        scanner.end_line();

        let code = trimmed[..cut].trim_end();
        continued = !open_string && code.ends_with('\\');
        let code = if continued { code.trim_end_matches('\\').trim_end() } else { code };

        match out.last_mut() {
            Some(last) if joining => {
                if !code.is_empty() {
                    last.text.push(' ');
                    last.text.push_str(code);
                }
            }
            _ => out.push(LogicalLine {
                number: idx + 1,
                indent: indent_width(raw),
                text: code.to_string(),
            }),
        }
    }
    out
}
