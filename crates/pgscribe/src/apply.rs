//! Migration/index application.
//!
//! Reads a SQL file, splits it into statements, and runs each statement
//! in its own transaction. "Already exists" failures roll back and count
//! as skips; any other failure rolls back, is logged, and execution moves
//! on to the next statement. A statement error never aborts the run.
//!
//! The splitter is a real scanner rather than a bare `split(';')`:
//! semicolons inside string literals, comments, and dollar-quoted bodies
//! do not terminate a statement.

use crate::{Error, Result};
use std::path::Path;
use tokio_postgres::Client;
use tokio_postgres::error::SqlState;

/// Outcome counts for one apply run.
///
/// `succeeded + skipped + failed == total` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total: usize,
}

impl ApplyReport {
    /// True when no statement failed (skips are fine).
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Apply every statement in the SQL file at `path`.
///
/// Failure to read the file or to open a transaction is fatal; individual
/// statement failures are counted and logged only.
pub async fn apply_file(client: &mut Client, path: &Path) -> Result<ApplyReport> {
    let sql = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let statements = split_statements(&sql);
    let total = statements.len();
    tracing::info!(path = %path.display(), statements = total, "applying SQL file");

    let mut report = ApplyReport {
        total,
        ..Default::default()
    };

    for (i, statement) in statements.iter().enumerate() {
        let n = i + 1;
        let index = index_name(statement);

        let tx = client.transaction().await?;
        match tx.batch_execute(statement).await {
            Ok(()) => {
                tx.commit().await?;
                report.succeeded += 1;
                match &index {
                    Some(name) => {
                        tracing::info!(statement = n, total, index = %name, "created index")
                    }
                    None => tracing::info!(statement = n, total, "statement ok"),
                }
            }
            Err(e) if is_duplicate_object(e.code()) => {
                tx.rollback().await?;
                report.skipped += 1;
                match &index {
                    Some(name) => {
                        tracing::info!(statement = n, total, index = %name, "already exists, skipping")
                    }
                    None => tracing::info!(statement = n, total, "already exists, skipping"),
                }
            }
            Err(e) => {
                tx.rollback().await?;
                report.failed += 1;
                tracing::error!(statement = n, total, error = %e, "statement failed");
            }
        }
    }

    Ok(report)
}

/// Whether a SQLSTATE means "the object already exists".
///
/// Postgres reports duplicate indexes and tables as `42P07` and other
/// duplicate objects (types, constraints) as `42710`.
fn is_duplicate_object(code: Option<&SqlState>) -> bool {
    matches!(
        code,
        Some(c) if *c == SqlState::DUPLICATE_TABLE || *c == SqlState::DUPLICATE_OBJECT
    )
}

/// Split a SQL script into individual statements.
///
/// Honors line comments, block comments, single-quoted strings (with
/// `''` escapes), and dollar-quoted bodies. Comment text is dropped;
/// blank fragments are discarded.
pub fn split_statements(sql: &str) -> Vec<String> {
    let chars: Vec<char> = sql.chars().collect();
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        // line comment: drop through end of line, keep the newline
        if c == '-' && chars.get(i + 1) == Some(&'-') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }

        // block comment
        if c == '/' && chars.get(i + 1) == Some(&'*') {
            i += 2;
            while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                i += 1;
            }
            i = (i + 2).min(chars.len());
            continue;
        }

        // single-quoted string, '' escapes a quote
        if c == '\'' {
            current.push(c);
            i += 1;
            while i < chars.len() {
                current.push(chars[i]);
                if chars[i] == '\'' {
                    if chars.get(i + 1) == Some(&'\'') {
                        current.push('\'');
                        i += 2;
                        continue;
                    }
                    i += 1;
                    break;
                }
                i += 1;
            }
            continue;
        }

        // dollar-quoted body: $tag$ ... $tag$
        if c == '$'
            && let Some(tag) = dollar_tag(&chars[i..])
        {
            current.push_str(&tag);
            i += tag.chars().count();
            while i < chars.len() {
                if chars[i] == '$' && starts_with(&chars[i..], &tag) {
                    current.push_str(&tag);
                    i += tag.chars().count();
                    break;
                }
                current.push(chars[i]);
                i += 1;
            }
            continue;
        }

        if c == ';' {
            push_statement(&mut statements, &mut current);
            i += 1;
            continue;
        }

        current.push(c);
        i += 1;
    }

    push_statement(&mut statements, &mut current);
    statements
}

/// Extract the index name from a `CREATE [UNIQUE] INDEX` statement.
///
/// Returns `None` for non-index statements and for unnamed indexes
/// (`CREATE INDEX ON ...`).
pub fn index_name(statement: &str) -> Option<String> {
    let tokens: Vec<&str> = statement.split_whitespace().collect();
    if !tokens.first()?.eq_ignore_ascii_case("create") {
        return None;
    }
    let pos = tokens.iter().position(|t| t.eq_ignore_ascii_case("index"))?;
    if pos > 2 {
        return None;
    }

    let mut rest = &tokens[pos + 1..];
    if rest.first().is_some_and(|t| t.eq_ignore_ascii_case("concurrently")) {
        rest = &rest[1..];
    }
    if rest.len() >= 3
        && rest[0].eq_ignore_ascii_case("if")
        && rest[1].eq_ignore_ascii_case("not")
        && rest[2].eq_ignore_ascii_case("exists")
    {
        rest = &rest[3..];
    }

    let name = rest.first()?;
    if name.eq_ignore_ascii_case("on") {
        return None;
    }
    Some(name.trim_matches('"').trim_end_matches('(').to_string())
}

/// Parse a `$tag$` opener at the start of `chars`, if present.
fn dollar_tag(chars: &[char]) -> Option<String> {
    let mut j = 1;
    while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_') {
        j += 1;
    }
    if j < chars.len() && chars[j] == '$' {
        Some(chars[..=j].iter().collect())
    } else {
        None
    }
}

fn starts_with(chars: &[char], tag: &str) -> bool {
    let tag: Vec<char> = tag.chars().collect();
    chars.len() >= tag.len() && chars[..tag.len()] == tag[..]
}

fn push_statement(statements: &mut Vec<String>, current: &mut String) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
    current.clear();
}
