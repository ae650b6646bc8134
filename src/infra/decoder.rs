//! Output decoding for the two invocation modes
//!
//! Format output is taken verbatim as the new document text. Lint output is
//! read line by line against the grammar
//!
//! ```text
//! <path>:<line>:<ruleId>:<severity>: <message>
//! ```
//!
//! where `line` is 1-based, `ruleId` has no colons and `severity` is exactly
//! `error` or `warning`. Lines that do not match are skipped.

use crate::models::diagnostic::{Diagnostic, DiagnosticSeverity};
use crate::models::document::Document;
use crate::models::edit::{Range, TextEdit};

/// One matched line of linter output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finding<'a> {
    pub path: &'a str,
    /// 1-based line number as printed by the linter
    pub line: u32,
    pub rule_id: &'a str,
    pub severity: DiagnosticSeverity,
    pub message: &'a str,
}

impl<'a> Finding<'a> {
    /// Match a single output line against the lint grammar.
    ///
    /// Paths may contain colons (drive letters, URIs), so every colon is a
    /// candidate end of the path, rightmost first.
    pub fn parse(line: &'a str) -> Option<Self> {
        let line = line.strip_suffix('\r').unwrap_or(line);

        line.rmatch_indices(':')
            .filter(|&(i, _)| i > 0)
            .find_map(|(i, _)| parse_fields(&line[..i], &line[i + 1..]))
    }
}

fn parse_fields<'a>(path: &'a str, rest: &'a str) -> Option<Finding<'a>> {
    let (digits, rest) = rest.split_once(':')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let line = digits.parse().ok()?;

    let (rule_id, rest) = rest.split_once(':')?;
    if rule_id.is_empty() {
        return None;
    }

    let (token, rest) = rest.split_once(':')?;
    let severity = DiagnosticSeverity::from_token(token)?;

    let message = rest.strip_prefix(' ')?;
    if message.is_empty() {
        return None;
    }

    Some(Finding {
        path,
        line,
        rule_id,
        severity,
        message,
    })
}

/// Whole-text protocol: stdout replaces the full document
pub fn decode_format(stdout: String, document: &Document) -> TextEdit {
    TextEdit::replace(document.full_range(), stdout)
}

/// Line-grammar protocol: findings on lines outside the document are dropped
pub fn decode_lint(stdout: &str, document: &Document) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for raw in stdout.lines() {
        let Some(finding) = Finding::parse(raw) else {
            if !raw.trim().is_empty() {
                tracing::trace!("Skipping unrecognized lint output: {}", raw);
            }
            continue;
        };

        let Some(index) = finding.line.checked_sub(1) else {
            tracing::trace!("Dropping finding on line 0: {}", raw);
            continue;
        };
        let Some(length) = document.line_len(index as usize) else {
            tracing::trace!(
                "Dropping finding on line {} of {}-line document",
                finding.line,
                document.line_count()
            );
            continue;
        };

        diagnostics.push(Diagnostic::new(
            Range::line(index, length),
            finding.severity,
            finding.rule_id,
            finding.message,
        ));
    }

    diagnostics
}
