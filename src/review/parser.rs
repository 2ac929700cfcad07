/*!
 * Completion response parsing.
 *
 * A result line has the shape
 *
 * ```text
 * <marker> <row number>: <revised> | <category> | <explanation>
 * ```
 *
 * The row field runs up to the first ASCII `:` or full-width `：`. The payload
 * splits on `|` into at most three fields; missing fields read as empty.
 * Lines that do not start with the marker, followed by whitespace or a digit,
 * are chatter and are ignored. Marker lines that cannot be decoded are skipped with a
 * `ParseWarning`; parsing as a whole never fails.
 */

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;

static RESULT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<row>[^:：]*)[:：](?P<payload>.*)$").unwrap()
});

/// Review outcome for one row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewResult {
    /// Corrected translation
    pub revised: String,
    /// Error category label
    pub category: String,
    /// Explanation, usually empty unless the category is the catch-all
    pub explanation: String,
}

/// A marker line that could not be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    /// 1-based line number within the completion
    pub line_number: usize,
    /// The offending line
    pub line: String,
    /// What was wrong with it
    pub reason: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ({})", self.line_number, self.reason, self.line)
    }
}

/// Parsed completion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedResponse {
    /// Results keyed by sheet row number
    pub results: BTreeMap<usize, ReviewResult>,
    /// Skipped marker lines
    pub warnings: Vec<ParseWarning>,
}

/// Parse a completion into per-row results
pub fn parse_response(text: &str, marker: &str) -> ParsedResponse {
    let mut parsed = ParsedResponse::default();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        // The marker must stand alone: prose that merely begins with it is chatter
        let Some(rest) = line
            .strip_prefix(marker)
            .filter(|rest| rest.starts_with(|c: char| c.is_whitespace() || c.is_ascii_digit()))
        else {
            continue;
        };

        match parse_result_line(rest) {
            Ok((row, result)) => {
                // Last occurrence wins
                parsed.results.insert(row, result);
            }
            Err(reason) => {
                let warning = ParseWarning {
                    line_number: index + 1,
                    line: line.to_string(),
                    reason,
                };
                warn!("Skipping completion {}", warning);
                parsed.warnings.push(warning);
            }
        }
    }

    parsed
}

fn parse_result_line(rest: &str) -> Result<(usize, ReviewResult), String> {
    let captures = RESULT_LINE
        .captures(rest)
        .ok_or_else(|| "missing ':' after row number".to_string())?;

    let row_field = captures["row"].trim();
    let row = row_field
        .parse::<usize>()
        .map_err(|_| format!("invalid row number '{}'", row_field))?;

    let mut fields = captures["payload"].splitn(3, '|').map(str::trim);
    let mut next = || fields.next().unwrap_or_default().to_string();

    Ok((row, ReviewResult {
        revised: next(),
        category: next(),
        explanation: next(),
    }))
}
