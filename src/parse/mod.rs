//! Line-oriented reconstruction of clang-tidy diagnostics.
//!
//! The tool's output has no unique delimiter between multi-line diagnostic
//! blocks, so lines are classified one at a time and fed through a small
//! state machine: a header line always opens a new record, context and
//! continuation lines attach to the record in progress, and anything else
//! closes it.

mod enrich;

pub use enrich::enrich;

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Diagnostic severity. Closed set; a header with any other token is
/// rejected and counted, never defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
    Fatal,
}

impl Severity {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            "note" => Some(Self::Note),
            "fatal" => Some(Self::Fatal),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Note => "note",
            Self::Fatal => "fatal",
        }
    }
}

/// One structured finding reconstructed from tool output.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub file_path: PathBuf,
    /// 1-based, matching the tool's convention.
    pub line: u32,
    /// 1-based.
    pub column: u32,
    pub severity: Severity,
    /// Rule identifier; empty when the header carried no `[rule]` suffix.
    pub rule: String,
    pub message: String,
    /// Source text under the finding, as printed by the tool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_line: Option<String>,
    /// Caret/tilde annotation pinpointing the column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_indicator: Option<String>,
    /// Suggested replacement text; multiple fix lines accumulate in order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_suggestion: Option<String>,
}

impl Diagnostic {
    /// Identity tuple correlating the same finding across parser passes.
    #[must_use]
    pub fn key(&self) -> (&PathBuf, u32, u32, &str) {
        (&self.file_path, self.line, self.column, &self.rule)
    }

    /// Whether both context fields were captured from the tool's own output.
    #[must_use]
    pub fn has_context(&self) -> bool {
        self.source_line.is_some() && self.position_indicator.is_some()
    }
}

/// Parser output: accepted diagnostics plus the count of rejected headers.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub diagnostics: Vec<Diagnostic>,
    /// Header-shaped lines dropped for an unknown severity token.
    pub dropped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    Idle,
    InDiagnostic,
}

/// Shape of one input line, decided before any state is consulted.
#[derive(Debug, PartialEq, Eq)]
enum LineKind<'a> {
    Blank,
    Header {
        path: &'a str,
        line: u32,
        column: u32,
        severity: &'a str,
        message: &'a str,
    },
    /// `<ws> <number> | <text>` — the tool's source snippet line.
    SourceContext(&'a str),
    /// `<ws> | <text>` — caret/tilde indicator or fix-suggestion text.
    Continuation(&'a str),
    Other,
}

// `<path>:<line>:<column>: <severity>: <message>`, where the path is POSIX
// absolute or Windows drive-qualified. Drive letters keep the first colon
// out of the position fields.
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((?:[A-Za-z]:[\\/]|/)[^:]*):(\d+):(\d+):\s+(\w+):\s+(.*)$")
        .unwrap_or_else(|_| panic!("Invalid Regex"))
});

static RULE_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*\[([^\[\]]+)\]\s*$").unwrap_or_else(|_| panic!("Invalid Regex"))
});

static CONTEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+(\d+)\s*\| ?(.*)$").unwrap_or_else(|_| panic!("Invalid Regex"))
});

static CONTINUATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+\| ?(.*)$").unwrap_or_else(|_| panic!("Invalid Regex"))
});

fn classify(line: &str) -> LineKind<'_> {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }

    if let Some(caps) = HEADER_RE.captures(line) {
        let line_no = caps.get(2).and_then(|m| m.as_str().parse().ok());
        let column = caps.get(3).and_then(|m| m.as_str().parse().ok());
        if let (Some(line_no), Some(column)) = (line_no, column) {
            return LineKind::Header {
                path: caps.get(1).map_or("", |m| m.as_str()),
                line: line_no,
                column,
                severity: caps.get(4).map_or("", |m| m.as_str()),
                message: caps.get(5).map_or("", |m| m.as_str()),
            };
        }
    }

    if let Some(caps) = CONTEXT_RE.captures(line) {
        return LineKind::SourceContext(caps.get(2).map_or("", |m| m.as_str()));
    }

    if let Some(caps) = CONTINUATION_RE.captures(line) {
        return LineKind::Continuation(caps.get(1).map_or("", |m| m.as_str()));
    }

    LineKind::Other
}

/// Splits the trailing `[rule]` suffix off a header message.
fn split_rule(message: &str) -> (String, String) {
    if let Some(caps) = RULE_SUFFIX_RE.captures(message) {
        let rule = caps.get(1).map_or("", |m| m.as_str()).to_string();
        let stripped = message[..caps.get(0).map_or(0, |m| m.start())].to_string();
        (stripped, rule)
    } else {
        (message.to_string(), String::new())
    }
}

/// The diagnostic state machine. Feed lines in input order; state depends
/// on prior lines, so a single instance must never be shared across
/// concurrently parsed streams.
#[derive(Debug, Default)]
pub struct DiagnosticParser {
    state: State,
    diagnostics: Vec<Diagnostic>,
    dropped: usize,
}

impl DiagnosticParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes one line. Transitions, in evaluation order: blank resets;
    /// a header opens a new record regardless of state; context and
    /// continuation lines attach only while a record is open; anything
    /// else closes the open record without being consumed.
    pub fn feed_line(&mut self, line: &str) {
        match classify(line) {
            LineKind::Blank => self.state = State::Idle,
            LineKind::Header {
                path,
                line,
                column,
                severity,
                message,
            } => match Severity::parse(severity) {
                Some(severity) => {
                    let (message, rule) = split_rule(message);
                    self.diagnostics.push(Diagnostic {
                        file_path: PathBuf::from(path),
                        line,
                        column,
                        severity,
                        rule,
                        message,
                        source_line: None,
                        position_indicator: None,
                        fix_suggestion: None,
                    });
                    self.state = State::InDiagnostic;
                }
                None => {
                    self.dropped += 1;
                    self.state = State::Idle;
                }
            },
            LineKind::SourceContext(text) => {
                if self.state == State::InDiagnostic {
                    if let Some(current) = self.diagnostics.last_mut() {
                        current.source_line = Some(text.to_string());
                    }
                }
            }
            LineKind::Continuation(text) => {
                if self.state == State::InDiagnostic {
                    if let Some(current) = self.diagnostics.last_mut() {
                        attach_continuation(current, text);
                    }
                }
            }
            LineKind::Other => self.state = State::Idle,
        }
    }

    #[must_use]
    pub fn finish(self) -> ParseOutcome {
        ParseOutcome {
            diagnostics: self.diagnostics,
            dropped: self.dropped,
        }
    }
}

fn attach_continuation(diagnostic: &mut Diagnostic, text: &str) {
    if text.contains('^') || text.contains('~') {
        // Stored once; later caret-bearing lines belong to fix rendering.
        if diagnostic.position_indicator.is_none() {
            diagnostic.position_indicator = Some(text.to_string());
            return;
        }
    }
    match &mut diagnostic.fix_suggestion {
        Some(existing) => {
            existing.push('\n');
            existing.push_str(text);
        }
        None => diagnostic.fix_suggestion = Some(text.to_string()),
    }
}

/// Parses a complete merged output stream.
#[must_use]
pub fn parse_output(text: &str) -> ParseOutcome {
    let mut parser = DiagnosticParser::new();
    for line in text.lines() {
        parser.feed_line(line);
    }
    parser.finish()
}
