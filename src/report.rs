//! Aggregated results handed to the rendering layer.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Serialize;

use crate::parse::{Diagnostic, Severity};

/// The boundary artifact of a scan: the full diagnostic list plus derived
/// aggregates. Every aggregate is recomputed from the list at construction;
/// nothing is maintained incrementally.
#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub diagnostics: Vec<Diagnostic>,
    /// Findings per rule identifier.
    pub rule_counts: BTreeMap<String, usize>,
    pub files_scanned: usize,
    pub files_with_findings: usize,
    /// Header-shaped lines rejected for an unknown severity.
    pub dropped_lines: usize,
    pub duration_ms: u64,
}

impl ReportData {
    #[must_use]
    pub fn new(
        diagnostics: Vec<Diagnostic>,
        files_scanned: usize,
        dropped_lines: usize,
        duration_ms: u64,
    ) -> Self {
        let mut rule_counts: BTreeMap<String, usize> = BTreeMap::new();
        for diagnostic in &diagnostics {
            *rule_counts.entry(diagnostic.rule.clone()).or_insert(0) += 1;
        }

        let files_with_findings = diagnostics
            .iter()
            .map(|d| d.file_path.as_path())
            .collect::<BTreeSet<_>>()
            .len();

        Self {
            diagnostics,
            rule_counts,
            files_scanned,
            files_with_findings,
            dropped_lines,
            duration_ms,
        }
    }

    /// Diagnostics grouped by file, in path order, derived on demand.
    #[must_use]
    pub fn by_file(&self) -> BTreeMap<&Path, Vec<&Diagnostic>> {
        let mut groups: BTreeMap<&Path, Vec<&Diagnostic>> = BTreeMap::new();
        for diagnostic in &self.diagnostics {
            groups
                .entry(diagnostic.file_path.as_path())
                .or_default()
                .push(diagnostic);
        }
        groups
    }

    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Errors plus fatals.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error) + self.count(Severity::Fatal)
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    #[must_use]
    pub fn note_count(&self) -> usize {
        self.count(Severity::Note)
    }

    #[must_use]
    pub fn has_findings(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}
