//! Post-pass enrichment from the referenced source files.
//!
//! clang-tidy only prints a snippet for the primary finding of a block;
//! notes and some check output arrive with no inline context at all. This
//! pass fills the gaps by reading the referenced files directly.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;

use rayon::prelude::*;

use super::Diagnostic;

/// Fills missing source-line and position-indicator fields in place.
///
/// Each referenced file is read at most once. Values captured from the
/// tool's own output are never overwritten, so the pass is idempotent.
/// A file that cannot be read is warned about and skipped; its diagnostics
/// keep whatever context they already had.
pub fn enrich(diagnostics: &mut [Diagnostic], verbose: bool) {
    let needed: BTreeSet<PathBuf> = diagnostics
        .iter()
        .filter(|d| d.source_line.is_none() || d.position_indicator.is_none())
        .map(|d| d.file_path.clone())
        .collect();
    if needed.is_empty() {
        return;
    }

    let contents: BTreeMap<PathBuf, Vec<String>> = needed
        .into_par_iter()
        .filter_map(|path| match fs::read_to_string(&path) {
            Ok(content) => {
                let lines = content.lines().map(String::from).collect();
                Some((path, lines))
            }
            Err(e) => {
                if verbose {
                    eprintln!("WARN: cannot read {} for enrichment: {e}", path.display());
                }
                None
            }
        })
        .collect();

    for diagnostic in diagnostics.iter_mut() {
        let Some(lines) = contents.get(&diagnostic.file_path) else {
            continue;
        };
        // 1-based positions into 0-based storage.
        let Some(index) = (diagnostic.line as usize).checked_sub(1) else {
            continue;
        };
        let Some(text) = lines.get(index) else {
            continue;
        };

        if diagnostic.source_line.is_none() {
            diagnostic.source_line = Some(text.clone());
        }
        if diagnostic.position_indicator.is_none() {
            // Column is the tool's character count; tabs and multi-byte
            // characters in the source line will drift the caret.
            let pad = (diagnostic.column as usize).saturating_sub(1);
            diagnostic.position_indicator = Some(format!("{}^", " ".repeat(pad)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{parse_output, Severity};
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn diagnostic(path: &Path, line: u32, column: u32) -> Diagnostic {
        Diagnostic {
            file_path: path.to_path_buf(),
            line,
            column,
            severity: Severity::Warning,
            rule: "test-rule".into(),
            message: "test".into(),
            source_line: None,
            position_indicator: None,
            fix_suggestion: None,
        }
    }

    #[test]
    fn fills_source_line_and_synthesized_caret() {
        let dir = TempDir::new().expect("temp dir");
        let file = dir.path().join("f.cpp");
        fs::write(&file, "int a;\nchar c = 'a';\nint b;\n").expect("write");

        let mut diagnostics = vec![diagnostic(&file, 2, 6)];
        enrich(&mut diagnostics, false);

        assert_eq!(diagnostics[0].source_line.as_deref(), Some("char c = 'a';"));
        assert_eq!(diagnostics[0].position_indicator.as_deref(), Some("     ^"));
    }

    #[test]
    fn first_line_uses_one_based_indexing() {
        let dir = TempDir::new().expect("temp dir");
        let file = dir.path().join("f.cpp");
        fs::write(&file, "first line\nsecond line\n").expect("write");

        let mut diagnostics = vec![diagnostic(&file, 1, 1)];
        enrich(&mut diagnostics, false);

        assert_eq!(diagnostics[0].source_line.as_deref(), Some("first line"));
        assert_eq!(diagnostics[0].position_indicator.as_deref(), Some("^"));
    }

    #[test]
    fn never_overwrites_tool_captured_context() {
        let dir = TempDir::new().expect("temp dir");
        let file = dir.path().join("f.cpp");
        fs::write(&file, "on disk\n").expect("write");

        let mut d = diagnostic(&file, 1, 1);
        d.source_line = Some("from tool".into());
        d.position_indicator = Some("^~~~".into());
        let mut diagnostics = vec![d];
        enrich(&mut diagnostics, false);

        assert_eq!(diagnostics[0].source_line.as_deref(), Some("from tool"));
        assert_eq!(diagnostics[0].position_indicator.as_deref(), Some("^~~~"));
    }

    #[test]
    fn enrichment_is_idempotent() {
        let dir = TempDir::new().expect("temp dir");
        let file = dir.path().join("f.cpp");
        fs::write(&file, "char c = 'a';\n").expect("write");

        let mut diagnostics = vec![diagnostic(&file, 1, 3)];
        enrich(&mut diagnostics, false);
        let first = diagnostics[0].clone();
        enrich(&mut diagnostics, false);

        assert_eq!(diagnostics[0].source_line, first.source_line);
        assert_eq!(diagnostics[0].position_indicator, first.position_indicator);
    }

    #[test]
    fn unreadable_file_skipped_others_still_enriched() {
        let dir = TempDir::new().expect("temp dir");
        let present = dir.path().join("present.cpp");
        fs::write(&present, "int x;\n").expect("write");
        let missing = dir.path().join("missing.cpp");

        let mut diagnostics = vec![diagnostic(&missing, 1, 1), diagnostic(&present, 1, 4)];
        enrich(&mut diagnostics, false);

        assert!(diagnostics[0].source_line.is_none());
        assert!(diagnostics[0].position_indicator.is_none());
        assert_eq!(diagnostics[1].source_line.as_deref(), Some("int x;"));
        assert_eq!(diagnostics[1].position_indicator.as_deref(), Some("   ^"));
    }

    #[test]
    fn out_of_range_line_left_untouched() {
        let dir = TempDir::new().expect("temp dir");
        let file = dir.path().join("f.cpp");
        fs::write(&file, "only line\n").expect("write");

        let mut diagnostics = vec![diagnostic(&file, 99, 1)];
        enrich(&mut diagnostics, false);

        assert!(diagnostics[0].source_line.is_none());
    }

    #[test]
    fn partial_context_from_tool_is_completed_not_replaced() {
        let dir = TempDir::new().expect("temp dir");
        let file = dir.path().join("f.cpp");
        fs::write(&file, "char c = 'a';\n").expect("write");

        let text = format!("{}:1:3: warning: w [r]\n   1 | from tool output\n", file.display());
        let mut outcome = parse_output(&text);
        assert_eq!(outcome.diagnostics[0].source_line.as_deref(), Some("from tool output"));

        enrich(&mut outcome.diagnostics, false);
        // Source line stays as captured; only the missing caret is derived.
        assert_eq!(
            outcome.diagnostics[0].source_line.as_deref(),
            Some("from tool output")
        );
        assert_eq!(
            outcome.diagnostics[0].position_indicator.as_deref(),
            Some("  ^")
        );
    }
}
