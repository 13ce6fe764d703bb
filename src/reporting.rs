//! Console rendering of scan results.

use colored::Colorize;

use crate::parse::{Diagnostic, Severity};
use crate::report::ReportData;

/// Prints the report grouped by file, followed by a summary line.
pub fn print_report(report: &ReportData) {
    for (file, diagnostics) in report.by_file() {
        println!("{}", file.display().to_string().bold().underline());
        for diagnostic in diagnostics {
            print_diagnostic(diagnostic);
        }
        println!();
    }
    print_summary(report);
}

fn severity_header(diagnostic: &Diagnostic) -> String {
    let mut header = format!("{}: {}", diagnostic.severity.label(), diagnostic.message);
    if !diagnostic.rule.is_empty() {
        header.push_str(&format!(" [{}]", diagnostic.rule));
    }
    header
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    let header = severity_header(diagnostic);
    match diagnostic.severity {
        Severity::Error | Severity::Fatal => println!("{}", header.red().bold()),
        Severity::Warning => println!("{}", header.yellow()),
        Severity::Note => println!("{}", header.dimmed()),
    }

    println!(
        "  {} {}:{}:{}",
        "-->".blue(),
        diagnostic.file_path.display(),
        diagnostic.line,
        diagnostic.column
    );

    if let Some(source) = &diagnostic.source_line {
        let gutter = format!("{:4} |", diagnostic.line);
        println!("  {} {}", gutter.blue(), source);
        if let Some(indicator) = &diagnostic.position_indicator {
            println!("  {} {}", "     |".blue(), indicator.red().bold());
        }
    }

    if let Some(fix) = &diagnostic.fix_suggestion {
        for line in fix.lines() {
            println!("  {} {}", "fix:".green(), line.green());
        }
    }
}

fn pluralize(word: &str, count: usize) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

fn print_summary(report: &ReportData) {
    let errors = report.error_count();
    let warnings = report.warning_count();
    let notes = report.note_count();
    let duration = report.duration_ms;

    if report.dropped_lines > 0 {
        println!(
            "{}",
            format!(
                "{} unparseable diagnostic {} dropped",
                report.dropped_lines,
                pluralize("line", report.dropped_lines)
            )
            .dimmed()
        );
    }

    if !report.has_findings() {
        println!(
            "{} No findings in {} {} ({duration}ms).",
            "OK".green().bold(),
            report.files_scanned,
            pluralize("file", report.files_scanned)
        );
        return;
    }

    let mut parts: Vec<String> = Vec::new();
    if errors > 0 {
        parts.push(format!("{errors} {}", pluralize("error", errors)));
    }
    if warnings > 0 {
        parts.push(format!("{warnings} {}", pluralize("warning", warnings)));
    }
    if notes > 0 {
        parts.push(format!("{notes} {}", pluralize("note", notes)));
    }
    let summary = parts.join(", ");

    let marker = if errors > 0 {
        "X".red().bold()
    } else {
        "~".yellow().bold()
    };
    println!(
        "{marker} tidyscan found {summary} in {} of {} {} ({duration}ms).",
        report.files_with_findings,
        report.files_scanned,
        pluralize("file", report.files_scanned)
    );
}
