//! Output formatting

use miette::{IntoDiagnostic, Result};
use serde_json::{json, Value};
use sqlvet_core::{ResultCategory, Severity, ValidationResult};

use crate::args::OutputFormat;
use crate::check::{CheckReport, FileReport};

/// Output formatter for a whole `check` run
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print every file's results in the configured format
    ///
    /// Machine-readable formats produce exactly one document per run.
    pub fn print_report(&self, report: &CheckReport) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                for file in &report.files {
                    print_human(file);
                }
                Ok(())
            }
            OutputFormat::Json => print_document(&json_document(report)),
            OutputFormat::Sarif => print_document(&sarif_document(report)),
        }
    }
}

fn print_document(document: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(document).into_diagnostic()?);
    Ok(())
}

fn print_human(file: &FileReport) {
    for result in file.results() {
        let severity_str = match result.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        eprintln!("{}[{}]: {}", severity_str, rule_id(result), result.message);
        eprintln!(
            "  --> {}:{}:{}",
            file.file_name,
            result.start_line + 1,
            result.start_ch + 1
        );

        // Print source line with annotation
        if let Some(source_line) = get_source_line(&file.source, result.start_line) {
            let line_no = result.start_line + 1;
            eprintln!("   |");
            eprintln!("{:>3} | {}", line_no, source_line);

            let (padding, width) = underline(result, source_line);
            eprintln!("   | {}{}", " ".repeat(padding), "^".repeat(width));
        }

        if let Some(suggestion) = &result.suggestion {
            eprintln!("   = help: replace with `{}`", suggestion);
        }

        eprintln!();
    }
}

/// One JSON document with an entry per checked file
fn json_document(report: &CheckReport) -> Value {
    let files: Vec<Value> = report
        .files
        .iter()
        .map(|file| {
            let mut entry = json!({
                "file": file.file_name,
                "validated": file.error().is_none(),
                "results": file.results(),
            });
            if let Some(err) = file.error() {
                entry["error"] = json!(err.to_string());
            }
            entry
        })
        .collect();

    json!({
        "files": files,
        "summary": {
            "errors": report.count(Severity::Error),
            "warnings": report.count(Severity::Warning),
            "not_run": report.not_run(),
        }
    })
}

/// One SARIF 2.1.0 log with a single run covering every file
fn sarif_document(report: &CheckReport) -> Value {
    let results: Vec<Value> = report
        .files
        .iter()
        .flat_map(|file| file.results().iter().map(move |r| sarif_result(&file.file_name, r)))
        .collect();

    let notifications: Vec<Value> = report
        .files
        .iter()
        .filter_map(|file| {
            let err = file.error()?;
            Some(json!({
                "level": "error",
                "message": { "text": err.to_string() },
                "locations": [{
                    "physicalLocation": {
                        "artifactLocation": { "uri": file.file_name }
                    }
                }]
            }))
        })
        .collect();

    json!({
        "$schema": "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json",
        "version": "2.1.0",
        "runs": [{
            "tool": {
                "driver": {
                    "name": "sqlvet",
                    "version": env!("CARGO_PKG_VERSION")
                }
            },
            "invocations": [{
                "executionSuccessful": notifications.is_empty(),
                "toolExecutionNotifications": notifications
            }],
            "results": results
        }]
    })
}

fn sarif_result(file_name: &str, r: &ValidationResult) -> Value {
    let mut sarif_result = json!({
        "ruleId": rule_id(r),
        "level": match r.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "note",
        },
        "message": {
            "text": r.message
        },
        "locations": [{
            "physicalLocation": {
                "artifactLocation": {
                    "uri": file_name
                },
                "region": {
                    "startLine": r.start_line + 1,
                    "startColumn": r.start_ch + 1,
                    "endLine": r.end_line + 1,
                    "endColumn": r.end_ch + 1
                }
            }
        }]
    });
    if let Some(suggestion) = &r.suggestion {
        sarif_result["properties"] = json!({ "suggestion": suggestion });
    }
    sarif_result
}

/// Rule code when a rule reported the result, otherwise its category
fn rule_id(result: &ValidationResult) -> &str {
    result
        .code
        .as_deref()
        .unwrap_or_else(|| category_name(result.category))
}

fn category_name(category: ResultCategory) -> &'static str {
    match category {
        ResultCategory::Lint => "lint",
        ResultCategory::General => "general",
    }
}

/// Get a specific line from source (0-indexed)
fn get_source_line(source: &str, line: usize) -> Option<&str> {
    source.split('\n').nth(line)
}

/// Caret padding and width for a result on its first line
fn underline(result: &ValidationResult, source_line: &str) -> (usize, usize) {
    let line_len = source_line.chars().count();
    let start = result.start_ch.min(line_len);
    let end = if result.end_line == result.start_line {
        result.end_ch.min(line_len)
    } else {
        line_len
    };
    (start, end.saturating_sub(start).max(1))
}
