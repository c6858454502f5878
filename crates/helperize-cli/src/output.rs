//! Output formatting for helperize
//!
//! Supports colored text, JSON and unified diff output.

use anyhow::Result;
use colored::*;
use serde::Serialize;
use std::path::Path;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Diff,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<OutputFormat> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            "diff" => Some(OutputFormat::Diff),
            _ => None,
        }
    }
}

/// Information about a single edit
#[derive(Debug, Clone, Serialize)]
pub struct EditInfo {
    pub rule: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Reported outcome for one file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub edits: Vec<EditInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    pub fn success(path: &Path, edits: Vec<EditInfo>) -> Self {
        Self {
            path: path.display().to_string(),
            edits,
            error: None,
        }
    }

    pub fn error(path: &Path, error: String) -> Self {
        Self {
            path: path.display().to_string(),
            edits: Vec::new(),
            error: Some(error),
        }
    }
}

/// Summary statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub files_processed: usize,
    pub files_with_changes: usize,
    pub total_edits: usize,
    pub errors: usize,
    /// Classes known to the index
    pub classes_indexed: usize,
}

/// Full JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    pub version: String,
    pub summary: Summary,
    pub files: Vec<FileReport>,
}

/// Reporter for accumulating and outputting results
pub struct Reporter {
    format: OutputFormat,
    verbose: bool,
    results: Vec<FileReport>,
    summary: Summary,
}

impl Reporter {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self {
            format,
            verbose,
            results: Vec::new(),
            summary: Summary::default(),
        }
    }

    pub fn set_classes_indexed(&mut self, count: usize) {
        self.summary.classes_indexed = count;
    }

    /// Report a file with pending changes (check mode)
    pub fn report_check(&mut self, path: &Path, edits: Vec<EditInfo>, old_source: &str, new_source: &str) {
        self.summary.files_processed += 1;

        if edits.is_empty() {
            self.report_unchanged(path);
            return;
        }

        self.summary.files_with_changes += 1;
        self.summary.total_edits += edits.len();

        match self.format {
            OutputFormat::Text => {
                println!("{}", path.display().to_string().bold());
                print_diff(old_source, new_source);
                println!();
                for edit in &edits {
                    println!(
                        "  {} {}:{} {}",
                        "->".green(),
                        edit.line,
                        edit.column,
                        edit.message
                    );
                }
                println!();
            }
            OutputFormat::Diff => {
                print_unified_diff(path, old_source, new_source);
            }
            OutputFormat::Json => {}
        }

        self.results.push(FileReport::success(path, edits));
    }

    /// Report a file after applying fixes
    pub fn report_fix(&mut self, path: &Path, edits: Vec<EditInfo>) {
        self.summary.files_processed += 1;

        if edits.is_empty() {
            self.report_unchanged(path);
            return;
        }

        self.summary.files_with_changes += 1;
        self.summary.total_edits += edits.len();

        if self.format == OutputFormat::Text {
            println!("{}", path.display().to_string().bold());
            println!("  {} Applied {} change(s)", "OK".green(), edits.len());
            println!();
        }

        self.results.push(FileReport::success(path, edits));
    }

    /// Report a file that needed no changes
    pub fn report_skipped(&mut self, path: &Path) {
        self.summary.files_processed += 1;
        self.report_unchanged(path);
    }

    fn report_unchanged(&mut self, path: &Path) {
        if self.verbose && self.format == OutputFormat::Text {
            println!("{}: No changes needed", path.display());
        }
        self.results.push(FileReport::success(path, vec![]));
    }

    /// Report an error processing a file
    pub fn report_error(&mut self, path: &Path, error: &str) {
        self.summary.files_processed += 1;
        self.summary.errors += 1;

        if self.format == OutputFormat::Text {
            eprintln!("{}: {} - {}", "Warning".yellow(), path.display(), error);
        }

        self.results.push(FileReport::error(path, error.to_string()));
    }

    /// Print final summary/output
    pub fn finish(self, check_mode: bool) -> Result<()> {
        match self.format {
            OutputFormat::Text => {
                println!();
                println!("{}", "Summary".bold().underline());
                println!("  Files processed: {}", self.summary.files_processed);
                println!("  Classes indexed: {}", self.summary.classes_indexed);
                println!("  Files with changes: {}", self.summary.files_with_changes);
                println!("  Total edits: {}", self.summary.total_edits);
                if self.summary.errors > 0 {
                    println!("  Errors: {}", self.summary.errors);
                }

                if check_mode && self.summary.total_edits > 0 {
                    println!();
                    println!("{}", "Run with --fix to apply changes".yellow());
                }
            }
            OutputFormat::Json => {
                let output = self.into_json();
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            // patch-compatible output has no summary
            OutputFormat::Diff => {}
        }
        Ok(())
    }

    fn into_json(self) -> JsonOutput {
        JsonOutput {
            version: env!("CARGO_PKG_VERSION").to_string(),
            summary: self.summary,
            files: self.results,
        }
    }

    /// Get summary for exit code determination
    pub fn summary(&self) -> &Summary {
        &self.summary
    }
}

/// Print a colored diff between old and new content
fn print_diff(old: &str, new: &str) {
    for diff_result in diff::lines(old, new) {
        match diff_result {
            diff::Result::Left(l) => {
                println!("  {}", format!("- {}", l).red());
            }
            diff::Result::Right(r) => {
                println!("  {}", format!("+ {}", r).green());
            }
            diff::Result::Both(_, _) => {}
        }
    }
}

/// Print unified diff format (standard diff -u compatible)
fn print_unified_diff(path: &Path, old: &str, new: &str) {
    print!("{}", unified_diff(path, old, new));
}

fn unified_diff(path: &Path, old: &str, new: &str) -> String {
    use similar::TextDiff;

    let path_str = path.display().to_string();
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{}", path_str), &format!("b/{}", path_str))
        .to_string()
}
