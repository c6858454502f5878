//! helperize CLI - rewrites `$this->faker` to `fake()` in Laravel factories
//!
//! Runs in two phases over the given paths: every PHP file is indexed for
//! class declarations first, then each file is rewritten against the shared
//! class hierarchy, so factories extending a base factory declared in
//! another file are still recognized.

mod config;
mod output;
mod process;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use helperize_core::ClassHierarchy;
use helperize_rules::{RewriteConfig, RuleRegistry};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use config::Config;
use output::{EditInfo, OutputFormat, Reporter};
use process::{build_hierarchy, process_file, write_file};

#[derive(Parser)]
#[command(name = "helperize")]
#[command(version)]
#[command(about = "Replace legacy member access with helper function calls in PHP code")]
struct Cli {
    /// Files or directories to process
    #[arg(required_unless_present = "list_rules")]
    paths: Vec<PathBuf>,

    /// Check for changes without applying them (default mode)
    #[arg(long, conflicts_with = "fix")]
    check: bool,

    /// Apply changes to files
    #[arg(long, conflicts_with = "check")]
    fix: bool,

    /// Show verbose output and debug logs
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Output format: text, json, diff
    #[arg(long, value_name = "FORMAT")]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Path to config file (default: auto-detect .helperize.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long)]
    no_config: bool,

    /// List available rules and exit
    #[arg(long)]
    list_rules: bool,

    /// Fully-qualified class whose descendants are rewritten
    #[arg(long, value_name = "NAME")]
    base_class: Option<String>,

    /// Helper function that replaces the member access
    #[arg(long, value_name = "NAME")]
    helper: Option<String>,

    /// Member accessed on $this
    #[arg(long, value_name = "NAME")]
    member: Option<String>,

    /// Additional call that keeps the instance (can be specified multiple times)
    #[arg(long, value_name = "NAME")]
    exclude_call: Vec<String>,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

/// Default directives, merged with `RUST_LOG` when it is set
fn env_filter(verbose: bool) -> EnvFilter {
    let defaults = if verbose {
        "warn,helperize_rules=debug,helperize_cli=debug"
    } else {
        "warn"
    };

    match std::env::var("RUST_LOG")
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
    {
        Some(env_directives) => EnvFilter::try_new(format!("{defaults},{env_directives}"))
            .or_else(|_| EnvFilter::try_new(env_directives))
            .unwrap_or_else(|_| EnvFilter::new(defaults)),
        None => EnvFilter::new(defaults),
    }
}

fn init_tracing(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Config file settings with command line overrides on top
fn rewrite_config(cli: &Cli, config: &Config) -> RewriteConfig {
    let mut rewrite = config.rule.apply(RewriteConfig::default());
    if let Some(base_class) = &cli.base_class {
        rewrite.base_class = base_class.clone();
    }
    if let Some(helper) = &cli.helper {
        rewrite.helper_function = helper.clone();
    }
    if let Some(member) = &cli.member {
        rewrite.member_name = member.clone();
    }
    rewrite.excluded_calls.extend(cli.exclude_call.iter().cloned());
    rewrite
}

fn load_config(cli: &Cli) -> Result<Config> {
    if cli.no_config {
        return Ok(Config::default());
    }
    if let Some(config_path) = &cli.config {
        let config = Config::load_path(config_path)?;
        info!(path = %config_path.display(), "using config");
        return Ok(config);
    }
    match Config::load()? {
        Some((config, path)) => {
            info!(path = %path.display(), "using config");
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    let rewrite = rewrite_config(&cli, &config);
    debug!(?rewrite, "rewrite configuration");

    let registry =
        RuleRegistry::with_config(rewrite).context("Invalid rewrite configuration")?;

    // Handle --list-rules
    if cli.list_rules {
        println!("{}", "Available rules:".bold());
        for (name, description) in registry.list_rules() {
            println!("  {} - {}", name.green(), description);
        }
        return Ok(ExitCode::SUCCESS);
    }

    // Command line wins over the config file
    let output_format = if cli.json {
        OutputFormat::Json
    } else {
        let format = cli
            .format
            .as_deref()
            .or(config.output.format.as_deref())
            .unwrap_or("text");
        OutputFormat::from_str(format).ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid output format '{}'. Valid options: text, json, diff",
                format
            )
        })?
    };

    let enabled_rules: HashSet<String> =
        registry.all_names().into_iter().map(String::from).collect();

    let fix_mode = cli.fix;
    let check_mode = !fix_mode;

    if cli.verbose && output_format == OutputFormat::Text {
        println!(
            "{}: {}",
            "Mode".bold(),
            if fix_mode { "fix" } else { "check" }
        );
        println!();
    }

    let (file_paths, missing_paths) = collect_files(&cli.paths, &config);

    for path in &missing_paths {
        if output_format == OutputFormat::Text {
            eprintln!(
                "{}: Path does not exist: {}",
                "Warning".yellow(),
                path.display()
            );
        }
    }

    // Phase 1: every file contributes to the class hierarchy
    let hierarchy = build_hierarchy(&file_paths);

    // Phase 2: rewrite against the finished hierarchy
    let results: Vec<FileOutcome> = file_paths
        .par_iter()
        .map(|path| process_file_to_outcome(path, &registry, &hierarchy, &enabled_rules))
        .collect();

    // Sort results by path for deterministic output
    let mut sorted_results: Vec<_> = results.into_iter().zip(file_paths.iter()).collect();
    sorted_results.sort_by(|a, b| a.1.cmp(b.1));

    let mut reporter = Reporter::new(output_format, cli.verbose);
    reporter.set_classes_indexed(hierarchy.len());

    for (outcome, path) in sorted_results {
        report_outcome(path, outcome, fix_mode, &mut reporter)?;
    }

    let summary = reporter.summary();
    let exit_code = if summary.errors > 0 {
        ExitCode::from(1)
    } else if check_mode && summary.files_with_changes > 0 {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    };

    reporter.finish(check_mode)?;

    Ok(exit_code)
}

/// Expand the given paths into PHP files, returning the paths that do not exist separately
fn collect_files(paths: &[PathBuf], config: &Config) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut file_paths = Vec::new();
    let mut missing_paths = Vec::new();

    for path in paths {
        if path.is_file() {
            file_paths.push(path.clone());
        } else if path.is_dir() {
            for entry in walkdir::WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "php"))
            {
                let file_path = entry.path();
                if !config.should_exclude(file_path) {
                    file_paths.push(file_path.to_path_buf());
                }
            }
        } else {
            missing_paths.push(path.clone());
        }
    }

    (file_paths, missing_paths)
}

/// Result of processing a single file (for parallel processing)
enum FileOutcome {
    NoChanges,
    HasChanges {
        edits: Vec<EditInfo>,
        old_source: String,
        new_source: String,
    },
    ParseError,
    Error(String),
}

fn process_file_to_outcome(
    path: &Path,
    registry: &RuleRegistry,
    hierarchy: &ClassHierarchy,
    enabled_rules: &HashSet<String>,
) -> FileOutcome {
    match process_file(path, registry, hierarchy, enabled_rules) {
        Ok(Some(result)) => match result.new_source {
            Some(new_source) if !result.edits.is_empty() => FileOutcome::HasChanges {
                edits: result.edits,
                old_source: result.old_source,
                new_source,
            },
            _ => FileOutcome::NoChanges,
        },
        Ok(None) => FileOutcome::ParseError,
        Err(e) => FileOutcome::Error(format!("{:#}", e)),
    }
}

/// Report a file outcome and optionally write the fix
fn report_outcome(
    path: &Path,
    outcome: FileOutcome,
    fix_mode: bool,
    reporter: &mut Reporter,
) -> Result<()> {
    match outcome {
        FileOutcome::NoChanges => {
            reporter.report_skipped(path);
        }
        FileOutcome::HasChanges {
            edits,
            old_source,
            new_source,
        } => {
            if fix_mode {
                write_file(path, &new_source)?;
                reporter.report_fix(path, edits);
            } else {
                reporter.report_check(path, edits, &old_source, &new_source);
            }
        }
        FileOutcome::ParseError => {
            reporter.report_error(path, "Parse error, skipping");
        }
        FileOutcome::Error(msg) => {
            reporter.report_error(path, &msg);
        }
    }
    Ok(())
}
