//! File processing logic for helperize
//!
//! Two passes over the same file list: [`build_hierarchy`] indexes every
//! class declaration, then [`process_file`] rewrites each file against the
//! finished, read-only index.

use anyhow::{Context, Result};
use bumpalo::Bump;
use helperize_core::{apply_edits, dedup_edits, ClassHierarchy, DeclarationInfo};
use helperize_rules::{collect_declarations, RuleRegistry};
use mago_database::file::FileId;
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use crate::output::EditInfo;

/// Result of processing a single file
pub struct ProcessResult {
    /// Edits that were found/applied
    pub edits: Vec<EditInfo>,
    /// Original source code
    pub old_source: String,
    /// New source code after edits (only if edits were found)
    pub new_source: Option<String>,
}

/// Class declarations of one file, `None` if it does not parse
pub fn index_file(path: &Path) -> Result<Option<Vec<DeclarationInfo>>> {
    let source_code = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let arena = Bump::new();
    let file_id = FileId::new(path.to_string_lossy().as_ref());
    let (program, parse_error) =
        mago_syntax::parser::parse_file_content(&arena, file_id, &source_code);

    if parse_error.is_some() {
        return Ok(None);
    }

    Ok(Some(collect_declarations(program, &source_code)))
}

/// Index the class declarations of every file, in parallel.
///
/// Files that fail to read or parse are left out. When two files declare
/// the same class the later one in `paths` wins.
pub fn build_hierarchy(paths: &[PathBuf]) -> ClassHierarchy {
    let hierarchy = paths
        .par_iter()
        .filter_map(|path| match index_file(path) {
            Ok(Some(declarations)) => {
                trace!(path = %path.display(), classes = declarations.len(), "indexed");
                Some(declarations)
            }
            Ok(None) => {
                debug!(path = %path.display(), "parse error, not indexed");
                None
            }
            Err(e) => {
                warn!(path = %path.display(), error = %format!("{:#}", e), "not indexed");
                None
            }
        })
        .fold(ClassHierarchy::new, |mut hierarchy, declarations| {
            hierarchy.extend(&declarations);
            hierarchy
        })
        .reduce(ClassHierarchy::new, |mut left, right| {
            left.merge(right);
            left
        });

    debug!(classes = hierarchy.len(), files = paths.len(), "class hierarchy built");
    hierarchy
}

/// Process a single PHP file and return the edits found
pub fn process_file(
    path: &Path,
    registry: &RuleRegistry,
    hierarchy: &ClassHierarchy,
    enabled_rules: &HashSet<String>,
) -> Result<Option<ProcessResult>> {
    let source_code = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let arena = Bump::new();
    let file_id = FileId::new(path.to_string_lossy().as_ref());
    let (program, parse_error) =
        mago_syntax::parser::parse_file_content(&arena, file_id, &source_code);

    if parse_error.is_some() {
        return Ok(None);
    }

    let mut edits = Vec::new();
    let mut edit_infos = Vec::new();
    for rule in registry.get_enabled(enabled_rules) {
        for edit in dedup_edits(rule.check(program, &source_code, hierarchy)) {
            let (line, column) = edit.line_column(&source_code);
            edit_infos.push(EditInfo {
                rule: rule.name().to_string(),
                line,
                column,
                message: edit.message.clone(),
            });
            edits.push(edit);
        }
    }

    trace!(path = %path.display(), edits = edits.len(), "processed");

    if edits.is_empty() {
        return Ok(Some(ProcessResult {
            edits: vec![],
            old_source: source_code,
            new_source: None,
        }));
    }

    let new_source = apply_edits(&source_code, &edits)
        .with_context(|| format!("Failed to apply edits to {}", path.display()))?;

    Ok(Some(ProcessResult {
        edits: edit_infos,
        old_source: source_code,
        new_source: Some(new_source),
    }))
}

/// Write the processed result to the file
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write file: {}", path.display()))
}
