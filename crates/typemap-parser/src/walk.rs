//! Collect Python sources under a directory.

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};

/// Path globs applied relative to the source root.
#[derive(Debug, Clone, Default)]
pub struct SourceFilter {
    /// When non-empty, only matching files are kept.
    pub include: Vec<String>,
    pub skip: Vec<String>,
}

impl SourceFilter {
    pub fn new(include: Vec<String>, skip: Vec<String>) -> Self {
        Self { include, skip }
    }
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for p in patterns {
        builder.add(Glob::new(p).with_context(|| format!("invalid glob pattern: {}", p))?);
    }
    Ok(Some(builder.build().context("failed to build glob set")?))
}

fn is_python(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("py" | "pyi")
    )
}

/// Read every `.py`/`.pyi` file under `root` that passes `filter`.
///
/// Honors `.gitignore` and `.typemapignore` and skips hidden entries.
/// Returned paths are relative to `root`; unreadable files are logged and skipped.
pub fn collect_python_files(root: &Path, filter: &SourceFilter) -> Result<Vec<(PathBuf, String)>> {
    let include = build_globset(&filter.include)?;
    let skip = build_globset(&filter.skip)?;

    let walker = ignore::WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(true)
        .add_custom_ignore_filename(".typemapignore")
        .build();

    let mut files = Vec::new();
    for entry in walker.flatten() {
        let path = entry.path();
        if !path.is_file() || !is_python(path) {
            continue;
        }
        let rel_path = path.strip_prefix(root).unwrap_or(path);
        if let Some(ref inc) = include
            && !inc.is_match(rel_path)
        {
            continue;
        }
        if let Some(ref exc) = skip
            && exc.is_match(rel_path)
        {
            continue;
        }

        match std::fs::read_to_string(path) {
            Ok(source) => files.push((rel_path.to_path_buf(), source)),
            Err(e) => tracing::warn!(path = %path.display(), "skipping unreadable file: {e}"),
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    tracing::debug!(count = files.len(), root = %root.display(), "collected python files");
    Ok(files)
}
