//! Locating per-realization input files on disk.
//!
//! Ensemble runs lay out one directory per member, e.g.
//! `runs/realization-3/iter-0/share/results/summary.parquet`. Given the run
//! root and a glob over relative paths, [`discover_realization_files`]
//! returns the matched file of every realization, keyed by the number in
//! its `realization-<N>` path component.
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use globset::Glob;
use log::debug;
use regex::Regex;
use snafu::prelude::*;
use walkdir::WalkDir;

/// Errors from realization file discovery.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DiscoveryError {
    /// The glob pattern does not parse.
    #[snafu(display("Invalid glob pattern {pattern:?}: {source}"))]
    InvalidGlob {
        /// The rejected pattern.
        pattern: String,
        /// Underlying parse error.
        source: globset::Error,
    },

    /// The realization component pattern failed to compile.
    #[snafu(display("Invalid realization pattern: {source}"))]
    RealizationPattern {
        /// Underlying regex error.
        source: regex::Error,
    },

    /// Walking the directory tree failed.
    #[snafu(display("Failed to walk {}: {source}", root.display()))]
    Walk {
        /// Root being walked.
        root: PathBuf,
        /// Underlying walk error.
        source: walkdir::Error,
    },

    /// A matched file has no `realization-<N>` component.
    #[snafu(display("No realization-<N> component in {}", path.display()))]
    NoRealizationIndex {
        /// The matched file.
        path: PathBuf,
    },

    /// Two matched files resolve to the same realization.
    #[snafu(display(
        "Realization {realization} matched twice: {} and {}",
        first.display(),
        second.display()
    ))]
    DuplicateRealization {
        /// The realization number.
        realization: i64,
        /// File found first.
        first: PathBuf,
        /// File found second.
        second: PathBuf,
    },
}

/// Path component naming a realization directory.
const REALIZATION_COMPONENT: &str = r"^realization-(\d+)$";

/// Walk `root` and collect files whose path relative to `root` matches
/// `pattern`, keyed by realization number.
///
/// `pattern` uses `globset` syntax and `/` separators, e.g.
/// `realization-*/iter-0/**/*.parquet`. Symlinks are not followed.
pub fn discover_realization_files(
    root: impl AsRef<Path>,
    pattern: &str,
) -> Result<BTreeMap<i64, PathBuf>, DiscoveryError> {
    let root = root.as_ref();
    let matcher = Glob::new(pattern)
        .context(InvalidGlobSnafu { pattern })?
        .compile_matcher();
    let component = Regex::new(REALIZATION_COMPONENT).context(RealizationPatternSnafu)?;

    let mut files = BTreeMap::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.context(WalkSnafu { root })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        if !matcher.is_match(relative) {
            continue;
        }

        let path = entry.into_path();
        let realization = realization_of(relative_components(&path, root), &component)
            .context(NoRealizationIndexSnafu { path: &path })?;

        if let Some(first) = files.get(&realization) {
            return DuplicateRealizationSnafu {
                realization,
                first: PathBuf::clone(first),
                second: path,
            }
            .fail();
        }
        files.insert(realization, path);
    }

    debug!(
        "discovered {} realization file(s) under {} matching {pattern:?}",
        files.len(),
        root.display()
    );
    Ok(files)
}

fn relative_components<'a>(path: &'a Path, root: &Path) -> impl Iterator<Item = &'a str> {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
}

/// Number in the first `realization-<N>` component.
fn realization_of<'a>(
    mut components: impl Iterator<Item = &'a str>,
    pattern: &Regex,
) -> Option<i64> {
    components.find_map(|part| {
        pattern
            .captures(part)
            .and_then(|caps| caps.get(1))
            .and_then(|n| n.as_str().parse().ok())
    })
}
