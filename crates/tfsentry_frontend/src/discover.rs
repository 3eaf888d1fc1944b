//! Source file discovery.

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{FrontendError, FrontendResult};

/// Filters for a discovery walk.
#[derive(Debug, Clone)]
pub struct WalkOptions {
    /// Directory levels to traverse below the root; 0 recurses fully.
    /// The root's direct children are level 1.
    pub depth: usize,
    /// File suffixes to include, e.g. `".tf"`.
    pub extensions: Vec<String>,
}

impl WalkOptions {
    pub fn new(depth: usize, extensions: &[&str]) -> Self {
        Self {
            depth,
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
        }
    }

    fn matches(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }
}

/// Discover the source files under `root`, sorted lexicographically by
/// path so downstream compilation is reproducible.
///
/// A missing root is [`FrontendError::NotFound`]; an existing root with
/// no matching files is an empty result. A root that is itself a
/// matching file yields exactly that file.
pub fn discover(root: &Path, options: &WalkOptions) -> FrontendResult<Vec<PathBuf>> {
    if !root.exists() {
        return Err(FrontendError::NotFound(root.to_path_buf()));
    }

    if root.is_file() {
        return Ok(if options.matches(root) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let mut walker = WalkDir::new(root);
    if options.depth > 0 {
        walker = walker.max_depth(options.depth);
    }

    let mut sources: Vec<PathBuf> = walker
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file() && options.matches(e.path()))
        .map(|e| e.into_path())
        .collect();
    sources.sort();

    debug!(root = %root.display(), count = sources.len(), "discovered sources");
    Ok(sources)
}
