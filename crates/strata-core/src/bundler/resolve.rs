//! Default import specifier resolution.
//!
//! Resolves relative and absolute specifiers to canonical file paths with
//! extension and index-file probing. Bare specifiers (`react`) are not
//! resolved here; the bundler leaves them external.

use std::path::{Path, PathBuf};

/// Extensions probed when a specifier has no match as written.
const RESOLVE_EXTENSIONS: &[&str] = &[".js", ".mjs", ".jsx", ".ts", ".tsx"];

/// Index files probed when a specifier names a directory.
const INDEX_FILES: &[&str] = &["index.js", "index.mjs", "index.jsx", "index.ts", "index.tsx"];

/// Failure raised by the default resolver.
///
/// A missing file is not a failure — that is `Ok(None)`. Errors here are
/// file-system faults (e.g. during canonicalization) and are propagated
/// unchanged through any hook that delegates resolution.
#[derive(Debug)]
pub struct ResolveError {
    pub specifier: String,
    pub from: String,
    pub message: String,
}

impl std::fmt::Display for ResolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cannot resolve '{}' from '{}': {}",
            self.specifier, self.from, self.message
        )
    }
}

impl std::error::Error for ResolveError {}

/// Default resolver for relative and root-absolute imports.
#[derive(Debug, Default)]
pub struct Resolver;

impl Resolver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Resolve `specifier` from the module at `from`, inside `root`.
    ///
    /// `/`-prefixed specifiers are project-root-relative. Returns the
    /// canonical absolute path of the first candidate that exists,
    /// `Ok(None)` when the specifier is bare or no candidate exists.
    pub fn resolve(
        &self,
        specifier: &str,
        from: &Path,
        root: &Path,
    ) -> Result<Option<PathBuf>, ResolveError> {
        let target = if specifier.starts_with("./") || specifier.starts_with("../") {
            from.parent().unwrap_or(Path::new(".")).join(specifier)
        } else if let Some(rest) = specifier.strip_prefix('/') {
            root.join(rest)
        } else {
            return Ok(None);
        };

        self.probe(&target, specifier, from)
    }

    /// Probe a candidate path as a file, with extensions, then as a
    /// directory with index files.
    fn probe(
        &self,
        target: &Path,
        specifier: &str,
        from: &Path,
    ) -> Result<Option<PathBuf>, ResolveError> {
        if target.is_file() {
            return canonical(target, specifier, from).map(Some);
        }

        for ext in RESOLVE_EXTENSIONS {
            let with_ext = PathBuf::from(format!("{}{}", target.display(), ext));
            if with_ext.is_file() {
                return canonical(&with_ext, specifier, from).map(Some);
            }
        }

        if target.is_dir() {
            for index in INDEX_FILES {
                let index_path = target.join(index);
                if index_path.is_file() {
                    return canonical(&index_path, specifier, from).map(Some);
                }
            }
        }

        Ok(None)
    }
}

fn canonical(path: &Path, specifier: &str, from: &Path) -> Result<PathBuf, ResolveError> {
    dunce::canonicalize(path).map_err(|e| ResolveError {
        specifier: specifier.to_string(),
        from: from.display().to_string(),
        message: e.to_string(),
    })
}
