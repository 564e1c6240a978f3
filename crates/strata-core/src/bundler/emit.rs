//! Chunk emission.
//!
//! Walks the relative-import graph dependency-first and concatenates each
//! entry script's modules into a single chunk. Imports of bundled modules
//! are stripped; imports of external (bare) specifiers are hoisted to the
//! top of the chunk, deduplicated in first-appearance order.

use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

use super::plugin::PluginContainer;
use super::resolve::Resolver;
use super::{BuildError, BuildInput};

/// How one import specifier resolved.
enum Resolution {
    /// Bundled into the chunk.
    Module(PathBuf),
    /// Left as an external import.
    External,
}

/// Emits one chunk per entry script for a single build pass.
pub(super) struct ChunkEmitter<'a> {
    input: &'a BuildInput,
    container: &'a PluginContainer,
    resolver: Resolver,
}

impl<'a> ChunkEmitter<'a> {
    pub(super) fn new(input: &'a BuildInput, container: &'a PluginContainer) -> Self {
        Self {
            input,
            container,
            resolver: Resolver::new(),
        }
    }

    /// Emit the chunk for an entry script.
    pub(super) fn emit(&self, entry: &Path) -> Result<String, BuildError> {
        let mut visited = FxHashSet::default();
        let mut externals: Vec<String> = Vec::new();
        let mut body = String::new();
        self.visit(entry, &mut visited, &mut externals, &mut body)?;

        let mut chunk = String::new();
        for line in &externals {
            chunk.push_str(line);
            chunk.push('\n');
        }
        if !externals.is_empty() {
            chunk.push('\n');
        }
        chunk.push_str(&body);
        Ok(chunk)
    }

    /// Append `module` and its dependencies to the chunk, dependencies
    /// first. Already-visited modules are skipped, which also terminates
    /// import cycles.
    fn visit(
        &self,
        module: &Path,
        visited: &mut FxHashSet<PathBuf>,
        externals: &mut Vec<String>,
        body: &mut String,
    ) -> Result<(), BuildError> {
        let canonical = dunce::canonicalize(module).map_err(|e| BuildError {
            code: "BUNDLE_READ_ERROR",
            message: e.to_string(),
            path: Some(module.display().to_string()),
        })?;
        if !visited.insert(canonical.clone()) {
            return Ok(());
        }

        let source = std::fs::read_to_string(&canonical).map_err(|e| BuildError {
            code: "BUNDLE_READ_ERROR",
            message: e.to_string(),
            path: Some(canonical.display().to_string()),
        })?;

        let mut kept = String::new();
        for line in source.lines() {
            if let Some(specifier) = import_specifier(line) {
                match self.resolve(&specifier, &canonical)? {
                    Resolution::Module(dep) => {
                        self.visit(&dep, visited, externals, body)?;
                        continue;
                    }
                    Resolution::External => {
                        let line = line.to_string();
                        if !externals.contains(&line) {
                            externals.push(line);
                        }
                        continue;
                    }
                }
            }
            kept.push_str(line);
            kept.push('\n');
        }

        let label = canonical
            .strip_prefix(&self.input.root)
            .map_or_else(|_| canonical.display().to_string(), |rel| {
                format!("/{}", rel.display())
            });
        body.push_str(&format!("// {label}\n"));
        body.push_str(&kept);
        body.push('\n');
        Ok(())
    }

    /// Resolve one import: plugin hooks first, then the default resolver.
    /// An unresolved relative or root-absolute import is a build error;
    /// an unresolved bare specifier stays external.
    fn resolve(&self, specifier: &str, importer: &Path) -> Result<Resolution, BuildError> {
        if let Some(resolved) = self
            .container
            .resolve_id(specifier, Some(importer))
            .map_err(BuildError::from)?
        {
            return Ok(Resolution::Module(resolved));
        }

        if let Some(resolved) = self
            .resolver
            .resolve(specifier, importer, &self.input.root)
            .map_err(BuildError::from)?
        {
            return Ok(Resolution::Module(resolved));
        }

        if specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/')
        {
            return Err(BuildError {
                code: "UNRESOLVED_IMPORT",
                message: format!("Cannot resolve '{specifier}'"),
                path: Some(importer.display().to_string()),
            });
        }
        Ok(Resolution::External)
    }
}

/// Extract the specifier from a static import, side-effect import, or
/// `export ... from` line. Returns `None` for anything else.
fn import_specifier(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.starts_with("import ") {
        return extract_from_specifier(trimmed).or_else(|| extract_side_effect(trimmed));
    }
    if trimmed.starts_with("export ") && trimmed.contains(" from ") {
        return extract_from_specifier(trimmed);
    }
    None
}

/// Extract the quoted specifier from a `... from 'specifier'` clause.
fn extract_from_specifier(line: &str) -> Option<String> {
    let from_idx = line.find(" from ")?;
    quoted_prefix(line[from_idx + 6..].trim_start())
}

/// Extract the quoted specifier from `import 'specifier'`.
fn extract_side_effect(line: &str) -> Option<String> {
    quoted_prefix(line.strip_prefix("import ")?.trim_start())
}

/// The contents of a quote-delimited string at the start of `s`.
fn quoted_prefix(s: &str) -> Option<String> {
    let quote = s.chars().next()?;
    if quote != '\'' && quote != '"' {
        return None;
    }
    let inner = &s[1..];
    let end = inner.find(quote)?;
    Some(inner[..end].to_string())
}

/// Extract the `src` values of `<script type="module">` tags, in document
/// order.
pub(super) fn module_script_srcs(html: &str) -> Vec<String> {
    let mut srcs = Vec::new();
    for segment in html.split("<script").skip(1) {
        let Some(tag_end) = segment.find('>') else {
            continue;
        };
        let tag = &segment[..tag_end];
        if !tag.contains("type=\"module\"") && !tag.contains("type='module'") {
            continue;
        }
        if let Some(src) = attr_value(tag, "src") {
            srcs.push(src);
        }
    }
    srcs
}

/// The quoted value of an attribute inside a tag body.
fn attr_value(tag: &str, name: &str) -> Option<String> {
    let idx = tag.find(&format!("{name}="))?;
    quoted_prefix(&tag[idx + name.len() + 1..])
}
