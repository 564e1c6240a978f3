//! Device-variant bundler.
//!
//! A small host bundler plus the hook contract the variant machinery plugs
//! into.
//!
//! ## Architecture
//!
//! 1. **Configure** - run the one-time `options` hook on the resolved input
//! 2. **Resolve** - plugin resolve hooks, then the default resolver
//! 3. **Emit** - concatenate each entry script's modules into one chunk
//! 4. **Finalize** - expose the asset map to `generate_bundle` hooks
//!
//! One [`Host::run`] call is one complete compilation pass for one device
//! variant. The orchestrator in [`variants`] sequences the passes and
//! merges their outputs.

mod emit;
mod plugin;
mod redirect;
mod resolve;
mod variants;

pub use plugin::{
    HookResult, Plugin, PluginCapability, PluginContainer, PluginContext, PluginError,
};
pub use redirect::DeviceRedirect;
pub use resolve::{ResolveError, Resolver};
pub use variants::{merge_variant_assets, variant_entry_name, BuildVariant, VariantOrchestrator};

use crate::device::DeviceType;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// One emitted output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputAsset {
    /// File content.
    pub content: String,
}

impl OutputAsset {
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// `fileName` → asset map accumulated during a pass and merged across
/// variant passes.
///
/// Append-only by convention: the pass that first inserts a name owns it.
pub type AssetMap = BTreeMap<String, OutputAsset>;

/// Resolved configuration for one build pass.
#[derive(Clone)]
pub struct BuildInput {
    /// Project root (canonical absolute).
    pub root: PathBuf,
    /// Entry document file name, relative to the root (`index.html`).
    pub entry: String,
    /// Ordered plugin list for the pass.
    pub plugins: Vec<Arc<dyn Plugin>>,
}

impl BuildInput {
    /// Create an input with no plugins.
    #[must_use]
    pub fn new(root: PathBuf, entry: impl Into<String>) -> Self {
        Self {
            root,
            entry: entry.into(),
            plugins: Vec::new(),
        }
    }

    /// Add a plugin.
    #[must_use]
    pub fn plugin(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }
}

/// Build pass error.
#[derive(Debug)]
pub struct BuildError {
    pub code: &'static str,
    pub message: String,
    pub path: Option<String>,
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "{}: {} ({})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for BuildError {}

impl From<PluginError> for BuildError {
    fn from(err: PluginError) -> Self {
        BuildError {
            code: "PLUGIN_ERROR",
            message: err.to_string(),
            path: None,
        }
    }
}

impl From<ResolveError> for BuildError {
    fn from(err: ResolveError) -> Self {
        BuildError {
            code: "BUNDLE_RESOLVE_ERROR",
            message: err.message,
            path: Some(err.from),
        }
    }
}

/// Host interface the orchestrator drives.
///
/// One call is one complete compilation pass for one device variant. The
/// device type is passed explicitly; implementations must not rely on any
/// process-wide variant signal.
pub trait Host: Send + Sync {
    fn run(&self, input: BuildInput, device: DeviceType) -> Result<AssetMap, BuildError>;
}

/// The bundler shipping with strata.
///
/// Parses the entry document for `<script type="module">` tags, walks each
/// script's relative-import graph through the plugin resolve chain, and
/// emits one content-hashed chunk per script alongside the rewritten
/// document. Identical names across passes imply identical content, which
/// is what makes first-writer-wins merging sound.
#[derive(Debug, Default)]
pub struct Bundler;

impl Bundler {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Host for Bundler {
    fn run(&self, mut input: BuildInput, device: DeviceType) -> Result<AssetMap, BuildError> {
        let ctx = PluginContext::new(input.root.clone(), device);
        let container = PluginContainer::new(input.plugins.clone(), ctx);

        // One-time configuration hook; the input is final afterwards.
        container.call_options(&mut input)?;

        let entry_path = input.root.join(&input.entry);
        let html = std::fs::read_to_string(&entry_path).map_err(|e| BuildError {
            code: "BUNDLE_ENTRY_NOT_FOUND",
            message: e.to_string(),
            path: Some(entry_path.display().to_string()),
        })?;

        let emitter = emit::ChunkEmitter::new(&input, &container);
        let mut assets = AssetMap::new();
        let mut document = html.clone();

        for src in emit::module_script_srcs(&html) {
            let script_path = input.root.join(src.trim_start_matches('/'));
            let chunk = emitter.emit(&script_path)?;
            let name = chunk_name(&src, &chunk);
            document = document
                .replace(&format!("\"{src}\""), &format!("\"/{name}\""))
                .replace(&format!("'{src}'"), &format!("'/{name}'"));
            assets.insert(name, OutputAsset::new(chunk));
        }

        assets.insert(input.entry.clone(), OutputAsset::new(document));

        container.call_generate_bundle(&mut assets)?;
        Ok(assets)
    }
}

/// Content-hashed output name for an entry script's chunk.
fn chunk_name(src: &str, chunk: &str) -> String {
    let stem = src
        .rsplit('/')
        .next()
        .map_or(src, |file| file.split('.').next().unwrap_or(file));
    let hash = blake3::hash(chunk.as_bytes()).to_hex().to_string();
    format!("assets/{stem}.{}.js", &hash[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_chunk_name_is_stable() {
        let a = chunk_name("/src/desktop/main.js", "const x = 1;");
        let b = chunk_name("/src/desktop/main.js", "const x = 1;");
        let c = chunk_name("/src/desktop/main.js", "const x = 2;");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.starts_with("assets/main."));
        assert!(a.ends_with(".js"));
    }

    #[test]
    fn test_pass_emits_chunk_and_rewritten_document() {
        let dir = tempdir().unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::write(
            root.join("index.html"),
            "<html><script type=\"module\" src=\"/src/main.js\"></script></html>",
        )
        .unwrap();
        std::fs::write(
            root.join("src/main.js"),
            "import { x } from './dep.js';\nconsole.log(x);\n",
        )
        .unwrap();
        std::fs::write(root.join("src/dep.js"), "export const x = 1;\n").unwrap();

        let input = BuildInput::new(root, "index.html");
        let assets = Bundler::new().run(input, DeviceType::Desktop).unwrap();

        assert!(assets.contains_key("index.html"));
        let chunk_names: Vec<&String> = assets
            .keys()
            .filter(|name| name.starts_with("assets/"))
            .collect();
        assert_eq!(chunk_names.len(), 1);

        // Dependency emitted before the entry, imports of bundled modules
        // stripped.
        let chunk = &assets[chunk_names[0]].content;
        let dep_at = chunk.find("export const x").unwrap();
        let entry_at = chunk.find("console.log(x)").unwrap();
        assert!(dep_at < entry_at);
        assert!(!chunk.contains("from './dep.js'"));

        // The document references the hashed chunk.
        let document = &assets["index.html"].content;
        assert!(document.contains(&format!("\"/{}\"", chunk_names[0])));
        assert!(!document.contains("/src/main.js"));
    }

    #[test]
    fn test_external_imports_hoisted() {
        let dir = tempdir().unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::write(
            root.join("index.html"),
            "<html><script type=\"module\" src=\"/src/main.js\"></script></html>",
        )
        .unwrap();
        std::fs::write(
            root.join("src/main.js"),
            "import React from 'react';\nconsole.log(React);\n",
        )
        .unwrap();

        let input = BuildInput::new(root, "index.html");
        let assets = Bundler::new().run(input, DeviceType::Desktop).unwrap();

        let chunk = assets
            .iter()
            .find(|(name, _)| name.starts_with("assets/"))
            .map(|(_, asset)| &asset.content)
            .unwrap();
        assert!(chunk.starts_with("import React from 'react';"));
    }

    #[test]
    fn test_missing_entry_is_fatal() {
        let dir = tempdir().unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        let input = BuildInput::new(root, "index.html");
        let err = Bundler::new().run(input, DeviceType::Desktop).unwrap_err();
        assert_eq!(err.code, "BUNDLE_ENTRY_NOT_FOUND");
    }

    #[test]
    fn test_unresolved_relative_import_is_fatal() {
        let dir = tempdir().unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::write(
            root.join("index.html"),
            "<html><script type=\"module\" src=\"/src/main.js\"></script></html>",
        )
        .unwrap();
        std::fs::write(root.join("src/main.js"), "import './missing.js';\n").unwrap();

        let input = BuildInput::new(root, "index.html");
        let err = Bundler::new().run(input, DeviceType::Desktop).unwrap_err();
        assert_eq!(err.code, "UNRESOLVED_IMPORT");
    }
}
