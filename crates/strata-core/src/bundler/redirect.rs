//! Device-tree import redirection.
//!
//! The build-time resolution hook that substitutes one device root for
//! another during relative-import resolution. A `./Button` import inside a
//! desktop module resolves to the mobile tree's `Button` when compiling the
//! mobile variant, with zero changes to import statements.

use std::path::{Path, PathBuf};

use super::plugin::{HookResult, Plugin, PluginCapability, PluginContext, PluginError};
use crate::device::DeviceType;
use crate::roots::RootRegistry;

/// Path segment owned by the dependency manager. Imports whose importer
/// lives under it are never redirected.
const NODE_MODULES_SEGMENT: &str = "node_modules";

/// Resolution hook bound to one target device type.
pub struct DeviceRedirect {
    device: DeviceType,
    registry: RootRegistry,
}

impl DeviceRedirect {
    /// Create a redirector targeting `device`'s tree.
    #[must_use]
    pub fn new(device: DeviceType, registry: RootRegistry) -> Self {
        Self { device, registry }
    }

    /// The device type this redirector targets.
    #[must_use]
    pub fn device(&self) -> DeviceType {
        self.device
    }
}

impl Plugin for DeviceRedirect {
    fn name(&self) -> &str {
        "strata:redirect"
    }

    fn capability(&self) -> PluginCapability {
        PluginCapability::DeviceRedirect
    }

    fn resolve_id(
        &self,
        specifier: &str,
        importer: Option<&Path>,
        ctx: &PluginContext,
    ) -> HookResult<Option<PathBuf>> {
        let Some(importer) = importer else {
            return Ok(None);
        };
        if in_node_modules(importer) {
            return Ok(None);
        }
        if !specifier.starts_with("./") && !specifier.starts_with("../") {
            return Ok(None);
        }

        // Default resolution first, skipping this hook; its failures pass
        // through untouched.
        let resolved = ctx
            .resolve_skip_hooks(specifier, importer)
            .map_err(|e| PluginError::new(self.name(), "resolve_id", e.to_string()))?;
        let Some(resolved) = resolved else {
            return Ok(None);
        };

        let Some(module_id) = module_id(&resolved, &ctx.root) else {
            return Ok(None);
        };
        let Some(current) = self.registry.resolve_root(&module_id) else {
            return Ok(None);
        };

        let target = self.registry.root_of(self.device);
        let rewritten = format!("{target}{}", &module_id[current.path.len()..]);
        Ok(Some(join_module_id(&ctx.root, &rewritten)))
    }
}

/// Project-root-relative module id (`/src/desktop/App.js`) for an absolute
/// path, or `None` when the path lies outside the root.
fn module_id(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let mut id = String::new();
    for component in rel.components() {
        id.push('/');
        id.push_str(&component.as_os_str().to_string_lossy());
    }
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Absolute path under `root` for a project-root-relative module id.
fn join_module_id(root: &Path, module_id: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for segment in module_id.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path
}

/// True when a path contains a dependency-manager-owned segment.
fn in_node_modules(path: &Path) -> bool {
    path.components()
        .any(|c| c.as_os_str() == NODE_MODULES_SEGMENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roots::RootOptions;
    use tempfile::{tempdir, TempDir};

    /// A project with a `Button` module in both device trees.
    fn project() -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        for tree in ["desktop", "mobile"] {
            std::fs::create_dir_all(root.join("src").join(tree)).unwrap();
        }
        std::fs::write(
            root.join("src/desktop/App.js"),
            "import { Button } from './Button.js';",
        )
        .unwrap();
        std::fs::write(root.join("src/desktop/Button.js"), "export const Button = 1;").unwrap();
        std::fs::write(root.join("src/mobile/Button.js"), "export const Button = 2;").unwrap();
        (dir, root)
    }

    fn registry() -> RootRegistry {
        RootRegistry::new(&RootOptions::default()).unwrap()
    }

    #[test]
    fn test_variant_dependent_resolution() {
        let (_dir, root) = project();
        let importer = root.join("src/desktop/App.js");

        // Same importer, same specifier; the result depends on the variant
        // being compiled.
        let mobile = DeviceRedirect::new(DeviceType::Mobile, registry());
        let ctx = PluginContext::new(root.clone(), DeviceType::Mobile);
        let resolved = mobile
            .resolve_id("./Button.js", Some(&importer), &ctx)
            .unwrap()
            .unwrap();
        assert_eq!(resolved, root.join("src/mobile/Button.js"));

        let desktop = DeviceRedirect::new(DeviceType::Desktop, registry());
        let ctx = PluginContext::new(root.clone(), DeviceType::Desktop);
        let resolved = desktop
            .resolve_id("./Button.js", Some(&importer), &ctx)
            .unwrap()
            .unwrap();
        assert_eq!(resolved, root.join("src/desktop/Button.js"));
    }

    #[test]
    fn test_extensionless_specifier_redirects() {
        let (_dir, root) = project();
        let importer = root.join("src/desktop/App.js");

        let mobile = DeviceRedirect::new(DeviceType::Mobile, registry());
        let ctx = PluginContext::new(root.clone(), DeviceType::Mobile);
        let resolved = mobile
            .resolve_id("./Button", Some(&importer), &ctx)
            .unwrap()
            .unwrap();
        assert_eq!(resolved, root.join("src/mobile/Button.js"));
    }

    #[test]
    fn test_bare_specifier_never_redirected() {
        let (_dir, root) = project();
        let importer = root.join("src/desktop/App.js");

        let mobile = DeviceRedirect::new(DeviceType::Mobile, registry());
        let ctx = PluginContext::new(root, DeviceType::Mobile);
        assert!(mobile
            .resolve_id("react", Some(&importer), &ctx)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_node_modules_importer_never_redirected() {
        let (_dir, root) = project();
        let dep = root.join("node_modules/pkg");
        std::fs::create_dir_all(&dep).unwrap();
        std::fs::write(dep.join("index.js"), "import './util.js';").unwrap();
        std::fs::write(dep.join("util.js"), "export {};").unwrap();

        let mobile = DeviceRedirect::new(DeviceType::Mobile, registry());
        let ctx = PluginContext::new(root.clone(), DeviceType::Mobile);
        assert!(mobile
            .resolve_id("./util.js", Some(&dep.join("index.js")), &ctx)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_missing_importer_never_redirected() {
        let (_dir, root) = project();
        let mobile = DeviceRedirect::new(DeviceType::Mobile, registry());
        let ctx = PluginContext::new(root, DeviceType::Mobile);
        assert!(mobile.resolve_id("./Button.js", None, &ctx).unwrap().is_none());
    }

    #[test]
    fn test_module_outside_roots_not_redirected() {
        let (_dir, root) = project();
        std::fs::create_dir_all(root.join("src/shared")).unwrap();
        std::fs::write(root.join("src/shared/util.js"), "export {};").unwrap();
        std::fs::write(
            root.join("src/desktop/uses_shared.js"),
            "import '../shared/util.js';",
        )
        .unwrap();

        let mobile = DeviceRedirect::new(DeviceType::Mobile, registry());
        let ctx = PluginContext::new(root.clone(), DeviceType::Mobile);
        // Resolves fine, but falls under no registered root.
        assert!(mobile
            .resolve_id(
                "../shared/util.js",
                Some(&root.join("src/desktop/uses_shared.js")),
                &ctx
            )
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_unresolvable_relative_import_is_none() {
        let (_dir, root) = project();
        let importer = root.join("src/desktop/App.js");

        let mobile = DeviceRedirect::new(DeviceType::Mobile, registry());
        let ctx = PluginContext::new(root, DeviceType::Mobile);
        // The default resolver has no answer; the redirector defers.
        assert!(mobile
            .resolve_id("./Missing.js", Some(&importer), &ctx)
            .unwrap()
            .is_none());
    }
}
