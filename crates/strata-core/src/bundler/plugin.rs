//! Plugin system for the bundler.
//!
//! Models the narrow host contract the variant machinery plugs into: a
//! one-time configuration hook, a per-import resolution hook, and a
//! bundle-finalization hook. Every hook has a default no-op body, so a
//! plugin implements only the slots it needs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::resolve::{ResolveError, Resolver};
use super::{AssetMap, BuildInput};
use crate::device::DeviceType;

/// Result type for plugin hooks.
pub type HookResult<T> = Result<T, PluginError>;

/// Error from a plugin hook.
#[derive(Debug)]
pub struct PluginError {
    /// Plugin name that caused the error.
    pub plugin: String,
    /// Hook that failed.
    pub hook: &'static str,
    /// Error message.
    pub message: String,
}

impl PluginError {
    #[must_use]
    pub fn new(plugin: &str, hook: &'static str, message: impl Into<String>) -> Self {
        Self {
            plugin: plugin.to_string(),
            hook,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for PluginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.plugin, self.hook, self.message)
    }
}

impl std::error::Error for PluginError {}

/// Role a plugin declares at construction.
///
/// The orchestrator filters cloned plugin lists by capability; plugin names
/// are for error messages only and never drive installation decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PluginCapability {
    /// Ordinary plugin, carried into every variant pass.
    #[default]
    Standard,
    /// Rewrites relative-import resolution onto one device tree.
    DeviceRedirect,
    /// Captures the primary pass configuration; never carried into
    /// secondary passes.
    VariantInit,
}

/// Context for one build pass, passed to every hook invocation.
///
/// Carries the pass's device type explicitly; there is no process-wide
/// "current variant" signal anywhere.
#[derive(Clone)]
pub struct PluginContext {
    /// Project root directory (canonical absolute).
    pub root: PathBuf,
    /// Device variant this pass compiles.
    pub device: DeviceType,
    /// Default resolver, for hooks that delegate resolution.
    resolver: Arc<Resolver>,
}

impl PluginContext {
    /// Create a context for one pass.
    #[must_use]
    pub fn new(root: PathBuf, device: DeviceType) -> Self {
        Self {
            root,
            device,
            resolver: Arc::new(Resolver::new()),
        }
    }

    /// Resolve `specifier` from `importer` with the default resolver,
    /// skipping every plugin resolve hook.
    ///
    /// `Ok(None)` means the resolver had no answer. An `Err` is the host
    /// resolver's own failure; callers must propagate it, never swallow it.
    pub fn resolve_skip_hooks(
        &self,
        specifier: &str,
        importer: &Path,
    ) -> Result<Option<PathBuf>, ResolveError> {
        self.resolver.resolve(specifier, importer, &self.root)
    }
}

/// The plugin trait.
///
/// All hooks have default implementations that do nothing, so a plugin
/// implements only the hooks it cares about.
pub trait Plugin: Send + Sync {
    /// Plugin name for error messages.
    fn name(&self) -> &str;

    /// Role declared at construction.
    fn capability(&self) -> PluginCapability {
        PluginCapability::Standard
    }

    /// One-time configuration hook.
    ///
    /// Invoked exactly once per pass with the resolved build input, before
    /// compilation starts. Plugins can mutate the input.
    fn options(&self, _input: &mut BuildInput, _ctx: &PluginContext) -> HookResult<()> {
        Ok(())
    }

    /// Per-import resolution hook.
    ///
    /// Return `Some(path)` to override resolution, or `None` to defer to
    /// the next plugin or the default resolver.
    fn resolve_id(
        &self,
        _specifier: &str,
        _importer: Option<&Path>,
        _ctx: &PluginContext,
    ) -> HookResult<Option<PathBuf>> {
        Ok(None)
    }

    /// Bundle-finalization hook.
    ///
    /// Invoked with the pass's finished asset map; plugins can add, rename,
    /// or rewrite assets before the invoker persists them.
    fn generate_bundle(&self, _assets: &mut AssetMap, _ctx: &PluginContext) -> HookResult<()> {
        Ok(())
    }
}

/// Ordered plugin list dispatching hooks for one pass.
///
/// `resolve_id` may be called many times concurrently across modules; the
/// container holds no mutable state, so no synchronization is needed.
pub struct PluginContainer {
    plugins: Vec<Arc<dyn Plugin>>,
    ctx: PluginContext,
}

impl PluginContainer {
    /// Create a container for one pass.
    #[must_use]
    pub fn new(plugins: Vec<Arc<dyn Plugin>>, ctx: PluginContext) -> Self {
        Self { plugins, ctx }
    }

    /// The pass context.
    #[must_use]
    pub fn context(&self) -> &PluginContext {
        &self.ctx
    }

    /// Call the configuration hook on every plugin, in order.
    pub fn call_options(&self, input: &mut BuildInput) -> HookResult<()> {
        for plugin in &self.plugins {
            plugin.options(input, &self.ctx)?;
        }
        Ok(())
    }

    /// Try to resolve an import through plugins; first non-`None` wins.
    pub fn resolve_id(
        &self,
        specifier: &str,
        importer: Option<&Path>,
    ) -> HookResult<Option<PathBuf>> {
        for plugin in &self.plugins {
            if let Some(resolved) = plugin.resolve_id(specifier, importer, &self.ctx)? {
                return Ok(Some(resolved));
            }
        }
        Ok(None)
    }

    /// Call the bundle-finalization hook on every plugin, in order.
    pub fn call_generate_bundle(&self, assets: &mut AssetMap) -> HookResult<()> {
        for plugin in &self.plugins {
            plugin.generate_bundle(assets, &self.ctx)?;
        }
        Ok(())
    }
}
