//! Variant build orchestration.
//!
//! Runs the primary (desktop) pass, then one secondary pass per additional
//! distinct device root, folding every secondary asset map into the
//! primary's. Secondary passes clone the primary's *resolved* configuration
//! as captured at the one-time `options` hook, so none can start before the
//! primary's configuration resolution has completed.

use std::sync::{Arc, Mutex};

use super::plugin::{HookResult, Plugin, PluginCapability, PluginContext, PluginError};
use super::redirect::DeviceRedirect;
use super::{AssetMap, BuildError, BuildInput, Host};
use crate::device::DeviceType;
use crate::roots::RootRegistry;

/// One scheduled compilation pass.
#[derive(Clone)]
pub struct BuildVariant {
    /// Device category this pass compiles.
    pub device: DeviceType,
    /// Input configuration for the pass.
    pub input: BuildInput,
}

/// Captures the primary pass's resolved input at the one-time
/// configuration hook.
struct VariantInit {
    captured: Arc<Mutex<Option<BuildInput>>>,
}

impl Plugin for VariantInit {
    fn name(&self) -> &str {
        "strata:init"
    }

    fn capability(&self) -> PluginCapability {
        PluginCapability::VariantInit
    }

    fn options(&self, input: &mut BuildInput, _ctx: &PluginContext) -> HookResult<()> {
        let mut slot = self
            .captured
            .lock()
            .map_err(|_| PluginError::new(self.name(), "options", "capture slot poisoned"))?;
        // The hook fires once per pass; only the first configuration is the
        // primary's.
        if slot.is_none() {
            *slot = Some(input.clone());
        }
        Ok(())
    }
}

/// Sequences the primary and secondary variant builds against a host.
///
/// Passes are totally ordered: primary first, then each secondary in
/// registration order, never concurrently. A failing pass aborts the whole
/// build; a primary failure pre-empts every secondary.
pub struct VariantOrchestrator<'h> {
    host: &'h dyn Host,
    registry: RootRegistry,
}

impl<'h> VariantOrchestrator<'h> {
    #[must_use]
    pub fn new(host: &'h dyn Host, registry: RootRegistry) -> Self {
        Self { host, registry }
    }

    /// Run every variant pass and return the merged asset map.
    pub fn run(&self, input: BuildInput) -> Result<AssetMap, BuildError> {
        let captured: Arc<Mutex<Option<BuildInput>>> = Arc::new(Mutex::new(None));

        // Idempotent installation: previously installed variant machinery
        // is replaced, never duplicated.
        let mut primary = BuildVariant {
            device: DeviceType::Desktop,
            input,
        };
        primary
            .input
            .plugins
            .retain(|p| p.capability() == PluginCapability::Standard);
        primary.input.plugins.push(Arc::new(DeviceRedirect::new(
            DeviceType::Desktop,
            self.registry.clone(),
        )));
        primary.input.plugins.push(Arc::new(VariantInit {
            captured: Arc::clone(&captured),
        }));

        let BuildVariant { device, input } = primary;
        let mut assets = self.host.run(input, device)?;

        let resolved = captured
            .lock()
            .ok()
            .and_then(|mut slot| slot.take())
            .ok_or_else(|| BuildError {
                code: "HOST_CONTRACT_ERROR",
                message: "host never invoked the configuration hook".to_string(),
                path: None,
            })?;
        let entry = resolved.entry.clone();

        for device in self.registry.secondary_devices() {
            let BuildVariant { device, input } = self.derive_variant(&resolved, device);
            let secondary_assets = self.host.run(input, device)?;
            merge_variant_assets(&mut assets, secondary_assets, device, &entry);
        }

        Ok(assets)
    }

    /// Clone the primary's resolved input for a secondary device: variant
    /// machinery is dropped by capability and a redirector bound to the
    /// secondary device installed in its place.
    fn derive_variant(&self, resolved: &BuildInput, device: DeviceType) -> BuildVariant {
        let mut input = resolved.clone();
        input
            .plugins
            .retain(|p| p.capability() == PluginCapability::Standard);
        input
            .plugins
            .push(Arc::new(DeviceRedirect::new(device, self.registry.clone())));
        BuildVariant { device, input }
    }
}

/// Entry document name for a variant (`index.html` → `index.mobile.html`).
#[must_use]
pub fn variant_entry_name(entry: &str, device: DeviceType) -> String {
    match entry.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}.{}.{ext}", device.as_str()),
        None => format!("{entry}.{}", device.as_str()),
    }
}

/// Fold a secondary pass's assets into the primary map.
///
/// The entry document is renamed per variant before insertion, so variants
/// never collide on the canonical entry name. Every other file inserts only
/// when absent: first writer wins, and the primary always wins ties.
pub fn merge_variant_assets(
    primary: &mut AssetMap,
    secondary: AssetMap,
    device: DeviceType,
    entry: &str,
) {
    for (name, asset) in secondary {
        if name == entry {
            primary.insert(variant_entry_name(entry, device), asset);
        } else {
            primary.entry(name).or_insert(asset);
        }
    }
}
