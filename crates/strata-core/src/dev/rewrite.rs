//! Per-request device path rewriting.
//!
//! Each request is classified from its device-category signal and, when the
//! requested path lives in a different device tree than the classification
//! calls for, the root prefix is substituted with the remainder preserved.

use crate::device::DeviceType;
use crate::roots::RootRegistry;

/// Reserved internal-module URL prefix. Requests under it pass through
/// unchanged regardless of classification.
pub const INTERNAL_PREFIX: &str = "/@modules/";

/// Rewrites request paths onto the classified device tree.
///
/// Pure and request-local: classification and rewrite share nothing across
/// requests beyond the read-only registry.
#[derive(Debug, Clone)]
pub struct RequestRewriter {
    registry: RootRegistry,
}

impl RequestRewriter {
    #[must_use]
    pub fn new(registry: RootRegistry) -> Self {
        Self { registry }
    }

    /// Rewritten path for a request, or `None` when the path passes through
    /// unchanged.
    ///
    /// `category` is the raw device-category string derived from request
    /// headers by an external parser; `None` classifies as desktop. Once a
    /// root match is found the rewrite is a pure prefix substitution and
    /// cannot fail.
    #[must_use]
    pub fn rewrite(&self, path: &str, category: Option<&str>) -> Option<String> {
        if path.starts_with(INTERNAL_PREFIX) {
            return None;
        }
        let current = self.registry.resolve_root(path)?;
        let device = DeviceType::from_category(category);
        let target = self.registry.root_of(device);
        if current.path == target {
            return None;
        }
        Some(format!("{target}{}", &path[current.path.len()..]))
    }
}
