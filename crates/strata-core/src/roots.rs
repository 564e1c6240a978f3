//! Device root registry.
//!
//! Maps each device type to the source-tree directory owning that device
//! category and answers boundary-safe prefix-containment queries against
//! project-root-relative module ids.

use crate::device::DeviceType;
use crate::error::Error;
use serde::{Deserialize, Serialize};

/// Default directory containing desktop-only modules.
pub const DEFAULT_DESKTOP_ROOT: &str = "/src/desktop";
/// Default directory containing phone-only modules.
pub const DEFAULT_MOBILE_ROOT: &str = "/src/mobile";

/// Root directories per device category, as configured.
///
/// All fields are optional; `RootRegistry::new` fills in the defaults. The
/// tablet root defaults to the mobile root, so projects without a dedicated
/// tablet tree serve tablets the mobile modules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RootOptions {
    /// Directory containing desktop-only modules.
    pub desktop_root: Option<String>,
    /// Directory containing phone-only modules.
    pub mobile_root: Option<String>,
    /// Directory containing tablet-only modules.
    pub tablet_root: Option<String>,
}

impl RootOptions {
    /// Overlay `other` on top of `self`: any root set in `other` wins.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            desktop_root: other.desktop_root.or(self.desktop_root),
            mobile_root: other.mobile_root.or(self.mobile_root),
            tablet_root: other.tablet_root.or(self.tablet_root),
        }
    }
}

/// A registered device root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRoot {
    /// Device category this root serves.
    pub device: DeviceType,
    /// Normalized project-root-relative path (`/src/mobile`).
    pub path: String,
}

/// Validated device-type → root mapping.
///
/// Constructed once per build or serve invocation and read-only afterwards.
/// Registration order is fixed: desktop, mobile, tablet.
#[derive(Debug, Clone)]
pub struct RootRegistry {
    roots: [ModuleRoot; 3],
}

impl RootRegistry {
    /// Build a registry from configured roots, applying defaults.
    ///
    /// Ambiguous registrations are rejected here rather than mismatching at
    /// resolution time: an error is returned when any two distinct roots are
    /// such that one is a strict prefix of the other up to a `/` boundary,
    /// or when a root is empty, `/`, or contains backslashes.
    pub fn new(options: &RootOptions) -> Result<Self, Error> {
        let desktop = normalize_root(
            options
                .desktop_root
                .as_deref()
                .unwrap_or(DEFAULT_DESKTOP_ROOT),
        )?;
        let mobile = normalize_root(
            options
                .mobile_root
                .as_deref()
                .unwrap_or(DEFAULT_MOBILE_ROOT),
        )?;
        let tablet = match options.tablet_root.as_deref() {
            Some(path) => normalize_root(path)?,
            None => mobile.clone(),
        };

        let roots = [
            ModuleRoot {
                device: DeviceType::Desktop,
                path: desktop,
            },
            ModuleRoot {
                device: DeviceType::Mobile,
                path: mobile,
            },
            ModuleRoot {
                device: DeviceType::Tablet,
                path: tablet,
            },
        ];

        for (i, a) in roots.iter().enumerate() {
            for b in roots.iter().skip(i + 1) {
                if a.path != b.path
                    && (is_boundary_prefix(&a.path, &b.path)
                        || is_boundary_prefix(&b.path, &a.path))
                {
                    return Err(Error::OverlappingRoots {
                        first: a.path.clone(),
                        second: b.path.clone(),
                    });
                }
            }
        }

        Ok(Self { roots })
    }

    /// The root path registered for a device type.
    #[must_use]
    pub fn root_of(&self, device: DeviceType) -> &str {
        match device {
            DeviceType::Desktop => &self.roots[0].path,
            DeviceType::Mobile => &self.roots[1].path,
            DeviceType::Tablet => &self.roots[2].path,
        }
    }

    /// Logically distinct roots (deduplicated by physical path), in
    /// registration order.
    ///
    /// Two device types sharing one directory count as one root for
    /// variant-build purposes while staying distinct for classification.
    #[must_use]
    pub fn distinct_roots(&self) -> Vec<&ModuleRoot> {
        let mut distinct: Vec<&ModuleRoot> = Vec::with_capacity(self.roots.len());
        for root in &self.roots {
            if !distinct.iter().any(|r| r.path == root.path) {
                distinct.push(root);
            }
        }
        distinct
    }

    /// Devices owning a distinct root other than the primary (desktop) one,
    /// in registration order.
    #[must_use]
    pub fn secondary_devices(&self) -> Vec<DeviceType> {
        self.distinct_roots()
            .into_iter()
            .filter(|root| root.device != DeviceType::Desktop)
            .map(|root| root.device)
            .collect()
    }

    /// The most specific registered root containing `module_id`.
    ///
    /// Containment requires the character following the root in `module_id`
    /// to be a `/`, so `/src/mobile` does not match `/src/mobileExtra/x`.
    /// No match is `None`, never an error.
    #[must_use]
    pub fn resolve_root(&self, module_id: &str) -> Option<&ModuleRoot> {
        self.distinct_roots()
            .into_iter()
            .filter(|root| is_boundary_prefix(&root.path, module_id))
            .max_by_key(|root| root.path.len())
    }
}

/// True when `prefix` is a strict prefix of `path` ending at a `/` boundary.
fn is_boundary_prefix(prefix: &str, path: &str) -> bool {
    path.len() > prefix.len()
        && path.starts_with(prefix)
        && path.as_bytes()[prefix.len()] == b'/'
}

/// Normalize a configured root: leading `/`, no trailing `/`.
fn normalize_root(raw: &str) -> Result<String, Error> {
    let invalid = |reason: &str| Error::InvalidRoot {
        root: raw.to_string(),
        reason: reason.to_string(),
    };

    if raw.contains('\\') {
        return Err(invalid("use forward slashes"));
    }
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(invalid("must name a directory below the project root"));
    }
    let normalized = if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    };
    if normalized.contains("//") {
        return Err(invalid("contains an empty path segment"));
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(desktop: &str, mobile: &str, tablet: Option<&str>) -> RootOptions {
        RootOptions {
            desktop_root: Some(desktop.to_string()),
            mobile_root: Some(mobile.to_string()),
            tablet_root: tablet.map(str::to_string),
        }
    }

    #[test]
    fn test_defaults() {
        let registry = RootRegistry::new(&RootOptions::default()).unwrap();
        assert_eq!(registry.root_of(DeviceType::Desktop), "/src/desktop");
        assert_eq!(registry.root_of(DeviceType::Mobile), "/src/mobile");
        // Tablet defaults to the mobile tree.
        assert_eq!(registry.root_of(DeviceType::Tablet), "/src/mobile");
    }

    #[test]
    fn test_dedupe_shared_physical_root() {
        let registry = RootRegistry::new(&options("/d", "/m", Some("/m"))).unwrap();
        let distinct = registry.distinct_roots();
        assert_eq!(distinct.len(), 2);
        assert_eq!(registry.secondary_devices(), vec![DeviceType::Mobile]);
    }

    #[test]
    fn test_distinct_tablet_root_schedules_two_secondaries() {
        let registry = RootRegistry::new(&options("/d", "/m", Some("/t"))).unwrap();
        assert_eq!(
            registry.secondary_devices(),
            vec![DeviceType::Mobile, DeviceType::Tablet]
        );
    }

    #[test]
    fn test_boundary_safe_matching() {
        let registry =
            RootRegistry::new(&options("/src/mobileExtra", "/src/mobile", None)).unwrap();
        let matched = registry.resolve_root("/src/mobileExtra/x").unwrap();
        assert_eq!(matched.path, "/src/mobileExtra");
        let matched = registry.resolve_root("/src/mobile/x").unwrap();
        assert_eq!(matched.path, "/src/mobile");
    }

    #[test]
    fn test_no_match_is_none() {
        let registry = RootRegistry::new(&RootOptions::default()).unwrap();
        assert!(registry.resolve_root("/src/shared/util.js").is_none());
        // The root itself is a directory, not a module inside it.
        assert!(registry.resolve_root("/src/mobile").is_none());
    }

    #[test]
    fn test_overlapping_roots_rejected() {
        let err = RootRegistry::new(&options("/src", "/src/mobile", None)).unwrap_err();
        assert!(matches!(err, Error::OverlappingRoots { .. }));
    }

    #[test]
    fn test_overlap_after_normalization_rejected() {
        // "src/mobile/" normalizes to "/src/mobile", overlapping "/src".
        let err = RootRegistry::new(&options("src", "src/mobile/", None)).unwrap_err();
        assert!(matches!(err, Error::OverlappingRoots { .. }));
    }

    #[test]
    fn test_invalid_roots_rejected() {
        assert!(matches!(
            RootRegistry::new(&options("", "/m", None)).unwrap_err(),
            Error::InvalidRoot { .. }
        ));
        assert!(matches!(
            RootRegistry::new(&options("/", "/m", None)).unwrap_err(),
            Error::InvalidRoot { .. }
        ));
        assert!(matches!(
            RootRegistry::new(&options("\\src\\desktop", "/m", None)).unwrap_err(),
            Error::InvalidRoot { .. }
        ));
    }

    #[test]
    fn test_normalization() {
        let registry = RootRegistry::new(&options("src/desktop/", "src/mobile", None)).unwrap();
        assert_eq!(registry.root_of(DeviceType::Desktop), "/src/desktop");
        assert_eq!(registry.root_of(DeviceType::Mobile), "/src/mobile");
    }
}
