//! Device category classification.
//!
//! Maps a raw device-category string (derived externally from request
//! headers) to one of a closed set of device types. Build passes carry a
//! fixed `DeviceType` for the whole pass instead of classifying per module.

use serde::{Deserialize, Serialize};

/// Device category a source tree or request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    #[default]
    Desktop,
    Mobile,
    Tablet,
}

impl DeviceType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Mobile => "mobile",
            Self::Tablet => "tablet",
        }
    }

    /// Classify a raw device-category string.
    ///
    /// Categories containing "tablet" map to [`DeviceType::Tablet`], those
    /// containing "phone" (which covers "smartphone" and "feature phone")
    /// map to [`DeviceType::Mobile`]. Anything else — an unknown category,
    /// an empty string, or an upstream parse failure surfaced as `None` —
    /// falls back to [`DeviceType::Desktop`].
    ///
    /// Pure and deterministic; computed fresh per call, never cached.
    #[must_use]
    pub fn from_category(category: Option<&str>) -> Self {
        let Some(category) = category else {
            return Self::Desktop;
        };
        let category = category.to_ascii_lowercase();
        if category.contains("tablet") {
            Self::Tablet
        } else if category.contains("phone") {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
