//! Application features a license can unlock, and their bitmask encoding.
//!
//! The order of a feature table is a wire contract: bit `i`, counted from the
//! most significant bit of the allocated field, grants `order[i]`. Reordering
//! a table is a breaking format change.

use crate::error::{LicenseError, LicenseResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A feature flag of the Orbit CRM application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Partner directory.
    Partners,
    /// Project tracking.
    Projects,
    /// Sales pipeline.
    Sales,
    /// Document storage.
    Documents,
    /// Shared calendar.
    Calendar,
    /// Activity logs.
    Logs,
    /// Per-user item lists.
    MyItems,
    /// Audit trail.
    Audit,
}

impl Feature {
    /// Stable wire/CLI name of the feature.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Partners => "partners",
            Self::Projects => "projects",
            Self::Sales => "sales",
            Self::Documents => "documents",
            Self::Calendar => "calendar",
            Self::Logs => "logs",
            Self::MyItems => "my_items",
            Self::Audit => "audit",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Feature {
    type Err = LicenseError;

    fn from_str(s: &str) -> LicenseResult<Self> {
        match s {
            "partners" => Ok(Self::Partners),
            "projects" => Ok(Self::Projects),
            "sales" => Ok(Self::Sales),
            "documents" => Ok(Self::Documents),
            "calendar" => Ok(Self::Calendar),
            "logs" => Ok(Self::Logs),
            "my_items" => Ok(Self::MyItems),
            "audit" => Ok(Self::Audit),
            other => Err(LicenseError::InvalidTerms(format!(
                "unknown feature: {other}"
            ))),
        }
    }
}

/// Feature table of the current key format (8-bit field, MSB first).
pub const FEATURE_ORDER: [Feature; 7] = [
    Feature::Partners,
    Feature::Projects,
    Feature::Sales,
    Feature::Documents,
    Feature::Calendar,
    Feature::MyItems,
    Feature::Audit,
];

/// Bit width of the current feature field.
pub const FEATURE_MASK_BITS: u32 = 8;

/// Feature table of the legacy key format (6-bit field, MSB first).
pub const LEGACY_FEATURE_ORDER: [Feature; 6] = [
    Feature::Partners,
    Feature::Sales,
    Feature::Calendar,
    Feature::Projects,
    Feature::Documents,
    Feature::Logs,
];

/// Bit width of the legacy feature field.
pub const LEGACY_FEATURE_MASK_BITS: u32 = 6;

/// Packs `features` into a bitmask under the given table.
///
/// # Errors
///
/// Returns [`LicenseError::InvalidTerms`] for a feature the table cannot
/// represent.
pub fn features_to_mask(
    features: &BTreeSet<Feature>,
    order: &[Feature],
    width: u32,
) -> LicenseResult<u8> {
    let mut mask = 0u8;
    for feature in features {
        let idx = order.iter().position(|f| f == feature).ok_or_else(|| {
            LicenseError::InvalidTerms(format!(
                "feature {feature} is not representable in this key format"
            ))
        })?;
        mask |= 1u8 << (width - 1 - idx as u32);
    }
    Ok(mask)
}

/// Expands a bitmask back into a feature set under the given table.
///
/// Bits beyond the table (possible when the table is shorter than the field)
/// are ignored; the mask arrives MAC-authenticated.
#[must_use]
pub fn mask_to_features(mask: u8, order: &[Feature], width: u32) -> BTreeSet<Feature> {
    let mut features = BTreeSet::new();
    for (idx, feature) in order.iter().enumerate() {
        if mask & (1u8 << (width - 1 - idx as u32)) != 0 {
            features.insert(*feature);
        }
    }
    features
}
