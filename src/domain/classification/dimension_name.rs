// ============================================================
// DIMENSION NAME
// ============================================================
// Validated, case-normalized name of a business dimension

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Category, Rejection};

/// Maximum length of a dimension name, in characters
pub const MAX_DIMENSION_NAME_LEN: usize = 64;

/// Name of the catch-all dimension. It can never be removed or renamed.
pub const UNATTRIBUTED: &str = "unattributed";

/// A business dimension name: trimmed, lower-cased, non-empty, and distinct
/// from the base category names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DimensionName(String);

impl DimensionName {
    pub fn new(raw: &str) -> Result<Self, Rejection> {
        let normalized = raw.trim().to_lowercase();

        if normalized.is_empty() {
            return Err(Rejection::InvalidDimensionName {
                name: raw.to_string(),
                reason: "name is empty".to_string(),
            });
        }
        if normalized.chars().count() > MAX_DIMENSION_NAME_LEN {
            return Err(Rejection::InvalidDimensionName {
                name: raw.to_string(),
                reason: format!("name exceeds {} characters", MAX_DIMENSION_NAME_LEN),
            });
        }
        if normalized.chars().any(char::is_control) {
            return Err(Rejection::InvalidDimensionName {
                name: raw.to_string(),
                reason: "name contains control characters".to_string(),
            });
        }
        if Category::is_base_name(&normalized) {
            return Err(Rejection::InvalidDimensionName {
                name: raw.to_string(),
                reason: "name is a reserved category".to_string(),
            });
        }

        Ok(Self(normalized))
    }

    pub fn unattributed() -> Self {
        Self(UNATTRIBUTED.to_string())
    }

    pub fn is_unattributed(&self) -> bool {
        self.0 == UNATTRIBUTED
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DimensionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for DimensionName {
    type Err = Rejection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for DimensionName {
    type Error = Rejection;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<DimensionName> for String {
    fn from(name: DimensionName) -> Self {
        name.0
    }
}

impl AsRef<str> for DimensionName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
