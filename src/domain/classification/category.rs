// ============================================================
// COLUMN CATEGORY
// ============================================================
// The three base roles a column can hold

use serde::{Deserialize, Serialize};
use std::fmt;

/// Base role of a column within a classified file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Categorical or key values (customer ID, market)
    Identifiers,

    /// Quantitative values (revenue, volume)
    Measures,

    /// Not yet assigned a role
    Unclassified,
}

impl Category {
    pub const ALL: [Category; 3] = [
        Category::Identifiers,
        Category::Measures,
        Category::Unclassified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Identifiers => "identifiers",
            Category::Measures => "measures",
            Category::Unclassified => "unclassified",
        }
    }

    /// Whether `name` spells one of the base categories (case-insensitive).
    pub fn is_base_name(name: &str) -> bool {
        name.trim().parse::<Category>().is_ok()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "identifiers" => Ok(Self::Identifiers),
            "measures" => Ok(Self::Measures),
            "unclassified" => Ok(Self::Unclassified),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}
