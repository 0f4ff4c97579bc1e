// ============================================================
// TRANSITION TYPES
// ============================================================
// Move targets, outcomes, and rejection reasons for local edits

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::{Category, DimensionName};

/// Destination of a column move: a base category, or a business dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Target {
    Category(Category),
    Dimension(DimensionName),
}

impl Target {
    /// Dispatch a free-form drop target name: base category names select a
    /// category, anything else is taken as a dimension name.
    pub fn parse(raw: &str) -> Result<Self, Rejection> {
        match raw.trim().parse::<Category>() {
            Ok(category) => Ok(Target::Category(category)),
            Err(_) => DimensionName::new(raw).map(Target::Dimension),
        }
    }
}

impl From<Category> for Target {
    fn from(category: Category) -> Self {
        Target::Category(category)
    }
}

impl From<DimensionName> for Target {
    fn from(name: DimensionName) -> Self {
        Target::Dimension(name)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Category(category) => write!(f, "category:{}", category),
            Target::Dimension(name) => write!(f, "dimension:{}", name),
        }
    }
}

/// Why a local edit was not applied. State is never mutated on rejection.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rejection {
    #[error("unknown column: {column}")]
    UnknownColumn { column: String },

    #[error("unknown dimension: {dimension}")]
    UnknownDimension { dimension: String },

    #[error("dimension already exists: {dimension}")]
    DuplicateDimension { dimension: String },

    #[error("custom dimension limit of {limit} reached")]
    DimensionQuotaReached { limit: usize },

    #[error("dimension {dimension} is reserved")]
    ReservedDimension { dimension: String },

    #[error("invalid dimension name {name:?}: {reason}")]
    InvalidDimensionName { name: String, reason: String },

    #[error("file index {index} out of range for {len} files")]
    FileIndexOutOfRange { index: usize, len: usize },

    #[error("no active file")]
    NoActiveFile,
}

/// Result of an accepted edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Applied {
    Changed,
    Unchanged,
}

impl Applied {
    pub fn changed(&self) -> bool {
        matches!(self, Applied::Changed)
    }

    pub fn from_changed(changed: bool) -> Self {
        if changed {
            Applied::Changed
        } else {
            Applied::Unchanged
        }
    }

    /// Combine two outcomes: changed if either changed.
    pub fn or(self, other: Applied) -> Applied {
        Applied::from_changed(self.changed() || other.changed())
    }
}

pub type Transition = Result<Applied, Rejection>;

/// Per-column outcome of a batch move
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Columns the move was applied to (including no-op moves)
    pub moved: Vec<String>,

    /// Columns skipped, with the reason
    pub skipped: Vec<(String, Rejection)>,

    /// Whether any column's state actually changed
    pub changed: bool,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}
