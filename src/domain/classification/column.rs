use serde::{Deserialize, Serialize};

use super::Category;

/// A dataset column and the base role it currently holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub category: Category,
}

impl Column {
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            name: name.into(),
            category,
        }
    }

    pub fn is_identifier(&self) -> bool {
        self.category == Category::Identifiers
    }
}
