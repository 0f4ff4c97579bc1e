// ============================================================
// CLASSIFIED FILE
// ============================================================
// Column registry plus dimension map for one uploaded file

use serde::{Deserialize, Serialize};

use super::{Applied, Category, Column, DimensionMap, DimensionName, Rejection, Transition};

/// Deserialization goes through [`ClassifiedFileRecord`] so stored or
/// received files come back with their invariants restored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ClassifiedFileRecord")]
pub struct ClassifiedFile {
    pub file_name: String,

    /// Backend dataframe identity used for classification and saved configs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataframe_handle: Option<String>,

    columns: Vec<Column>,

    custom_dimensions: DimensionMap,
}

impl ClassifiedFile {
    /// Build a file from columns. Duplicate names keep their first entry.
    pub fn new(file_name: impl Into<String>, columns: Vec<Column>) -> Self {
        let mut file = Self {
            file_name: file_name.into(),
            ..Default::default()
        };
        for column in columns {
            file.push_column(column);
        }
        file
    }

    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.dataframe_handle = Some(handle.into());
        self
    }

    pub(crate) fn with_dimensions(mut self, dimensions: DimensionMap) -> Self {
        self.custom_dimensions = dimensions;
        self
    }

    /// Append a column unless the name is already registered.
    pub fn push_column(&mut self, column: Column) -> bool {
        if self.column(&column.name).is_some() {
            return false;
        }
        self.columns.push(column);
        true
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn category_of(&self, name: &str) -> Option<Category> {
        self.column(name).map(|c| c.category)
    }

    pub fn names_in(&self, category: Category) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.category == category)
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn dimensions(&self) -> &DimensionMap {
        &self.custom_dimensions
    }

    pub(crate) fn dimensions_mut(&mut self) -> &mut DimensionMap {
        &mut self.custom_dimensions
    }

    /// Identifier columns not listed in any dimension.
    pub fn unmapped_identifiers(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.is_identifier() && self.custom_dimensions.dimension_of(&c.name).is_none())
            .map(|c| c.name.clone())
            .collect()
    }

    /// Set a column's category. Leaving `identifiers` also drops the column
    /// from every dimension.
    pub fn set_category(&mut self, name: &str, category: Category) -> Transition {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name == name)
            .ok_or_else(|| Rejection::UnknownColumn {
                column: name.to_string(),
            })?;

        let changed = column.category != category;
        column.category = category;

        let released = if category != Category::Identifiers {
            self.custom_dimensions.release(name)
        } else {
            false
        };

        self.check_invariants();
        Ok(Applied::from_changed(changed || released))
    }

    /// Put a column into a dimension, creating the dimension if needed. A
    /// column outside `identifiers` is promoted first.
    pub fn assign_to_dimension(&mut self, name: &str, dimension: &DimensionName) -> Transition {
        let promoted = match self.category_of(name) {
            None => {
                return Err(Rejection::UnknownColumn {
                    column: name.to_string(),
                })
            }
            Some(Category::Identifiers) => Applied::Unchanged,
            Some(_) => self.set_category(name, Category::Identifiers)?,
        };

        let assigned = self.custom_dimensions.assign(name, dimension);
        self.check_invariants();
        Ok(promoted.or(Applied::from_changed(assigned)))
    }

    /// Columns exist once, dimensions are exclusive, and only identifier
    /// columns are dimension members.
    pub fn invariants_hold(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        let unique = self.columns.iter().all(|c| seen.insert(c.name.as_str()));

        let coherent = self.custom_dimensions.iter().all(|(_, members)| {
            members
                .iter()
                .all(|m| self.category_of(m) == Some(Category::Identifiers))
        });

        unique && coherent && self.custom_dimensions.is_exclusive()
    }

    pub(crate) fn check_invariants(&self) {
        debug_assert!(
            self.invariants_hold(),
            "classified file {} violates its invariants",
            self.file_name
        );
    }
}

/// Unchecked wire shape of a [`ClassifiedFile`]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassifiedFileRecord {
    file_name: String,
    #[serde(default)]
    dataframe_handle: Option<String>,
    columns: Vec<Column>,
    #[serde(default)]
    custom_dimensions: DimensionMap,
}

impl From<ClassifiedFileRecord> for ClassifiedFile {
    /// Duplicate columns keep their first entry. Dimension members must be
    /// identifier columns, and a column listed twice stays with the first
    /// dimension naming it.
    fn from(record: ClassifiedFileRecord) -> Self {
        let mut file = ClassifiedFile::new(record.file_name, record.columns);
        file.dataframe_handle = record.dataframe_handle;

        let mut dimensions = DimensionMap::new();
        for (name, members) in record.custom_dimensions.iter() {
            dimensions.ensure(name.clone());
            for member in members {
                if file.category_of(member) == Some(Category::Identifiers)
                    && dimensions.dimension_of(member).is_none()
                {
                    dimensions.assign(member, name);
                }
            }
        }
        file.custom_dimensions = dimensions;
        file.check_invariants();
        file
    }
}
