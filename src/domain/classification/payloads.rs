// ============================================================
// BACKEND PAYLOADS
// ============================================================
// Wire shapes exchanged with the classification backend

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Category;

/// A three-way split of column names as produced by the classifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationPartition {
    #[serde(default)]
    pub identifiers: Vec<String>,
    #[serde(default)]
    pub measures: Vec<String>,
    #[serde(default)]
    pub unclassified: Vec<String>,
}

impl ClassificationPartition {
    pub fn list(&self, category: Category) -> &[String] {
        match category {
            Category::Identifiers => &self.identifiers,
            Category::Measures => &self.measures,
            Category::Unclassified => &self.unclassified,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty() && self.measures.is_empty() && self.unclassified.is_empty()
    }
}

/// Request body for a (re)classification run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRequest {
    pub dataframe_handle: String,

    /// Previously known split, used to seed reclassification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<ClassificationPartition>,
}

impl ClassificationRequest {
    pub fn new(dataframe_handle: impl Into<String>) -> Self {
        Self {
            dataframe_handle: dataframe_handle.into(),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: ClassificationPartition) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResponse {
    pub final_classification: ClassificationPartition,
}

/// A configuration previously saved for a dataframe
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedConfiguration {
    #[serde(default)]
    pub identifiers: Vec<String>,
    #[serde(default)]
    pub measures: Vec<String>,
    #[serde(default)]
    pub unclassified: Vec<String>,
    #[serde(default)]
    pub dimensions: IndexMap<String, Vec<String>>,
}

impl SavedConfiguration {
    pub fn partition(&self) -> ClassificationPartition {
        ClassificationPartition {
            identifiers: self.identifiers.clone(),
            measures: self.measures.clone(),
            unclassified: self.unclassified.clone(),
        }
    }
}

/// Body sent to persist a file's configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveConfigurationRequest {
    pub identifiers: Vec<String>,
    pub measures: Vec<String>,
    pub dimensions: IndexMap<String, Vec<String>>,
}

/// Composite key a configuration is stored under
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoragePath {
    pub client: String,
    pub app: String,
    pub project: String,
    pub file_key: String,
}

impl StoragePath {
    pub fn new(
        client: impl Into<String>,
        app: impl Into<String>,
        project: impl Into<String>,
        file_key: impl Into<String>,
    ) -> Self {
        Self {
            client: client.into(),
            app: app.into(),
            project: project.into(),
            file_key: file_key.into(),
        }
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.client, self.app, self.project, self.file_key
        )
    }
}
