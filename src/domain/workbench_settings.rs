//! Workbench settings: dimension quotas, backend routes, storage keys.
//! Loaded by `infrastructure::config::ConfigService`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::{Validate, ValidationError};

use crate::domain::classification::{DimensionName, StoragePath};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct WorkbenchSettings {
    #[validate(nested)]
    pub dimensions: DimensionSettings,

    #[validate(nested)]
    pub backend: BackendSettings,

    #[validate(nested)]
    pub storage: StorageSettings,

    pub cache: CacheSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct DimensionSettings {
    /// User-created dimensions allowed beyond the built-ins
    #[validate(range(max = 50))]
    pub max_custom_dimensions: usize,

    /// Dimensions every file starts with; they do not count toward the quota
    #[validate(custom(function = "validate_dimension_names"))]
    pub builtin_dimensions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct BackendSettings {
    #[validate(url)]
    pub base_url: String,

    #[validate(length(min = 1))]
    pub classify_path: String,

    /// Saved-configuration lookup; the dataframe handle is appended
    #[validate(length(min = 1))]
    pub config_path: String,

    #[validate(length(min = 1))]
    pub save_path: String,

    /// No timeout when unset; the engine waits for the backend or a cancel
    #[validate(range(min = 1))]
    pub request_timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StorageSettings {
    #[validate(length(min = 1))]
    pub client: String,

    #[validate(length(min = 1))]
    pub app: String,

    #[validate(length(min = 1))]
    pub project: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Where the local configuration snapshot is persisted; memory-only when unset
    pub snapshot_path: Option<PathBuf>,
}

impl Default for DimensionSettings {
    fn default() -> Self {
        Self {
            max_custom_dimensions: 5,
            builtin_dimensions: vec![crate::domain::classification::UNATTRIBUTED.to_string()],
        }
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            classify_path: "/classify".to_string(),
            config_path: "/configurations".to_string(),
            save_path: "/configurations/save".to_string(),
            request_timeout_ms: None,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            client: "default".to_string(),
            app: "workbench".to_string(),
            project: "default".to_string(),
        }
    }
}

impl DimensionSettings {
    pub fn builtin_names(&self) -> Vec<DimensionName> {
        self.builtin_dimensions
            .iter()
            .filter_map(|raw| DimensionName::new(raw).ok())
            .collect()
    }
}

impl StorageSettings {
    pub fn path_for(&self, file_key: &str) -> StoragePath {
        StoragePath::new(&self.client, &self.app, &self.project, file_key)
    }
}

fn validate_dimension_names(names: &[String]) -> Result<(), ValidationError> {
    for name in names {
        if DimensionName::new(name).is_err() {
            let mut err = ValidationError::new("invalid_dimension_name");
            err.add_param("name".into(), name);
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = WorkbenchSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.dimensions.max_custom_dimensions, 5);
        assert_eq!(
            settings.dimensions.builtin_names(),
            vec![DimensionName::unattributed()]
        );
    }

    #[test]
    fn test_rejects_bad_url() {
        let mut settings = WorkbenchSettings::default();
        settings.backend.base_url = "not a url".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_reserved_builtin() {
        let mut settings = WorkbenchSettings::default();
        settings.dimensions.builtin_dimensions.push("measures".to_string());
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_storage_key() {
        let mut settings = WorkbenchSettings::default();
        settings.storage.project.clear();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_storage_path() {
        let storage = StorageSettings::default();
        assert_eq!(
            storage.path_for("sales.csv").to_string(),
            "default/workbench/default/sales.csv"
        );
    }
}
