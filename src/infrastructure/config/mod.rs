use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use tracing::info;
use validator::Validate;

use crate::domain::error::{AppError, Result};
use crate::domain::workbench_settings::WorkbenchSettings;

/// Prefix of environment overrides, e.g. `WORKBENCH_BACKEND__BASE_URL`
pub const ENV_PREFIX: &str = "WORKBENCH_";

/// Layered settings: defaults, then an optional TOML file, then environment.
pub struct ConfigService {
    config_file: Option<PathBuf>,
}

impl ConfigService {
    pub fn new() -> Self {
        Self { config_file: None }
    }

    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self {
            config_file: Some(path.into()),
        }
    }

    fn figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(WorkbenchSettings::default()));
        if let Some(path) = &self.config_file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load `.env` (if any), then extract and validate settings.
    pub fn load(&self) -> Result<WorkbenchSettings> {
        let _ = dotenvy::dotenv();
        self.load_without_dotenv()
    }

    pub fn load_without_dotenv(&self) -> Result<WorkbenchSettings> {
        let settings: WorkbenchSettings = self
            .figment()
            .extract()
            .map_err(|e| AppError::ConfigError(format!("Failed to load settings: {}", e)))?;

        settings
            .validate()
            .map_err(|e| AppError::ConfigError(format!("Invalid settings: {}", e)))?;

        info!(
            source = %self.describe_source(),
            base_url = %settings.backend.base_url,
            max_custom_dimensions = settings.dimensions.max_custom_dimensions,
            "workbench settings loaded"
        );
        Ok(settings)
    }

    fn describe_source(&self) -> String {
        self.config_file
            .as_deref()
            .map(Path::display)
            .map(|d| d.to_string())
            .unwrap_or_else(|| "defaults".to_string())
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_without_file() {
        let settings = ConfigService::new().load_without_dotenv().unwrap();
        assert_eq!(settings.storage.app, "workbench");
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workbench.toml");
        fs::write(
            &path,
            r#"
[dimensions]
max_custom_dimensions = 3

[backend]
base_url = "http://classifier.internal:9000"

[storage]
client = "acme"
"#,
        )
        .unwrap();

        let settings = ConfigService::with_file(&path).load_without_dotenv().unwrap();
        assert_eq!(settings.dimensions.max_custom_dimensions, 3);
        assert_eq!(settings.backend.base_url, "http://classifier.internal:9000");
        assert_eq!(settings.backend.classify_path, "/classify");
        assert_eq!(settings.storage.client, "acme");
        assert_eq!(settings.storage.project, "default");
    }

    #[test]
    fn test_invalid_file_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workbench.toml");
        fs::write(&path, "[backend]\nbase_url = \"no scheme\"\n").unwrap();

        let result = ConfigService::with_file(&path).load_without_dotenv();
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }
}
