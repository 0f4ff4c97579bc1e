use super::ClassificationBackend;
use crate::domain::classification::{
    ClassificationRequest, ClassificationResponse, SaveConfigurationRequest, SavedConfiguration,
    StoragePath,
};
use crate::domain::error::{AppError, Result};
use crate::domain::workbench_settings::BackendSettings;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::json;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub struct HttpClassifierClient {
    client: reqwest::Client,
    base_url: Url,
    classify_path: String,
    config_path: String,
    save_path: String,
}

impl HttpClassifierClient {
    pub fn new(settings: &BackendSettings) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(ms) = settings.request_timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let client = builder
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        let base_url = Url::parse(&settings.base_url)
            .map_err(|e| AppError::ConfigError(format!("Invalid backend URL: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            classify_path: settings.classify_path.clone(),
            config_path: settings.config_path.clone(),
            save_path: settings.save_path.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let base = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}/{}", base, path.trim_start_matches('/')));
        url
    }

    fn config_url(&self, handle: &str) -> Result<Url> {
        let mut url = self.endpoint(&self.config_path);
        url.path_segments_mut()
            .map_err(|_| AppError::ConfigError("Backend URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(handle);
        Ok(url)
    }

    async fn error_from(response: reqwest::Response) -> AppError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        AppError::BackendError {
            status: status.as_u16(),
            message: text,
        }
    }
}

#[async_trait]
impl ClassificationBackend for HttpClassifierClient {
    async fn classify(&self, request: &ClassificationRequest) -> Result<ClassificationResponse> {
        let url = self.endpoint(&self.classify_path);
        debug!(%url, handle = %request.dataframe_handle, "requesting classification");

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::TransportError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        response
            .json::<ClassificationResponse>()
            .await
            .map_err(|e| AppError::ParseError(format!("Failed to parse classification: {}", e)))
    }

    async fn fetch_saved_configuration(&self, handle: &str) -> Result<Option<SavedConfiguration>> {
        let url = self.config_url(handle)?;
        debug!(%url, handle, "fetching saved configuration");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::TransportError(format!("Request failed: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }

        response
            .json::<Option<SavedConfiguration>>()
            .await
            .map_err(|e| AppError::ParseError(format!("Failed to parse saved configuration: {}", e)))
    }

    async fn save_configuration(
        &self,
        path: &StoragePath,
        config: &SaveConfigurationRequest,
    ) -> Result<()> {
        let url = self.endpoint(&self.save_path);
        let body = json!({
            "storage_path": path.to_string(),
            "identifiers": config.identifiers,
            "measures": config.measures,
            "dimensions": config.dimensions,
        });
        debug!(%url, storage_path = %path, "saving configuration");

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::TransportError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        Ok(())
    }
}
