pub mod http;

use crate::domain::classification::{
    ClassificationRequest, ClassificationResponse, SaveConfigurationRequest, SavedConfiguration,
    StoragePath,
};
use crate::domain::error::Result;
use async_trait::async_trait;

pub use http::HttpClassifierClient;

/// The column-type inference and configuration backend
#[async_trait]
pub trait ClassificationBackend: Send + Sync {
    async fn classify(&self, request: &ClassificationRequest) -> Result<ClassificationResponse>;

    /// `None` when nothing was ever saved for the handle.
    async fn fetch_saved_configuration(&self, handle: &str) -> Result<Option<SavedConfiguration>>;

    async fn save_configuration(
        &self,
        path: &StoragePath,
        config: &SaveConfigurationRequest,
    ) -> Result<()>;
}
