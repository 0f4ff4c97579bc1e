//! The single owner of a workbench's file collection.
//!
//! UI events call the synchronous edit methods; classification runs through
//! the shared [`Reconciler`] and lands here via [`WorkbenchSession::install`].

use std::sync::Arc;

use tracing::{info, warn};

use super::config_transfer::{export_configuration, snapshot_configuration};
use super::reconciler::{ReconcileOutcome, Reconciler};
use super::transition_engine::TransitionEngine;
use crate::domain::classification::{
    BatchReport, Category, ClassificationRequest, ClassifiedFile, DimensionName, FileCollection,
    Rejection, Target, Transition,
};
use crate::domain::error::{AppError, Result};
use crate::domain::workbench_settings::{StorageSettings, WorkbenchSettings};
use crate::infrastructure::classifier_client::ClassificationBackend;
use crate::infrastructure::config_cache::LocalConfigCache;

pub struct WorkbenchSession {
    files: FileCollection,
    engine: TransitionEngine,
    reconciler: Arc<Reconciler>,
    backend: Arc<dyn ClassificationBackend>,
    cache: Arc<LocalConfigCache>,
    storage: StorageSettings,
}

impl WorkbenchSession {
    pub fn new(settings: &WorkbenchSettings, backend: Arc<dyn ClassificationBackend>) -> Self {
        let cache = Arc::new(match &settings.cache.snapshot_path {
            Some(path) => LocalConfigCache::open(path.clone()),
            None => LocalConfigCache::in_memory(),
        });
        Self::with_cache(settings, backend, cache)
    }

    pub fn with_cache(
        settings: &WorkbenchSettings,
        backend: Arc<dyn ClassificationBackend>,
        cache: Arc<LocalConfigCache>,
    ) -> Self {
        let engine = TransitionEngine::new(&settings.dimensions);
        let reconciler = Arc::new(Reconciler::new(
            backend.clone(),
            cache.clone(),
            engine.builtins().to_vec(),
        ));
        Self {
            files: FileCollection::new(),
            engine,
            reconciler,
            backend,
            cache,
            storage: settings.storage.clone(),
        }
    }

    pub fn files(&self) -> &FileCollection {
        &self.files
    }

    pub fn active_file(&self) -> Option<&ClassifiedFile> {
        self.files.active_file()
    }

    /// Shared handle for running classifications outside `&mut self`.
    pub fn reconciler(&self) -> Arc<Reconciler> {
        self.reconciler.clone()
    }

    /// Add a file that was classified by hand rather than by the backend.
    pub fn add_file(&mut self, file: ClassifiedFile) -> usize {
        self.files.push_file(file)
    }

    /// Put a reconciled file in place: the file with the same dataframe
    /// handle is replaced (and becomes active), otherwise it is appended.
    pub fn install(&mut self, outcome: ReconcileOutcome) -> usize {
        let existing = outcome
            .file
            .dataframe_handle
            .as_deref()
            .and_then(|handle| self.files.position_of_handle(handle));

        let index = match existing {
            Some(index) if self.files.set_active_file(index).is_ok() => {
                self.files.replace_active_file(outcome.file);
                index
            }
            _ => self.files.push_file(outcome.file),
        };
        info!(request_id = %outcome.request_id, index, restored = outcome.restored, "installed classified file");
        index
    }

    /// Classify and install in one step. On failure the collection is left
    /// as it was.
    pub async fn classify_file(
        &mut self,
        slot: &str,
        file_name: &str,
        request: ClassificationRequest,
    ) -> Result<usize> {
        let outcome = self
            .reconciler
            .classify_and_reconcile(slot, file_name, request)
            .await?;
        Ok(self.install(outcome))
    }

    /// Replace the active file with the local-snapshot preview, if one exists.
    pub fn apply_local_preview(&mut self) -> bool {
        let Some(preview) = self.files.active_file().and_then(|f| self.reconciler.preview(f)) else {
            return false;
        };
        self.files.replace_active_file(preview);
        true
    }

    /// Persist the active file's configuration under its storage path.
    pub async fn save_active_configuration(&self) -> Result<()> {
        let file = self
            .files
            .active_file()
            .ok_or_else(|| AppError::ValidationError(Rejection::NoActiveFile.to_string()))?;
        let key = file.dataframe_handle.as_deref().unwrap_or(&file.file_name);
        let path = self.storage.path_for(key);

        self.backend
            .save_configuration(&path, &export_configuration(file))
            .await?;

        if let Some(handle) = file.dataframe_handle.as_deref() {
            self.cache.put(handle, snapshot_configuration(file));
            // the backend already accepted the save
            if let Err(e) = self.cache.save() {
                warn!(handle, error = %e, "failed to persist snapshot cache");
            }
        }
        info!(storage_path = %path, "configuration saved");
        Ok(())
    }

    pub fn recategorize(&mut self, column: &str, category: Category) -> Transition {
        self.engine.recategorize(&mut self.files, None, column, category)
    }

    pub fn assign_to_dimension(&mut self, column: &str, dimension: &DimensionName) -> Transition {
        self.engine
            .assign_to_dimension(&mut self.files, None, column, dimension)
    }

    pub fn move_column(&mut self, column: &str, target: &Target) -> Transition {
        self.engine.move_column(&mut self.files, None, column, target)
    }

    pub fn move_many<I, S>(&mut self, columns: I, target: &Target) -> std::result::Result<BatchReport, Rejection>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.engine.move_many(&mut self.files, None, columns, target)
    }

    pub fn create_dimension(&mut self, name: &str) -> std::result::Result<DimensionName, Rejection> {
        self.engine.create_dimension(&mut self.files, None, name)
    }

    pub fn remove_dimension(&mut self, name: &str) -> std::result::Result<Vec<String>, Rejection> {
        self.engine.remove_dimension(&mut self.files, None, name)
    }

    pub fn rename_dimension(&mut self, from: &str, to: &str) -> Transition {
        self.engine.rename_dimension(&mut self.files, None, from, to)
    }

    pub fn set_active_file(&mut self, index: usize) -> Transition {
        self.engine.set_active_file(&mut self.files, index)
    }

    pub fn delete_file(&mut self, index: usize) -> Transition {
        self.engine.delete_file(&mut self.files, index)
    }
}
