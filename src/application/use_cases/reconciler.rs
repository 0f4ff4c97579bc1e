// ============================================================
// CONFIGURATION RECONCILER USE CASE
// ============================================================
// Fetch a fresh classification plus any saved configuration for a
// dataframe, then merge them so earlier dimension work survives.
//
// Idle -> Fetching -> Reconciling -> Ready, or Failed from either
// middle phase. A newer request for the same slot cancels the older.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::config_transfer::import_configuration;
use crate::domain::classification::{
    reconcile, ClassificationRequest, ClassifiedFile, DimensionName,
};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::classifier_client::ClassificationBackend;
use crate::infrastructure::config_cache::LocalConfigCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcilePhase {
    Idle,
    Fetching,
    Reconciling,
    Ready,
    Failed,
}

/// A reconciled file ready to be installed into the collection
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    pub request_id: Uuid,
    pub file: ClassifiedFile,
    /// Whether a saved configuration was found and merged
    pub restored: bool,
}

struct SlotState {
    generation: u64,
    token: CancellationToken,
    phase: ReconcilePhase,
}

pub struct Reconciler {
    backend: Arc<dyn ClassificationBackend>,
    cache: Arc<LocalConfigCache>,
    builtins: Vec<DimensionName>,
    slots: Mutex<HashMap<String, SlotState>>,
}

impl Reconciler {
    pub fn new(
        backend: Arc<dyn ClassificationBackend>,
        cache: Arc<LocalConfigCache>,
        builtins: Vec<DimensionName>,
    ) -> Self {
        Self {
            backend,
            cache,
            builtins,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, SlotState>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn phase(&self, slot: &str) -> ReconcilePhase {
        self.slots()
            .get(slot)
            .map(|s| s.phase)
            .unwrap_or(ReconcilePhase::Idle)
    }

    /// Cancel the in-flight request for `slot`, if any.
    pub fn cancel(&self, slot: &str) -> bool {
        let mut slots = self.slots();
        match slots.get_mut(slot) {
            Some(state) if matches!(state.phase, ReconcilePhase::Fetching | ReconcilePhase::Reconciling) => {
                state.token.cancel();
                state.phase = ReconcilePhase::Idle;
                true
            }
            _ => false,
        }
    }

    fn begin(&self, slot: &str) -> (u64, CancellationToken) {
        let mut slots = self.slots();
        let token = CancellationToken::new();
        let generation = match slots.get(slot) {
            Some(previous) => {
                previous.token.cancel();
                previous.generation + 1
            }
            None => 1,
        };
        slots.insert(
            slot.to_string(),
            SlotState {
                generation,
                token: token.clone(),
                phase: ReconcilePhase::Fetching,
            },
        );
        (generation, token)
    }

    /// Move `slot` to `phase` if `generation` still owns it.
    fn advance(&self, slot: &str, generation: u64, phase: ReconcilePhase) -> bool {
        let mut slots = self.slots();
        match slots.get_mut(slot) {
            Some(state) if state.generation == generation => {
                state.phase = phase;
                true
            }
            _ => false,
        }
    }

    /// Run a classification for `request` and merge it with any saved
    /// configuration. Existing state is never touched here; the caller
    /// installs the returned file.
    pub async fn classify_and_reconcile(
        &self,
        slot: &str,
        file_name: &str,
        request: ClassificationRequest,
    ) -> Result<ReconcileOutcome> {
        let request_id = Uuid::new_v4();
        let handle = request.dataframe_handle.clone();
        let (generation, token) = self.begin(slot);
        debug!(%request_id, slot, handle = %handle, generation, "fetching classification");

        let fetch = async {
            tokio::try_join!(
                self.backend.classify(&request),
                self.backend.fetch_saved_configuration(&handle),
            )
        };

        let fetched = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            result = fetch => Some(result),
        };

        let Some(fetched) = fetched.filter(|_| !token.is_cancelled()) else {
            info!(%request_id, slot, "classification superseded");
            return Err(AppError::Cancelled(format!("slot {}", slot)));
        };

        let (response, saved) = match fetched {
            Ok(pair) => pair,
            Err(e) => {
                warn!(%request_id, slot, error = %e, "classification fetch failed");
                self.advance(slot, generation, ReconcilePhase::Failed);
                return Err(e);
            }
        };

        if !self.advance(slot, generation, ReconcilePhase::Reconciling) {
            return Err(AppError::Cancelled(format!("slot {}", slot)));
        }

        let partition = response.final_classification;
        if partition.is_empty() {
            self.advance(slot, generation, ReconcilePhase::Failed);
            return Err(AppError::ValidationError(format!(
                "Classification for {} returned no columns",
                handle
            )));
        }

        // the backend answer is authoritative; the local tier follows it
        match &saved {
            Some(config) => self.cache.put(&handle, config.clone()),
            None => {
                self.cache.evict(&handle);
            }
        }
        if let Err(e) = self.cache.save() {
            warn!(%request_id, handle = %handle, error = %e, "failed to persist snapshot cache");
        }

        let file = reconcile(file_name, &partition, saved.as_ref(), &self.builtins)
            .with_handle(handle.clone());

        if !self.advance(slot, generation, ReconcilePhase::Ready) {
            return Err(AppError::Cancelled(format!("slot {}", slot)));
        }

        info!(
            %request_id,
            slot,
            handle = %handle,
            columns = file.columns().len(),
            dimensions = file.dimensions().len(),
            restored = saved.is_some(),
            "classification reconciled"
        );

        Ok(ReconcileOutcome {
            request_id,
            file,
            restored: saved.is_some(),
        })
    }

    /// Stopgap view from the local snapshot, shown before the backend
    /// round-trip completes.
    pub fn preview(&self, file: &ClassifiedFile) -> Option<ClassifiedFile> {
        let handle = file.dataframe_handle.as_deref()?;
        let snapshot = self.cache.get(handle)?;
        debug!(handle, cached_at = %snapshot.cached_at, "previewing cached configuration");
        Some(import_configuration(
            file,
            &snapshot.configuration,
            &self.builtins,
        ))
    }
}
