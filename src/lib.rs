pub mod application;
pub mod domain;
pub mod infrastructure;

mod app;

pub use app::init_tracing;
pub use application::{
    ReconcileOutcome, ReconcilePhase, Reconciler, TransitionEngine, WorkbenchSession,
};
pub use domain::classification::{
    Applied, BatchReport, Category, ClassifiedFile, Column, DimensionMap, DimensionName,
    FileCollection, Rejection, Target,
};
pub use domain::error::{AppError, Result};
pub use domain::workbench_settings::WorkbenchSettings;
pub use infrastructure::classifier_client::{ClassificationBackend, HttpClassifierClient};
pub use infrastructure::config::ConfigService;
