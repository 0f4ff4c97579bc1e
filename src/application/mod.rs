pub mod use_cases;

pub use use_cases::config_transfer::{export_configuration, import_configuration};
pub use use_cases::reconciler::{ReconcileOutcome, ReconcilePhase, Reconciler};
pub use use_cases::transition_engine::TransitionEngine;
pub use use_cases::workbench_session::WorkbenchSession;
