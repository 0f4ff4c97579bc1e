// ============================================================
// CLASSIFICATION DOMAIN LAYER
// ============================================================
// Column roles, business dimensions, and multi-file state.
// No I/O, no async.

mod category;
mod classified_file;
mod column;
mod dimension_map;
mod dimension_name;
mod file_collection;
mod payloads;
mod reconcile;
mod transition;

pub use category::Category;
pub use classified_file::ClassifiedFile;
pub use column::Column;
pub use dimension_map::DimensionMap;
pub use dimension_name::{DimensionName, MAX_DIMENSION_NAME_LEN, UNATTRIBUTED};
pub use file_collection::FileCollection;
pub use payloads::{
    ClassificationPartition, ClassificationRequest, ClassificationResponse, SaveConfigurationRequest,
    SavedConfiguration, StoragePath,
};
pub use reconcile::reconcile;
pub use transition::{Applied, BatchReport, Rejection, Target, Transition};
