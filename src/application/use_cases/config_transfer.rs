//! Configuration import and export for a single classified file.

use tracing::debug;

use crate::domain::classification::{
    reconcile, Category, ClassificationPartition, ClassifiedFile, DimensionName,
    SaveConfigurationRequest, SavedConfiguration,
};

/// Payload persisted by save-configuration. Empty dimensions are kept so a
/// reload recreates them.
pub fn export_configuration(file: &ClassifiedFile) -> SaveConfigurationRequest {
    SaveConfigurationRequest {
        identifiers: file.names_in(Category::Identifiers),
        measures: file.names_in(Category::Measures),
        dimensions: file.dimensions().to_record(),
    }
}

/// Full snapshot, including unclassified columns, as kept by the local cache.
pub fn snapshot_configuration(file: &ClassifiedFile) -> SavedConfiguration {
    SavedConfiguration {
        identifiers: file.names_in(Category::Identifiers),
        measures: file.names_in(Category::Measures),
        unclassified: file.names_in(Category::Unclassified),
        dimensions: file.dimensions().to_record(),
    }
}

/// Apply a saved configuration to an existing file's columns.
///
/// Only the file's own columns survive: names the configuration mentions but
/// the file lacks are ignored, and file columns the configuration does not
/// mention become `unclassified`.
pub fn import_configuration(
    file: &ClassifiedFile,
    saved: &SavedConfiguration,
    builtins: &[DimensionName],
) -> ClassifiedFile {
    let present = |name: &&String| file.column(name).is_some();
    let mut partition = ClassificationPartition {
        identifiers: saved.identifiers.iter().filter(present).cloned().collect(),
        measures: saved.measures.iter().filter(present).cloned().collect(),
        unclassified: saved.unclassified.iter().filter(present).cloned().collect(),
    };

    for column in file.columns() {
        let mentioned = Category::ALL
            .iter()
            .any(|category| partition.list(*category).contains(&column.name));
        if !mentioned {
            partition.unclassified.push(column.name.clone());
        }
    }

    // identifiers here are a subset of saved.identifiers, so none are "new"
    let mut imported = reconcile(&file.file_name, &partition, Some(saved), builtins);
    imported.dataframe_handle = file.dataframe_handle.clone();

    debug!(
        file = %file.file_name,
        dimensions = imported.dimensions().len(),
        "imported configuration"
    );
    imported
}
