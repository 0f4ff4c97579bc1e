// ============================================================
// RECONCILE MERGE
// ============================================================
// Pure merge of a fresh classification with saved dimension work.
// No I/O, no async.

use std::collections::HashSet;

use tracing::warn;

use super::{
    Category, ClassificationPartition, ClassifiedFile, Column, DimensionMap, DimensionName,
    SavedConfiguration,
};

/// Rebuild a file from `partition`, carrying over whatever of `saved`'s
/// dimension assignments still applies.
///
/// - columns keep partition order (identifiers, measures, unclassified);
///   a name listed twice keeps its first category
/// - saved dimension members are intersected with the new identifier set,
///   first dimension listing a column wins
/// - every name in `builtins` gets an entry
/// - identifiers that were not identifiers before (all of them when there is
///   no saved configuration) fall into `unattributed` if that entry exists
pub fn reconcile(
    file_name: &str,
    partition: &ClassificationPartition,
    saved: Option<&SavedConfiguration>,
    builtins: &[DimensionName],
) -> ClassifiedFile {
    let mut columns = Vec::new();
    let mut seen = HashSet::new();
    for category in Category::ALL {
        for name in partition.list(category) {
            if seen.insert(name.as_str()) {
                columns.push(Column::new(name.clone(), category));
            } else {
                warn!(file = file_name, column = %name, %category, "duplicate column in classification, keeping first");
            }
        }
    }

    let identifiers: HashSet<&str> = columns
        .iter()
        .filter(|c| c.is_identifier())
        .map(|c| c.name.as_str())
        .collect();

    let mut dimensions = DimensionMap::new();
    if let Some(saved) = saved {
        for (raw_name, members) in &saved.dimensions {
            let name = match DimensionName::new(raw_name) {
                Ok(name) => name,
                Err(rejection) => {
                    warn!(file = file_name, dimension = %raw_name, %rejection, "dropping saved dimension");
                    continue;
                }
            };
            dimensions.ensure(name.clone());
            for member in members {
                if !identifiers.contains(member.as_str()) {
                    continue;
                }
                if dimensions.dimension_of(member).is_none() {
                    dimensions.assign(member, &name);
                }
            }
        }
    }

    for builtin in builtins {
        dimensions.ensure(builtin.clone());
    }

    let unattributed = DimensionName::unattributed();
    if dimensions.contains(&unattributed) {
        let previous: HashSet<&str> = saved
            .map(|s| s.identifiers.iter().map(String::as_str).collect())
            .unwrap_or_default();

        let newcomers: Vec<String> = columns
            .iter()
            .filter(|c| c.is_identifier())
            .filter(|c| !previous.contains(c.name.as_str()))
            .filter(|c| dimensions.dimension_of(&c.name).is_none())
            .map(|c| c.name.clone())
            .collect();

        for name in newcomers {
            dimensions.assign(&name, &unattributed);
        }
    }

    let file = ClassifiedFile::new(file_name, columns).with_dimensions(dimensions);
    file.check_invariants();
    file
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn dim(name: &str) -> DimensionName {
        DimensionName::new(name).unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn partition(ids: &[&str], measures: &[&str], unclassified: &[&str]) -> ClassificationPartition {
        ClassificationPartition {
            identifiers: strings(ids),
            measures: strings(measures),
            unclassified: strings(unclassified),
        }
    }

    fn saved(ids: &[&str], dims: &[(&str, &[&str])]) -> SavedConfiguration {
        SavedConfiguration {
            identifiers: strings(ids),
            dimensions: dims
                .iter()
                .map(|(name, members)| (name.to_string(), strings(members)))
                .collect::<IndexMap<_, _>>(),
            ..Default::default()
        }
    }

    #[test]
    fn test_drops_columns_no_longer_identifiers() {
        let saved = saved(&["colA", "colB"], &[("finance", &["colA", "colB"])]);
        let fresh = partition(&["colA"], &["colB"], &[]);

        let file = reconcile("f.csv", &fresh, Some(&saved), &[]);

        assert_eq!(
            file.dimensions().members(&dim("finance")).unwrap(),
            &["colA".to_string()]
        );
        assert_eq!(file.category_of("colB"), Some(Category::Measures));
    }

    #[test]
    fn test_new_identifiers_go_to_unattributed() {
        let saved = saved(
            &["region", "legacy"],
            &[("market", &["region"]), ("unattributed", &[])],
        );
        let fresh = partition(&["region", "legacy", "channel"], &["sales"], &[]);

        let file = reconcile("f.csv", &fresh, Some(&saved), &[]);

        assert_eq!(
            file.dimensions().members(&dim("unattributed")).unwrap(),
            &["channel".to_string()]
        );
        // previously an identifier, left dimension-less by the user
        assert_eq!(file.dimensions().dimension_of("legacy"), None);
    }

    #[test]
    fn test_new_identifiers_stay_unmapped_without_bucket() {
        let saved = saved(&["region"], &[("market", &["region"])]);
        let fresh = partition(&["region", "channel"], &[], &[]);

        let file = reconcile("f.csv", &fresh, Some(&saved), &[]);

        assert_eq!(file.unmapped_identifiers(), vec!["channel".to_string()]);
        assert!(!file.dimensions().contains(&DimensionName::unattributed()));
    }

    #[test]
    fn test_no_saved_config_seeds_builtins() {
        let fresh = partition(&["region", "sku"], &["sales"], &["notes"]);

        let file = reconcile("f.csv", &fresh, None, &[DimensionName::unattributed()]);

        assert_eq!(
            file.dimensions().members(&dim("unattributed")).unwrap(),
            &["region".to_string(), "sku".to_string()]
        );
        assert_eq!(file.columns().len(), 4);
    }

    #[test]
    fn test_saved_names_are_normalized_and_invalid_dropped() {
        let saved = saved(&["a", "b"], &[("  Market ", &["a"]), ("measures", &["b"])]);
        let fresh = partition(&["a", "b"], &[], &[]);

        let file = reconcile("f.csv", &fresh, Some(&saved), &[]);

        assert!(file.dimensions().contains(&dim("market")));
        assert_eq!(file.dimensions().len(), 1);
        assert_eq!(file.dimensions().dimension_of("b"), None);
    }

    #[test]
    fn test_saved_overlap_first_dimension_wins() {
        let saved = saved(&["a"], &[("market", &["a"]), ("product", &["a"])]);
        let fresh = partition(&["a"], &[], &[]);

        let file = reconcile("f.csv", &fresh, Some(&saved), &[]);

        assert_eq!(file.dimensions().dimension_of("a"), Some(&dim("market")));
        assert!(file.invariants_hold());
    }

    #[test]
    fn test_duplicate_partition_entries_keep_first() {
        let fresh = partition(&["a"], &["a", "b"], &["b"]);
        let file = reconcile("f.csv", &fresh, None, &[]);
        assert_eq!(file.category_of("a"), Some(Category::Identifiers));
        assert_eq!(file.category_of("b"), Some(Category::Measures));
        assert_eq!(file.columns().len(), 2);
    }
}
