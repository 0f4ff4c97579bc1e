// ============================================================
// TRANSITION ENGINE USE CASE
// ============================================================
// Interactive edits against a file collection. Every operation
// addresses the active file unless an explicit index is given.

use tracing::{debug, info};

use crate::domain::classification::{
    Applied, BatchReport, Category, DimensionName, FileCollection, Rejection, Target, Transition,
};
use crate::domain::workbench_settings::DimensionSettings;

/// Stateless operation surface; the collection is owned by the caller
pub struct TransitionEngine {
    max_custom_dimensions: usize,
    builtins: Vec<DimensionName>,
}

impl TransitionEngine {
    pub fn new(settings: &DimensionSettings) -> Self {
        Self {
            max_custom_dimensions: settings.max_custom_dimensions,
            builtins: settings.builtin_names(),
        }
    }

    pub fn builtins(&self) -> &[DimensionName] {
        &self.builtins
    }

    pub fn recategorize(
        &self,
        files: &mut FileCollection,
        file: Option<usize>,
        column: &str,
        category: Category,
    ) -> Transition {
        let target = files.file_mut(file)?;
        let applied = target.set_category(column, category)?;
        debug!(file = %target.file_name, column, %category, changed = applied.changed(), "recategorized column");
        Ok(applied)
    }

    pub fn assign_to_dimension(
        &self,
        files: &mut FileCollection,
        file: Option<usize>,
        column: &str,
        dimension: &DimensionName,
    ) -> Transition {
        let target = files.file_mut(file)?;

        if target.column(column).is_none() {
            return Err(Rejection::UnknownColumn {
                column: column.to_string(),
            });
        }
        if !target.dimensions().contains(dimension) {
            self.check_quota(target.dimensions().custom_count(&self.builtins), dimension)?;
        }

        let applied = target.assign_to_dimension(column, dimension)?;
        debug!(file = %target.file_name, column, %dimension, changed = applied.changed(), "assigned column to dimension");
        Ok(applied)
    }

    /// Combined move: recategorize for a category target, assign for a
    /// dimension target.
    pub fn move_column(
        &self,
        files: &mut FileCollection,
        file: Option<usize>,
        column: &str,
        target: &Target,
    ) -> Transition {
        match target {
            Target::Category(category) => self.recategorize(files, file, column, *category),
            Target::Dimension(name) => self.assign_to_dimension(files, file, column, name),
        }
    }

    /// Apply the same move to every column. Unknown columns are skipped and
    /// reported; the rest still move.
    pub fn move_many<I, S>(
        &self,
        files: &mut FileCollection,
        file: Option<usize>,
        columns: I,
        target: &Target,
    ) -> Result<BatchReport, Rejection>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let index = files.resolve(file)?;
        let mut report = BatchReport::default();

        for column in columns {
            let column = column.as_ref();
            match self.move_column(files, Some(index), column, target) {
                Ok(applied) => {
                    report.changed |= applied.changed();
                    report.moved.push(column.to_string());
                }
                Err(rejection) => {
                    debug!(column, %rejection, "skipping column in batch move");
                    report.skipped.push((column.to_string(), rejection));
                }
            }
        }

        info!(
            %target,
            moved = report.moved.len(),
            skipped = report.skipped.len(),
            "batch move applied"
        );
        Ok(report)
    }

    pub fn create_dimension(
        &self,
        files: &mut FileCollection,
        file: Option<usize>,
        raw_name: &str,
    ) -> Result<DimensionName, Rejection> {
        let name = DimensionName::new(raw_name)?;
        let target = files.file_mut(file)?;

        if target.dimensions().contains(&name) {
            return Err(Rejection::DuplicateDimension {
                dimension: name.to_string(),
            });
        }
        self.check_quota(target.dimensions().custom_count(&self.builtins), &name)?;

        target.dimensions_mut().ensure(name.clone());
        info!(file = %target.file_name, dimension = %name, "created dimension");
        Ok(name)
    }

    /// Drop a dimension. Its members stay `identifiers`, just unmapped.
    pub fn remove_dimension(
        &self,
        files: &mut FileCollection,
        file: Option<usize>,
        raw_name: &str,
    ) -> Result<Vec<String>, Rejection> {
        let name = DimensionName::new(raw_name)?;
        if name.is_unattributed() {
            return Err(Rejection::ReservedDimension {
                dimension: name.to_string(),
            });
        }

        let target = files.file_mut(file)?;
        let released = target
            .dimensions_mut()
            .remove(&name)
            .ok_or_else(|| Rejection::UnknownDimension {
                dimension: name.to_string(),
            })?;

        info!(file = %target.file_name, dimension = %name, released = released.len(), "removed dimension");
        Ok(released)
    }

    pub fn rename_dimension(
        &self,
        files: &mut FileCollection,
        file: Option<usize>,
        from: &str,
        to: &str,
    ) -> Transition {
        let from = DimensionName::new(from)?;
        let to = DimensionName::new(to)?;
        // built-in names are fixed on both sides of a rename
        if let Some(reserved) = [&from, &to].into_iter().find(|name| self.is_reserved(name)) {
            return Err(Rejection::ReservedDimension {
                dimension: reserved.to_string(),
            });
        }

        let target = files.file_mut(file)?;
        if !target.dimensions().contains(&from) {
            return Err(Rejection::UnknownDimension {
                dimension: from.to_string(),
            });
        }
        if from == to {
            return Ok(Applied::Unchanged);
        }
        if target.dimensions().contains(&to) {
            return Err(Rejection::DuplicateDimension {
                dimension: to.to_string(),
            });
        }
        target.dimensions_mut().rename(&from, to.clone());

        info!(file = %target.file_name, from = %from, to = %to, "renamed dimension");
        Ok(Applied::Changed)
    }

    pub fn set_active_file(&self, files: &mut FileCollection, index: usize) -> Transition {
        let changed = files.active_file_index() != index;
        files.set_active_file(index)?;
        Ok(Applied::from_changed(changed))
    }

    pub fn delete_file(&self, files: &mut FileCollection, index: usize) -> Transition {
        let removed = files.delete_file(index)?;
        info!(
            file = %removed.file_name,
            remaining = files.len(),
            active = files.active_file_index(),
            "deleted file"
        );
        Ok(Applied::Changed)
    }

    fn is_reserved(&self, name: &DimensionName) -> bool {
        self.builtins.contains(name) || name.is_unattributed()
    }

    fn check_quota(&self, custom_count: usize, name: &DimensionName) -> Result<(), Rejection> {
        if self.is_reserved(name) {
            return Ok(());
        }
        if custom_count >= self.max_custom_dimensions {
            return Err(Rejection::DimensionQuotaReached {
                limit: self.max_custom_dimensions,
            });
        }
        Ok(())
    }
}

impl Default for TransitionEngine {
    fn default() -> Self {
        Self::new(&DimensionSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::classification::{ClassifiedFile, Column};

    fn dim(name: &str) -> DimensionName {
        DimensionName::new(name).unwrap()
    }

    fn workbench() -> FileCollection {
        FileCollection::from_files(vec![
            ClassifiedFile::new(
                "sales.csv",
                vec![
                    Column::new("x", Category::Identifiers),
                    Column::new("y", Category::Measures),
                    Column::new("z", Category::Unclassified),
                ],
            ),
            ClassifiedFile::new("other.csv", vec![Column::new("k", Category::Identifiers)]),
        ])
    }

    #[test]
    fn test_end_to_end_assign_then_measure() {
        let engine = TransitionEngine::default();
        let mut files = workbench();

        engine
            .move_column(&mut files, None, "x", &Target::parse("market").unwrap())
            .unwrap();
        let file = files.active_file().unwrap();
        assert_eq!(file.dimensions().members(&dim("market")).unwrap(), &["x".to_string()]);
        assert_eq!(file.category_of("x"), Some(Category::Identifiers));

        engine
            .move_column(&mut files, None, "x", &Target::parse("measures").unwrap())
            .unwrap();
        let file = files.active_file().unwrap();
        assert_eq!(file.dimensions().members(&dim("market")).unwrap(), &[] as &[String]);
        assert_eq!(file.category_of("x"), Some(Category::Measures));
    }

    #[test]
    fn test_explicit_file_index() {
        let engine = TransitionEngine::default();
        let mut files = workbench();

        engine
            .recategorize(&mut files, Some(1), "k", Category::Measures)
            .unwrap();
        assert_eq!(files.get(1).unwrap().category_of("k"), Some(Category::Measures));
        assert_eq!(
            engine.recategorize(&mut files, Some(7), "k", Category::Measures),
            Err(Rejection::FileIndexOutOfRange { index: 7, len: 2 })
        );
    }

    #[test]
    fn test_move_many_skips_unknown() {
        let engine = TransitionEngine::default();
        let mut files = workbench();

        let report = engine
            .move_many(
                &mut files,
                None,
                ["y", "ghost", "z"],
                &Target::Category(Category::Identifiers),
            )
            .unwrap();

        assert_eq!(report.moved, vec!["y".to_string(), "z".to_string()]);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.changed);
        let file = files.active_file().unwrap();
        assert_eq!(file.names_in(Category::Identifiers).len(), 3);
    }

    #[test]
    fn test_move_many_empty_set() {
        let engine = TransitionEngine::default();
        let mut files = workbench();
        let before = files.clone();
        let report = engine
            .move_many(&mut files, None, Vec::<String>::new(), &Target::Category(Category::Measures))
            .unwrap();
        assert!(report.moved.is_empty() && report.is_clean());
        assert_eq!(files, before);
    }

    #[test]
    fn test_create_dimension_normalizes_and_rejects_duplicates() {
        let engine = TransitionEngine::default();
        let mut files = workbench();

        let name = engine.create_dimension(&mut files, None, "  Product ").unwrap();
        assert_eq!(name.as_str(), "product");
        assert_eq!(
            engine.create_dimension(&mut files, None, "PRODUCT"),
            Err(Rejection::DuplicateDimension {
                dimension: "product".to_string()
            })
        );
    }

    #[test]
    fn test_dimension_quota() {
        let engine = TransitionEngine::new(&DimensionSettings {
            max_custom_dimensions: 2,
            builtin_dimensions: vec!["unattributed".to_string()],
        });
        let mut files = workbench();

        engine.create_dimension(&mut files, None, "unattributed").unwrap();
        engine.create_dimension(&mut files, None, "market").unwrap();
        engine.create_dimension(&mut files, None, "product").unwrap();
        assert_eq!(
            engine.create_dimension(&mut files, None, "channel"),
            Err(Rejection::DimensionQuotaReached { limit: 2 })
        );
        // implicit creation through assignment honours the same quota
        assert_eq!(
            engine.assign_to_dimension(&mut files, None, "x", &dim("channel")),
            Err(Rejection::DimensionQuotaReached { limit: 2 })
        );
        assert!(engine
            .assign_to_dimension(&mut files, None, "x", &dim("market"))
            .is_ok());
    }

    #[test]
    fn test_remove_dimension_keeps_identifiers() {
        let engine = TransitionEngine::default();
        let mut files = workbench();
        engine
            .assign_to_dimension(&mut files, None, "x", &dim("market"))
            .unwrap();

        let released = engine.remove_dimension(&mut files, None, "Market").unwrap();
        assert_eq!(released, vec!["x".to_string()]);
        let file = files.active_file().unwrap();
        assert_eq!(file.category_of("x"), Some(Category::Identifiers));
        assert!(file.dimensions().is_empty());
    }

    #[test]
    fn test_remove_unattributed_rejected() {
        let engine = TransitionEngine::default();
        let mut files = workbench();
        engine.create_dimension(&mut files, None, "unattributed").unwrap();
        assert_eq!(
            engine.remove_dimension(&mut files, None, "unattributed"),
            Err(Rejection::ReservedDimension {
                dimension: "unattributed".to_string()
            })
        );
        assert!(files
            .active_file()
            .unwrap()
            .dimensions()
            .contains(&DimensionName::unattributed()));
    }

    #[test]
    fn test_rename_dimension() {
        let engine = TransitionEngine::default();
        let mut files = workbench();
        engine
            .assign_to_dimension(&mut files, None, "x", &dim("market"))
            .unwrap();
        engine.create_dimension(&mut files, None, "product").unwrap();

        assert_eq!(
            engine.rename_dimension(&mut files, None, "market", "product"),
            Err(Rejection::DuplicateDimension {
                dimension: "product".to_string()
            })
        );
        assert_eq!(
            engine.rename_dimension(&mut files, None, "market", "Region"),
            Ok(Applied::Changed)
        );
        let file = files.active_file().unwrap();
        assert_eq!(file.dimensions().dimension_of("x"), Some(&dim("region")));
    }

    #[test]
    fn test_rename_validates_before_noop() {
        let engine = TransitionEngine::default();

        let mut empty = FileCollection::new();
        assert_eq!(
            engine.rename_dimension(&mut empty, None, "market", "market"),
            Err(Rejection::NoActiveFile)
        );

        let mut files = workbench();
        assert_eq!(
            engine.rename_dimension(&mut files, Some(9), "market", "market"),
            Err(Rejection::FileIndexOutOfRange { index: 9, len: 2 })
        );
        assert_eq!(
            engine.rename_dimension(&mut files, None, "market", "market"),
            Err(Rejection::UnknownDimension {
                dimension: "market".to_string()
            })
        );

        engine.create_dimension(&mut files, None, "market").unwrap();
        assert_eq!(
            engine.rename_dimension(&mut files, None, "market", "Market"),
            Ok(Applied::Unchanged)
        );
    }

    #[test]
    fn test_rename_builtin_rejected() {
        let engine = TransitionEngine::new(&DimensionSettings {
            max_custom_dimensions: 1,
            builtin_dimensions: vec!["unattributed".to_string(), "calendar".to_string()],
        });
        let mut files = workbench();
        engine.create_dimension(&mut files, None, "calendar").unwrap();
        engine.create_dimension(&mut files, None, "market").unwrap();

        assert_eq!(
            engine.rename_dimension(&mut files, None, "calendar", "season"),
            Err(Rejection::ReservedDimension {
                dimension: "calendar".to_string()
            })
        );
        assert_eq!(
            engine.rename_dimension(&mut files, None, "market", "calendar"),
            Err(Rejection::ReservedDimension {
                dimension: "calendar".to_string()
            })
        );
        let file = files.active_file().unwrap();
        assert_eq!(file.dimensions().custom_count(engine.builtins()), 1);
        assert!(file.dimensions().contains(&dim("calendar")));
    }

    #[test]
    fn test_delete_file_scenarios() {
        let engine = TransitionEngine::default();
        let mut files = FileCollection::from_files(
            (0..3)
                .map(|i| ClassifiedFile::new(format!("{}.csv", i), Vec::new()))
                .collect(),
        );
        engine.set_active_file(&mut files, 2).unwrap();
        engine.delete_file(&mut files, 2).unwrap();
        assert_eq!((files.active_file_index(), files.len()), (1, 2));

        assert_eq!(
            engine.delete_file(&mut files, 5),
            Err(Rejection::FileIndexOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn test_operations_on_empty_collection() {
        let engine = TransitionEngine::default();
        let mut files = FileCollection::new();
        assert_eq!(
            engine.recategorize(&mut files, None, "x", Category::Measures),
            Err(Rejection::NoActiveFile)
        );
        assert_eq!(
            engine.move_many(&mut files, None, ["x"], &Target::Category(Category::Measures)),
            Err(Rejection::NoActiveFile)
        );
    }
}
