// ============================================================
// FILE COLLECTION
// ============================================================
// Ordered classified files plus the active-file cursor

use serde::{Deserialize, Serialize};

use super::{ClassifiedFile, Rejection};

/// Invariant: `active_file_index < files.len()` when non-empty, `0` otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "FileCollectionRecord")]
pub struct FileCollection {
    files: Vec<ClassifiedFile>,
    active_file_index: usize,
}

impl FileCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_files(files: Vec<ClassifiedFile>) -> Self {
        Self {
            files,
            active_file_index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn files(&self) -> &[ClassifiedFile] {
        &self.files
    }

    pub fn active_file_index(&self) -> usize {
        self.active_file_index
    }

    pub fn active_file(&self) -> Option<&ClassifiedFile> {
        self.files.get(self.active_file_index)
    }

    pub fn get(&self, index: usize) -> Option<&ClassifiedFile> {
        self.files.get(index)
    }

    /// Resolve an explicit index, or the active file when `None`.
    pub fn resolve(&self, index: Option<usize>) -> Result<usize, Rejection> {
        match index {
            Some(i) if i < self.files.len() => Ok(i),
            Some(i) => Err(Rejection::FileIndexOutOfRange {
                index: i,
                len: self.files.len(),
            }),
            None if self.files.is_empty() => Err(Rejection::NoActiveFile),
            None => Ok(self.active_file_index),
        }
    }

    pub(crate) fn file_mut(&mut self, index: Option<usize>) -> Result<&mut ClassifiedFile, Rejection> {
        let i = self.resolve(index)?;
        self.files.get_mut(i).ok_or(Rejection::NoActiveFile)
    }

    pub fn set_active_file(&mut self, index: usize) -> Result<(), Rejection> {
        if index >= self.files.len() {
            return Err(Rejection::FileIndexOutOfRange {
                index,
                len: self.files.len(),
            });
        }
        self.active_file_index = index;
        Ok(())
    }

    /// Remove the file at `index`, keeping the cursor on a valid file.
    pub fn delete_file(&mut self, index: usize) -> Result<ClassifiedFile, Rejection> {
        if index >= self.files.len() {
            return Err(Rejection::FileIndexOutOfRange {
                index,
                len: self.files.len(),
            });
        }
        let removed = self.files.remove(index);

        let active = self.active_file_index;
        let next = if index == active {
            active.saturating_sub(1)
        } else if index < active {
            active - 1
        } else {
            active
        };
        self.active_file_index = next.min(self.files.len().saturating_sub(1));

        Ok(removed)
    }

    /// Append a file and make it active.
    pub fn push_file(&mut self, file: ClassifiedFile) -> usize {
        self.files.push(file);
        self.active_file_index = self.files.len() - 1;
        self.active_file_index
    }

    pub fn replace_file(&mut self, index: usize, file: ClassifiedFile) -> Result<ClassifiedFile, Rejection> {
        let len = self.files.len();
        let slot = self
            .files
            .get_mut(index)
            .ok_or(Rejection::FileIndexOutOfRange { index, len })?;
        Ok(std::mem::replace(slot, file))
    }

    /// Swap in a re-classified file at the cursor. An empty collection gets
    /// the file appended instead.
    pub fn replace_active_file(&mut self, file: ClassifiedFile) -> Option<ClassifiedFile> {
        match self.files.get_mut(self.active_file_index) {
            Some(slot) => Some(std::mem::replace(slot, file)),
            None => {
                self.push_file(file);
                None
            }
        }
    }

    /// Index of the file bound to a backend dataframe handle.
    pub fn position_of_handle(&self, handle: &str) -> Option<usize> {
        self.files
            .iter()
            .position(|f| f.dataframe_handle.as_deref() == Some(handle))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileCollectionRecord {
    files: Vec<ClassifiedFile>,
    #[serde(default)]
    active_file_index: usize,
}

impl From<FileCollectionRecord> for FileCollection {
    fn from(record: FileCollectionRecord) -> Self {
        let last = record.files.len().saturating_sub(1);
        Self {
            active_file_index: record.active_file_index.min(last),
            files: record.files,
        }
    }
}
