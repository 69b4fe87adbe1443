//! Result workbook sinks.

use std::{
    collections::{BTreeMap, HashSet},
    fs::{self, File},
    path::{Path, PathBuf},
};

use polars::prelude::*;
use tailwatch_traits::{ResultSink, Sheet, StoreError};
use tracing::info;

use crate::csv_io::DELIMITER;

/// Longest accepted sheet name.
pub const MAX_SHEET_NAME_LEN: usize = 31;

fn validate_sheets(sheets: &[Sheet]) -> Result<(), StoreError> {
    let mut seen = HashSet::new();
    for sheet in sheets {
        let reason = if sheet.name.is_empty() {
            Some("empty name".to_string())
        } else if sheet.name.chars().count() > MAX_SHEET_NAME_LEN {
            Some(format!("longer than {MAX_SHEET_NAME_LEN} characters"))
        } else if sheet.name.contains(['/', '\\']) {
            Some("contains a path separator".to_string())
        } else if !seen.insert(sheet.name.as_str()) {
            Some("appears twice in the workbook".to_string())
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(StoreError::InvalidSheetName { name: sheet.name.clone(), reason });
        }
    }
    Ok(())
}

/// Writes each workbook as a directory holding one CSV file per sheet.
#[derive(Debug, Clone)]
pub struct CsvWorkbookSink {
    root: PathBuf,
    written: HashSet<String>,
}

impl CsvWorkbookSink {
    /// Open a sink writing under `root`.
    ///
    /// # Errors
    /// Returns `StoreError::MissingRoot` if `root` is not a directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(StoreError::MissingRoot(root.display().to_string()));
        }
        Ok(Self { root, written: HashSet::new() })
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ResultSink for CsvWorkbookSink {
    fn write_workbook(&mut self, name: &str, sheets: &mut [Sheet]) -> Result<(), StoreError> {
        validate_sheets(sheets)?;
        if self.written.contains(name) {
            return Err(StoreError::DuplicateTarget(name.to_string()));
        }

        let dir = self.root.join(name);
        fs::create_dir_all(&dir)?;
        for sheet in sheets.iter_mut() {
            let mut file = File::create(dir.join(format!("{}.csv", sheet.name)))?;
            CsvWriter::new(&mut file)
                .include_header(true)
                .with_separator(DELIMITER)
                .finish(&mut sheet.frame)?;
        }

        self.written.insert(name.to_string());
        info!(workbook = name, sheets = sheets.len(), "wrote workbook");
        Ok(())
    }
}

/// Keeps workbooks in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    workbooks: BTreeMap<String, Vec<Sheet>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sheets of a written workbook.
    #[must_use]
    pub fn workbook(&self, name: &str) -> Option<&[Sheet]> {
        self.workbooks.get(name).map(Vec::as_slice)
    }

    /// A single sheet of a written workbook.
    #[must_use]
    pub fn sheet(&self, workbook: &str, sheet: &str) -> Option<&DataFrame> {
        self.workbook(workbook)?.iter().find(|s| s.name == sheet).map(|s| &s.frame)
    }

    /// Names of written workbooks, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.workbooks.keys().map(String::as_str)
    }

    /// Number of written workbooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.workbooks.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workbooks.is_empty()
    }
}

impl ResultSink for MemorySink {
    fn write_workbook(&mut self, name: &str, sheets: &mut [Sheet]) -> Result<(), StoreError> {
        validate_sheets(sheets)?;
        if self.workbooks.contains_key(name) {
            return Err(StoreError::DuplicateTarget(name.to_string()));
        }
        self.workbooks.insert(name.to_string(), sheets.to_vec());
        Ok(())
    }
}
