//! Saving and loading spreadsheets.
//!
//! A saved spreadsheet is a version tag plus an ordered list of
//! `(name, contents)` pairs, where contents is the text that recreates the
//! cell when fed back through [`Spreadsheet::set_contents_of_cell`]:
//!
//! ```json
//! { "version": "v1", "cells": [ { "name": "A1", "contents": "=B1+2" } ] }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{FileError, Result, SpreadsheetError};
use crate::spreadsheet::Spreadsheet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpreadsheetFile {
    pub version: String,
    #[serde(default)]
    pub cells: Vec<CellEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CellEntry {
    pub name: String,
    /// `None` when the file omits the contents; rejected on load
    #[serde(default)]
    pub contents: Option<String>,
}

/// Just the tag, for reading the version without the cells
#[derive(Deserialize)]
struct VersionHeader {
    version: String,
}

impl SpreadsheetFile {
    /// Snapshot of every non-empty cell, in name order
    pub fn from_sheet(sheet: &Spreadsheet) -> Self {
        let cells = sheet
            .stored_cells()
            .into_iter()
            .map(|cell| CellEntry {
                name: cell.name().to_string(),
                contents: Some(cell.contents().to_input_string()),
            })
            .collect();

        Self {
            version: sheet.version().to_string(),
            cells,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| SpreadsheetError::read_write(path, e))
}

impl Spreadsheet {
    /// Load a spreadsheet saved with version `expected_version`.
    ///
    /// Cells are replayed in file order through
    /// [`set_contents_checked`](Spreadsheet::set_contents_checked); any
    /// failure, including a bad name, formula or cycle, is reported as
    /// [`SpreadsheetError::ReadWrite`].
    pub fn load<V, N>(
        path: impl AsRef<Path>,
        is_valid: V,
        normalize: N,
        expected_version: &str,
    ) -> Result<Self>
    where
        V: Fn(&str) -> bool + Send + Sync + 'static,
        N: Fn(&str) -> String + Send + Sync + 'static,
    {
        let path = path.as_ref();
        let json = read_to_string(path)?;
        let file =
            SpreadsheetFile::from_json(&json).map_err(|e| SpreadsheetError::read_write(path, e))?;

        if file.version != expected_version {
            return Err(SpreadsheetError::read_write(
                path,
                FileError::VersionMismatch {
                    expected: expected_version.to_string(),
                    found: file.version,
                },
            ));
        }

        let mut sheet = Spreadsheet::with_hooks(is_valid, normalize, file.version);
        for entry in &file.cells {
            sheet
                .set_contents_checked(&entry.name, entry.contents.as_deref())
                .map_err(|e| SpreadsheetError::read_write(path, Box::new(e)))?;
        }
        sheet.mark_saved();

        info!(path = %path.display(), cells = file.cells.len(), "loaded spreadsheet");
        Ok(sheet)
    }

    /// Write every non-empty cell to `path` and clear the changed flag
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = SpreadsheetFile::from_sheet(self);
        let json = file
            .to_json_pretty()
            .map_err(|e| SpreadsheetError::read_write(path, e))?;
        fs::write(path, json).map_err(|e| SpreadsheetError::read_write(path, e))?;

        self.mark_saved();
        info!(path = %path.display(), cells = file.cells.len(), "saved spreadsheet");
        Ok(())
    }

    /// The version tag stored in a saved file, without loading its cells
    pub fn saved_version(path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let json = read_to_string(path)?;
        let header: VersionHeader =
            serde_json::from_str(&json).map_err(|e| SpreadsheetError::read_write(path, e))?;
        Ok(header.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellContents;

    #[test]
    fn test_file_snapshot() {
        let mut sheet = Spreadsheet::with_hooks(|_| true, |s| s.to_string(), "v1");
        sheet.set_contents_of_cell("B1", "=A1 * 2.0").unwrap();
        sheet.set_contents_of_cell("A1", "3").unwrap();
        sheet.set_contents_of_cell("C1", "note").unwrap();

        let file = SpreadsheetFile::from_sheet(&sheet);
        assert_eq!(file.version, "v1");
        assert_eq!(
            file.cells,
            vec![
                CellEntry { name: "A1".into(), contents: Some("3".into()) },
                CellEntry { name: "B1".into(), contents: Some("=A1*2".into()) },
                CellEntry { name: "C1".into(), contents: Some("note".into()) },
            ]
        );
    }

    #[test]
    fn test_file_snapshot_skips_second_normalization() {
        // Applying the normalizer again to a stored name yields another name
        let normalize = |s: &str| {
            if s.starts_with(|c: char| c.is_ascii_lowercase()) {
                s.to_uppercase()
            } else {
                format!("{}0", s)
            }
        };
        let mut sheet = Spreadsheet::with_hooks(|_| true, normalize, "v");
        sheet.set_contents_of_cell("a1", "5").unwrap();
        sheet.set_contents_of_cell("b1", "=a1 + 1").unwrap();
        assert_eq!(sheet.nonempty_cell_names(), vec!["A1", "B1"]);

        let file = SpreadsheetFile::from_sheet(&sheet);
        assert_eq!(
            file.cells,
            vec![
                CellEntry { name: "A1".into(), contents: Some("5".into()) },
                CellEntry { name: "B1".into(), contents: Some("=A1+1".into()) },
            ]
        );
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{"version":"v1","cells":[{"name":"A1","contents":"=1+1"}]}"#;
        let file = SpreadsheetFile::from_json(json).unwrap();
        assert_eq!(file.cells[0].contents.as_deref(), Some("=1+1"));

        let missing = r#"{"version":"v1","cells":[{"name":"A1"}]}"#;
        assert_eq!(SpreadsheetFile::from_json(missing).unwrap().cells[0].contents, None);

        assert!(SpreadsheetFile::from_json(r#"{"cells":[]}"#).is_err());
        assert!(SpreadsheetFile::from_json(r#"{"version":"v1","extra":1}"#).is_err());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.json");

        let mut sheet = Spreadsheet::new();
        sheet.set_contents_of_cell("A1", "2").unwrap();
        sheet.set_contents_of_cell("B1", "=A1+A1").unwrap();
        sheet.save(&path).unwrap();
        assert!(!sheet.is_changed());

        let loaded = Spreadsheet::load(&path, |_| true, |s| s.to_string(), "default").unwrap();
        assert!(!loaded.is_changed());
        assert_eq!(loaded.cell_value("B1").unwrap().as_number(), Some(4.0));
        assert_eq!(
            loaded.cell_contents("B1").unwrap(),
            sheet.cell_contents("B1").unwrap()
        );
        assert!(matches!(
            loaded.cell_contents("A1").unwrap(),
            CellContents::Number(n) if n == 2.0
        ));
    }
}
