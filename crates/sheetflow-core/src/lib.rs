pub mod cell;
pub mod error;
pub mod file;
pub mod name;
pub mod recalc;
pub mod spreadsheet;

pub use cell::{Cell, CellContents, CellValue};
pub use error::{FileError, SpreadsheetError};
pub use file::{CellEntry, SpreadsheetFile};
pub use name::is_cell_name;
pub use recalc::{recalc_order, CycleDetected};
pub use spreadsheet::{NameNormalizer, NameValidator, Spreadsheet, DEFAULT_VERSION};

pub use sheetflow_formula::{DependencyGraph, Formula, FormulaError, FormulaFormatError};
