//! # Spreadsheet Access
//!
//! The narrow read-only interface the table pipeline uses to reach a workbook:
//! enumerate sheets, load a worksheet's raw cells, and look up shared strings.
//! Only the Office Open XML formats (`.xlsx`, `.xlsm`) are implemented.
pub mod cell;
pub(crate) mod excel;
pub mod reference;
pub mod worksheet;
pub mod xlsx;

use crate::error::RustyConfigError;
use crate::spreadsheet::xlsx::XlsxWorkbook;
use crate::spreadsheet::worksheet::Worksheet;
use std::path::Path;
use thiserror::Error;

/// Resource-integrity errors raised while reading a workbook.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Part '{0}' not found in workbook")]
    FileError(String),

    #[error("Sheet id '{1}' not found in '{0}'")]
    SheetNotFoundError(String, String),

    #[error("Sheet '{0}' has no id")]
    MissingSheetIdError(String),

    #[error("Shared string index {0} out of range, the table holds {1} strings")]
    SharedStringIndexError(usize, usize),

    #[error("Invalid shared string index '{0}'")]
    SharedStringValueError(String),

    #[error("Unsupported spreadsheet format '{0}'")]
    UnsupportedFormatError(String),

    #[error("'{0}' is password protected or not an Office Open XML package")]
    SpreadsheetPasswordProtectedError(String),
}

/// A sheet as listed by the workbook: display name plus an opaque id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetEntry {
    pub name: String,
    pub id: String,
}

/// Read-only access to one open workbook.
///
/// The handle owns the underlying file; dropping it releases the file.
pub trait Workbook {
    /// Source file name
    fn name(&self) -> &str;

    /// Sheets in workbook order
    fn sheets(&self) -> &[SheetEntry];

    /// Loads the cells of the sheet with the given id
    fn worksheet(&mut self, id: &str) -> Result<Worksheet, RustyConfigError>;

    /// The shared string table, indexed by the values of `SharedString` cells
    fn shared_strings(&self) -> &[String];
}

/// Opens a workbook for reading, choosing the reader by file extension.
pub fn open_workbook<P: AsRef<Path>>(path: P) -> Result<Box<dyn Workbook>, RustyConfigError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.to_ascii_lowercase());
    match extension.as_deref() {
        Some("xlsx") | Some("xlsm") => Ok(Box::new(XlsxWorkbook::open(path)?)),
        _ => Err(SpreadsheetError::UnsupportedFormatError(path.display().to_string()))?,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_extension() {
        let error = open_workbook("tables/Item.ods").err().unwrap();
        assert!(matches!(
            error,
            RustyConfigError::SpreadsheetError(SpreadsheetError::UnsupportedFormatError(_))
        ));
    }

    #[test]
    fn missing_file() {
        let error = open_workbook("non_existent_file.xlsx").err().unwrap();
        assert!(matches!(error, RustyConfigError::IoError(_)));
    }
}
