use crate::spreadsheet::reference;
use crate::spreadsheet::worksheet::Worksheet;
use crate::spreadsheet::SpreadsheetError;
use crate::table::resolver::resolve_text;

/// Marker that includes a column or a data row in the output
pub const OUTPUT_SYMBOL: &str = "*";

// Metadata rows, 1-based
pub const OUTPUT_FLAG_ROW: u32 = 1;
pub const FIELD_NAME_ROW: u32 = 2;
pub const FIELD_TYPE_ROW: u32 = 3;
pub const COMMENT_ROW: u32 = 4;
pub const DEFAULT_VALUE_ROW: u32 = 5;

/// Column holding the per-row output flag
pub const ROW_FLAG_COLUMN: &str = "A";

/// Locates flagged columns and rows of one worksheet and reads cells by address.
pub struct TableScanner<'a> {
    worksheet: &'a Worksheet,
    shared_strings: &'a [String],
}

impl<'a> TableScanner<'a> {
    pub fn new(worksheet: &'a Worksheet, shared_strings: &'a [String]) -> Self {
        TableScanner { worksheet, shared_strings }
    }

    /// Sheet name as listed by the workbook
    pub fn sheet_name(&self) -> &str {
        &self.worksheet.name
    }

    /// Column labels whose row 1 cell holds the output symbol, left to right.
    /// An empty result means the sheet has nothing to generate.
    pub fn flagged_columns(&self) -> Result<Vec<String>, SpreadsheetError> {
        let mut columns = Vec::<String>::new();
        for cell in self.worksheet.cells() {
            if reference::row_of(Some(cell.reference.as_str())) != Some(OUTPUT_FLAG_ROW) {
                continue;
            }
            if resolve_text(Some(cell), self.shared_strings)? == OUTPUT_SYMBOL {
                columns.push(reference::column_of(Some(cell.reference.as_str())).to_ascii_uppercase());
            }
        }
        // Shorter labels come first: Z < AA
        columns.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        columns.dedup();
        Ok(columns)
    }

    /// Rows whose column `A` cell holds the output symbol, in ascending order.
    /// Any row counts, metadata rows included.
    pub fn flagged_data_rows(&self) -> Result<Vec<u32>, SpreadsheetError> {
        let mut rows = Vec::<u32>::new();
        for cell in self.worksheet.cells() {
            if !reference::column_of(Some(cell.reference.as_str())).eq_ignore_ascii_case(ROW_FLAG_COLUMN) {
                continue;
            }
            let row = match reference::row_of(Some(cell.reference.as_str())) {
                Some(row) => row,
                None => continue,
            };
            if resolve_text(Some(cell), self.shared_strings)? == OUTPUT_SYMBOL {
                rows.push(row);
            }
        }
        rows.sort_unstable();
        rows.dedup();
        Ok(rows)
    }

    /// Resolved text of the cell at `column` and `row`; a missing cell reads as empty.
    pub fn cell_at(&self, column: &str, row: u32) -> Result<String, SpreadsheetError> {
        let cell = self.worksheet.cell(&reference::reference(column, row));
        resolve_text(cell, self.shared_strings)
    }
}
