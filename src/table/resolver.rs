use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::SpreadsheetError;

/// Resolves the display text of a cell.
///
/// An absent or empty cell yields an empty string. Shared string cells are
/// looked up in `shared_strings`; booleans become `TRUE` / `FALSE`; every other
/// kind passes its raw text through for the value converter to interpret.
pub fn resolve_text(cell: Option<&Cell>, shared_strings: &[String]) -> Result<String, SpreadsheetError> {
    let cell = match cell {
        Some(cell) if !cell.value.is_empty() => cell,
        _ => return Ok(String::new()),
    };
    match cell.kind {
        CellType::SharedString => {
            let index = cell.value.trim()
                .parse::<usize>()
                .map_err(|_| SpreadsheetError::SharedStringValueError(cell.value.to_owned()))?;
            shared_strings
                .get(index)
                .cloned()
                .ok_or(SpreadsheetError::SharedStringIndexError(index, shared_strings.len()))
        }
        CellType::Boolean => Ok(if cell.value == "0" { "FALSE" } else { "TRUE" }.to_owned()),
        _ => Ok(cell.value.to_owned()),
    }
}
