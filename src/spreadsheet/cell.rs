/// Declared type of a worksheet cell, taken from the `t` attribute of `<c>`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CellType {
    /// Numeric values, also the default when `t` is absent
    #[default]
    Number,
    /// Boolean values stored as `0` / `1`
    Boolean,
    /// Index into the workbook's shared string table
    SharedString,
    /// Inline or formula string values
    InlineString,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Error values such as `#DIV/0!`
    Error,
}

impl CellType {
    /// Maps the SpreadsheetML `t` attribute to a cell type.
    pub fn parse(kind: Option<&str>) -> Self {
        match kind {
            Some("s") => CellType::SharedString,
            Some("inlineStr") | Some("str") => CellType::InlineString,
            Some("b") => CellType::Boolean,
            Some("d") => CellType::IsoDateTime,
            Some("e") => CellType::Error,
            _ => CellType::Number,
        }
    }
}

/// A single worksheet cell with its raw, unresolved content.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    /// Cell reference such as `B2`
    pub reference: String,
    /// Declared cell type
    pub kind: CellType,
    /// Raw inner text (a shared string index for `SharedString` cells)
    pub value: String,
}

impl Cell {
    pub fn new(reference: &str, kind: CellType, value: &str) -> Self {
        Cell {
            reference: reference.to_owned(),
            kind,
            value: value.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cell_type() {
        assert_eq!(CellType::parse(Some("s")), CellType::SharedString);
        assert_eq!(CellType::parse(Some("str")), CellType::InlineString);
        assert_eq!(CellType::parse(Some("inlineStr")), CellType::InlineString);
        assert_eq!(CellType::parse(Some("b")), CellType::Boolean);
        assert_eq!(CellType::parse(Some("e")), CellType::Error);
        assert_eq!(CellType::parse(Some("n")), CellType::Number);
        assert_eq!(CellType::parse(None), CellType::Number);
    }
}
