use crate::spreadsheet::cell::Cell;
use std::collections::HashMap;

/// The cells of one sheet, detached from the workbook that produced them.
#[derive(Clone, Debug, Default)]
pub struct Worksheet {
    /// Sheet name
    pub name: String,
    /// Cells in document order (row-major as written by the producer)
    cells: Vec<Cell>,
    /// Reference to position in `cells`
    indexes: HashMap<String, usize>,
}

impl Worksheet {
    pub fn new(name: &str) -> Self {
        Worksheet {
            name: name.to_owned(),
            ..Default::default()
        }
    }

    /// Adds a cell. A later cell with the same reference replaces the earlier one.
    pub fn push(&mut self, cell: Cell) {
        let key = cell.reference.to_ascii_uppercase();
        if let Some(index) = self.indexes.get(&key) {
            self.cells[*index] = cell;
        } else {
            self.indexes.insert(key, self.cells.len());
            self.cells.push(cell);
        }
    }

    /// Looks up a cell by reference (case-insensitive).
    pub fn cell(&self, reference: &str) -> Option<&Cell> {
        self.indexes
            .get(&reference.to_ascii_uppercase())
            .and_then(|index| self.cells.get(*index))
    }

    /// All cells in document order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }
}

impl FromIterator<Cell> for Worksheet {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        let mut worksheet = Worksheet::default();
        for cell in iter {
            worksheet.push(cell);
        }
        worksheet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::cell::CellType;

    #[test]
    fn lookup_by_reference() {
        let mut sheet = Worksheet::new("Item");
        sheet.push(Cell::new("A1", CellType::InlineString, "*"));
        sheet.push(Cell::new("B2", CellType::Number, "3"));

        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.cell("b2").map(|cell| cell.value.as_str()), Some("3"));
        assert!(sheet.cell("C3").is_none());
    }

    #[test]
    fn duplicate_reference_replaces() {
        let sheet: Worksheet = vec![
            Cell::new("A1", CellType::Number, "1"),
            Cell::new("A1", CellType::Number, "2"),
        ]
        .into_iter()
        .collect();

        assert_eq!(sheet.len(), 1);
        assert_eq!(sheet.cell("A1").map(|cell| cell.value.as_str()), Some("2"));
    }
}
