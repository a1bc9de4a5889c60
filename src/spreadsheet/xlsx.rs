use crate::error::RustyConfigError;
use crate::helpers::xml::read_text;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::excel;
use crate::spreadsheet::excel::load_relationships;
use crate::spreadsheet::reference;
use crate::spreadsheet::worksheet::Worksheet;
use crate::spreadsheet::SheetEntry;
use crate::spreadsheet::SpreadsheetError;
use crate::spreadsheet::Workbook;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

// XML tag names for parsing the XLSX format
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");   // Shared string table item
const TAG_SHEET: QName = QName(b"sheet");             // Worksheet definition
const TAG_ROW: QName = QName(b"row");                 // Row in worksheet
const TAG_CELL: QName = QName(b"c");                  // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");        // Inline string value
const TAG_VALUE: QName = QName(b"v");                 // Cell value content

const PATH_WORKBOOK: &str = "xl/workbook.xml";
const PATH_WORKBOOK_RELATIONSHIPS: &str = "xl/_rels/workbook.xml.rels";
const PATH_SHARED_STRINGS: &str = "xl/sharedStrings.xml";

/// An Excel XLSX workbook opened for reading
pub struct XlsxWorkbook<RS: Read + Seek = BufReader<File>> {
    /// File name of the workbook
    name: String,
    /// ZIP archive containing the package parts
    zip: ZipArchive<RS>,
    /// Sheets in workbook order, id is the relationship id
    sheets: Vec<SheetEntry>,
    /// Relationship id to worksheet part path
    relationships: HashMap<String, String>,
    /// Whole shared string table
    shared_strings: Vec<String>,
}

impl XlsxWorkbook {
    /// Opens an XLSX file and loads its sheet list and shared strings
    pub fn open(path: &Path) -> Result<XlsxWorkbook, RustyConfigError> {
        let zip = excel::open(path)?;
        XlsxWorkbook::from_archive(&path.display().to_string(), zip)
    }
}

impl<RS: Read + Seek> XlsxWorkbook<RS> {
    /// Builds a workbook over an already opened package archive
    pub fn from_archive(name: &str, mut zip: ZipArchive<RS>) -> Result<XlsxWorkbook<RS>, RustyConfigError> {
        let relationships = load_relationships(&mut zip, PATH_WORKBOOK_RELATIONSHIPS)?;
        let sheets = load_workbook(&mut zip)?;
        let shared_strings = load_shared_strings(&mut zip)?;
        debug!(workbook = name, sheets = sheets.len(), shared_strings = shared_strings.len(), "Opened workbook");
        Ok(XlsxWorkbook {
            name: name.to_owned(),
            zip,
            sheets,
            relationships,
            shared_strings,
        })
    }
}

impl<RS: Read + Seek> Workbook for XlsxWorkbook<RS> {
    fn name(&self) -> &str {
        &self.name
    }

    fn sheets(&self) -> &[SheetEntry] {
        &self.sheets
    }

    /// Reads every non-empty `<c>` element of the worksheet part, keeping the
    /// raw value and declared type; nothing is resolved here.
    fn worksheet(&mut self, id: &str) -> Result<Worksheet, RustyConfigError> {
        let sheet_name = self.sheets.iter()
            .find(|sheet| sheet.id == id)
            .map(|sheet| sheet.name.to_owned())
            .ok_or_else(|| SpreadsheetError::SheetNotFoundError(self.name.to_owned(), id.to_owned()))?;
        let path = self.relationships
            .get(id)
            .ok_or_else(|| SpreadsheetError::SheetNotFoundError(self.name.to_owned(), id.to_owned()))?;
        let mut reader = self.zip.xml_reader(path)?
            .ok_or_else(|| SpreadsheetError::FileError(path.to_owned()))?;

        let mut worksheet = Worksheet::new(&sheet_name);
        let mut row_count = 0usize;
        let mut col_count = 0usize;
        let mut cell_reference = String::new();
        let mut kind = CellType::default();
        let mut value = String::new();
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_ROW => {
                if let Some(row) = event.get_attribute_value("r")? {
                    row_count = row.parse::<usize>()?.saturating_sub(1);
                }
                col_count = 0;
            }
            Event::End(event) if event.name() == TAG_ROW => {
                row_count += 1;
            }
            Event::Start(event) if event.name() == TAG_CELL => {
                cell_reference = event.get_attribute_value("r")?
                    .map(|reference| reference.to_string())
                    .unwrap_or_else(|| reference::from_index(row_count, col_count));
                col_count += 1;
                kind = CellType::parse(event.get_attribute_value("t")?.as_deref());
                value.clear();
            }
            Event::Start(event) if event.name() == TAG_INLINE_STRING => {
                value = read_text(&mut reader, TAG_INLINE_STRING, false)?;
            }
            Event::Start(event) if event.name() == TAG_VALUE => {
                value = read_text(&mut reader, TAG_VALUE, true)?;
            }
            Event::End(event) if !value.is_empty() && event.name() == TAG_CELL => {
                worksheet.push(Cell {
                    reference: std::mem::take(&mut cell_reference),
                    kind,
                    value: std::mem::take(&mut value),
                });
            }
        });
        debug!(sheet = sheet_name.as_str(), cells = worksheet.len(), "Loaded worksheet");
        Ok(worksheet)
    }

    fn shared_strings(&self) -> &[String] {
        &self.shared_strings
    }
}

/// Loads the sheet list from `xl/workbook.xml`.
/// The id of each entry is its `r:id` relationship id.
fn load_workbook<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<Vec<SheetEntry>, RustyConfigError> {
    let mut reader = zip.xml_reader(PATH_WORKBOOK)?
        .ok_or_else(|| SpreadsheetError::FileError(PATH_WORKBOOK.to_string()))?;
    let mut sheets = Vec::<SheetEntry>::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = String::new();
            let mut id = None::<String>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = attribute.get_value()?.to_string();
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.get_value()?.to_string());
                }
            }
            let id = id.ok_or_else(|| SpreadsheetError::MissingSheetIdError(name.to_owned()))?;
            sheets.push(SheetEntry { name, id });
        }
    });
    Ok(sheets)
}

/// Loads the whole shared string table; a workbook without one has an empty table.
fn load_shared_strings<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<Vec<String>, RustyConfigError> {
    let mut shared_strings = Vec::<String>::new();
    let mut reader = match zip.xml_reader(PATH_SHARED_STRINGS)? {
        Some(reader) => reader,
        None => return Ok(shared_strings),
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
            shared_strings.push(read_text(&mut reader, TAG_SHARED_STRING_ITEM, false)?);
        }
    });
    Ok(shared_strings)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Assembles a minimal xlsx package in memory.
    /// `sheets` holds (sheet name, worksheet `<sheetData>` body) pairs.
    pub(crate) fn package(sheets: &[(&str, &str)], shared_strings: &[&str]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        let mut workbook = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
        );
        let mut rels = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for (index, (name, _)) in sheets.iter().enumerate() {
            let number = index + 1;
            workbook.push_str(&format!(r#"<sheet name="{name}" sheetId="{number}" r:id="rId{number}"/>"#));
            rels.push_str(&format!(
                r#"<Relationship Id="rId{number}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{number}.xml"/>"#
            ));
        }
        workbook.push_str("</sheets></workbook>");
        rels.push_str("</Relationships>");

        writer.start_file("xl/workbook.xml", options).unwrap();
        writer.write_all(workbook.as_bytes()).unwrap();
        writer.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
        writer.write_all(rels.as_bytes()).unwrap();

        for (index, (_, body)) in sheets.iter().enumerate() {
            writer.start_file(format!("xl/worksheets/sheet{}.xml", index + 1), options).unwrap();
            let xml = format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{body}</sheetData></worksheet>"#
            );
            writer.write_all(xml.as_bytes()).unwrap();
        }

        if !shared_strings.is_empty() {
            let mut sst = format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">"#,
                shared_strings.len()
            );
            for string in shared_strings {
                sst.push_str(&format!("<si><t>{string}</t></si>"));
            }
            sst.push_str("</sst>");
            writer.start_file("xl/sharedStrings.xml", options).unwrap();
            writer.write_all(sst.as_bytes()).unwrap();
        }

        writer.finish().unwrap().into_inner()
    }

    pub(crate) fn workbook(sheets: &[(&str, &str)], shared_strings: &[&str]) -> XlsxWorkbook<Cursor<Vec<u8>>> {
        let zip = ZipArchive::new(Cursor::new(package(sheets, shared_strings))).unwrap();
        XlsxWorkbook::from_archive("test.xlsx", zip).unwrap()
    }

    #[test]
    fn list_sheets_in_order() {
        let workbook = workbook(&[("Item", ""), ("Monster", "")], &[]);
        let names: Vec<&str> = workbook.sheets().iter().map(|sheet| sheet.name.as_str()).collect();
        assert_eq!(names, vec!["Item", "Monster"]);
        assert_eq!(workbook.sheets()[1].id, "rId2");
    }

    #[test]
    fn load_shared_string_table() {
        let workbook = workbook(&[("Item", "")], &["ID", "Name", "Sword &amp; Shield"]);
        assert_eq!(workbook.shared_strings(), &["ID", "Name", "Sword & Shield"]);
    }

    #[test]
    fn read_raw_cells() {
        let body = concat!(
            r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1"><v>12.5</v></c></row>"#,
            r#"<row r="2"><c r="A2" t="b"><v>1</v></c><c r="B2" t="inlineStr"><is><t>inline</t></is></c><c r="C2" s="3"/></row>"#,
        );
        let mut workbook = workbook(&[("Item", body)], &["*"]);
        let sheet = workbook.worksheet("rId1").unwrap();

        assert_eq!(sheet.name, "Item");
        assert_eq!(sheet.len(), 4);
        assert_eq!(sheet.cell("A1"), Some(&Cell::new("A1", CellType::SharedString, "0")));
        assert_eq!(sheet.cell("B1"), Some(&Cell::new("B1", CellType::Number, "12.5")));
        assert_eq!(sheet.cell("A2"), Some(&Cell::new("A2", CellType::Boolean, "1")));
        assert_eq!(sheet.cell("B2"), Some(&Cell::new("B2", CellType::InlineString, "inline")));
        assert!(sheet.cell("C2").is_none());
    }

    #[test]
    fn cells_without_reference_are_counted() {
        let body = r#"<row r="3"><c><v>1</v></c><c><v>2</v></c></row><row><c><v>3</v></c></row>"#;
        let mut workbook = workbook(&[("Item", body)], &[]);
        let sheet = workbook.worksheet("rId1").unwrap();

        assert_eq!(sheet.cell("A3").map(|cell| cell.value.as_str()), Some("1"));
        assert_eq!(sheet.cell("B3").map(|cell| cell.value.as_str()), Some("2"));
        assert_eq!(sheet.cell("A4").map(|cell| cell.value.as_str()), Some("3"));
    }

    #[test]
    fn unknown_sheet_id() {
        let mut workbook = workbook(&[("Item", "")], &[]);
        let error = workbook.worksheet("rId9").unwrap_err();
        assert!(matches!(
            error,
            RustyConfigError::SpreadsheetError(SpreadsheetError::SheetNotFoundError(_, _))
        ));
    }
}
