//! Office Open XML package helpers
use crate::error::RustyConfigError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Path;
use zip::ZipArchive;

/// XML tag name for relationship elements
const TAG_RELATIONSHIP: &[u8] = b"Relationship";

/// Compound File Binary signature; encrypted packages and legacy `.xls` start with it
const OLE_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Opens the package archive of an Office Open XML file.
pub(super) fn open(path: &Path) -> Result<ZipArchive<BufReader<File>>, RustyConfigError> {
    let mut reader = BufReader::new(File::open(path)?);
    if is_password_protected(&mut reader)? {
        Err(SpreadsheetError::SpreadsheetPasswordProtectedError(path.display().to_string()))?;
    }
    Ok(ZipArchive::new(reader)?)
}

/// Loads worksheet relationships, mapping relationship ids to part paths.
pub(super) fn load_relationships<RS: Read + Seek>(
    zip: &mut ZipArchive<RS>,
    path: &str,
) -> Result<HashMap<String, String>, RustyConfigError> {
    let mut reader = zip.xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::FileError(path.to_string()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            // Only worksheet relationships are of interest
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Normalizes a relationship target to a path inside the archive.
pub(crate) fn to_zip_path(path: Cow<'_, str>) -> String {
    if let Some(stripped) = path.strip_prefix('/') {
        stripped.to_string()
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}

/// Checks the leading bytes for the CFB signature and rewinds the reader.
fn is_password_protected<R: Read + Seek>(reader: &mut R) -> Result<bool, RustyConfigError> {
    let mut signature = [0u8; 8];
    let matched = match reader.read_exact(&mut signature) {
        Ok(()) => signature == OLE_SIGNATURE,
        Err(error) if error.kind() == std::io::ErrorKind::UnexpectedEof => false,
        Err(error) => Err(error)?,
    };
    reader.seek(SeekFrom::Start(0))?;
    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    #[test]
    fn zip_path_normalization() {
        assert_eq!(to_zip_path(Cow::Borrowed("worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path(Cow::Borrowed("/xl/worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path(Cow::Borrowed("xl/worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
    }

    #[test]
    fn detect_ole_signature() {
        let mut encrypted = Cursor::new([OLE_SIGNATURE.to_vec(), vec![0u8; 16]].concat());
        assert!(is_password_protected(&mut encrypted).unwrap());
        assert_eq!(encrypted.position(), 0);

        let mut short = Cursor::new(vec![0x50u8, 0x4B]);
        assert!(!is_password_protected(&mut short).unwrap());
    }

    #[test]
    fn worksheet_relationships_only() {
        let rels = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>"#;
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.start_file("xl/_rels/workbook.xml.rels", SimpleFileOptions::default()).unwrap();
        writer.write_all(rels.as_bytes()).unwrap();
        let mut zip = ZipArchive::new(writer.finish().unwrap()).unwrap();

        let relationships = load_relationships(&mut zip, "xl/_rels/workbook.xml.rels").unwrap();
        assert_eq!(relationships.len(), 1);
        assert_eq!(relationships["rId1"], "xl/worksheets/sheet1.xml");
    }

    #[test]
    fn missing_relationships_part() {
        let writer = ZipWriter::new(Cursor::new(Vec::new()));
        let mut zip = ZipArchive::new(writer.finish().unwrap()).unwrap();
        assert!(load_relationships(&mut zip, "xl/_rels/workbook.xml.rels").is_err());
    }
}
