//! XML parsing utilities for the SpreadsheetML parts of a workbook.
//! Provides a reader wrapper plus helper traits for attributes and text content.

use crate::error::RustyConfigError;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::name::QName;
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::BufRead;
use thiserror::Error;

/// Phonetic run inside a rich text item, never part of the displayed text
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");
/// Text run inside a shared or inline string
const TAG_TEXT: QName = QName(b"t");

/// Errors specific to XML parsing operations
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Parse entity '{0}' failed")]
    ParseEntityError(String),
}

/// XML reader wrapper configured for workbook parts
pub(crate) struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    /// Creates a new XML reader. Empty elements are expanded so `<v/>` and
    /// `<v></v>` produce the same start/end event pair.
    pub(crate) fn new(buf_reader: R) -> XmlReader<R> {
        let mut reader = Reader::from_reader(buf_reader);
        let config = reader.config_mut();
        config.check_comments = false;
        config.check_end_names = false;
        config.expand_empty_elements = true;
        config.trim_text(false);

        let buffer = Vec::with_capacity(1024);
        XmlReader { reader, buffer }
    }

    /// Reads the next XML event, `None` at end of document
    pub(crate) fn next(&'_ mut self) -> Result<Option<Event<'_>>, RustyConfigError> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer) {
            Ok(Event::Eof) => Ok(None),
            Ok(event) => Ok(Some(event)),
            Err(error) => Err(RustyConfigError::XmlError(error)),
        }
    }
}

/// Helper trait for XML attributes
pub(crate) trait XmlAttributeHelper<'a> {
    /// Gets the unescaped attribute value as a string
    fn get_value(&self) -> Result<Cow<'a, str>, RustyConfigError>;
}

impl<'a> XmlAttributeHelper<'a> for Attribute<'a> {
    fn get_value(&self) -> Result<Cow<'a, str>, RustyConfigError> {
        Ok(self.unescape_value()?)
    }
}

/// Helper trait for XML nodes providing attribute access by name
pub(crate) trait XmlNodeHelper<'a> {
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, RustyConfigError>;
}

impl<'a> XmlNodeHelper<'a> for BytesStart<'a> {
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, RustyConfigError> {
        self.try_get_attribute(name)?
            .map(|attribute| attribute.get_value())
            .transpose()
    }
}

/// Helper trait for building text content from XML events
pub(crate) trait XmlTextContextHelper {
    /// Appends an entity or character reference (`&amp;`, `&#20013;`, `&#x4E2D;`)
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), RustyConfigError>;
}

impl XmlTextContextHelper for String {
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), RustyConfigError> {
        let raw = bytes.xml_content()?;
        if let Some(number) = raw.strip_prefix('#') {
            let code = if let Some(hex) = number.strip_prefix('x') {
                u32::from_str_radix(hex, 16)?
            } else {
                number.parse::<u32>()?
            };
            if let Some(character) = std::char::from_u32(code) {
                self.push(character);
            }
        } else if let Some(entity) = resolve_xml_entity(&raw) {
            self.push_str(entity);
        } else {
            Err(XmlError::ParseEntityError(raw.to_string()))?;
        }

        Ok(())
    }
}

#[macro_export]
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(result) = $reader.next()? {
            match result {
                Event::Eof => break,
                $($arms)*
                _ => (),
            }
        }
    };
}

/// Collects the text of an element up to its closing `end_tag`.
///
/// Phonetic runs are skipped. When `is_text_content` is false only text inside
/// `<t>` runs counts, which is how shared and inline strings are laid out; a
/// `<v>` value element carries its text directly.
pub(crate) fn read_text<R: BufRead>(
    reader: &mut XmlReader<R>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, RustyConfigError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(xml: &str) -> XmlReader<Cursor<Vec<u8>>> {
        XmlReader::new(Cursor::new(xml.as_bytes().to_vec()))
    }

    fn read_first(xml: &str, tag: &'static [u8], is_text_content: bool) -> Result<String, RustyConfigError> {
        let mut reader = reader(xml);
        let mut text = String::new();
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == QName(tag) => {
                text = read_text(&mut reader, QName(tag), is_text_content)?;
                break;
            }
        });
        Ok(text)
    }

    #[test]
    fn read_text_joins_rich_text_runs() {
        let xml = r#"<si><r><t>Fire</t></r><r><t xml:space="preserve"> Sword</t></r></si>"#;
        assert_eq!(read_first(xml, b"si", false).unwrap(), "Fire Sword");
    }

    #[test]
    fn read_text_skips_phonetic_runs() {
        let xml = "<si><t>\u{6771}\u{4EAC}</t><rPh sb=\"0\" eb=\"2\"><t>\u{30C8}\u{30A6}</t></rPh></si>";
        assert_eq!(read_first(xml, b"si", false).unwrap(), "\u{6771}\u{4EAC}");
    }

    #[test]
    fn read_text_resolves_references() {
        assert_eq!(read_first("<v>a&amp;b&#35;c&#x41;</v>", b"v", true).unwrap(), "a&b#cA");
    }

    #[test]
    fn read_text_of_empty_element() {
        assert_eq!(read_first("<c><v/></c>", b"v", true).unwrap(), "");
    }

    #[test]
    fn unknown_entity_fails() {
        assert!(read_first("<v>&bogus;</v>", b"v", true).is_err());
    }

    #[test]
    fn attribute_lookup() -> Result<(), RustyConfigError> {
        let mut reader = reader(r#"<c r="B2" t="s"/>"#);
        let mut found = None;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == QName(b"c") => {
                found = Some((
                    event.get_attribute_value("r")?.map(|v| v.to_string()),
                    event.get_attribute_value("s")?.map(|v| v.to_string()),
                ));
            }
        });
        assert_eq!(found, Some((Some("B2".to_string()), None)));
        Ok(())
    }
}
