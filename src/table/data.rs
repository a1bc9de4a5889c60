use crate::error::RustyConfigError;
use crate::table::converter::ConversionError;
use crate::table::converter::Value;
use crate::table::converter::ValueConverter;
use crate::table::scanner::TableScanner;
use crate::table::scanner::DEFAULT_VALUE_ROW;
use crate::table::scanner::FIELD_NAME_ROW;
use crate::table::schema::TableSchema;
use serde::ser::SerializeMap;
use serde::Serialize;
use serde::Serializer;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Key of the record array in a data file
pub const CONTENT_KEY: &str = "Content";

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Invalid value at {reference} for field '{field}' in table '{table}': {source}")]
    CellValueError {
        table: String,
        field: String,
        reference: String,
        #[source]
        source: ConversionError,
    },

    #[error("Field '{field}' of table '{table}' has no flagged column")]
    MissingColumnError { table: String, field: String },
}

/// One data row: field values in declaration order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    values: Vec<(String, Value)>,
}

impl Record {
    pub fn push(&mut self, field: &str, value: Value) {
        self.values.push((field.to_owned(), value));
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.iter().find(|(name, _)| name == field).map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Records of one table in ascending row order
#[derive(Clone, Debug, PartialEq)]
pub struct TableData {
    pub table_name: String,
    pub records: Vec<Record>,
}

impl Serialize for TableData {
    /// Serializes as `{ "Content": [ ... ] }`, the data file layout.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(CONTENT_KEY, &self.records)?;
        map.end()
    }
}

/// Walks the flagged data rows of a sheet and converts them to records.
pub struct DataExtractor<'a> {
    converter: &'a ValueConverter,
}

impl<'a> DataExtractor<'a> {
    pub fn new(converter: &'a ValueConverter) -> Self {
        DataExtractor { converter }
    }

    /// Extracts the records of a sheet whose schema is `schema`.
    /// `None` means no data row is flagged.
    pub fn extract(&self, schema: &TableSchema, scanner: &TableScanner) -> Result<Option<TableData>, RustyConfigError> {
        let columns = self.field_columns(scanner)?;
        let rows = scanner.flagged_data_rows()?;
        if rows.is_empty() {
            debug!(table = schema.table_name.as_str(), "No output rows");
            return Ok(None);
        }

        let mut records = Vec::<Record>::with_capacity(rows.len());
        for row in rows {
            let mut record = Record::default();
            for field in &schema.fields {
                let column = columns.get(&field.name).ok_or_else(|| DataError::MissingColumnError {
                    table: schema.table_name.to_owned(),
                    field: field.name.to_owned(),
                })?;
                let (text, source_row) = match scanner.cell_at(column, row)? {
                    text if text.is_empty() => (scanner.cell_at(column, DEFAULT_VALUE_ROW)?, DEFAULT_VALUE_ROW),
                    text => (text, row),
                };
                let value = self.converter
                    .convert(&field.field_type, &text)
                    .map_err(|source| DataError::CellValueError {
                        table: schema.table_name.to_owned(),
                        field: field.name.to_owned(),
                        reference: format!("{column}{source_row}"),
                        source,
                    })?;
                record.push(&field.name, value);
            }
            records.push(record);
        }
        debug!(table = schema.table_name.as_str(), records = records.len(), "Extracted records");

        Ok(Some(TableData {
            table_name: schema.table_name.to_owned(),
            records,
        }))
    }

    /// Maps each flagged field name to its column label
    fn field_columns(&self, scanner: &TableScanner) -> Result<HashMap<String, String>, RustyConfigError> {
        let mut columns = HashMap::<String, String>::new();
        for column in scanner.flagged_columns()? {
            let name = scanner.cell_at(&column, FIELD_NAME_ROW)?;
            columns.entry(name).or_insert(column);
        }
        Ok(columns)
    }
}
