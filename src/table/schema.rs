use crate::error::RustyConfigError;
use crate::table::converter::ValueConverter;
use crate::table::scanner::TableScanner;
use crate::table::scanner::FIELD_NAME_ROW;
use crate::table::scanner::FIELD_TYPE_ROW;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use tracing::warn;

/// Grammar shared by table and field names, matched at the start of the name
pub const IDENTIFIER_PATTERN: &str = "^[A-Z][A-Za-z0-9_]*";

/// Default name of the reserved id field
pub const DEFAULT_ID_FIELD: &str = "ID";

static IDENTIFIER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(IDENTIFIER_PATTERN).expect("Hardcode regex pattern"));

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Invalid table name '{0}', expected pattern {IDENTIFIER_PATTERN}")]
    InvalidTableName(String),

    #[error("Invalid field name '{field}' in table '{table}', expected pattern {IDENTIFIER_PATTERN}")]
    InvalidFieldName { table: String, field: String },

    #[error("Unsupported type '{field_type}' for field '{field}' in table '{table}', expected one of: {supported}")]
    UnsupportedType { table: String, field: String, field_type: String, supported: String },

    #[error("Table '{table}' must declare a field named '{id_field}' to hold the data id")]
    MissingIdField { table: String, id_field: String },

    #[error("Field '{field}' is declared more than once in table '{table}'")]
    DuplicateField { table: String, field: String },
}

/// One output column: its name and declared type
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "Type")]
    pub field_type: String,
}

/// The generated type of one sheet
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableSchema {
    pub table_name: String,
    pub id_field_type: String,
    /// Fields in column order, the id field included
    pub fields: Vec<FieldDescriptor>,
}

impl TableSchema {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// A name is valid when it starts with an uppercase letter; the rest is not checked
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER_REGEX.is_match(name)
}

/// Builds table schemas, validating names and types against one registry.
pub struct SchemaExtractor<'a> {
    converter: &'a ValueConverter,
    id_field: &'a str,
}

impl<'a> SchemaExtractor<'a> {
    pub fn new(converter: &'a ValueConverter, id_field: &'a str) -> Self {
        SchemaExtractor { converter, id_field }
    }

    /// Extracts the schema of a scanned sheet.
    /// `None` means the sheet has nothing to generate.
    pub fn extract(&self, scanner: &TableScanner) -> Result<Option<TableSchema>, RustyConfigError> {
        let columns = scanner.flagged_columns()?;
        if columns.is_empty() {
            debug!(sheet = scanner.sheet_name(), "No output columns, sheet skipped");
            return Ok(None);
        }

        let table_name = scanner.sheet_name().to_owned();
        if table_name.trim().is_empty() {
            warn!("A sheet has no name, skipped");
            return Ok(None);
        }
        if !is_valid_identifier(&table_name) {
            Err(SchemaError::InvalidTableName(table_name.to_owned()))?;
        }

        let mut id_field_type = None::<String>;
        let mut fields = Vec::<FieldDescriptor>::with_capacity(columns.len());
        for column in &columns {
            let name = scanner.cell_at(column, FIELD_NAME_ROW)?;
            if !is_valid_identifier(&name) {
                Err(SchemaError::InvalidFieldName { table: table_name.to_owned(), field: name.to_owned() })?;
            }
            let field_type = scanner.cell_at(column, FIELD_TYPE_ROW)?;
            if !self.converter.is_valid_type(&field_type) {
                Err(SchemaError::UnsupportedType {
                    table: table_name.to_owned(),
                    field: name.to_owned(),
                    field_type: field_type.to_owned(),
                    supported: self.converter.supported_types().join(", "),
                })?;
            }
            if fields.iter().any(|field| field.name == name) {
                Err(SchemaError::DuplicateField { table: table_name.to_owned(), field: name.to_owned() })?;
            }
            if name == self.id_field {
                id_field_type = Some(field_type.to_owned());
            }
            debug!(table = table_name.as_str(), column = column.as_str(), field = name.as_str(), field_type = field_type.as_str(), "Field");
            fields.push(FieldDescriptor { name, field_type });
        }

        if fields.is_empty() {
            return Ok(None);
        }
        let id_field_type = id_field_type.ok_or_else(|| SchemaError::MissingIdField {
            table: table_name.to_owned(),
            id_field: self.id_field.to_owned(),
        })?;

        Ok(Some(TableSchema {
            table_name,
            id_field_type,
            fields,
        }))
    }
}
