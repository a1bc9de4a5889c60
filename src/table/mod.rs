//! # Table Extraction
//!
//! One sheet is one table. The layout is fixed:
//!
//! | Row  | Meaning                          |
//! |------|----------------------------------|
//! | 1    | column output flag (`*`)         |
//! | 2    | field name                       |
//! | 3    | field type                       |
//! | 4    | comment, ignored                 |
//! | 5    | default value                    |
//! | 6..  | data, column `A` is the row flag |
//!
//! [`scanner::TableScanner`] finds the flagged columns and rows,
//! [`schema::SchemaExtractor`] validates the header rows into a [`schema::TableSchema`],
//! and [`data::DataExtractor`] converts every flagged row with the
//! [`converter::ValueConverter`] registry.
pub mod converter;
pub mod data;
pub mod resolver;
pub mod scanner;
pub mod schema;
