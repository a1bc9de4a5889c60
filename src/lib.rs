//! # Spreadsheet Configuration Tables
//!
//! Turns spreadsheet configuration tables into typed data classes and JSON
//! data files. Every sheet of a workbook is one table laid out by a fixed
//! convention (see [`table`]); the header rows become a [`table::schema::TableSchema`]
//! and every flagged data row becomes a [`table::data::Record`].
//!
//! ## Features
//!
//! - **Office Open XML input**: `.xlsx` and `.xlsm` workbooks, read with
//!   `zip` and streaming `quick-xml` events
//! - **Strict validation**: table names, field names and declared types are
//!   checked before anything is written
//! - **Typed values**: `short`, `int`, `long`, `float`, `double`, `string`
//!   and their `#` separated array forms, extensible through
//!   [`table::converter::ValueConverter::register`]
//! - **Code generation**: C# and Go data classes ([`generator`])
//! - **Data files**: one `<TableName>.num` JSON file per table
//!
//! ## Example
//!
//! ```no_run
//! use rusty_config::pipeline::Pipeline;
//! use std::path::Path;
//!
//! let pipeline = Pipeline::default();
//! for schema in pipeline.collect_schemas(Path::new("tables/Item.xlsx"))? {
//!     println!("{} ({} fields)", schema.table_name, schema.fields.len());
//! }
//! # Ok::<(), rusty_config::error::RustyConfigError>(())
//! ```
pub mod config;
pub mod error;
pub mod generator;
mod helpers;
pub mod pipeline;
pub mod spreadsheet;
pub mod table;

pub use crate::config::Config;
pub use crate::error::RustyConfigError;
pub use crate::pipeline::Pipeline;
