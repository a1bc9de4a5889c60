//! Workbook-level orchestration: one workbook at a time, one sheet at a time.

use crate::error::ResultMessage;
use crate::error::RustyConfigError;
use crate::generator::generator_for;
use crate::generator::Language;
use crate::spreadsheet::open_workbook;
use crate::spreadsheet::Workbook;
use crate::table::converter::ValueConverter;
use crate::table::data::DataExtractor;
use crate::table::data::TableData;
use crate::table::scanner::TableScanner;
use crate::table::schema::SchemaExtractor;
use crate::table::schema::TableSchema;
use crate::table::schema::DEFAULT_ID_FIELD;
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Extension of generated data files
pub const DATA_FILE_EXTENSION: &str = "num";

/// Everything extracted from one workbook
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkbookOutput {
    pub schemas: Vec<TableSchema>,
    /// Tables with at least one record
    pub data: Vec<TableData>,
}

/// Extraction settings shared by every workbook of a run.
pub struct Pipeline {
    converter: ValueConverter,
    id_field: String,
}

impl Default for Pipeline {
    fn default() -> Self {
        Pipeline::new(ValueConverter::with_defaults(), DEFAULT_ID_FIELD)
    }
}

impl Pipeline {
    pub fn new(converter: ValueConverter, id_field: &str) -> Self {
        Pipeline { converter, id_field: id_field.to_owned() }
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    /// Extracts schemas and records from every sheet of an open workbook.
    /// The first format or conversion error aborts the workbook.
    pub fn process(&self, workbook: &mut dyn Workbook) -> Result<WorkbookOutput, RustyConfigError> {
        let mut output = WorkbookOutput::default();
        if workbook.sheets().is_empty() {
            warn!(workbook = workbook.name(), "Workbook has no sheets");
            return Ok(output);
        }

        let schemas = SchemaExtractor::new(&self.converter, &self.id_field);
        let records = DataExtractor::new(&self.converter);
        for sheet in workbook.sheets().to_vec() {
            let worksheet = workbook.worksheet(&sheet.id)?;
            let scanner = TableScanner::new(&worksheet, workbook.shared_strings());
            let schema = match schemas.extract(&scanner)? {
                Some(schema) => schema,
                None => continue,
            };
            debug!(table = schema.table_name.as_str(), fields = schema.fields.len(), "Extracted schema");
            if let Some(data) = records.extract(&schema, &scanner)? {
                output.data.push(data);
            }
            output.schemas.push(schema);
        }
        Ok(output)
    }

    /// Opens the workbook at `path` and processes it; the file is closed on return.
    /// Errors, including a file that cannot be opened, are prefixed with the path.
    pub fn process_file(&self, path: &Path) -> Result<WorkbookOutput, RustyConfigError> {
        info!(workbook = %path.display(), "Processing workbook");
        let process = || -> Result<WorkbookOutput, RustyConfigError> {
            let mut workbook = open_workbook(path)?;
            self.process(workbook.as_mut())
        };
        process().with_prefix(&path.display().to_string())
    }

    pub fn collect_schemas(&self, path: &Path) -> Result<Vec<TableSchema>, RustyConfigError> {
        Ok(self.process_file(path)?.schemas)
    }

    pub fn collect_data(&self, path: &Path) -> Result<Vec<TableData>, RustyConfigError> {
        Ok(self.process_file(path)?.data)
    }

    /// Processes every workbook in the directory, in file name order.
    /// The first error aborts the run before anything is written.
    pub fn process_directory(&self, input: &Path, pattern: &str) -> Result<WorkbookOutput, RustyConfigError> {
        let mut output = WorkbookOutput::default();
        for path in workbook_paths(input, pattern)? {
            let workbook = self.process_file(&path)?;
            output.schemas.extend(workbook.schemas);
            output.data.extend(workbook.data);
        }
        Ok(output)
    }

    /// Writes the code files of `tables` for each language.
    pub fn write_code(
        &self,
        tables: &[TableSchema],
        languages: &[Language],
        namespace: &str,
        out_dir: &Path,
    ) -> Result<Vec<PathBuf>, RustyConfigError> {
        create_output_dir(out_dir)?;
        let mut paths = Vec::<PathBuf>::new();
        for language in languages {
            let generator = generator_for(*language, &self.id_field);
            paths.extend(generator.generate(namespace, tables, out_dir)?);
            info!(language = %language, tables = tables.len(), "Generated code");
        }
        Ok(paths)
    }

    /// Processes every workbook in the directory, then writes the code files.
    pub fn generate_code(
        &self,
        input: &Path,
        pattern: &str,
        languages: &[Language],
        namespace: &str,
        out_dir: &Path,
    ) -> Result<Vec<PathBuf>, RustyConfigError> {
        let output = self.process_directory(input, pattern)?;
        self.write_code(&output.schemas, languages, namespace, out_dir)
    }

    /// Processes every workbook in the directory, then writes one data file per table.
    pub fn generate_data(&self, input: &Path, pattern: &str, out_dir: &Path) -> Result<Vec<PathBuf>, RustyConfigError> {
        let output = self.process_directory(input, pattern)?;
        write_data_files(out_dir, &output.data)
    }
}

/// Workbook files in `dir` matching `pattern`, in sorted order.
/// Office lock files (`~$Item.xlsx`) are skipped.
pub fn workbook_paths(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, RustyConfigError> {
    let pattern = dir.join(pattern);
    let mut paths = Vec::<PathBuf>::new();
    for entry in glob::glob(&pattern.to_string_lossy())? {
        let path = entry?;
        let is_lock_file = path.file_name()
            .map(|name| name.to_string_lossy().starts_with("~$"))
            .unwrap_or(false);
        if path.is_file() && !is_lock_file {
            paths.push(path);
        }
    }
    paths.sort();
    if paths.is_empty() {
        warn!(pattern = %pattern.display(), "No workbook found");
    }
    Ok(paths)
}

fn create_output_dir(out_dir: &Path) -> Result<(), RustyConfigError> {
    let create = || -> Result<(), RustyConfigError> {
        std::fs::create_dir_all(out_dir)?;
        Ok(())
    };
    create().with_prefix(&format!("Create {}", out_dir.display()))
}

/// Writes one data file per table into `out_dir`, creating the directory if needed.
pub fn write_data_files(out_dir: &Path, tables: &[TableData]) -> Result<Vec<PathBuf>, RustyConfigError> {
    create_output_dir(out_dir)?;
    tables.iter().map(|data| write_data_file(out_dir, data)).collect()
}

/// Writes `<TableName>.num` as indented JSON, replacing any previous file.
pub fn write_data_file(out_dir: &Path, data: &TableData) -> Result<PathBuf, RustyConfigError> {
    let path = out_dir.join(format!("{}.{DATA_FILE_EXTENSION}", data.table_name));
    let write = || -> Result<(), RustyConfigError> {
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, data)?;
        writer.flush()?;
        Ok(())
    };
    write().with_prefix(&format!("Write {}", path.display()))?;
    info!(file = %path.display(), records = data.records.len(), "Generated data");
    Ok(path)
}
