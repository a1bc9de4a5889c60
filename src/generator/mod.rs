//! # Code Generation
//!
//! Emits data classes for the extracted table schemas. Each language writes a
//! shared base declaration plus one source file per table; every file is
//! truncated and recreated on each run.
pub mod csharp;
pub mod go;

use crate::error::ResultMessage;
use crate::error::RustyConfigError;
use crate::table::schema::TableSchema;
use clap::ValueEnum;
use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use tracing::info;

/// Spaces per indentation level
const INDENT_WIDTH: usize = 4;

/// Target languages of the code generators
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[value(name = "csharp")]
    CSharp,
    Go,
}

impl Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::CSharp => write!(f, "csharp"),
            Language::Go => write!(f, "go"),
        }
    }
}

pub trait CodeGenerator {
    fn language(&self) -> Language;

    /// Writes the source files for `tables` into `out_dir` and returns their paths.
    /// An empty `namespace` means no namespace (C#) or the default package (Go).
    fn generate(&self, namespace: &str, tables: &[TableSchema], out_dir: &Path) -> Result<Vec<PathBuf>, RustyConfigError>;
}

/// Creates the generator of a language.
/// `id_field` is the reserved id field name declared by every table.
pub fn generator_for(language: Language, id_field: &str) -> Box<dyn CodeGenerator> {
    match language {
        Language::CSharp => Box::new(csharp::CSharpGenerator::new(id_field)),
        Language::Go => Box::new(go::GoGenerator::new(id_field)),
    }
}

/// Line buffer with block indentation.
#[derive(Debug, Default)]
pub(crate) struct SourceWriter {
    buffer: String,
    level: usize,
}

impl SourceWriter {
    pub(crate) fn new() -> Self {
        SourceWriter::default()
    }

    /// Appends one line at the current level; an empty line carries no indentation
    pub(crate) fn line(&mut self, text: &str) -> &mut Self {
        if !text.is_empty() {
            self.buffer.push_str(&" ".repeat(self.level * INDENT_WIDTH));
            self.buffer.push_str(text);
        }
        self.buffer.push('\n');
        self
    }

    pub(crate) fn blank(&mut self) -> &mut Self {
        self.line("")
    }

    /// Writes the opening line of a block and indents
    pub(crate) fn open(&mut self, opener: &str) -> &mut Self {
        self.line(opener);
        self.level += 1;
        self
    }

    /// Dedents and writes the block closer
    pub(crate) fn close(&mut self, closer: &str) -> &mut Self {
        self.level = self.level.saturating_sub(1);
        self.line(closer)
    }

    pub(crate) fn finish(self) -> String {
        self.buffer
    }
}

/// Writes one generated file, replacing any previous content.
pub(crate) fn write_source(out_dir: &Path, file_name: &str, content: &str) -> Result<PathBuf, RustyConfigError> {
    let path = out_dir.join(file_name);
    let write = || -> Result<(), RustyConfigError> {
        let mut file = File::create(&path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    };
    write().with_prefix(&format!("Write {}", path.display()))?;
    info!(file = %path.display(), "Generated source");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn nested_blocks() {
        let mut writer = SourceWriter::new();
        writer.line("namespace Game").open("{");
        writer.line("public class A").open("{").line("public int X;").close("}");
        writer.blank();
        writer.open("type B struct {").line("X int32").close("}");
        writer.close("}");
        assert_eq!(
            writer.finish(),
            "namespace Game\n{\n    public class A\n    {\n        public int X;\n    }\n\n    type B struct {\n        X int32\n    }\n}\n"
        );
    }

    #[test]
    fn language_names() {
        assert_eq!(Language::CSharp.to_string(), "csharp");
        assert_eq!(Language::from_str("go", true).unwrap(), Language::Go);
        assert_eq!(Language::from_str("csharp", true).unwrap(), Language::CSharp);
    }

    #[test]
    fn generator_dispatch() {
        assert_eq!(generator_for(Language::CSharp, "ID").language(), Language::CSharp);
        assert_eq!(generator_for(Language::Go, "ID").language(), Language::Go);
    }

    #[test]
    fn write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        write_source(dir.path(), "A.cs", "first version\n").unwrap();
        let path = write_source(dir.path(), "A.cs", "second\n").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "second\n");
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let error = write_source(&dir.path().join("missing"), "A.cs", "").unwrap_err();
        assert!(error.to_string().starts_with("Write "));
    }
}
