//! Tool settings, read from a TOML file and overridden from the command line.
//!
//! ```toml
//! excel_path = "tables"
//! code_namespace = "Game.Config"
//! code_output_path = "out/code"
//! data_output_path = "out/data"
//! languages = ["csharp", "go"]
//! id_field = "ID"
//! pattern = "*.xlsx"
//! ```

use crate::error::ResultMessage;
use crate::error::RustyConfigError;
use crate::generator::Language;
use crate::table::schema::is_valid_identifier;
use crate::table::schema::DEFAULT_ID_FIELD;
use serde::Deserialize;
use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Default glob for workbooks inside the input directory
pub const DEFAULT_PATTERN: &str = "*.xlsx";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid id field name '{0}'")]
    InvalidIdFieldError(String),

    #[error("Workbook pattern must not be empty")]
    EmptyPatternError,

    #[error("No target language selected")]
    NoLanguageError,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the workbooks
    pub excel_path: PathBuf,
    /// C# namespace or Go package of the generated code, empty for none
    pub code_namespace: String,
    pub code_output_path: PathBuf,
    pub data_output_path: PathBuf,
    pub languages: Vec<Language>,
    /// Reserved id field name every table declares
    pub id_field: String,
    /// Glob of the workbook file names
    pub pattern: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            excel_path: PathBuf::from("."),
            code_namespace: String::new(),
            code_output_path: PathBuf::from("code"),
            data_output_path: PathBuf::from("data"),
            languages: vec![Language::CSharp],
            id_field: DEFAULT_ID_FIELD.to_owned(),
            pattern: DEFAULT_PATTERN.to_owned(),
        }
    }
}

impl Config {
    /// Loads the settings file; keys missing from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Config, RustyConfigError> {
        let load = || -> Result<Config, RustyConfigError> {
            let content = std::fs::read_to_string(path)?;
            Config::parse(&content)
        };
        load().with_prefix(&format!("Load {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Config, RustyConfigError> {
        let config: Config = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RustyConfigError> {
        if !is_valid_identifier(&self.id_field) {
            Err(ConfigError::InvalidIdFieldError(self.id_field.to_owned()))?;
        }
        if self.pattern.trim().is_empty() {
            Err(ConfigError::EmptyPatternError)?;
        }
        if self.languages.is_empty() {
            Err(ConfigError::NoLanguageError)?;
        }
        Ok(())
    }

    /// Turns relative paths into paths under `base`
    pub fn resolve_paths(&mut self, base: &Path) {
        for path in [&mut self.excel_path, &mut self.code_output_path, &mut self.data_output_path] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}
