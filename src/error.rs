use thiserror::Error;

/// Main error type for the configuration table converter.
/// Aggregates errors from the standard library, dependencies, and internal modules.
#[derive(Error, Debug)]
pub enum RustyConfigError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("{0}")]
    StringEncodingError(#[from] std::str::Utf8Error),

    // Third-party library errors
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{0}")]
    PatternError(#[from] glob::PatternError),

    #[error("{0}")]
    GlobError(#[from] glob::GlobError),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Spreadsheet module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    // Table module errors
    #[error("{0}")]
    SchemaError(#[from] crate::table::schema::SchemaError),

    #[error("{0}")]
    ConversionError(#[from] crate::table::converter::ConversionError),

    #[error("{0}")]
    DataError(#[from] crate::table::data::DataError),

    // Configuration errors
    #[error("{0}")]
    ConfigError(#[from] crate::config::ConfigError),
}

pub trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, RustyConfigError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| RustyConfigError::WithContextError(format!("{}: {}", message, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_prefix_wraps_message() {
        let result: Result<(), RustyConfigError> = Err(std::io::Error::other("disk full").into());
        let error = result.with_prefix("Write Item.num failed").unwrap_err();
        assert_eq!(error.to_string(), "Write Item.num failed: disk full");
    }

    #[test]
    fn with_prefix_keeps_ok() {
        let result: Result<u8, RustyConfigError> = Ok(7);
        assert_eq!(result.with_prefix("unused").unwrap(), 7);
    }
}
