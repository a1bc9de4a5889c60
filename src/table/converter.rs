//! Type-name keyed registry turning cell text into typed values.
//!
//! Every declared column type maps to one conversion function. Scalars parse
//! the text directly; `<scalar>[]` types split the text on `#` and convert each
//! segment with the scalar function. The schema extractor validates declared
//! types against the same registry, so adding an entry here is the only step
//! needed to support a new column type.

use serde::ser::SerializeSeq;
use serde::Serialize;
use serde::Serializer;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// Separator between the elements of an array cell
pub const ARRAY_SEPARATOR: char = '#';

#[derive(Error, Debug, PartialEq)]
pub enum ConversionError {
    #[error("Cannot convert '{text}' to {type_name}")]
    InvalidValueError { type_name: &'static str, text: String },

    #[error("Unknown value type '{0}'")]
    UnknownTypeError(String),
}

/// A converted cell value. Arrays are homogeneous by construction.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Array(Vec<Value>),
}

impl Value {
    /// Runtime type tag, spelled like the declared column type.
    pub fn type_name(&self) -> String {
        match self {
            Value::Short(_) => "short".to_owned(),
            Value::Int(_) => "int".to_owned(),
            Value::Long(_) => "long".to_owned(),
            Value::Float(_) => "float".to_owned(),
            Value::Double(_) => "double".to_owned(),
            Value::String(_) => "string".to_owned(),
            Value::Array(values) => {
                let element = values.first().map(Value::type_name).unwrap_or_else(|| "string".to_owned());
                format!("{element}[]")
            }
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Short(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Long(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Double(value) => write!(f, "{value}"),
            Value::String(value) => write!(f, "{value}"),
            Value::Array(values) => {
                for (index, value) in values.iter().enumerate() {
                    if index > 0 {
                        write!(f, "{ARRAY_SEPARATOR}")?;
                    }
                    write!(f, "{value}")?;
                }
                Ok(())
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Short(value) => serializer.serialize_i16(*value),
            Value::Int(value) => serializer.serialize_i32(*value),
            Value::Long(value) => serializer.serialize_i64(*value),
            Value::Float(value) => serializer.serialize_f32(*value),
            Value::Double(value) => serializer.serialize_f64(*value),
            Value::String(value) => serializer.serialize_str(value),
            Value::Array(values) => {
                let mut seq = serializer.serialize_seq(Some(values.len()))?;
                for value in values {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
        }
    }
}

/// Conversion function stored in the registry
pub type Converter = fn(&str) -> Result<Value, ConversionError>;

/// Registry of supported column types.
///
/// Built explicitly and handed to the pipeline, so pipelines with different
/// type vocabularies can coexist.
#[derive(Clone, Debug)]
pub struct ValueConverter {
    converters: BTreeMap<String, Converter>,
}

impl ValueConverter {
    /// An empty registry
    pub fn new() -> Self {
        ValueConverter {
            converters: BTreeMap::new(),
        }
    }

    /// The built-in scalar types and their array forms
    pub fn with_defaults() -> Self {
        let mut converter = ValueConverter::new();
        converter
            .register("short", to_short)
            .register("int", to_int)
            .register("long", to_long)
            .register("float", to_float)
            .register("double", to_double)
            .register("string", to_string)
            .register("short[]", to_short_array)
            .register("int[]", to_int_array)
            .register("long[]", to_long_array)
            .register("float[]", to_float_array)
            .register("double[]", to_double_array)
            .register("string[]", to_string_array);
        converter
    }

    /// Adds or replaces the converter for a type name
    pub fn register(&mut self, type_name: &str, converter: Converter) -> &mut Self {
        self.converters.insert(type_name.to_owned(), converter);
        self
    }

    pub fn is_valid_type(&self, type_name: &str) -> bool {
        self.converters.contains_key(type_name)
    }

    /// Registered type names in sorted order
    pub fn supported_types(&self) -> Vec<&str> {
        self.converters.keys().map(String::as_str).collect()
    }

    /// Converts `text` according to `type_name`
    pub fn convert(&self, type_name: &str, text: &str) -> Result<Value, ConversionError> {
        let converter = self.converters
            .get(type_name)
            .ok_or_else(|| ConversionError::UnknownTypeError(type_name.to_owned()))?;
        converter(text)
    }
}

impl Default for ValueConverter {
    fn default() -> Self {
        ValueConverter::with_defaults()
    }
}

/// Parses the text with surrounding whitespace removed
fn parse_trimmed<T: FromStr>(text: &str, type_name: &'static str) -> Result<T, ConversionError> {
    text.trim()
        .parse::<T>()
        .map_err(|_| ConversionError::InvalidValueError { type_name, text: text.to_owned() })
}

/// Parses trimmed floating point text; `NaN` and infinities have no JSON form and are rejected
fn parse_float<T: FromStr + Into<f64> + Copy>(text: &str, type_name: &'static str) -> Result<T, ConversionError> {
    let number = parse_trimmed::<T>(text, type_name)?;
    if !number.into().is_finite() {
        Err(ConversionError::InvalidValueError { type_name, text: text.to_owned() })?
    }
    Ok(number)
}

fn to_short(text: &str) -> Result<Value, ConversionError> {
    parse_trimmed(text, "short").map(Value::Short)
}

fn to_int(text: &str) -> Result<Value, ConversionError> {
    parse_trimmed(text, "int").map(Value::Int)
}

fn to_long(text: &str) -> Result<Value, ConversionError> {
    parse_trimmed(text, "long").map(Value::Long)
}

fn to_float(text: &str) -> Result<Value, ConversionError> {
    parse_float(text, "float").map(Value::Float)
}

fn to_double(text: &str) -> Result<Value, ConversionError> {
    parse_float(text, "double").map(Value::Double)
}

fn to_string(text: &str) -> Result<Value, ConversionError> {
    Ok(Value::String(text.to_owned()))
}

/// Splits on the separator and converts every segment. Empty text still yields
/// one element, so `""` as `string[]` is `[""]` and as `int[]` is an error.
fn to_array(text: &str, element: Converter) -> Result<Value, ConversionError> {
    text.split(ARRAY_SEPARATOR)
        .map(element)
        .collect::<Result<Vec<Value>, ConversionError>>()
        .map(Value::Array)
}

fn to_short_array(text: &str) -> Result<Value, ConversionError> {
    to_array(text, to_short)
}

fn to_int_array(text: &str) -> Result<Value, ConversionError> {
    to_array(text, to_int)
}

fn to_long_array(text: &str) -> Result<Value, ConversionError> {
    to_array(text, to_long)
}

fn to_float_array(text: &str) -> Result<Value, ConversionError> {
    to_array(text, to_float)
}

fn to_double_array(text: &str) -> Result<Value, ConversionError> {
    to_array(text, to_double)
}

fn to_string_array(text: &str) -> Result<Value, ConversionError> {
    to_array(text, to_string)
}
