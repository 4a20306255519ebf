use serde::{Serialize, Deserialize};

use crate::error::{NnError, Result};

/// Storage type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Double,
    Float,
    Int,
}

impl FieldType {
    /// Parses the type names used when binding fields: `"double"`, `"float"`, `"int"`.
    pub fn parse(name: &str) -> Result<FieldType> {
        match name {
            "double" => Ok(FieldType::Double),
            "float" => Ok(FieldType::Float),
            "int" => Ok(FieldType::Int),
            other => Err(NnError::UnsupportedFieldType(other.to_string())),
        }
    }
}

/// One scalar value read from a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Numeric {
    Double(f64),
    Float(f32),
    Int(i32),
}

impl Numeric {
    pub fn field_type(&self) -> FieldType {
        match self {
            Numeric::Double(_) => FieldType::Double,
            Numeric::Float(_) => FieldType::Float,
            Numeric::Int(_) => FieldType::Int,
        }
    }

    pub fn as_double(&self) -> f64 {
        match *self {
            Numeric::Double(x) => x,
            Numeric::Float(x) => x as f64,
            Numeric::Int(x) => x as f64,
        }
    }

    /// Truncates toward zero; out-of-range floats saturate.
    pub fn as_int(&self) -> i32 {
        match *self {
            Numeric::Double(x) => x as i32,
            Numeric::Float(x) => x as i32,
            Numeric::Int(x) => x,
        }
    }
}
