//! Column types as reported by the schema oracle.

use serde::{Deserialize, Serialize};

/// Declared type of a column.
///
/// Engines report types as integer codes; [`SeriesType::from_code`] is the
/// only place those codes are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesType {
    String,
    Double,
    Int,
    Boolean,
}

impl SeriesType {
    pub const STRING_CODE: i32 = 0;
    pub const DOUBLE_CODE: i32 = 1;
    pub const INT_CODE: i32 = 2;
    pub const BOOLEAN_CODE: i32 = 3;

    /// Interpret an engine type code. Unrecognized codes yield `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            Self::STRING_CODE => Some(SeriesType::String),
            Self::DOUBLE_CODE => Some(SeriesType::Double),
            Self::INT_CODE => Some(SeriesType::Int),
            Self::BOOLEAN_CODE => Some(SeriesType::Boolean),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            SeriesType::String => Self::STRING_CODE,
            SeriesType::Double => Self::DOUBLE_CODE,
            SeriesType::Int => Self::INT_CODE,
            SeriesType::Boolean => Self::BOOLEAN_CODE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SeriesType::String => "string",
            SeriesType::Double => "double",
            SeriesType::Int => "int",
            SeriesType::Boolean => "boolean",
        }
    }
}

/// Schema entry of one column of a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub series_type: SeriesType,
    /// Whether the engine accepts writes to this column
    pub writable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for ty in [
            SeriesType::String,
            SeriesType::Double,
            SeriesType::Int,
            SeriesType::Boolean,
        ] {
            assert_eq!(SeriesType::from_code(ty.code()), Some(ty));
        }
    }

    #[test]
    fn unknown_codes_are_not_guessed() {
        assert_eq!(SeriesType::from_code(-1), None);
        assert_eq!(SeriesType::from_code(4), None);
    }
}
