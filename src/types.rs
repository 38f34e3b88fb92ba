use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Comparison operator for a condition term
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TermOperator {
    Above,
    Below,
    Equal,
}

/// Severity a condition term fires at
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TermPriority {
    Critical,
    Warning,
}

impl Display for TermPriority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TermPriority::Critical => write!(f, "critical"),
            TermPriority::Warning => write!(f, "warning"),
        }
    }
}

/// Aggregation window behavior for a term
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeFunction {
    All,
    Any,
}

/// One threshold term of an alert condition
///
/// The REST API encodes `duration` and `threshold` as JSON strings
/// (`"duration": "5"`), hence the serde adapters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionTerm {
    #[serde(with = "string_encoded::int")]
    pub duration: i64,
    pub operator: TermOperator,
    pub priority: TermPriority,
    #[serde(with = "string_encoded::float")]
    pub threshold: f64,
    pub time_function: TimeFunction,
}

/// Serde adapters for numeric fields the API encodes as JSON strings.
///
/// Deserialization also accepts plain numbers, which some endpoints emit.
pub(crate) mod string_encoded {
    pub mod int {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&value.to_string())
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
            #[derive(Deserialize)]
            #[serde(untagged)]
            enum Raw {
                Int(i64),
                Str(String),
            }

            match Raw::deserialize(deserializer)? {
                Raw::Int(v) => Ok(v),
                Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
            }
        }
    }

    pub mod float {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&value.to_string())
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
            #[derive(Deserialize)]
            #[serde(untagged)]
            enum Raw {
                Float(f64),
                Str(String),
            }

            match Raw::deserialize(deserializer)? {
                Raw::Float(v) => Ok(v),
                Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
            }
        }
    }
}
