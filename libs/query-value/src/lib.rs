mod error;

use serde::{Deserialize, Deserializer, Serialize};
use std::{convert::TryFrom, fmt};

pub use error::ConversionFailure;
pub type QueryValueResult<T> = std::result::Result<T, ConversionFailure>;
pub type QueryListValue = Vec<QueryValue>;

/// A scalar or list value carried by a filter condition and emitted as a
/// bound parameter by the dialect compilers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(QueryListValue),
}

impl TryFrom<serde_json::Value> for QueryValue {
    type Error = ConversionFailure;

    fn try_from(v: serde_json::Value) -> QueryValueResult<Self> {
        match v {
            serde_json::Value::Null => Ok(QueryValue::Null),
            serde_json::Value::Bool(b) => Ok(QueryValue::Boolean(b)),
            serde_json::Value::String(s) => Ok(QueryValue::String(s)),
            serde_json::Value::Number(num) => match num.as_i64() {
                Some(i) => Ok(QueryValue::Int(i)),
                None => num
                    .as_f64()
                    .map(QueryValue::Float)
                    .ok_or_else(|| ConversionFailure::new(num.to_string(), "QueryValue::Float")),
            },
            serde_json::Value::Array(values) => {
                let vals: QueryValueResult<Vec<QueryValue>> = values.into_iter().map(QueryValue::try_from).collect();
                Ok(QueryValue::List(vals?))
            }
            serde_json::Value::Object(obj) => Err(ConversionFailure::new(
                serde_json::Value::Object(obj).to_string(),
                "QueryValue",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for QueryValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let json = serde_json::Value::deserialize(deserializer)?;
        QueryValue::try_from(json).map_err(serde::de::Error::custom)
    }
}

impl QueryValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            QueryValue::Int(i) => Some(*i),
            QueryValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            QueryValue::Boolean(b) => Some(*b),
            QueryValue::String(s) if s.eq_ignore_ascii_case("true") || s == "1" => Some(true),
            QueryValue::String(s) if s.eq_ignore_ascii_case("false") || s == "0" => Some(false),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, QueryValue::Null)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, QueryValue::List(_))
    }

    pub fn into_list(self) -> Option<QueryListValue> {
        match self {
            QueryValue::List(l) => Some(l),
            _ => None,
        }
    }

    /// The textual form used when a value becomes part of a pattern
    /// (`LIKE`, regular expressions).
    pub fn to_text(&self) -> String {
        match self {
            QueryValue::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            QueryValue::Null => serde_json::Value::Null,
            QueryValue::Boolean(b) => serde_json::Value::Bool(*b),
            QueryValue::Int(i) => serde_json::Value::from(*i),
            QueryValue::Float(f) => serde_json::Value::from(*f),
            QueryValue::String(s) => serde_json::Value::String(s.clone()),
            QueryValue::List(l) => serde_json::Value::Array(l.iter().map(QueryValue::to_json).collect()),
        }
    }
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Null => "null".fmt(f),
            QueryValue::Boolean(x) => x.fmt(f),
            QueryValue::Int(x) => x.fmt(f),
            QueryValue::Float(x) => x.fmt(f),
            QueryValue::String(x) => x.fmt(f),
            QueryValue::List(_) => self.to_json().fmt(f),
        }
    }
}

/// Formats a parameter list for logging, `["tom", 1]`.
pub struct Params<'a>(pub &'a [QueryValue]);

impl fmt::Display for Params<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self.0.len();

        write!(f, "[")?;
        for (i, val) in self.0.iter().enumerate() {
            match val {
                QueryValue::String(s) => write!(f, "{s:?}")?,
                other => write!(f, "{other}")?,
            }

            if i < (len - 1) {
                write!(f, ",")?;
            }
        }
        write!(f, "]")
    }
}

impl From<&str> for QueryValue {
    fn from(s: &str) -> Self {
        QueryValue::from(s.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(s: String) -> Self {
        QueryValue::String(s)
    }
}

impl From<bool> for QueryValue {
    fn from(b: bool) -> Self {
        QueryValue::Boolean(b)
    }
}

impl From<i32> for QueryValue {
    fn from(i: i32) -> Self {
        QueryValue::Int(i64::from(i))
    }
}

impl From<i64> for QueryValue {
    fn from(i: i64) -> Self {
        QueryValue::Int(i)
    }
}

impl From<u64> for QueryValue {
    fn from(u: u64) -> Self {
        QueryValue::Int(u as i64)
    }
}

impl From<f64> for QueryValue {
    fn from(f: f64) -> Self {
        QueryValue::Float(f)
    }
}

impl<T> From<Vec<T>> for QueryValue
where
    T: Into<QueryValue>,
{
    fn from(values: Vec<T>) -> Self {
        QueryValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T> From<Option<T>> for QueryValue
where
    T: Into<QueryValue>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => QueryValue::Null,
        }
    }
}
