pub mod binary;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Course identifier as it appears in the dataset. Codes are opaque and are not
/// guaranteed to be unique.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum CourseCode {
    Int(i64),
    Text(String),
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourseCode::Int(n) => write!(f, "{n}"),
            CourseCode::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CourseCode {
    fn from(value: i64) -> Self {
        CourseCode::Int(value)
    }
}

impl From<&str> for CourseCode {
    fn from(value: &str) -> Self {
        CourseCode::Text(value.to_string())
    }
}

impl CourseCode {
    /// Parses user input the way a code is written in the dataset: digits become
    /// an integer code, anything else stays text.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        match trimmed.parse::<i64>() {
            Ok(n) => CourseCode::Int(n),
            Err(_) => CourseCode::Text(trimmed.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CourseRecord {
    #[serde(rename = "codigo", alias = "code")]
    pub code: CourseCode,
    #[serde(rename = "nombre", alias = "name")]
    pub name: String,
    #[serde(rename = "horas", alias = "duration_hours", alias = "hours")]
    pub duration_hours: f64,
    #[serde(rename = "costo", alias = "cost")]
    pub cost: f64,
}

impl CourseRecord {
    pub fn new(code: impl Into<CourseCode>, name: &str, duration_hours: f64, cost: f64) -> Self {
        Self {
            code: code.into(),
            name: name.to_string(),
            duration_hours,
            cost,
        }
    }

    /// `[code] name`, the label used in KPI tie lists.
    pub fn label(&self) -> String {
        format!("[{}] {}", self.code, self.name)
    }

    /// Checks the numeric invariants of a loaded record.
    pub fn validate(&self) -> Result<(), String> {
        if !self.duration_hours.is_finite() || self.duration_hours < 0.0 {
            return Err(format!(
                "course {} has invalid duration {}",
                self.code, self.duration_hours
            ));
        }
        if !self.cost.is_finite() || self.cost < 0.0 {
            return Err(format!("course {} has invalid cost {}", self.code, self.cost));
        }
        Ok(())
    }
}

/// Parses the JSON catalog document. A top-level value that is not an array is an
/// empty catalog; an array holding a malformed entry is an error.
pub fn parse_json_catalog(bytes: &[u8]) -> Result<Vec<CourseRecord>, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    if !value.is_array() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value)
}
