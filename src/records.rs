use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

/// One row of a flat hierarchy dataset, as authored by hand or exported.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct FlatRecord {
    pub name: String,
    pub level: i64,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
}

impl FlatRecord {
    pub fn new(name: impl Into<String>, level: i64) -> Self {
        Self {
            name: name.into(),
            level,
            parent: None,
            source: None,
            value: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn weight(&self) -> f64 {
        weight_of(self.value)
    }
}

/// Weight used for display; missing, non-finite or non-positive values count as 1.
pub fn weight_of(value: Option<f64>) -> f64 {
    match value {
        Some(value) if value.is_finite() && value > 0.0 => value,
        _ => 1.0,
    }
}

/// Accepts either a bare JSON array of records or an object with a `records` array.
pub fn parse_records(raw: &str) -> Result<Vec<FlatRecord>> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in record file")?;

    let list = match parsed {
        Value::Array(_) => parsed,
        Value::Object(mut object) => object
            .remove("records")
            .ok_or_else(|| anyhow!("record file object has no \"records\" array"))?,
        _ => return Err(anyhow!("record file must be a JSON array or object")),
    };

    let records: Vec<FlatRecord> =
        serde_json::from_value(list).context("invalid record entry in JSON")?;

    if records.is_empty() {
        Err(anyhow!("record file contains no records"))
    } else {
        Ok(records)
    }
}

pub fn load_records(path: &Path) -> Result<Vec<FlatRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read record file {}", path.display()))?;
    parse_records(&raw).with_context(|| format!("failed to parse {}", path.display()))
}
