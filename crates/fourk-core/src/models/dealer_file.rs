//! Delivery log records fetched from `GET /dealers/{client}/logs/{type}`

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::util::parse_timestamp;

/// One row of delivery history for a dealer and file type.
///
/// Records are immutable once fetched and only live for the current refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealerFile {
    pub id: String,
    /// Type key the row was requested under
    #[serde(rename = "type")]
    pub type_key: String,
    pub shipment_type: Option<String>,
    pub shipment_datetime: Option<DateTime<Utc>>,
    pub data_start_datetime: Option<DateTime<Utc>>,
    pub data_end_datetime: Option<DateTime<Utc>>,
    pub file_name: Option<String>,
    pub file_size_mb: f64,
    /// Whether transmission to the external partner succeeded
    pub sended: bool,
}

impl DealerFile {
    /// Convert a wire row fetched for `type_key`.
    #[must_use]
    pub fn from_row(type_key: &str, row: LogRow) -> Self {
        Self {
            id: row.id.map(WireScalar::into_text).unwrap_or_default(),
            type_key: type_key.to_string(),
            shipment_type: row.shipment_type,
            shipment_datetime: row.shipment_datetime.as_deref().and_then(parse_timestamp),
            data_start_datetime: row.data_start_datetime.as_deref().and_then(parse_timestamp),
            data_end_datetime: row.data_end_datetime.as_deref().and_then(parse_timestamp),
            file_name: row.file_name,
            file_size_mb: row.file_size_mb.and_then(WireScalar::as_f64).unwrap_or(0.0),
            sended: row.sended.is_some_and(WireFlag::is_truthy),
        }
    }
}

/// Body of the logs endpoint. A missing or null `rows` means no records.
#[derive(Debug, Default, Deserialize)]
pub struct LogsResponse {
    #[serde(default)]
    pub rows: Option<Vec<LogRow>>,
}

impl LogsResponse {
    #[must_use]
    pub fn into_files(self, type_key: &str) -> Vec<DealerFile> {
        self.rows
            .unwrap_or_default()
            .into_iter()
            .map(|row| DealerFile::from_row(type_key, row))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogRow {
    #[serde(default)]
    pub id: Option<WireScalar>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub file_size_mb: Option<WireScalar>,
    #[serde(default)]
    pub sended: Option<WireFlag>,
    #[serde(default)]
    pub shipment_type: Option<String>,
    #[serde(default)]
    pub shipment_datetime: Option<String>,
    #[serde(default)]
    pub data_start_datetime: Option<String>,
    #[serde(default)]
    pub data_end_datetime: Option<String>,
}

/// A value the backend sends either as a JSON number or as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireScalar {
    Number(serde_json::Number),
    Text(String),
}

impl WireScalar {
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Number(number) => number.to_string(),
            Self::Text(text) => text,
        }
    }

    #[must_use]
    pub fn as_f64(self) -> Option<f64> {
        let value = match self {
            Self::Number(number) => number.as_f64(),
            Self::Text(text) => text.trim().parse::<f64>().ok(),
        };
        value.filter(|value| value.is_finite())
    }
}

impl fmt::Display for WireScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// A boolean the backend may encode as `true`, `1` or `"true"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WireFlag {
    Bool(bool),
    Number(i64),
    Text(#[serde(deserialize_with = "deserialize_text_flag")] bool),
}

impl WireFlag {
    #[must_use]
    pub const fn is_truthy(self) -> bool {
        match self {
            Self::Bool(value) | Self::Text(value) => value,
            Self::Number(value) => value != 0,
        }
    }
}

fn deserialize_text_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    ))
}
