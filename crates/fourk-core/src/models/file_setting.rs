//! Per-dealer file-type configuration and its derived status

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Type key of the monthly parts-management file.
pub const PMM_TYPE: &str = "pmm";

/// Display status of one file type for one dealer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// A relevant record exists and was delivered to the partner
    Sent,
    /// A relevant record exists but was not delivered
    Generated,
    /// Enabled, but nothing relevant was recorded
    Error,
    /// The dealer is not configured to send this type
    #[default]
    Disabled,
}

impl FileStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Generated => "generated",
            Self::Error => "error",
            Self::Disabled => "disabled",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sent" => Ok(Self::Sent),
            "generated" => Ok(Self::Generated),
            "error" => Ok(Self::Error),
            "disabled" => Ok(Self::Disabled),
            other => Err(format!("unknown file status '{other}'")),
        }
    }
}

/// One supported exchange type (ELIPS, PMM, Parts Data, Seedz...) for a dealer.
///
/// `status` and `last_sent` are derived by reconciliation and are optional in
/// roster files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSetting {
    /// Display name, e.g. "Parts Data"
    pub name: String,
    /// Lowercase key matched against log records, e.g. "partsdata"
    #[serde(rename = "type")]
    pub type_key: String,
    /// Whether this dealer is configured to send this type
    pub enabled: bool,
    #[serde(default)]
    pub status: FileStatus,
    #[serde(default)]
    pub last_sent: Option<DateTime<Utc>>,
}

impl FileSetting {
    #[must_use]
    pub fn new(name: impl Into<String>, type_key: impl Into<String>, enabled: bool) -> Self {
        Self {
            name: name.into(),
            type_key: type_key.into().trim().to_ascii_lowercase(),
            enabled,
            status: FileStatus::default(),
            last_sent: None,
        }
    }

    /// Whether this setting uses the calendar-month relevance window.
    #[must_use]
    pub fn is_pmm(&self) -> bool {
        self.type_key == PMM_TYPE
    }
}
