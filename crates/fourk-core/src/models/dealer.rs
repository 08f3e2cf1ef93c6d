//! Dealer model

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{DealerFile, FileSetting};

/// Activity status of a dealer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DealerStatus {
    #[default]
    Active,
    Inactive,
}

impl fmt::Display for DealerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => f.write_str("Active"),
            Self::Inactive => f.write_str("Inactive"),
        }
    }
}

/// A partner organization whose file exchange is tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dealer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: String,
    /// External dealer code assigned by the partner
    #[serde(default)]
    pub dealer_code: Option<String>,
    /// Client code used in FourK API paths
    #[serde(default)]
    pub client_code: Option<String>,
    #[serde(default)]
    pub status: DealerStatus,
    #[serde(default)]
    pub server: Option<String>,
    #[serde(default)]
    pub db_architecture: Option<String>,
    #[serde(default)]
    pub sap_system: Option<String>,
    /// Fixed configuration, one entry per supported file type
    #[serde(default)]
    pub file_settings: Vec<FileSetting>,
    /// Log records from the latest fetch; replaced wholesale on every refresh
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<DealerFile>,
}

impl Dealer {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == DealerStatus::Active
    }

    #[must_use]
    pub fn has_enabled_settings(&self) -> bool {
        self.file_settings.iter().any(|setting| setting.enabled)
    }

    /// Type keys of the enabled settings, in configuration order.
    #[must_use]
    pub fn enabled_type_keys(&self) -> Vec<&str> {
        self.file_settings
            .iter()
            .filter(|setting| setting.enabled)
            .map(|setting| setting.type_key.as_str())
            .collect()
    }

    /// The client code to fetch logs with, when this dealer should be fetched.
    ///
    /// Inactive dealers, dealers with nothing enabled, and dealers without a
    /// client code are never fetched.
    #[must_use]
    pub fn fetch_client_code(&self) -> Option<&str> {
        if !self.is_active() || !self.has_enabled_settings() {
            return None;
        }
        self.client_code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }

    /// Return a copy carrying `files` in place of the previous fetch.
    #[must_use]
    pub fn with_files(&self, files: Vec<DealerFile>) -> Self {
        Self {
            files,
            ..self.clone()
        }
    }
}
