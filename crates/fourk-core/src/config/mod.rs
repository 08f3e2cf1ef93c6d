//! Static dealer roster.
//!
//! Dealers and their file settings are fixed configuration read from a JSON
//! file. Derived fields (`status`, `last_sent`, `files`) may be absent and are
//! never written back by the monitor.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Dealer, DealerStatus, FileSetting};
use crate::util::normalize_text_option;

pub const DEALERS_PATH_ENV: &str = "FOURK_DEALERS_PATH";
pub const DEALERS_FILE_NAME: &str = "dealers.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DealerRoster {
    #[serde(default)]
    pub dealers: Vec<Dealer>,
}

impl DealerRoster {
    /// Roster used when no roster file exists yet.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            dealers: vec![Dealer {
                id: "1".to_string(),
                name: "PR".to_string(),
                location: "Puerto Rico".to_string(),
                dealer_code: None,
                client_code: Some("PR".to_string()),
                status: DealerStatus::Active,
                server: None,
                db_architecture: None,
                sap_system: None,
                file_settings: vec![
                    FileSetting::new("ELIPS", "elips", true),
                    FileSetting::new("PMM", "pmm", true),
                    FileSetting::new("Parts Data", "partsdata", true),
                    FileSetting::new("Seedz", "seedz", false),
                ],
                files: Vec::new(),
            }],
        }
    }

    /// Parse and validate a roster document.
    pub fn from_json(payload: &str) -> Result<Self> {
        let mut roster: Self = serde_json::from_str(payload)?;
        roster.normalize()?;
        Ok(roster)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let payload = std::fs::read_to_string(path)?;
        Self::from_json(&payload).map_err(|error| match error {
            Error::Serialization(error) => Error::Config(format!(
                "Invalid dealer roster {}: {error}",
                path.display()
            )),
            other => other,
        })
    }

    /// Load `path`, or the built-in roster when the file does not exist.
    pub fn load_or_builtin(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(
                "No dealer roster at {}, using built-in roster",
                path.display()
            );
            return Ok(Self::builtin());
        }
        Self::load_from_path(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(self)?;
        std::fs::write(path, payload)?;
        Ok(())
    }

    /// Look a dealer up by id, client code or name (case-insensitive).
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&Dealer> {
        let key = key.trim();
        self.dealers.iter().find(|dealer| {
            dealer.id == key
                || dealer
                    .client_code
                    .as_deref()
                    .is_some_and(|code| code.eq_ignore_ascii_case(key))
                || dealer.name.eq_ignore_ascii_case(key)
        })
    }

    fn normalize(&mut self) -> Result<()> {
        let mut seen = HashSet::new();
        for dealer in &mut self.dealers {
            dealer.id = dealer.id.trim().to_string();
            if dealer.id.is_empty() {
                return Err(Error::Config("Dealer id must not be empty".to_string()));
            }
            if !seen.insert(dealer.id.clone()) {
                return Err(Error::Config(format!("Duplicate dealer id '{}'", dealer.id)));
            }
            dealer.client_code = normalize_text_option(dealer.client_code.take());
            dealer.dealer_code = normalize_text_option(dealer.dealer_code.take());

            let mut types = HashSet::new();
            for setting in &mut dealer.file_settings {
                setting.type_key = setting.type_key.trim().to_ascii_lowercase();
                if setting.type_key.is_empty() {
                    return Err(Error::Config(format!(
                        "Dealer '{}' has a file setting without a type",
                        dealer.id
                    )));
                }
                if !types.insert(setting.type_key.clone()) {
                    return Err(Error::Config(format!(
                        "Dealer '{}' configures '{}' more than once",
                        dealer.id, setting.type_key
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Pick the roster path: explicit flag, then environment, then profile, then
/// the platform default.
#[must_use]
pub fn resolve_dealers_path(
    flag: Option<PathBuf>,
    env_value: Option<String>,
    profile_value: Option<String>,
    default_path: Option<PathBuf>,
) -> Option<PathBuf> {
    flag.or_else(|| normalize_text_option(env_value).map(PathBuf::from))
        .or_else(|| normalize_text_option(profile_value).map(PathBuf::from))
        .or(default_path)
}
