//! Dashboard view models built from reconciled dealers.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Dealer, DealerFile, FileSetting, FileStatus};

/// Files shown per page in the cross-dealer file listing.
pub const FILES_PER_PAGE: usize = 6;

const MB_PER_GB: f64 = 1024.0;

/// Dashboard counters over every dealer's file settings.
///
/// `total` counts non-disabled settings, so `sent + generated + error == total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub total: usize,
    pub sent: usize,
    pub generated: usize,
    pub error: usize,
}

impl StatusSummary {
    pub fn from_settings<'a>(settings: impl IntoIterator<Item = &'a FileSetting>) -> Self {
        settings
            .into_iter()
            .fold(Self::default(), |mut summary, setting| {
                match setting.status {
                    FileStatus::Sent => summary.sent += 1,
                    FileStatus::Generated => summary.generated += 1,
                    FileStatus::Error => summary.error += 1,
                    FileStatus::Disabled => return summary,
                }
                summary.total += 1;
                summary
            })
    }

    pub fn from_dealers(dealers: &[Dealer]) -> Self {
        Self::from_settings(dealers.iter().flat_map(|dealer| &dealer.file_settings))
    }
}

/// A fetched record together with the dealer it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub dealer_id: String,
    pub dealer_name: String,
    pub client_code: Option<String>,
    #[serde(flatten)]
    pub file: DealerFile,
}

/// Filters for [`FileCatalog::query`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Case-insensitive substring of the file name
    pub search: String,
    /// Restrict to one dealer id; `None` means all dealers
    pub dealer_id: Option<String>,
    /// 1-based page number
    pub page: usize,
}

/// One page of the file listing plus totals over every matching record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogPage {
    pub entries: Vec<CatalogEntry>,
    pub page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
    pub shipped_today: usize,
    pub total_size_gb: f64,
}

/// Every fetched record across dealers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileCatalog {
    entries: Vec<CatalogEntry>,
}

impl FileCatalog {
    #[must_use]
    pub fn from_dealers(dealers: &[Dealer]) -> Self {
        let entries = dealers
            .iter()
            .flat_map(|dealer| {
                dealer.files.iter().map(move |file| CatalogEntry {
                    dealer_id: dealer.id.clone(),
                    dealer_name: dealer.name.clone(),
                    client_code: dealer.client_code.clone(),
                    file: file.clone(),
                })
            })
            .collect();
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn query(&self, query: &CatalogQuery, now: DateTime<Utc>) -> CatalogPage {
        let needle = query.search.trim().to_lowercase();
        let matching = self
            .entries
            .iter()
            .filter(|entry| matches_search(entry, &needle))
            .filter(|entry| {
                query
                    .dealer_id
                    .as_deref()
                    .map_or(true, |dealer_id| entry.dealer_id == dealer_id)
            })
            .collect::<Vec<_>>();

        let today = now.date_naive();
        let shipped_today = matching
            .iter()
            .filter(|entry| {
                entry
                    .file
                    .shipment_datetime
                    .is_some_and(|shipped_at| shipped_at.date_naive() == today)
            })
            .count();
        let total_size_mb = matching
            .iter()
            .map(|entry| entry.file.file_size_mb)
            .sum::<f64>();

        let page = query.page.max(1);
        let entries = matching
            .iter()
            .skip((page - 1).saturating_mul(FILES_PER_PAGE))
            .take(FILES_PER_PAGE)
            .map(|entry| (*entry).clone())
            .collect();

        CatalogPage {
            entries,
            page,
            total_pages: matching.len().div_ceil(FILES_PER_PAGE),
            total_matches: matching.len(),
            shipped_today,
            total_size_gb: total_size_mb / MB_PER_GB,
        }
    }
}

fn matches_search(entry: &CatalogEntry, needle: &str) -> bool {
    match entry.file.file_name.as_deref() {
        Some(name) => name.to_lowercase().contains(needle),
        None => needle.is_empty(),
    }
}
