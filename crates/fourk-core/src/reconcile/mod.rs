//! File-status reconciliation.
//!
//! Merges a dealer's configured [`FileSetting`]s with the delivery records
//! fetched for it and classifies each file type as sent, generated, error or
//! disabled. Everything here is a pure function of its inputs and `now`.

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::models::{Dealer, DealerFile, FileSetting, FileStatus};

const DAILY_WINDOW_HOURS: i64 = 24;

/// Time range within which a record counts as current for status purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelevanceWindow {
    /// Shipped in the same calendar month (and year) as now.
    CalendarMonth,
    /// Shipped no later than now and at most this long ago, both bounds inclusive.
    Trailing(Duration),
}

impl RelevanceWindow {
    /// `pmm` files are monthly; every other type is expected daily.
    #[must_use]
    pub fn for_setting(setting: &FileSetting) -> Self {
        if setting.is_pmm() {
            Self::CalendarMonth
        } else {
            Self::Trailing(Duration::hours(DAILY_WINDOW_HOURS))
        }
    }

    #[must_use]
    pub fn contains(self, shipped_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            Self::CalendarMonth => {
                shipped_at.year() == now.year() && shipped_at.month() == now.month()
            }
            Self::Trailing(window) => {
                let age = now.signed_duration_since(shipped_at);
                age >= Duration::zero() && age <= window
            }
        }
    }
}

/// Classify one setting against every record fetched for its dealer.
///
/// Only records of the setting's own type with a shipment timestamp take
/// part. `last_sent` becomes the newest such timestamp, or keeps its previous
/// value when there is none. The status comes from the newest record inside
/// the relevance window.
#[must_use]
pub fn reconcile_setting(
    setting: &FileSetting,
    records: &[DealerFile],
    now: DateTime<Utc>,
) -> FileSetting {
    let window = RelevanceWindow::for_setting(setting);
    let mut most_recent: Option<DateTime<Utc>> = None;
    let mut relevant: Option<(DateTime<Utc>, &DealerFile)> = None;

    for record in records
        .iter()
        .filter(|record| record.type_key == setting.type_key)
    {
        let Some(shipped_at) = record.shipment_datetime else {
            continue;
        };

        // Strict comparisons keep the earliest record among equal timestamps.
        if most_recent.map_or(true, |current| shipped_at > current) {
            most_recent = Some(shipped_at);
        }
        if window.contains(shipped_at, now)
            && relevant.map_or(true, |(current, _)| shipped_at > current)
        {
            relevant = Some((shipped_at, record));
        }
    }

    let status = if !setting.enabled {
        FileStatus::Disabled
    } else {
        match relevant {
            Some((_, record)) if record.sended => FileStatus::Sent,
            Some(_) => FileStatus::Generated,
            None => FileStatus::Error,
        }
    };

    FileSetting {
        status,
        last_sent: most_recent.or(setting.last_sent),
        ..setting.clone()
    }
}

/// Reconcile every setting of `dealer` against its fetched `files`.
#[must_use]
pub fn reconcile_dealer(dealer: &Dealer, now: DateTime<Utc>) -> Dealer {
    let file_settings = dealer
        .file_settings
        .iter()
        .map(|setting| reconcile_setting(setting, &dealer.files, now))
        .collect();

    Dealer {
        file_settings,
        ..dealer.clone()
    }
}
