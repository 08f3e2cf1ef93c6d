use std::env;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use fourk_core::api::ApiClient;
use fourk_core::auth::Session;
use fourk_core::config::{resolve_dealers_path, DealerRoster, DEALERS_PATH_ENV};
use fourk_core::monitor::DealerMonitor;
use fourk_core::summary::{CatalogEntry, CatalogPage, StatusSummary};
use fourk_core::util::normalize_text_option;
use fourk_core::{Dealer, FileSetting, FileStatus};
use serde::Serialize;

use crate::auth::{session_for_profile, KeyringSessionStore};
use crate::config_profiles::{
    default_dealers_path, CliProfile, CliProfilesConfig, API_BASE_URL_ENV,
};
use crate::error::CliError;

/// Everything a networked command needs for one profile.
pub struct CommandContext {
    pub profile_name: String,
    pub profile: CliProfile,
    pub client: ApiClient,
    pub session: Session<KeyringSessionStore>,
}

#[derive(Debug, Serialize)]
pub struct DealerStatusItem {
    pub id: String,
    pub name: String,
    pub location: String,
    pub client_code: Option<String>,
    pub status: String,
    pub files: Vec<FileStatusItem>,
}

#[derive(Debug, Serialize)]
pub struct FileStatusItem {
    pub name: String,
    #[serde(rename = "type")]
    pub type_key: String,
    pub enabled: bool,
    pub status: FileStatus,
    pub last_sent: Option<DateTime<Utc>>,
}

pub fn load_profile(global_profile: Option<&str>) -> Result<(String, CliProfile), CliError> {
    let config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(global_profile);
    let profile = config.profile(&profile_name).cloned().unwrap_or_default();
    Ok((profile_name, profile))
}

pub fn load_context(global_profile: Option<&str>) -> Result<CommandContext, CliError> {
    let (profile_name, profile) = load_profile(global_profile)?;
    let base_url = resolve_api_base_url(env::var(API_BASE_URL_ENV).ok(), &profile)
        .ok_or(CliError::ApiNotConfigured)?;
    let client = ApiClient::new(&base_url)?;
    let session =
        session_for_profile(&profile_name).map_err(|error| CliError::Auth(error.to_string()))?;
    tracing::debug!("Using profile '{}' against {}", profile_name, client.base_url());

    Ok(CommandContext {
        profile_name,
        profile,
        client,
        session,
    })
}

/// `FOURK_API_BASE_URL` wins over the profile's `api_base_url`.
pub fn resolve_api_base_url(env_value: Option<String>, profile: &CliProfile) -> Option<String> {
    normalize_text_option(env_value).or_else(|| profile.api_base_url())
}

pub fn load_roster(
    dealers_flag: Option<PathBuf>,
    profile: &CliProfile,
) -> Result<DealerRoster, CliError> {
    let path = resolve_dealers_path(
        dealers_flag,
        env::var(DEALERS_PATH_ENV).ok(),
        profile.dealers_path(),
        default_dealers_path(),
    );
    match path {
        Some(path) => Ok(DealerRoster::load_or_builtin(&path)?),
        None => Ok(DealerRoster::builtin()),
    }
}

/// Fetch and reconcile `dealers`; Ctrl-C cancels the refresh.
pub async fn refresh_dealers(
    context: &CommandContext,
    dealers: &[Dealer],
) -> Result<Vec<Dealer>, CliError> {
    let monitor = DealerMonitor::new(context.client.clone(), context.session.clone());
    let token = monitor.cancellation_token();
    let interrupt = tokio::spawn(async move {
        tokio::select! {
            () = token.cancelled() => {}
            result = tokio::signal::ctrl_c() => {
                if result.is_ok() {
                    token.cancel();
                }
            }
        }
    });

    let refreshed = monitor.refresh(dealers).await;
    drop(monitor);
    interrupt.abort();
    Ok(refreshed?)
}

pub fn select_dealers(
    roster: &DealerRoster,
    dealer_key: Option<&str>,
) -> Result<Vec<Dealer>, CliError> {
    match normalize_text_option(dealer_key.map(str::to_string)) {
        Some(key) => roster
            .find(&key)
            .cloned()
            .map(|dealer| vec![dealer])
            .ok_or(CliError::DealerNotFound(key)),
        None => Ok(roster.dealers.clone()),
    }
}

pub fn dealer_to_status_item(dealer: &Dealer) -> DealerStatusItem {
    DealerStatusItem {
        id: dealer.id.clone(),
        name: dealer.name.clone(),
        location: dealer.location.clone(),
        client_code: dealer.client_code.clone(),
        status: dealer.status.to_string(),
        files: dealer
            .file_settings
            .iter()
            .map(|setting| FileStatusItem {
                name: setting.name.clone(),
                type_key: setting.type_key.clone(),
                enabled: setting.enabled,
                status: setting.status,
                last_sent: setting.last_sent,
            })
            .collect(),
    }
}

pub fn format_dealer_lines(dealers: &[Dealer], now: DateTime<Utc>) -> Vec<String> {
    let mut lines = Vec::new();
    for dealer in dealers {
        let code = dealer.client_code.as_deref().unwrap_or("-");
        lines.push(format!(
            "{} ({})  {}  [{}]",
            dealer.name, code, dealer.location, dealer.status
        ));
        lines.extend(
            dealer
                .file_settings
                .iter()
                .map(|setting| format_setting_line(setting, now)),
        );
    }
    lines
}

pub fn format_setting_line(setting: &FileSetting, now: DateTime<Utc>) -> String {
    let last_sent = setting.last_sent.map_or_else(
        || "never".to_string(),
        |last_sent| format_relative_time(last_sent, now),
    );
    format!(
        "  {:<12}  {:<9}  {}",
        setting.name,
        setting.status.as_str(),
        last_sent
    )
}

pub fn format_summary_lines(summary: &StatusSummary) -> Vec<String> {
    vec![
        format!("Total:     {}", summary.total),
        format!("Sent:      {}", summary.sent),
        format!("Generated: {}", summary.generated),
        format!("Error:     {}", summary.error),
    ]
}

pub fn format_catalog_lines(page: &CatalogPage, now: DateTime<Utc>) -> Vec<String> {
    let mut lines = page
        .entries
        .iter()
        .map(|entry| format_catalog_entry(entry, now))
        .collect::<Vec<_>>();
    lines.push(format!(
        "Page {}/{}  ({} files, {} shipped today, {:.2} GB)",
        page.page,
        page.total_pages.max(1),
        page.total_matches,
        page.shipped_today,
        page.total_size_gb
    ));
    lines
}

fn format_catalog_entry(entry: &CatalogEntry, now: DateTime<Utc>) -> String {
    let file = &entry.file;
    let name = file.file_name.as_deref().unwrap_or("(unnamed)");
    let shipped = file.shipment_datetime.map_or_else(
        || "-".to_string(),
        |shipped_at| format_relative_time(shipped_at, now),
    );
    let delivery = if file.sended { "sent" } else { "pending" };
    format!(
        "{:<10}  {:<10}  {:<40}  {:>9.2} MB  {:<8}  {}",
        entry.dealer_name, file.type_key, name, file.file_size_mb, delivery, shipped
    )
}

pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(timestamp).num_milliseconds();
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}
