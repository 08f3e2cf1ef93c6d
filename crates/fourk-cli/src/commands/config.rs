use std::env;
use std::path::PathBuf;

use fourk_core::config::DealerRoster;
use fourk_core::util::{is_http_url, normalize_text_option};

use crate::cli::ConfigCommands;
use crate::config_profiles::{default_dealers_path, CliProfile, CliProfilesConfig, API_BASE_URL_ENV};
use crate::error::CliError;

pub fn run_config(command: ConfigCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Init {
            api_base_url,
            dealers_path,
            app_name,
            write_dealers,
            no_activate,
        } => run_config_init(
            global_profile,
            ProfileUpdate {
                api_base_url,
                dealers_path,
                app_name,
            },
            write_dealers,
            no_activate,
        ),
    }
}

/// Values given on the command line for `config init`.
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub api_base_url: Option<String>,
    pub dealers_path: Option<String>,
    pub app_name: Option<String>,
}

pub fn run_config_init(
    profile_name: Option<&str>,
    update: ProfileUpdate,
    write_dealers: bool,
    no_activate: bool,
) -> Result<(), CliError> {
    let mut config = CliProfilesConfig::load().map_err(CliError::Config)?;
    let profile_name = config.resolve_profile_name(profile_name);
    let existing_profile = config.profile(&profile_name).cloned().unwrap_or_default();

    let merged = merge_profile(
        update,
        env::var(API_BASE_URL_ENV).ok(),
        &existing_profile,
    );
    validate_profile_urls(&merged)?;
    *config.profile_mut_or_default(&profile_name) = merged.clone();

    if !no_activate {
        config.active_profile = Some(profile_name.clone());
    }

    let path = config.save().map_err(CliError::Config)?;
    println!(
        "Profile '{}' initialized at {}",
        profile_name,
        path.display()
    );

    if write_dealers {
        write_builtin_roster(&merged)?;
    }

    if merged.api_base_url().is_none() {
        println!("Profile '{profile_name}' is missing: api_base_url");
    } else {
        println!(
            "Profile '{profile_name}' is ready. Run `fourk auth login --email <email> --password <password>`."
        );
    }

    Ok(())
}

/// Flags win, then `FOURK_API_BASE_URL`, then the existing profile.
pub fn merge_profile(
    update: ProfileUpdate,
    env_api_base_url: Option<String>,
    existing: &CliProfile,
) -> CliProfile {
    CliProfile {
        api_base_url: normalize_text_option(update.api_base_url)
            .or_else(|| normalize_text_option(env_api_base_url))
            .or_else(|| existing.api_base_url())
            .map(|url| url.trim_end_matches('/').to_string()),
        dealers_path: normalize_text_option(update.dealers_path)
            .or_else(|| existing.dealers_path()),
        app_name: normalize_text_option(update.app_name).or_else(|| existing.app_name()),
    }
}

pub fn validate_profile_urls(profile: &CliProfile) -> Result<(), CliError> {
    if let Some(url) = profile.api_base_url() {
        if !is_http_url(&url) {
            return Err(CliError::Config(
                "api_base_url must include http:// or https://".to_string(),
            ));
        }
    }
    Ok(())
}

fn write_builtin_roster(profile: &CliProfile) -> Result<(), CliError> {
    let path = profile
        .dealers_path()
        .map(PathBuf::from)
        .or_else(default_dealers_path)
        .ok_or_else(|| CliError::Config("Failed to resolve dealer roster path".to_string()))?;

    if path.exists() {
        println!("Dealer roster already exists at {}", path.display());
        return Ok(());
    }

    DealerRoster::builtin().save(&path)?;
    println!("Wrote built-in dealer roster to {}", path.display());
    Ok(())
}
