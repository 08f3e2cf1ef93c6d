use std::path::Path;

use chrono::{Duration, TimeZone, Utc};
use clap::Parser;
use fourk_core::api::uploads::SendTarget;
use fourk_core::auth::{AccessLevel, Role, UserProfile};
use fourk_core::config::DealerRoster;
use fourk_core::summary::StatusSummary;
use fourk_core::{Dealer, FileSetting, FileStatus};
use pretty_assertions::assert_eq;

use crate::cli::{AuthCommands, Cli, Commands, CompletionShell, ConfigCommands, TransformFormat};
use crate::commands::auth_cmd::{format_permissions_line, format_user_lines};
use crate::commands::common::{
    dealer_to_status_item, format_dealer_lines, format_relative_time, format_setting_line,
    format_summary_lines, load_roster, resolve_api_base_url, select_dealers,
};
use crate::commands::completions::{render_completions, run_completions};
use crate::commands::config::{merge_profile, validate_profile_urls, ProfileUpdate};
use crate::commands::send::{upload_file_name, wants_processed_ids};
use crate::commands::transform::{run_transform, TransformOptions};
use crate::config_profiles::CliProfile;
use crate::error::CliError;

fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap()
}

fn reconciled_dealer() -> Dealer {
    let mut elips = FileSetting::new("ELIPS", "elips", true);
    elips.status = FileStatus::Sent;
    elips.last_sent = Some(now() - Duration::hours(3));
    let mut pmm = FileSetting::new("PMM", "pmm", true);
    pmm.status = FileStatus::Error;
    let seedz = FileSetting::new("Seedz", "seedz", false);

    let mut dealer = DealerRoster::builtin().dealers.remove(0);
    dealer.file_settings = vec![elips, pmm, seedz];
    dealer
}

fn profile(api_base_url: Option<&str>) -> CliProfile {
    CliProfile {
        api_base_url: api_base_url.map(str::to_string),
        dealers_path: None,
        app_name: None,
    }
}

#[test]
fn format_relative_time_units() {
    assert_eq!(format_relative_time(now() - Duration::seconds(30), now()), "just now");
    assert_eq!(format_relative_time(now() - Duration::minutes(2), now()), "2m ago");
    assert_eq!(format_relative_time(now() - Duration::hours(2), now()), "2h ago");
    assert_eq!(format_relative_time(now() - Duration::days(3), now()), "3d ago");
    assert_eq!(format_relative_time(now() - Duration::days(14), now()), "2w ago");
}

#[test]
fn format_relative_time_treats_future_as_just_now() {
    assert_eq!(format_relative_time(now() + Duration::hours(1), now()), "just now");
}

#[test]
fn format_setting_line_shows_status_and_last_sent() {
    let dealer = reconciled_dealer();
    assert_eq!(
        format_setting_line(&dealer.file_settings[0], now()),
        "  ELIPS         sent       3h ago"
    );
    assert_eq!(
        format_setting_line(&dealer.file_settings[2], now()),
        "  Seedz         disabled   never"
    );
}

#[test]
fn format_dealer_lines_has_header_per_dealer() {
    let lines = format_dealer_lines(&[reconciled_dealer()], now());
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "PR (PR)  Puerto Rico  [Active]");
    assert!(lines[2].contains("error"));
}

#[test]
fn dealer_status_item_serializes_lowercase_status() {
    let item = dealer_to_status_item(&reconciled_dealer());
    let json = serde_json::to_value(&item).unwrap();
    assert_eq!(json["files"][0]["status"], "sent");
    assert_eq!(json["files"][0]["type"], "elips");
    assert_eq!(json["files"][1]["last_sent"], serde_json::Value::Null);
}

#[test]
fn format_summary_lines_lists_counters() {
    let summary = StatusSummary::from_dealers(&[reconciled_dealer()]);
    assert_eq!(
        format_summary_lines(&summary),
        vec![
            "Total:     2".to_string(),
            "Sent:      1".to_string(),
            "Generated: 0".to_string(),
            "Error:     1".to_string(),
        ]
    );
}

#[test]
fn select_dealers_by_key_or_all() {
    let roster = DealerRoster::builtin();
    assert_eq!(select_dealers(&roster, None).unwrap().len(), 1);
    assert_eq!(select_dealers(&roster, Some("  ")).unwrap().len(), 1);
    assert_eq!(select_dealers(&roster, Some("pr")).unwrap()[0].id, "1");
    assert!(matches!(
        select_dealers(&roster, Some("nowhere")),
        Err(CliError::DealerNotFound(key)) if key == "nowhere"
    ));
}

#[test]
fn load_roster_prefers_flag_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dealers.json");
    std::fs::write(
        &path,
        r#"{"dealers":[{"id":"9","name":"Campo","client_code":"CMP","file_settings":[{"name":"ELIPS","type":"elips","enabled":true}]}]}"#,
    )
    .unwrap();

    let roster = load_roster(Some(path), &profile(None)).unwrap();
    assert_eq!(roster.dealers.len(), 1);
    assert_eq!(roster.dealers[0].name, "Campo");
}

#[test]
fn load_roster_falls_back_to_builtin_for_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let roster = load_roster(Some(dir.path().join("absent.json")), &profile(None)).unwrap();
    assert_eq!(roster, DealerRoster::builtin());
}

#[test]
fn resolve_api_base_url_prefers_env() {
    let configured = profile(Some("https://profile.example"));
    assert_eq!(
        resolve_api_base_url(Some("https://env.example".to_string()), &configured).as_deref(),
        Some("https://env.example")
    );
    assert_eq!(
        resolve_api_base_url(Some("  ".to_string()), &configured).as_deref(),
        Some("https://profile.example")
    );
    assert_eq!(resolve_api_base_url(None, &profile(None)), None);
}

#[test]
fn merge_profile_prefers_flags_then_env_then_existing() {
    let existing = CliProfile {
        api_base_url: Some("https://old.example".to_string()),
        dealers_path: Some("/srv/dealers.json".to_string()),
        app_name: Some("monitor".to_string()),
    };

    let merged = merge_profile(
        ProfileUpdate {
            api_base_url: Some("https://flag.example/".to_string()),
            ..ProfileUpdate::default()
        },
        Some("https://env.example".to_string()),
        &existing,
    );
    assert_eq!(merged.api_base_url.as_deref(), Some("https://flag.example"));
    assert_eq!(merged.dealers_path.as_deref(), Some("/srv/dealers.json"));
    assert_eq!(merged.app_name.as_deref(), Some("monitor"));

    let merged = merge_profile(
        ProfileUpdate::default(),
        Some("https://env.example".to_string()),
        &existing,
    );
    assert_eq!(merged.api_base_url.as_deref(), Some("https://env.example"));

    let merged = merge_profile(ProfileUpdate::default(), None, &existing);
    assert_eq!(merged.api_base_url.as_deref(), Some("https://old.example"));
}

#[test]
fn validate_profile_urls_requires_http_scheme() {
    assert!(validate_profile_urls(&profile(Some("https://api.example"))).is_ok());
    assert!(validate_profile_urls(&profile(None)).is_ok());
    assert!(matches!(
        validate_profile_urls(&profile(Some("api.example"))),
        Err(CliError::Config(_))
    ));
}

#[test]
fn cli_parses_send_target_and_global_profile() {
    let cli = Cli::try_parse_from([
        "fourk",
        "send",
        "--target",
        "seedz:orders",
        "report.txt",
        "--profile",
        "ops",
    ])
    .unwrap();
    assert_eq!(cli.profile.as_deref(), Some("ops"));
    match cli.command {
        Commands::Send {
            target,
            file,
            client_id,
            include_processed,
        } => {
            assert_eq!(target, SendTarget::Seedz("orders".to_string()));
            assert_eq!(file, Path::new("report.txt"));
            assert_eq!(client_id, None);
            assert!(!include_processed);
        }
        _ => panic!("expected send command"),
    }
}

#[test]
fn cli_rejects_unknown_send_target() {
    assert!(Cli::try_parse_from(["fourk", "send", "--target", "ftp", "report.txt"]).is_err());
}

#[test]
fn cli_parses_files_defaults() {
    let cli = Cli::try_parse_from(["fourk", "files", "-s", "ELIPS"]).unwrap();
    match cli.command {
        Commands::Files {
            search,
            dealer,
            page,
            json,
        } => {
            assert_eq!(search.as_deref(), Some("ELIPS"));
            assert_eq!(dealer, None);
            assert_eq!(page, 1);
            assert!(!json);
        }
        _ => panic!("expected files command"),
    }
}

#[test]
fn cli_parses_nested_config_and_auth_commands() {
    let cli = Cli::try_parse_from([
        "fourk",
        "config",
        "init",
        "--api-base-url",
        "https://api.example",
        "--no-activate",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Config {
            command: ConfigCommands::Init {
                no_activate: true,
                write_dealers: false,
                ..
            }
        }
    ));

    let cli = Cli::try_parse_from(["fourk", "auth", "access"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Auth {
            command: AuthCommands::Access { app: None }
        }
    ));
}

#[test]
fn wants_processed_ids_only_for_parts_data() {
    assert!(wants_processed_ids(&SendTarget::JohnDeerePartsData, true));
    assert!(!wants_processed_ids(&SendTarget::JohnDeerePartsData, false));
    assert!(!wants_processed_ids(&SendTarget::JohnDeerePmm, true));
}

#[test]
fn upload_file_name_uses_last_component() {
    assert_eq!(
        upload_file_name(Path::new("/tmp/out/parts_20250320.txt")).unwrap(),
        "parts_20250320.txt"
    );
    assert!(upload_file_name(Path::new("/")).is_err());
}

#[test]
fn format_user_lines_include_access_level() {
    let user = UserProfile {
        user_id: "7".to_string(),
        email: "ana@example.com".to_string(),
        client_id: Some("3".to_string()),
        client_name: Some("Agro PR".to_string()),
        dealer_name: None,
        role: Role::User,
        global_role: Role::User,
    };
    assert_eq!(
        format_user_lines("default", &user),
        vec![
            "Profile 'default' is signed in as ana@example.com (user)".to_string(),
            "Client: Agro PR".to_string(),
            "Permissions: view_orders, view_transfers, upload_files".to_string(),
        ]
    );
}

#[test]
fn format_permissions_line_for_no_access() {
    assert_eq!(format_permissions_line(AccessLevel::None), "Permissions: none");
}

fn transform_options(input: &Path, format: TransformFormat) -> TransformOptions<'_> {
    TransformOptions {
        input,
        headers: None,
        output: None,
        format,
        to_stdout: false,
    }
}

#[test]
fn run_transform_writes_xlsx_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("parts.txt");
    std::fs::write(&input, "part qty\nA1 3\nB2 5 extra\n").unwrap();

    let cli = Cli::try_parse_from(["fourk", "transform", "parts.txt"]).unwrap();
    let Commands::Transform { format, .. } = cli.command else {
        panic!("expected transform command");
    };
    run_transform(transform_options(&input, format)).unwrap();

    let written = std::fs::read(dir.path().join("parts_converted.xlsx")).unwrap();
    assert!(written.starts_with(b"PK"));
    assert!(!dir.path().join("parts_converted.csv").exists());
}

#[test]
fn run_transform_writes_converted_csv() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("parts.txt");
    std::fs::write(&input, "part qty\nA1 3\nB2 5 extra\n").unwrap();

    run_transform(transform_options(&input, TransformFormat::Csv)).unwrap();

    let output = std::fs::read_to_string(dir.path().join("parts_converted.csv")).unwrap();
    assert_eq!(output, "part,qty,extra_1\nA1,3,\nB2,5,extra\n");
}

#[test]
fn run_transform_keeps_blank_custom_headers() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("parts.txt");
    std::fs::write(&input, "A1 x 3\n").unwrap();

    let options = TransformOptions {
        headers: Some("part,,qty"),
        ..transform_options(&input, TransformFormat::Csv)
    };
    run_transform(options).unwrap();

    let output = std::fs::read_to_string(dir.path().join("parts_converted.csv")).unwrap();
    assert_eq!(output, "part,,qty\nA1,x,3\n");
}

#[test]
fn run_transform_rejects_empty_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.txt");
    std::fs::write(&input, "\n  \n").unwrap();

    assert!(matches!(
        run_transform(transform_options(&input, TransformFormat::Xlsx)),
        Err(CliError::Core(fourk_core::Error::Transform(_)))
    ));
    assert!(!dir.path().join("empty_converted.xlsx").exists());
}

#[test]
fn render_completions_mentions_binary_name() {
    let script = String::from_utf8(render_completions(CompletionShell::Bash)).unwrap();
    assert!(script.contains("fourk"));
}

#[test]
fn run_completions_writes_script_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fourk.fish");
    run_completions(CompletionShell::Fish, Some(&path)).unwrap();
    let script = std::fs::read_to_string(path).unwrap();
    assert!(script.contains("complete -c fourk"));
}
