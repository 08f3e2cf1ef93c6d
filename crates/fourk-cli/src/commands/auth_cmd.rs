use fourk_core::auth::{AccessLevel, UserProfile};

use crate::auth::session_for_profile;
use crate::cli::AuthCommands;
use crate::commands::common::{load_context, load_profile};
use crate::error::CliError;

pub async fn run_auth(command: AuthCommands, global_profile: Option<&str>) -> Result<(), CliError> {
    match command {
        AuthCommands::Login { email, password } => {
            let context = load_context(global_profile)?;
            context
                .client
                .login(&context.session, &email, &password)
                .await?;
            let user = context.client.current_user(&context.session).await?;
            println!(
                "Signed in profile '{}' as {}",
                context.profile_name, user.email
            );
            Ok(())
        }
        AuthCommands::Status => {
            let context = load_context(global_profile)?;
            let profile_name = context.profile_name.as_str();
            match context.client.restore_user(&context.session).await? {
                Some(user) => {
                    for line in format_user_lines(profile_name, &user) {
                        println!("{line}");
                    }
                }
                None => println!("Profile '{profile_name}' is not signed in."),
            }
            Ok(())
        }
        AuthCommands::Logout => run_logout(global_profile),
        AuthCommands::Access { app } => {
            let context = load_context(global_profile)?;
            let profile_name = context.profile_name.as_str();
            let app = app
                .or_else(|| context.profile.app_name())
                .ok_or_else(|| {
                    CliError::Config(format!(
                        "No app name given. Pass one or run `fourk config init --profile {profile_name} --app-name <NAME>`."
                    ))
                })?;
            if !context.session.is_authenticated() {
                return Err(CliError::NotSignedIn);
            }

            if context.client.check_app_access(&context.session, &app).await {
                println!("Profile '{profile_name}' has access to '{app}'");
            } else {
                println!("Profile '{profile_name}' has no access to '{app}'");
            }
            Ok(())
        }
    }
}

/// Logout only clears the keychain entry, so it needs no API profile.
fn run_logout(global_profile: Option<&str>) -> Result<(), CliError> {
    let (profile_name, _) = load_profile(global_profile)?;
    session_for_profile(&profile_name)
        .and_then(|session| session.clear())
        .map_err(|error| CliError::Auth(error.to_string()))?;
    println!("Signed out profile '{profile_name}'");
    Ok(())
}

pub fn format_user_lines(profile_name: &str, user: &UserProfile) -> Vec<String> {
    let level = user.access_level();
    let mut lines = vec![format!(
        "Profile '{}' is signed in as {} ({})",
        profile_name, user.email, level
    )];
    if let Some(client) = user.client_name.as_deref() {
        lines.push(format!("Client: {client}"));
    }
    if let Some(dealer) = user.dealer_name.as_deref() {
        lines.push(format!("Dealer: {dealer}"));
    }
    lines.push(format_permissions_line(level));
    lines
}

pub fn format_permissions_line(level: AccessLevel) -> String {
    let permissions = level.permissions();
    if permissions.is_empty() {
        return "Permissions: none".to_string();
    }
    let names = permissions
        .iter()
        .map(|permission| permission.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!("Permissions: {names}")
}
