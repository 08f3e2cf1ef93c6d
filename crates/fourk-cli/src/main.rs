//! fourk - Command-line monitor for dealer file exchange
//!
//! Fetches delivery logs from the FourK API and shows which files each dealer
//! has sent to John Deere and Seedz.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;

#[cfg(test)]
mod tests;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::auth_cmd::run_auth;
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::files::{run_files, FilesOptions};
use crate::commands::send::{run_send, SendOptions};
use crate::commands::status::run_status;
use crate::commands::summary::run_summary;
use crate::commands::transform::{run_transform, TransformOptions};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "fourk=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let profile = cli.profile.as_deref();

    match cli.command {
        Commands::Status { dealer, json } => {
            run_status(dealer.as_deref(), json, profile, cli.dealers).await?;
        }
        Commands::Summary { json } => run_summary(json, profile, cli.dealers).await?,
        Commands::Files {
            search,
            dealer,
            page,
            json,
        } => {
            let options = FilesOptions {
                search: search.as_deref(),
                dealer: dealer.as_deref(),
                page,
                as_json: json,
            };
            run_files(options, profile, cli.dealers).await?;
        }
        Commands::Send {
            target,
            file,
            client_id,
            include_processed,
        } => {
            let options = SendOptions {
                target: &target,
                file: &file,
                client_id,
                include_processed,
            };
            run_send(options, profile).await?;
        }
        Commands::Transform {
            input,
            headers,
            output,
            format,
            stdout,
        } => {
            let options = TransformOptions {
                input: &input,
                headers: headers.as_deref(),
                output: output.as_deref(),
                format,
                to_stdout: stdout,
            };
            run_transform(options)?;
        }
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
        Commands::Config { command } => run_config(command, profile)?,
        Commands::Auth { command } => run_auth(command, profile).await?,
    }

    Ok(())
}
