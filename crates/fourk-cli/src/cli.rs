use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use fourk_core::api::uploads::SendTarget;

#[derive(Parser)]
#[command(name = "fourk")]
#[command(about = "Monitor dealer file exchange with John Deere and Seedz")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// CLI profile name for API and roster configuration
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Path to the dealer roster JSON file
    #[arg(long, global = true, value_name = "PATH")]
    pub dealers: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch delivery logs and show per-dealer file status
    Status {
        /// Only show this dealer (id, client code or name)
        #[arg(long, value_name = "DEALER")]
        dealer: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show sent / generated / error counters across all dealers
    Summary {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List fetched files across dealers
    Files {
        /// Case-insensitive file name filter
        #[arg(short, long)]
        search: Option<String>,
        /// Only show files of this dealer (id, client code or name)
        #[arg(long, value_name = "DEALER")]
        dealer: Option<String>,
        /// Page number, starting at 1
        #[arg(short, long, default_value = "1")]
        page: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Send a file to John Deere or Seedz
    Send {
        /// Target: pmm, partsdata, elips or seedz:<file type>
        #[arg(long, value_name = "TARGET")]
        target: SendTarget,
        /// File to send
        file: PathBuf,
        /// Client the file is sent on behalf of
        #[arg(long, value_name = "ID")]
        client_id: Option<String>,
        /// Prefix parts data with processed order/transfer ids and mark them sent
        #[arg(long)]
        include_processed: bool,
    },
    /// Convert whitespace-separated text to an Excel spreadsheet
    Transform {
        /// Input text file
        input: PathBuf,
        /// Comma-separated column names; every line is then data
        #[arg(long, value_name = "NAMES")]
        headers: Option<String>,
        /// Output file name (defaults to <input>_converted.xlsx)
        #[arg(short, long, value_name = "NAME")]
        output: Option<String>,
        /// Output file format
        #[arg(long, value_enum, default_value_t = TransformFormat::Xlsx)]
        format: TransformFormat,
        /// Print CSV to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Configure CLI profiles
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Authenticate CLI profile with the FourK API
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum TransformFormat {
    Xlsx,
    Csv,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Initialize or update profile config
    Init {
        /// FourK API base URL
        #[arg(long, value_name = "URL")]
        api_base_url: Option<String>,
        /// Dealer roster JSON path for this profile
        #[arg(long, value_name = "PATH")]
        dealers_path: Option<String>,
        /// App name used for `fourk auth access`
        #[arg(long, value_name = "NAME")]
        app_name: Option<String>,
        /// Write the built-in dealer roster if no roster file exists
        #[arg(long)]
        write_dealers: bool,
        /// Keep current active profile instead of activating this one
        #[arg(long)]
        no_activate: bool,
    },
}

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Login with email/password and store tokens in keychain
    Login {
        /// Account email
        #[arg(long, value_name = "EMAIL")]
        email: String,
        /// Account password
        #[arg(long, value_name = "PASSWORD")]
        password: String,
    },
    /// Show auth status and permissions for profile
    Status,
    /// Logout profile and clear stored tokens
    Logout,
    /// Check whether the signed-in user may use an app
    Access {
        /// App name (defaults to the profile's app_name)
        #[arg(value_name = "APP")]
        app: Option<String>,
    },
}
