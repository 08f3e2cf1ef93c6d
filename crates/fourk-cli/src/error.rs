use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] fourk_core::Error),
    #[error(transparent)]
    Api(#[from] fourk_core::api::ApiError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Dealer not found: {0}")]
    DealerNotFound(String),
    #[error("Missing permission '{0}' for this profile")]
    PermissionDenied(fourk_core::auth::Permission),
    #[error("{0} is not valid UTF-8 text")]
    NotText(String),
    #[error(
        "API base URL is not configured. Run `fourk config init --api-base-url <URL>` or set FOURK_API_BASE_URL."
    )]
    ApiNotConfigured,
    #[error("Not signed in. Run `fourk auth login --email <EMAIL> --password <PASSWORD>`.")]
    NotSignedIn,
}
