//! FourK API request layer.
//!
//! Every authenticated call goes through [`ApiClient::send_authorized`], the
//! one place that attaches the bearer token and recovers from a `401`.

pub mod auth;
pub mod logs;
pub mod uploads;

#[cfg(test)]
pub(crate) mod test_server;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::auth::{AuthError, Session, SessionPersistence};
use crate::util::{compact_text, normalize_base_url};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Api(String),
    #[error("Session expired. Sign in again.")]
    SessionExpired,
    #[error("Not signed in.")]
    NotAuthenticated,
    #[error("Invalid API configuration: {0}")]
    InvalidConfiguration(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Handle to one FourK API deployment. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: impl AsRef<str>) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url.as_ref()).ok_or_else(|| {
            ApiError::InvalidConfiguration(
                "API base URL must include http:// or https://".to_string(),
            )
        })?;

        Ok(Self {
            base_url,
            client: Client::builder().build()?,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a request without credentials.
    pub(crate) async fn send_public(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request.send().await?;
        check_status(response).await
    }

    /// Send a request built by `build`, attaching the session's access token.
    ///
    /// A `401` triggers exactly one token refresh followed by one retry. When
    /// the refresh fails the session is cleared and
    /// [`ApiError::SessionExpired`] is returned. `build` runs once per attempt.
    pub async fn send_authorized<S, F>(&self, session: &Session<S>, build: F) -> ApiResult<Response>
    where
        S: SessionPersistence,
        F: Fn(&Client) -> ApiResult<RequestBuilder>,
    {
        let response = self.send_authorized_unchecked(session, build).await?;
        check_status(response).await
    }

    /// Like [`Self::send_authorized`] but hands back non-success responses
    /// other than an unrecoverable `401` for the caller to interpret.
    pub(crate) async fn send_authorized_unchecked<S, F>(
        &self,
        session: &Session<S>,
        build: F,
    ) -> ApiResult<Response>
    where
        S: SessionPersistence,
        F: Fn(&Client) -> ApiResult<RequestBuilder>,
    {
        let sent_token = session.access_token();
        let response = with_bearer(build(&self.client)?, sent_token.clone())
            .send()
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        {
            let _refresh = session.lock_refresh().await;
            let current_token = session.access_token();
            if current_token == sent_token {
                if session.refresh_token().is_none() {
                    return Err(ApiError::NotAuthenticated);
                }
                if let Err(error) = self.refresh(session).await {
                    tracing::warn!("Token refresh failed, clearing session: {}", error);
                    session.clear()?;
                    return Err(ApiError::SessionExpired);
                }
            } else if current_token.is_none() {
                // Another request's refresh failed while this one waited.
                return Err(ApiError::SessionExpired);
            } else {
                tracing::debug!("Token already refreshed, retrying request");
            }
        }

        let retried = with_bearer(build(&self.client)?, session.access_token())
            .send()
            .await?;
        if retried.status() == StatusCode::UNAUTHORIZED {
            return Err(ApiError::SessionExpired);
        }
        Ok(retried)
    }

    /// Send through [`Self::send_authorized`] and decode the JSON body.
    pub(crate) async fn fetch_json<S, F, T>(&self, session: &Session<S>, build: F) -> ApiResult<T>
    where
        S: SessionPersistence,
        F: Fn(&Client) -> ApiResult<RequestBuilder>,
        T: DeserializeOwned,
    {
        let response = self.send_authorized(session, build).await?;
        decode_json(response).await
    }
}

fn with_bearer(request: RequestBuilder, access_token: Option<String>) -> RequestBuilder {
    match access_token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

async fn check_status(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    tracing::debug!(
        "{} returned {}: {}",
        url,
        status.as_u16(),
        compact_text(&body)
    );
    Err(error_for_status(status, &body))
}

pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Map a non-success response to the message shown to users.
#[must_use]
pub fn error_for_status(status: StatusCode, body: &str) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED => ApiError::SessionExpired,
        StatusCode::FORBIDDEN => {
            ApiError::Api("You do not have permission to perform this action.".to_string())
        }
        StatusCode::NOT_FOUND => ApiError::Api("Resource not found.".to_string()),
        StatusCode::BAD_REQUEST => ApiError::Api(
            parse_detail(body).unwrap_or_else(|| "Invalid request data.".to_string()),
        ),
        _ => ApiError::Api(parse_detail(body).unwrap_or_else(|| "Server error.".to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    detail: Option<serde_json::Value>,
    message: Option<String>,
}

/// Extract the backend's `detail` (or `message`) text from an error body.
#[must_use]
pub fn parse_detail(body: &str) -> Option<String> {
    let payload = serde_json::from_str::<ErrorResponse>(body).ok()?;
    let detail = match payload.detail {
        Some(serde_json::Value::String(text)) => Some(text),
        Some(serde_json::Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    };
    detail
        .or(payload.message)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
