//! `/auth/*` endpoints.

use serde::Deserialize;

use super::{decode_json, ApiClient, ApiError, ApiResult};
use crate::auth::{AuthTokens, Session, SessionPersistence, UserProfile};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl TokenResponse {
    fn into_tokens(self) -> ApiResult<AuthTokens> {
        match (self.access_token, self.refresh_token) {
            (Some(access_token), Some(refresh_token))
                if !access_token.trim().is_empty() && !refresh_token.trim().is_empty() =>
            {
                Ok(AuthTokens::new(access_token, refresh_token))
            }
            _ => Err(ApiError::Api(
                "Auth response did not include both tokens".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AppAccessResponse {
    #[serde(default)]
    has_access: bool,
}

impl ApiClient {
    /// `POST /auth/login`; the issued tokens are stored in `session`.
    pub async fn login<S: SessionPersistence>(
        &self,
        session: &Session<S>,
        email: &str,
        password: &str,
    ) -> ApiResult<()> {
        validate_credentials(email, password)?;

        let payload = serde_json::json!({
            "email": email.trim(),
            "password": password,
        });
        let response = self
            .send_public(self.client.post(self.url("/auth/login")).json(&payload))
            .await?;
        let tokens = decode_json::<TokenResponse>(response).await?.into_tokens()?;
        session.set_tokens(tokens)?;
        tracing::info!("Signed in as {}", email.trim());
        Ok(())
    }

    /// `POST /auth/refresh` with the session's refresh token.
    ///
    /// Sent without the access token so it can never recurse into the
    /// `401` recovery in [`ApiClient::send_authorized`].
    pub async fn refresh<S: SessionPersistence>(&self, session: &Session<S>) -> ApiResult<()> {
        let refresh_token = session.refresh_token().ok_or(ApiError::NotAuthenticated)?;
        let payload = serde_json::json!({ "refresh_token": refresh_token });
        let response = self
            .send_public(self.client.post(self.url("/auth/refresh")).json(&payload))
            .await?;
        let tokens = decode_json::<TokenResponse>(response).await?.into_tokens()?;
        session.set_tokens(tokens)?;
        tracing::debug!("Access token refreshed");
        Ok(())
    }

    /// Forget the session locally. The backend keeps no logout state.
    pub fn logout<S: SessionPersistence>(&self, session: &Session<S>) -> ApiResult<()> {
        session.clear()?;
        Ok(())
    }

    /// `GET /auth/me`
    pub async fn current_user<S: SessionPersistence>(
        &self,
        session: &Session<S>,
    ) -> ApiResult<UserProfile> {
        if !session.is_authenticated() {
            return Err(ApiError::NotAuthenticated);
        }
        let url = self.url("/auth/me");
        self.fetch_json(session, |client| Ok(client.get(&url))).await
    }

    /// Load the profile for a stored session.
    ///
    /// An expired session that cannot be refreshed is cleared and yields
    /// `None`; other failures are returned.
    pub async fn restore_user<S: SessionPersistence>(
        &self,
        session: &Session<S>,
    ) -> ApiResult<Option<UserProfile>> {
        if !session.is_authenticated() {
            return Ok(None);
        }
        match self.current_user(session).await {
            Ok(profile) => Ok(Some(profile)),
            Err(ApiError::SessionExpired | ApiError::NotAuthenticated) => {
                session.clear()?;
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    /// `GET /auth/check-app-access/{app}`. Any failure means no access.
    pub async fn check_app_access<S: SessionPersistence>(
        &self,
        session: &Session<S>,
        app_name: &str,
    ) -> bool {
        let url = self.url(&format!(
            "/auth/check-app-access/{}",
            urlencoding::encode(app_name.trim())
        ));
        match self
            .fetch_json::<_, _, AppAccessResponse>(session, |client| Ok(client.get(&url)))
            .await
        {
            Ok(response) => response.has_access,
            Err(error) => {
                tracing::warn!("App access check for {} failed: {}", app_name, error);
                false
            }
        }
    }
}

fn validate_credentials(email: &str, password: &str) -> ApiResult<()> {
    if email.trim().is_empty() {
        return Err(ApiError::Api("Email is required".to_string()));
    }
    if password.is_empty() {
        return Err(ApiError::Api("Password is required".to_string()));
    }
    Ok(())
}
