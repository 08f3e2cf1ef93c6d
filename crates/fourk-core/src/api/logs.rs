//! Remote delivery-log fetcher.

use super::{ApiClient, ApiResult};
use crate::auth::{Session, SessionPersistence};
use crate::models::{DealerFile, LogsResponse};

impl ApiClient {
    /// `GET /dealers/{client_code}/logs/{type_key}`
    pub async fn try_fetch_dealer_logs<S: SessionPersistence>(
        &self,
        session: &Session<S>,
        client_code: &str,
        type_key: &str,
    ) -> ApiResult<Vec<DealerFile>> {
        let url = self.url(&format!(
            "/dealers/{}/logs/{}",
            urlencoding::encode(client_code),
            urlencoding::encode(type_key)
        ));
        let response: LogsResponse = self
            .fetch_json(session, |client| Ok(client.get(&url)))
            .await?;
        Ok(response.into_files(type_key))
    }

    /// Best-effort variant of [`Self::try_fetch_dealer_logs`].
    ///
    /// Any failure is logged and reported as no records.
    pub async fn fetch_dealer_logs<S: SessionPersistence>(
        &self,
        session: &Session<S>,
        client_code: &str,
        type_key: &str,
    ) -> Vec<DealerFile> {
        match self
            .try_fetch_dealer_logs(session, client_code, type_key)
            .await
        {
            Ok(files) => {
                tracing::debug!(
                    "Fetched {} {} log records for {}",
                    files.len(),
                    type_key,
                    client_code
                );
                files
            }
            Err(error) => {
                tracing::warn!(
                    "Failed to fetch {} logs for {}: {}",
                    type_key,
                    client_code,
                    error
                );
                Vec::new()
            }
        }
    }
}
