//! Concurrent dealer refresh: fetch every dealer's logs, then reconcile.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::api::ApiClient;
use crate::auth::{Session, SessionPersistence};
use crate::error::{Error, Result};
use crate::models::Dealer;
use crate::reconcile::reconcile_dealer;

/// Owns the refresh cycle for a set of dealers.
///
/// Dropping the monitor cancels its token, so anything waiting on
/// [`DealerMonitor::cancellation_token`] is released on teardown.
pub struct DealerMonitor<S: SessionPersistence> {
    client: ApiClient,
    session: Session<S>,
    cancel: CancellationToken,
    _cancel_on_drop: DropGuard,
}

impl<S: SessionPersistence> DealerMonitor<S> {
    pub fn new(client: ApiClient, session: Session<S>) -> Self {
        let cancel = CancellationToken::new();
        let guard = cancel.clone().drop_guard();
        Self {
            client,
            session,
            cancel,
            _cancel_on_drop: guard,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &Session<S> {
        &self.session
    }

    /// Token that aborts in-flight and future refreshes when cancelled.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Fetch logs for every dealer concurrently and reconcile against now.
    pub async fn refresh(&self, dealers: &[Dealer]) -> Result<Vec<Dealer>> {
        self.refresh_with_clock(dealers, Utc::now).await
    }

    /// [`Self::refresh`] with `now` read from `clock` once all fetches settle.
    ///
    /// Returns [`Error::Cancelled`] without partial results when the token is
    /// cancelled first.
    pub async fn refresh_with_clock<C>(&self, dealers: &[Dealer], clock: C) -> Result<Vec<Dealer>>
    where
        C: FnOnce() -> DateTime<Utc>,
    {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let fetches = join_all(dealers.iter().map(|dealer| self.fetch_dealer(dealer)));
        let fetched = tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                tracing::info!("Dealer refresh cancelled");
                return Err(Error::Cancelled);
            }
            fetched = fetches => fetched,
        };

        let now = clock();
        let reconciled = fetched
            .iter()
            .map(|dealer| reconcile_dealer(dealer, now))
            .collect::<Vec<_>>();
        tracing::info!("Refreshed {} dealers", reconciled.len());
        Ok(reconciled)
    }

    async fn fetch_dealer(&self, dealer: &Dealer) -> Dealer {
        let Some(client_code) = dealer.fetch_client_code() else {
            tracing::debug!("Skipping fetch for dealer {}", dealer.id);
            return dealer.with_files(Vec::new());
        };

        let per_type = join_all(dealer.enabled_type_keys().into_iter().map(|type_key| {
            self.client
                .fetch_dealer_logs(&self.session, client_code, type_key)
        }))
        .await;
        dealer.with_files(per_type.into_iter().flatten().collect())
    }
}
