use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
        per_metrics::SESSION_UPDATE_CONFLICTS_TOTAL,
    },
    axum_prometheus::metrics,
    time::OffsetDateTime,
};

impl Service {
    async fn update_session_for_lock<T, F>(
        &self,
        session_id: entities::SessionId,
        mutate: &F,
        lock: entities::SessionLock,
    ) -> Result<T, RestError>
    where
        F: Fn(&mut entities::BiddingSession, OffsetDateTime) -> Result<T, RestError> + Send + Sync,
        T: Send,
    {
        let _lock = lock.lock().await;
        for attempt in 1..=self.config.max_update_attempts {
            let current = self.repo.get_session(session_id).await?;
            let mut updated = current.clone();
            let output = mutate(&mut updated, OffsetDateTime::now_utc())?;
            if updated == current {
                return Ok(output);
            }
            if self.repo.update_session(updated).await?.is_some() {
                return Ok(output);
            }
            metrics::counter!(SESSION_UPDATE_CONFLICTS_TOTAL).increment(1);
            tracing::warn!(attempt, "Session changed while updating, retrying");
        }
        tracing::error!(
            attempts = self.config.max_update_attempts,
            "Failed to update session after repeated conflicts"
        );
        Err(RestError::TemporarilyUnavailable)
    }

    /// Runs a read-validate-write cycle on one session.
    ///
    /// `mutate` sees the latest stored session and the current time. It runs again
    /// from a fresh read whenever the conditional write loses to another writer.
    /// A mutation that leaves the session untouched is not written.
    #[tracing::instrument(skip_all, fields(session_id = %session_id))]
    pub(super) async fn update_session<T, F>(
        &self,
        session_id: entities::SessionId,
        mutate: F,
    ) -> Result<T, RestError>
    where
        F: Fn(&mut entities::BiddingSession, OffsetDateTime) -> Result<T, RestError> + Send + Sync,
        T: Send,
    {
        let session_lock = self
            .repo
            .get_or_create_in_memory_session_lock(session_id)
            .await;
        let result = self
            .update_session_for_lock(session_id, &mutate, session_lock)
            .await;
        self.repo.remove_in_memory_session_lock(&session_id).await;
        result
    }
}
