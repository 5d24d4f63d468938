use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities::{
            self,
            BidContainerTracing,
        },
    },
};

#[derive(Debug, Clone)]
pub struct StopSessionInput {
    pub session_id: entities::SessionId,
    /// Whether the caller owns the subject or is an admin.
    pub authorized: bool,
}

impl Service {
    /// Closes the session for good and discards its ledger. Stopping twice is a no-op.
    #[tracing::instrument(skip_all, fields(session_id = %input.session_id), err(level = tracing::Level::TRACE))]
    pub async fn stop_session(&self, input: StopSessionInput) -> Result<(), RestError> {
        if !input.authorized {
            return Err(RestError::Unauthorized);
        }
        let discarded = self
            .update_session(input.session_id, |session, now| {
                if session.status == entities::SessionStatus::Stopped {
                    return Ok(None);
                }
                Ok(Some(session.stop(now)))
            })
            .await?;

        match discarded {
            Some(bids) => tracing::info!(
                discarded_count = bids.len(),
                discarded_bids = %BidContainerTracing(&bids),
                "Session stopped"
            ),
            None => tracing::debug!("Session was already stopped"),
        }
        Ok(())
    }
}
