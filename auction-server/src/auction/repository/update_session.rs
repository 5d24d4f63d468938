use {
    super::Repository,
    crate::{
        api::RestError,
        auction::entities,
    },
};

impl Repository {
    /// Conditionally writes the session and returns the stored version, or `None`
    /// if the stored revision moved since `session` was read.
    #[tracing::instrument(skip_all, fields(session_id = %session.id, revision = session.revision))]
    pub async fn update_session(
        &self,
        session: entities::BiddingSession,
    ) -> Result<Option<entities::BiddingSession>, RestError> {
        if !self.db.update_session(&session).await? {
            tracing::debug!("Session was updated concurrently");
            return Ok(None);
        }
        Ok(Some(entities::BiddingSession {
            revision: session.revision + 1,
            ..session
        }))
    }
}
