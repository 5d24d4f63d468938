use {
    super::Repository,
    crate::{
        api::RestError,
        auction::entities,
    },
};

impl Repository {
    // NOTE: Do not call this function directly. Instead call `create_session` from `Service`.
    #[tracing::instrument(skip_all, fields(session_id = %session.id, subject_ref = %session.subject_ref))]
    pub async fn add_session(
        &self,
        session: entities::BiddingSession,
    ) -> Result<entities::BiddingSession, RestError> {
        self.db.add_session(&session).await?;
        Ok(session)
    }
}
