use {
    super::Repository,
    crate::{
        api::RestError,
        auction::entities,
    },
};

impl Repository {
    pub async fn get_session(
        &self,
        session_id: entities::SessionId,
    ) -> Result<entities::BiddingSession, RestError> {
        self.db
            .get_session(session_id)
            .await?
            .ok_or(RestError::SessionNotFound)
    }
}
