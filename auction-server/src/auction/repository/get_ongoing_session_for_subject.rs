use {
    super::Repository,
    crate::{
        api::RestError,
        auction::entities,
    },
};

impl Repository {
    pub async fn get_ongoing_session_for_subject(
        &self,
        subject_ref: &entities::SubjectRef,
    ) -> Result<Option<entities::BiddingSession>, RestError> {
        self.db.get_ongoing_session_for_subject(subject_ref).await
    }
}
