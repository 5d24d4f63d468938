use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
    },
};

#[derive(Debug, Clone)]
pub struct GetActiveSessionForSubjectInput {
    pub subject_ref: entities::SubjectRef,
}

impl Service {
    /// The ongoing session of a lot, whether or not its end time has passed.
    #[tracing::instrument(skip_all, fields(subject_ref = %input.subject_ref))]
    pub async fn get_active_session_for_subject(
        &self,
        input: GetActiveSessionForSubjectInput,
    ) -> Result<entities::SessionWithSubject, RestError> {
        let session = self
            .repo
            .get_ongoing_session_for_subject(&input.subject_ref)
            .await?
            .ok_or(RestError::SessionNotFound)?;
        let subject = self
            .subject_service
            .get_subject_summary(&input.subject_ref)
            .await;
        Ok(entities::SessionWithSubject { session, subject })
    }
}
