use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
    },
    futures::future::join_all,
    time::OffsetDateTime,
};

impl Service {
    /// Sessions currently taking bids, the one closing soonest first.
    #[tracing::instrument(skip_all)]
    pub async fn list_active_sessions(&self) -> Result<Vec<entities::SessionWithSubject>, RestError> {
        let sessions = self
            .repo
            .get_listed_sessions(OffsetDateTime::now_utc())
            .await?;
        let subjects = join_all(
            sessions
                .iter()
                .map(|session| self.subject_service.get_subject_summary(&session.subject_ref)),
        )
        .await;
        Ok(sessions
            .into_iter()
            .zip(subjects)
            .map(|(session, subject)| entities::SessionWithSubject { session, subject })
            .collect())
    }
}
