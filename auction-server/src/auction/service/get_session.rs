use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
    },
};

#[derive(Debug, Clone)]
pub struct GetSessionInput {
    pub session_id: entities::SessionId,
}

impl Service {
    #[tracing::instrument(skip_all, fields(session_id = %input.session_id))]
    pub async fn get_session(
        &self,
        input: GetSessionInput,
    ) -> Result<entities::SessionWithSubject, RestError> {
        let session = self.repo.get_session(input.session_id).await?;
        let subject = self
            .subject_service
            .get_subject_summary(&session.subject_ref)
            .await;
        Ok(entities::SessionWithSubject { session, subject })
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::auction::{
            repository::{
                InMemoryDatabase,
                MockDatabase,
            },
            service::tests::{
                FARMER_ID,
                LOT,
            },
        },
    };

    #[tokio::test]
    async fn test_session_comes_with_subject() {
        let service = Service::new_with_mocks(InMemoryDatabase::new());
        let session_id = service.create_test_session(LOT, 100).await;

        let details = service
            .get_session(GetSessionInput { session_id })
            .await
            .unwrap();
        assert_eq!(details.session.id, session_id);
        assert_eq!(details.subject.subject_ref, LOT);
        assert_eq!(details.subject.owner_id.as_deref(), Some(FARMER_ID));
    }

    #[tokio::test]
    async fn test_unresolved_subject_still_returns_session() {
        let service = Service::new_with_mocks(InMemoryDatabase::new());
        let session_id = service.create_test_session("lot-unknown", 100).await;

        let details = service
            .get_session(GetSessionInput { session_id })
            .await
            .unwrap();
        assert_eq!(details.subject.crop_type, None);
        assert_eq!(details.subject.owner_id, None);
    }

    #[tokio::test]
    async fn test_store_failure_is_surfaced() {
        let mut db = MockDatabase::new();
        db.expect_get_session()
            .returning(|_| Err(RestError::TemporarilyUnavailable));
        let service = Service::new_with_mocks(db);

        assert!(matches!(
            service
                .get_session(GetSessionInput {
                    session_id: entities::SessionId::new_v4(),
                })
                .await,
            Err(RestError::TemporarilyUnavailable)
        ));
    }
}
