use {
    super::{
        entities,
        Database,
    },
    crate::api::RestError,
    axum::async_trait,
    std::{
        collections::HashMap,
        sync::Arc,
    },
    time::OffsetDateTime,
    tokio::sync::RwLock,
};

/// Session store kept in process memory.
///
/// Clones share the same underlying map, so several services built on clones
/// observe each other's writes the same way they would through Postgres.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    sessions: Arc<RwLock<HashMap<entities::SessionId, entities::BiddingSession>>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Database for InMemoryDatabase {
    async fn add_session(&self, session: &entities::BiddingSession) -> Result<(), RestError> {
        let mut sessions = self.sessions.write().await;
        let already_active = sessions.values().any(|s| {
            s.subject_ref == session.subject_ref && s.status == entities::SessionStatus::Ongoing
        });
        if already_active {
            return Err(RestError::SessionAlreadyActive);
        }
        sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn get_session(
        &self,
        session_id: entities::SessionId,
    ) -> Result<Option<entities::BiddingSession>, RestError> {
        Ok(self.sessions.read().await.get(&session_id).cloned())
    }

    async fn get_ongoing_session_for_subject(
        &self,
        subject_ref: &entities::SubjectRef,
    ) -> Result<Option<entities::BiddingSession>, RestError> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .find(|s| &s.subject_ref == subject_ref && s.status == entities::SessionStatus::Ongoing)
            .cloned())
    }

    async fn get_listed_sessions(
        &self,
        now: OffsetDateTime,
    ) -> Result<Vec<entities::BiddingSession>, RestError> {
        let mut sessions: Vec<entities::BiddingSession> = self
            .sessions
            .read()
            .await
            .values()
            .filter(|s| s.is_listed_at(now))
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.end_time);
        Ok(sessions)
    }

    async fn update_session(&self, session: &entities::BiddingSession) -> Result<bool, RestError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session.id) {
            Some(stored) if stored.revision == session.revision => {
                *stored = entities::BiddingSession {
                    revision: session.revision + 1,
                    ..session.clone()
                };
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        time::macros::datetime,
    };

    fn session(subject_ref: &str, end_time: OffsetDateTime) -> entities::BiddingSession {
        entities::BiddingSession::new(
            subject_ref.to_string(),
            100,
            datetime!(2025-03-01 00:00 UTC),
            end_time,
        )
    }

    #[tokio::test]
    async fn test_update_requires_current_revision() {
        let db = InMemoryDatabase::new();
        let mut stored = session("lot-1", datetime!(2025-03-31 00:00 UTC));
        db.add_session(&stored).await.unwrap();

        let stale = stored.clone();
        stored.stop(datetime!(2025-03-10 00:00 UTC));
        assert!(db.update_session(&stored).await.unwrap());
        assert!(!db.update_session(&stale).await.unwrap());

        let current = db.get_session(stored.id).await.unwrap().unwrap();
        assert_eq!(current.revision, 1);
        assert_eq!(current.status, entities::SessionStatus::Stopped);
    }

    #[tokio::test]
    async fn test_one_ongoing_session_per_subject() {
        let db = InMemoryDatabase::new();
        let mut first = session("lot-1", datetime!(2025-03-31 00:00 UTC));
        db.add_session(&first).await.unwrap();
        assert!(matches!(
            db.add_session(&session("lot-1", datetime!(2025-04-30 00:00 UTC)))
                .await,
            Err(RestError::SessionAlreadyActive)
        ));

        first.stop(datetime!(2025-03-10 00:00 UTC));
        assert!(db.update_session(&first).await.unwrap());
        db.add_session(&session("lot-1", datetime!(2025-04-30 00:00 UTC)))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_listed_sessions_sorted_by_end_time() {
        let db = InMemoryDatabase::new();
        let now = datetime!(2025-03-15 00:00 UTC);
        let late = session("lot-late", datetime!(2025-05-31 00:00 UTC));
        let soon = session("lot-soon", datetime!(2025-03-31 00:00 UTC));
        let expired = session("lot-expired", datetime!(2025-02-28 00:00 UTC));
        for s in [&late, &soon, &expired] {
            db.add_session(s).await.unwrap();
        }

        let listed = db.get_listed_sessions(now).await.unwrap();
        assert_eq!(
            listed.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![soon.id, late.id]
        );
    }
}
