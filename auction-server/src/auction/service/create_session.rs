use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities::{
            self,
            HarvestPeriod,
        },
    },
    time::OffsetDateTime,
};

#[derive(Debug, Clone)]
pub struct CreateSessionInput {
    pub subject_ref:    entities::SubjectRef,
    pub minimum_bid:    entities::Amount,
    pub harvest_period: String,
}

impl Service {
    fn build_session(
        &self,
        input: &CreateSessionInput,
        now: OffsetDateTime,
    ) -> Result<entities::BiddingSession, RestError> {
        let subject_ref = input.subject_ref.trim();
        if subject_ref.is_empty() {
            return Err(RestError::BadParameters(
                "Subject reference must not be empty".to_string(),
            ));
        }
        if input.minimum_bid == 0 || i64::try_from(input.minimum_bid).is_err() {
            return Err(RestError::BadParameters(
                "Minimum bid must be a positive amount".to_string(),
            ));
        }
        let period: HarvestPeriod = input
            .harvest_period
            .parse()
            .map_err(|e: entities::HarvestPeriodError| RestError::BadParameters(e.to_string()))?;
        let end_time = period
            .end_time(self.config.utc_offset)
            .map_err(|e| RestError::BadParameters(e.to_string()))?;
        if end_time <= now {
            return Err(RestError::BadParameters(format!(
                "Harvest period {} has already ended",
                input.harvest_period
            )));
        }
        Ok(entities::BiddingSession::new(
            subject_ref.to_string(),
            input.minimum_bid,
            now,
            end_time,
        ))
    }

    async fn create_session_for_lock(
        &self,
        session: entities::BiddingSession,
        lock: entities::SubjectLock,
    ) -> Result<entities::BiddingSession, RestError> {
        let _lock = lock.lock().await;
        // An expired but unstopped session still blocks the subject until its owner stops it.
        if let Some(existing) = self
            .repo
            .get_ongoing_session_for_subject(&session.subject_ref)
            .await?
        {
            tracing::info!(existing_session_id = %existing.id, "Subject already has an ongoing session");
            return Err(RestError::SessionAlreadyActive);
        }
        self.repo.add_session(session).await
    }

    #[tracing::instrument(skip_all, fields(subject_ref = %input.subject_ref, session_id), err(level = tracing::Level::TRACE))]
    pub async fn create_session(
        &self,
        input: CreateSessionInput,
    ) -> Result<entities::BiddingSession, RestError> {
        let session = self.build_session(&input, OffsetDateTime::now_utc())?;
        tracing::Span::current().record("session_id", tracing::field::display(session.id));

        let subject_ref = session.subject_ref.clone();
        let subject_lock = self
            .repo
            .get_or_create_in_memory_subject_lock(&subject_ref)
            .await;
        let result = self.create_session_for_lock(session, subject_lock).await;
        self.repo.remove_in_memory_subject_lock(&subject_ref).await;
        result
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::auction::{
            repository::InMemoryDatabase,
            service::tests::{
                future_period,
                LOT,
            },
        },
        time::{
            macros::datetime,
            UtcOffset,
        },
    };

    fn input(subject_ref: &str, minimum_bid: entities::Amount, period: &str) -> CreateSessionInput {
        CreateSessionInput {
            subject_ref: subject_ref.to_string(),
            minimum_bid,
            harvest_period: period.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_session() {
        let service = Service::new_with_mocks(InMemoryDatabase::new());
        let before = OffsetDateTime::now_utc();
        let session = service
            .create_session(input(LOT, 100, &future_period()))
            .await
            .unwrap();

        assert_eq!(session.status, entities::SessionStatus::Ongoing);
        assert!(session.bids.is_empty());
        assert!(session.start_time >= before);
        let end_local = session.end_time.to_offset(UtcOffset::from_hms(5, 30, 0).unwrap());
        assert_eq!(end_local.month(), time::Month::June);
        assert_eq!(end_local.day(), 30);
        assert_eq!(
            (end_local.hour(), end_local.minute(), end_local.second()),
            (23, 59, 59)
        );
    }

    #[test]
    fn test_end_time_uses_configured_offset() {
        let service = Service::new_with_mocks(InMemoryDatabase::new());
        let session = service
            .build_session(&input(LOT, 100, "2025-03"), datetime!(2025-03-10 00:00 UTC))
            .unwrap();
        assert_eq!(session.end_time, datetime!(2025-03-31 18:29:59.999999 UTC));
    }

    #[tokio::test]
    async fn test_invalid_inputs_are_rejected() {
        let service = Service::new_with_mocks(InMemoryDatabase::new());
        for bad in [
            input(LOT, 0, &future_period()),
            input(LOT, u64::MAX, &future_period()),
            input("  ", 100, &future_period()),
            input(LOT, 100, "someday"),
            input(LOT, 100, "2001-01"),
        ] {
            assert!(matches!(
                service.create_session(bad).await,
                Err(RestError::BadParameters(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_one_ongoing_session_per_subject() {
        let service = Service::new_with_mocks(InMemoryDatabase::new());
        service.create_test_session(LOT, 100).await;
        assert!(matches!(
            service.create_session(input(LOT, 200, &future_period())).await,
            Err(RestError::SessionAlreadyActive)
        ));
        service.create_test_session("lot-2", 100).await;
    }

    #[tokio::test]
    async fn test_concurrent_creation_yields_one_session() {
        let service = Service::new_with_mocks(InMemoryDatabase::new());
        let attempts = (0..8).map(|_| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .create_session(input(LOT, 100, &future_period()))
                    .await
            })
        });
        let results = futures::future::join_all(attempts).await;
        let created = results
            .into_iter()
            .filter(|r| matches!(r, Ok(Ok(_))))
            .count();
        assert_eq!(created, 1);
    }
}
