use {
    super::{
        verification,
        Service,
    },
    crate::{
        api::RestError,
        auction::entities,
        per_metrics::BID_SUBMISSIONS_TOTAL,
    },
    axum_prometheus::metrics,
    email_address::EmailAddress,
};

#[derive(Debug, Clone)]
pub struct SubmitBidInput {
    pub session_id:      entities::SessionId,
    pub bidder:          entities::Bidder,
    pub amount_per_unit: entities::Amount,
}

pub(super) fn verify_bidder(bidder: &entities::Bidder) -> Result<(), RestError> {
    if bidder.name.is_empty() {
        return Err(RestError::BadParameters(
            "Bidder name must not be empty".to_string(),
        ));
    }
    if !EmailAddress::is_valid(&bidder.email) {
        return Err(RestError::BadParameters(format!(
            "Invalid bidder email {}",
            bidder.email
        )));
    }
    Ok(())
}

fn outcome(result: &Result<entities::Bid, RestError>) -> &'static str {
    match result {
        Ok(_) => "accepted",
        Err(RestError::TemporarilyUnavailable) => "error",
        Err(_) => "rejected",
    }
}

impl Service {
    #[tracing::instrument(skip_all, fields(session_id = %input.session_id, amount = input.amount_per_unit, bid_id), err(level = tracing::Level::TRACE))]
    pub async fn submit_bid(&self, input: SubmitBidInput) -> Result<entities::Bid, RestError> {
        verify_bidder(&input.bidder)?;
        let result = self
            .update_session(input.session_id, |session, now| {
                verification::validate_bid(session, input.amount_per_unit, now)?;
                let bid = entities::Bid::new(input.bidder.clone(), input.amount_per_unit, now);
                session.bids.push(bid.clone());
                Ok(bid)
            })
            .await;

        metrics::counter!(BID_SUBMISSIONS_TOTAL, "result" => outcome(&result)).increment(1);
        if let Ok(bid) = &result {
            tracing::Span::current().record("bid_id", tracing::field::display(bid.id));
            tracing::info!("Bid accepted");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::auction::{
            repository::{
                Database,
                InMemoryDatabase,
            },
            service::{
                revise_bid::ReviseBidInput,
                stop_session::StopSessionInput,
                tests::{
                    bidder,
                    LOT,
                },
            },
        },
        time::{
            Duration,
            OffsetDateTime,
        },
    };

    fn submit(
        session_id: entities::SessionId,
        name: &str,
        amount_per_unit: entities::Amount,
    ) -> SubmitBidInput {
        SubmitBidInput {
            session_id,
            bidder: bidder(name),
            amount_per_unit,
        }
    }

    #[tokio::test]
    async fn test_bidding_round_lifecycle() {
        let service = Service::new_with_mocks(InMemoryDatabase::new());
        let session_id = service.create_test_session(LOT, 100).await;

        assert!(matches!(
            service.submit_bid(submit(session_id, "A", 80)).await,
            Err(RestError::BelowMinimum { minimum: 100 })
        ));
        service
            .submit_bid(submit(session_id, "A", 120))
            .await
            .unwrap();
        assert!(matches!(
            service.submit_bid(submit(session_id, "C", 80)).await,
            Err(RestError::BelowMinimum { minimum: 100 })
        ));
        assert!(matches!(
            service.submit_bid(submit(session_id, "B", 100)).await,
            Err(RestError::BelowCurrentHighest { highest: 120 })
        ));
        service
            .submit_bid(submit(session_id, "B", 120))
            .await
            .unwrap();

        service
            .revise_bid(ReviseBidInput {
                session_id,
                bidder_email: "a@example.com".to_string(),
                bid_id: None,
                previous_amount: 120,
                new_amount: 150,
            })
            .await
            .unwrap();

        let session = service.repo.get_session(session_id).await.unwrap();
        assert_eq!(
            session
                .bids
                .iter()
                .map(|b| (b.bidder_email.as_str(), b.amount_per_unit))
                .collect::<Vec<_>>(),
            vec![("a@example.com", 150), ("b@example.com", 120)]
        );
        assert_eq!(session.highest_bid(), Some(150));

        service
            .stop_session(StopSessionInput {
                session_id,
                authorized: true,
            })
            .await
            .unwrap();
        let session = service.repo.get_session(session_id).await.unwrap();
        assert_eq!(session.status, entities::SessionStatus::Stopped);
        assert!(session.bids.is_empty());

        assert!(matches!(
            service.submit_bid(submit(session_id, "C", 200)).await,
            Err(RestError::SessionClosed)
        ));
    }

    #[tokio::test]
    async fn test_expired_session_rejects_bids_while_ongoing() {
        let db = InMemoryDatabase::new();
        let now = OffsetDateTime::now_utc();
        let session = entities::BiddingSession::new(
            LOT.to_string(),
            100,
            now - Duration::days(30),
            now - Duration::seconds(1),
        );
        db.add_session(&session).await.unwrap();
        let service = Service::new_with_mocks(db);

        assert!(matches!(
            service.submit_bid(submit(session.id, "A", 500)).await,
            Err(RestError::SessionExpired { .. })
        ));
        let stored = service.repo.get_session(session.id).await.unwrap();
        assert_eq!(stored.status, entities::SessionStatus::Ongoing);
    }

    #[tokio::test]
    async fn test_unknown_session() {
        let service = Service::new_with_mocks(InMemoryDatabase::new());
        assert!(matches!(
            service
                .submit_bid(submit(entities::SessionId::new_v4(), "A", 500))
                .await,
            Err(RestError::SessionNotFound)
        ));
    }

    #[tokio::test]
    async fn test_bidder_identity_is_validated() {
        let service = Service::new_with_mocks(InMemoryDatabase::new());
        let session_id = service.create_test_session(LOT, 100).await;
        for bidder in [
            entities::Bidder::new(" ", "a@example.com"),
            entities::Bidder::new("A", "not-an-email"),
        ] {
            assert!(matches!(
                service
                    .submit_bid(SubmitBidInput {
                        session_id,
                        bidder,
                        amount_per_unit: 500,
                    })
                    .await,
                Err(RestError::BadParameters(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_email_is_normalized() {
        let service = Service::new_with_mocks(InMemoryDatabase::new());
        let session_id = service.create_test_session(LOT, 100).await;
        let bid = service
            .submit_bid(SubmitBidInput {
                session_id,
                bidder: entities::Bidder::new("Asha", "  Asha@Example.COM "),
                amount_per_unit: 100,
            })
            .await
            .unwrap();
        assert_eq!(bid.bidder_email, "asha@example.com");
        assert!(bid.is_placed_by("ASHA@example.com"));
    }

    fn assert_ledger_is_monotonic(session: &entities::BiddingSession) {
        assert!(session
            .bids
            .windows(2)
            .all(|pair| pair[0].amount_per_unit <= pair[1].amount_per_unit));
    }

    #[tokio::test]
    async fn test_concurrent_submissions_keep_ledger_monotonic() {
        let service = Service::new_with_mocks(InMemoryDatabase::new());
        let session_id = service.create_test_session(LOT, 100).await;

        let amounts = [130, 100, 180, 150, 180, 110, 200, 170, 140, 190];
        let submissions = amounts.iter().enumerate().map(|(i, amount)| {
            let service = service.clone();
            let input = submit(session_id, &format!("T{i}"), *amount);
            tokio::spawn(async move { service.submit_bid(input).await })
        });
        let accepted = futures::future::join_all(submissions)
            .await
            .into_iter()
            .filter(|r| matches!(r, Ok(Ok(_))))
            .count();

        let session = service.repo.get_session(session_id).await.unwrap();
        assert_eq!(session.bids.len(), accepted);
        assert!(accepted >= 1);
        assert_ledger_is_monotonic(&session);
        assert!(service
            .repo
            .in_memory_store
            .session_lock
            .lock()
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_submissions_across_services_sharing_a_store() {
        let db = InMemoryDatabase::new();
        let first = Service::new_with_mocks_and_attempts(db.clone(), 50);
        let second = Service::new_with_mocks_and_attempts(db.clone(), 50);
        let session_id = first.create_test_session(LOT, 100).await;

        let submissions = (0..20u64).map(|i| {
            let service = if i % 2 == 0 {
                first.clone()
            } else {
                second.clone()
            };
            // Interleave rising and falling amounts so some submissions must lose.
            let amount = if i % 3 == 0 { 100 + i } else { 300 - i };
            let input = submit(session_id, &format!("T{i}"), amount);
            tokio::spawn(async move { service.submit_bid(input).await })
        });
        let results = futures::future::join_all(submissions).await;
        let accepted: Vec<entities::Bid> = results
            .into_iter()
            .filter_map(|r| r.ok().and_then(Result::ok))
            .collect();

        let session = db.get_session(session_id).await.unwrap().unwrap();
        assert_eq!(session.bids.len(), accepted.len());
        assert_eq!(session.revision as usize, accepted.len());
        assert_ledger_is_monotonic(&session);
    }
}
