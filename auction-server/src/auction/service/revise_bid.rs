use {
    super::{
        verification,
        Service,
    },
    crate::{
        api::RestError,
        auction::entities,
    },
};

#[derive(Debug, Clone)]
pub struct ReviseBidInput {
    pub session_id:      entities::SessionId,
    pub bidder_email:    String,
    /// Narrows the match to one bid when the bidder holds several at the same amount.
    pub bid_id:          Option<entities::BidId>,
    pub previous_amount: entities::Amount,
    pub new_amount:      entities::Amount,
}

impl ReviseBidInput {
    fn matches(&self, bid: &entities::Bid) -> bool {
        bid.is_placed_by(&self.bidder_email)
            && bid.amount_per_unit == self.previous_amount
            && self.bid_id.map_or(true, |id| id == bid.id)
    }
}

impl Service {
    /// Replaces the amount of one of the caller's bids.
    ///
    /// The bid is identified by its current amount, so a request built from a stale
    /// view of the ledger fails with `BidNotFound` instead of overwriting a newer value.
    #[tracing::instrument(skip_all, fields(session_id = %input.session_id, previous_amount = input.previous_amount, new_amount = input.new_amount), err(level = tracing::Level::TRACE))]
    pub async fn revise_bid(&self, input: ReviseBidInput) -> Result<entities::Bid, RestError> {
        self.update_session(input.session_id, |session, now| {
            verification::ensure_open(session, now)?;
            let index = session
                .bids
                .iter()
                .position(|bid| input.matches(bid))
                .ok_or(RestError::BidNotFound)?;
            verification::validate_revision(session, index, input.new_amount, now)?;

            let bid = &mut session.bids[index];
            bid.amount_per_unit = input.new_amount;
            bid.revised_at = Some(now);
            Ok(bid.clone())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::auction::{
            repository::InMemoryDatabase,
            service::{
                submit_bid::SubmitBidInput,
                tests::{
                    bidder,
                    LOT,
                },
            },
        },
    };

    async fn setup(amounts: &[(&str, entities::Amount)]) -> (Service, entities::SessionId) {
        let service = Service::new_with_mocks(InMemoryDatabase::new());
        let session_id = service.create_test_session(LOT, 100).await;
        for (name, amount) in amounts {
            service
                .submit_bid(SubmitBidInput {
                    session_id,
                    bidder: bidder(name),
                    amount_per_unit: *amount,
                })
                .await
                .unwrap();
        }
        (service, session_id)
    }

    fn revise(
        session_id: entities::SessionId,
        email: &str,
        previous_amount: entities::Amount,
        new_amount: entities::Amount,
    ) -> ReviseBidInput {
        ReviseBidInput {
            session_id,
            bidder_email: email.to_string(),
            bid_id: None,
            previous_amount,
            new_amount,
        }
    }

    #[tokio::test]
    async fn test_revision_keeps_position_and_submission_time() {
        let (service, session_id) = setup(&[("A", 120), ("B", 130)]).await;
        let before = service.repo.get_session(session_id).await.unwrap();

        let revised = service
            .revise_bid(revise(session_id, "A@example.com", 120, 140))
            .await
            .unwrap();
        assert_eq!(revised.id, before.bids[0].id);
        assert_eq!(revised.submitted_at, before.bids[0].submitted_at);
        assert!(revised.revised_at.is_some());

        let after = service.repo.get_session(session_id).await.unwrap();
        assert_eq!(after.bids[0].amount_per_unit, 140);
        assert_eq!(after.bids[1].amount_per_unit, 130);
    }

    #[tokio::test]
    async fn test_stale_previous_amount_is_not_found() {
        let (service, session_id) = setup(&[("A", 120)]).await;
        service
            .revise_bid(revise(session_id, "a@example.com", 120, 150))
            .await
            .unwrap();

        // A second client still showing 120 must not overwrite the 150.
        assert!(matches!(
            service
                .revise_bid(revise(session_id, "a@example.com", 120, 160))
                .await,
            Err(RestError::BidNotFound)
        ));
        assert!(matches!(
            service
                .revise_bid(revise(session_id, "b@example.com", 150, 160))
                .await,
            Err(RestError::BidNotFound)
        ));
    }

    #[tokio::test]
    async fn test_revision_must_not_undercut_other_bids() {
        let (service, session_id) = setup(&[("A", 120), ("B", 150)]).await;
        assert!(matches!(
            service
                .revise_bid(revise(session_id, "a@example.com", 120, 140))
                .await,
            Err(RestError::BelowCurrentHighest { highest: 150 })
        ));
        service
            .revise_bid(revise(session_id, "b@example.com", 150, 155))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_bid_id_selects_among_equal_amounts() {
        let (service, session_id) = setup(&[("A", 120), ("A", 120)]).await;
        let session = service.repo.get_session(session_id).await.unwrap();
        let second = session.bids[1].id;

        service
            .revise_bid(ReviseBidInput {
                bid_id: Some(second),
                ..revise(session_id, "a@example.com", 120, 130)
            })
            .await
            .unwrap();
        let session = service.repo.get_session(session_id).await.unwrap();
        assert_eq!(session.bids[0].amount_per_unit, 120);
        assert_eq!(session.bids[1].amount_per_unit, 130);

        assert!(matches!(
            service
                .revise_bid(ReviseBidInput {
                    bid_id: Some(entities::BidId::new_v4()),
                    ..revise(session_id, "a@example.com", 120, 140)
                })
                .await,
            Err(RestError::BidNotFound)
        ));
    }
}
