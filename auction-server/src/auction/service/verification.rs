use {
    crate::{
        api::RestError,
        auction::entities::{
            Amount,
            Bid,
            BiddingSession,
            SessionStatus,
        },
    },
    time::OffsetDateTime,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BidRejection {
    #[error("session is closed")]
    SessionClosed,
    #[error("session ended at {end_time}")]
    SessionExpired { end_time: OffsetDateTime },
    #[error("amount is below the minimum bid of {minimum}")]
    BelowMinimum { minimum: Amount },
    #[error("amount is below the current highest bid of {highest}")]
    BelowCurrentHighest { highest: Amount },
}

impl From<BidRejection> for RestError {
    fn from(rejection: BidRejection) -> Self {
        match rejection {
            BidRejection::SessionClosed => RestError::SessionClosed,
            BidRejection::SessionExpired { end_time } => RestError::SessionExpired { end_time },
            BidRejection::BelowMinimum { minimum } => RestError::BelowMinimum { minimum },
            BidRejection::BelowCurrentHighest { highest } => {
                RestError::BelowCurrentHighest { highest }
            }
        }
    }
}

/// Fails unless the session takes bids at `now`.
pub fn ensure_open(session: &BiddingSession, now: OffsetDateTime) -> Result<(), BidRejection> {
    if session.is_accepting_bids_at(now) {
        return Ok(());
    }
    if session.status != SessionStatus::Ongoing {
        return Err(BidRejection::SessionClosed);
    }
    Err(BidRejection::SessionExpired {
        end_time: session.end_time,
    })
}

fn validate_against<'a>(
    session: &BiddingSession,
    others: impl Iterator<Item = &'a Bid>,
    amount: Amount,
    now: OffsetDateTime,
) -> Result<(), BidRejection> {
    ensure_open(session, now)?;
    if amount < session.minimum_bid {
        return Err(BidRejection::BelowMinimum {
            minimum: session.minimum_bid,
        });
    }
    // Matching the current highest is allowed.
    match others.map(|bid| bid.amount_per_unit).max() {
        Some(highest) if amount < highest => Err(BidRejection::BelowCurrentHighest { highest }),
        _ => Ok(()),
    }
}

pub fn validate_bid(
    session: &BiddingSession,
    amount: Amount,
    now: OffsetDateTime,
) -> Result<(), BidRejection> {
    validate_against(session, session.bids.iter(), amount, now)
}

/// Same rules as [`validate_bid`], with the bid at `replaced_index` left out of the highest amount.
pub fn validate_revision(
    session: &BiddingSession,
    replaced_index: usize,
    new_amount: Amount,
    now: OffsetDateTime,
) -> Result<(), BidRejection> {
    let others = session
        .bids
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != replaced_index)
        .map(|(_, bid)| bid);
    validate_against(session, others, new_amount, now)
}
