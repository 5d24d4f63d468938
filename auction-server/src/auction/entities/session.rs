use {
    super::bid::Bid,
    crate::subject::entities::SubjectSummary,
    std::sync::Arc,
    time::OffsetDateTime,
    tokio::sync::Mutex,
    uuid::Uuid,
};

pub type SessionId = Uuid;
pub type SubjectRef = String;
/// Price per unit of produce, in the smallest currency unit.
pub type Amount = u64;
/// Store revision of a session, incremented by every successful write.
pub type Revision = i64;
pub type SessionLock = Arc<Mutex<()>>;
pub type SubjectLock = Arc<Mutex<()>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Ongoing,
    Stopped,
}

/// Status as observed at a point in time. `Ended` is derived and never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Ongoing,
    Ended,
    Stopped,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BiddingSession {
    pub id:          SessionId,
    pub subject_ref: SubjectRef,
    pub minimum_bid: Amount,
    pub start_time:  OffsetDateTime,
    pub end_time:    OffsetDateTime,
    pub stop_time:   Option<OffsetDateTime>,
    pub status:      SessionStatus,
    pub bids:        Vec<Bid>,
    pub revision:    Revision,
}

impl BiddingSession {
    pub fn new(
        subject_ref: SubjectRef,
        minimum_bid: Amount,
        start_time: OffsetDateTime,
        end_time: OffsetDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_ref,
            minimum_bid,
            start_time,
            end_time,
            stop_time: None,
            status: SessionStatus::Ongoing,
            bids: vec![],
            revision: 0,
        }
    }

    pub fn highest_bid(&self) -> Option<Amount> {
        self.bids.iter().map(|bid| bid.amount_per_unit).max()
    }

    /// Moves the session to its terminal state. The ledger is discarded and returned.
    pub fn stop(&mut self, now: OffsetDateTime) -> Vec<Bid> {
        self.status = SessionStatus::Stopped;
        self.stop_time = Some(now);
        std::mem::take(&mut self.bids)
    }
}

/// A session together with the display attributes of its lot.
#[derive(Clone, Debug)]
pub struct SessionWithSubject {
    pub session: BiddingSession,
    pub subject: SubjectSummary,
}
