use {
    super::Repository,
    crate::{
        api::RestError,
        auction::entities,
    },
    time::OffsetDateTime,
};

impl Repository {
    /// Sessions open for bidding at `now`, closing soonest first.
    pub async fn get_listed_sessions(
        &self,
        now: OffsetDateTime,
    ) -> Result<Vec<entities::BiddingSession>, RestError> {
        let mut sessions = self.db.get_listed_sessions(now).await?;
        sessions.retain(|s| s.is_listed_at(now));
        sessions.sort_by_key(|s| s.remaining_time(now));
        Ok(sessions)
    }
}
