#[cfg(test)]
use mockall::automock;
use {
    super::entities,
    crate::{
        api::RestError,
        kernel::db::DB,
    },
    axum::async_trait,
    serde::{
        Deserialize,
        Serialize,
    },
    sqlx::{
        types::Json,
        FromRow,
    },
    std::fmt::Debug,
    time::{
        OffsetDateTime,
        PrimitiveDateTime,
        UtcOffset,
    },
    tracing::instrument,
    uuid::Uuid,
};

#[derive(Clone, Copy, Debug, PartialEq, sqlx::Type)]
#[sqlx(type_name = "session_status", rename_all = "snake_case")]
pub enum SessionStatus {
    Ongoing,
    Stopped,
}

impl From<SessionStatus> for entities::SessionStatus {
    fn from(status: SessionStatus) -> Self {
        match status {
            SessionStatus::Ongoing => entities::SessionStatus::Ongoing,
            SessionStatus::Stopped => entities::SessionStatus::Stopped,
        }
    }
}

impl From<entities::SessionStatus> for SessionStatus {
    fn from(status: entities::SessionStatus) -> Self {
        match status {
            entities::SessionStatus::Ongoing => SessionStatus::Ongoing,
            entities::SessionStatus::Stopped => SessionStatus::Stopped,
        }
    }
}

/// A bid as stored inside the `bids` JSONB column.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BidRecord {
    pub id:              Uuid,
    pub bidder_name:     String,
    pub bidder_email:    String,
    pub amount_per_unit: entities::Amount,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at:    OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub revised_at:      Option<OffsetDateTime>,
}

impl From<BidRecord> for entities::Bid {
    fn from(record: BidRecord) -> Self {
        Self {
            id:              record.id,
            bidder_name:     record.bidder_name,
            bidder_email:    record.bidder_email,
            amount_per_unit: record.amount_per_unit,
            submitted_at:    record.submitted_at,
            revised_at:      record.revised_at,
        }
    }
}

impl From<&entities::Bid> for BidRecord {
    fn from(bid: &entities::Bid) -> Self {
        Self {
            id:              bid.id,
            bidder_name:     bid.bidder_name.clone(),
            bidder_email:    bid.bidder_email.clone(),
            amount_per_unit: bid.amount_per_unit,
            submitted_at:    bid.submitted_at,
            revised_at:      bid.revised_at,
        }
    }
}

#[derive(Clone, FromRow, Debug)]
pub struct BiddingSession {
    pub id:          entities::SessionId,
    pub subject_ref: String,
    pub minimum_bid: i64,
    pub start_time:  PrimitiveDateTime,
    pub end_time:    PrimitiveDateTime,
    pub stop_time:   Option<PrimitiveDateTime>,
    pub status:      SessionStatus,
    pub bids:        Json<Vec<BidRecord>>,
    pub revision:    i64,
}

fn to_primitive(time: OffsetDateTime) -> PrimitiveDateTime {
    let time = time.to_offset(UtcOffset::UTC);
    PrimitiveDateTime::new(time.date(), time.time())
}

impl BiddingSession {
    fn get_session_entity(self) -> anyhow::Result<entities::BiddingSession> {
        Ok(entities::BiddingSession {
            id:          self.id,
            subject_ref: self.subject_ref,
            minimum_bid: self.minimum_bid.try_into()?,
            start_time:  self.start_time.assume_utc(),
            end_time:    self.end_time.assume_utc(),
            stop_time:   self.stop_time.map(|t| t.assume_utc()),
            status:      self.status.into(),
            bids:        self.bids.0.into_iter().map(Into::into).collect(),
            revision:    self.revision,
        })
    }

    fn from_entity(session: &entities::BiddingSession) -> anyhow::Result<Self> {
        Ok(Self {
            id:          session.id,
            subject_ref: session.subject_ref.clone(),
            minimum_bid: session.minimum_bid.try_into()?,
            start_time:  to_primitive(session.start_time),
            end_time:    to_primitive(session.end_time),
            stop_time:   session.stop_time.map(to_primitive),
            status:      session.status.into(),
            bids:        Json(session.bids.iter().map(Into::into).collect()),
            revision:    session.revision,
        })
    }
}

fn convert_rows(rows: Vec<BiddingSession>) -> Result<Vec<entities::BiddingSession>, RestError> {
    rows.into_iter()
        .map(|row| {
            let id = row.id;
            row.get_session_entity().map_err(|e| {
                tracing::error!(
                    error = e.to_string(),
                    session_id = id.to_string(),
                    "Failed to convert session to entity"
                );
                RestError::TemporarilyUnavailable
            })
        })
        .collect()
}

fn query_failed(e: sqlx::Error, message: &'static str) -> RestError {
    tracing::Span::current().record("result", "error");
    tracing::error!(error = e.to_string(), "{}", message);
    RestError::TemporarilyUnavailable
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Database: Debug + Send + Sync + 'static {
    /// Inserts a new session. Fails with `SessionAlreadyActive` if the subject already has an ongoing one.
    async fn add_session(&self, session: &entities::BiddingSession) -> Result<(), RestError>;
    async fn get_session(
        &self,
        session_id: entities::SessionId,
    ) -> Result<Option<entities::BiddingSession>, RestError>;
    async fn get_ongoing_session_for_subject(
        &self,
        subject_ref: &entities::SubjectRef,
    ) -> Result<Option<entities::BiddingSession>, RestError>;
    /// Ongoing sessions whose end time is after `now`, closing soonest first.
    async fn get_listed_sessions(
        &self,
        now: OffsetDateTime,
    ) -> Result<Vec<entities::BiddingSession>, RestError>;
    /// Writes the session if the stored revision still equals `session.revision`.
    /// Returns false when another writer got there first.
    async fn update_session(&self, session: &entities::BiddingSession) -> Result<bool, RestError>;
}

#[async_trait]
impl Database for DB {
    #[instrument(
        target = "metrics",
        name = "db_add_session",
        fields(
            category = "db_queries",
            result = "success",
            name = "add_session",
            tracing_enabled
        ),
        skip_all
    )]
    async fn add_session(&self, session: &entities::BiddingSession) -> Result<(), RestError> {
        let row = BiddingSession::from_entity(session).map_err(|e| {
            tracing::error!(error = e.to_string(), session = ?session, "Failed to convert session to row");
            RestError::BadParameters("Minimum bid is out of range".to_string())
        })?;
        sqlx::query("INSERT INTO bidding_session (id, subject_ref, minimum_bid, start_time, end_time, stop_time, status, bids, revision) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)")
            .bind(row.id)
            .bind(&row.subject_ref)
            .bind(row.minimum_bid)
            .bind(row.start_time)
            .bind(row.end_time)
            .bind(row.stop_time)
            .bind(row.status)
            .bind(&row.bids)
            .bind(row.revision)
            .execute(self)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_error) if db_error.is_unique_violation() => {
                    RestError::SessionAlreadyActive
                }
                _ => query_failed(e, "DB: Failed to insert session"),
            })?;
        Ok(())
    }

    #[instrument(
        target = "metrics",
        name = "db_get_session",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_session",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_session(
        &self,
        session_id: entities::SessionId,
    ) -> Result<Option<entities::BiddingSession>, RestError> {
        let row: Option<BiddingSession> =
            sqlx::query_as("SELECT * FROM bidding_session WHERE id = $1")
                .bind(session_id)
                .fetch_optional(self)
                .await
                .map_err(|e| query_failed(e, "DB: Failed to get session"))?;
        Ok(convert_rows(row.into_iter().collect())?.pop())
    }

    #[instrument(
        target = "metrics",
        name = "db_get_ongoing_session_for_subject",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_ongoing_session_for_subject",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_ongoing_session_for_subject(
        &self,
        subject_ref: &entities::SubjectRef,
    ) -> Result<Option<entities::BiddingSession>, RestError> {
        let row: Option<BiddingSession> =
            sqlx::query_as("SELECT * FROM bidding_session WHERE subject_ref = $1 AND status = $2")
                .bind(subject_ref)
                .bind(SessionStatus::Ongoing)
                .fetch_optional(self)
                .await
                .map_err(|e| query_failed(e, "DB: Failed to get ongoing session for subject"))?;
        Ok(convert_rows(row.into_iter().collect())?.pop())
    }

    #[instrument(
        target = "metrics",
        name = "db_get_listed_sessions",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_listed_sessions",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_listed_sessions(
        &self,
        now: OffsetDateTime,
    ) -> Result<Vec<entities::BiddingSession>, RestError> {
        let rows: Vec<BiddingSession> = sqlx::query_as(
            "SELECT * FROM bidding_session WHERE status = $1 AND end_time > $2 ORDER BY end_time ASC",
        )
        .bind(SessionStatus::Ongoing)
        .bind(to_primitive(now))
        .fetch_all(self)
        .await
        .map_err(|e| query_failed(e, "DB: Failed to list sessions"))?;
        convert_rows(rows)
    }

    #[instrument(
        target = "metrics",
        name = "db_update_session",
        fields(
            category = "db_queries",
            result = "success",
            name = "update_session",
            tracing_enabled
        ),
        skip_all
    )]
    async fn update_session(&self, session: &entities::BiddingSession) -> Result<bool, RestError> {
        let row = BiddingSession::from_entity(session).map_err(|e| {
            tracing::error!(error = e.to_string(), session = ?session, "Failed to convert session to row");
            RestError::TemporarilyUnavailable
        })?;
        let result = sqlx::query("UPDATE bidding_session SET status = $1, stop_time = $2, bids = $3, revision = $4 WHERE id = $5 AND revision = $6")
            .bind(row.status)
            .bind(row.stop_time)
            .bind(&row.bids)
            .bind(row.revision + 1)
            .bind(row.id)
            .bind(row.revision)
            .execute(self)
            .await
            .map_err(|e| query_failed(e, "DB: Failed to update session"))?;
        Ok(result.rows_affected() == 1)
    }
}
