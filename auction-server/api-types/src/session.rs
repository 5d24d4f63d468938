use {
    crate::{
        bid::Bid,
        subject::{
            SubjectRef,
            SubjectSummary,
        },
        AccessLevel,
        Amount,
        Routable,
        RouteProperties,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    strum::AsRefStr,
    time::OffsetDateTime,
    utoipa::{
        IntoParams,
        ToResponse,
        ToSchema,
    },
    uuid::Uuid,
};

pub type SessionId = Uuid;

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct SessionCreate {
    /// The crop lot to put up for bidding.
    #[schema(example = "lot-2f9c1a")]
    pub subject_ref:    SubjectRef,
    /// Floor price per unit, in the smallest currency unit.
    #[schema(example = 2000)]
    pub minimum_bid:    Amount,
    /// The harvesting month of the lot. Bidding closes at the end of this month.
    /// Both `2025-03` and `March 2025` are accepted.
    #[schema(example = "2025-03")]
    pub harvest_period: String,
}

#[derive(Serialize, Deserialize, ToResponse, ToSchema, Clone, Debug)]
pub struct SessionCreated {
    #[schema(example = "f47ac10b-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub session_id: SessionId,
}

/// The stored status of a session.
#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Ongoing,
    Stopped,
}

/// The phase of a session as seen at response time.
///
/// `ended` is never stored: it is reported for ongoing sessions whose end time has passed.
#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Ongoing,
    Ended,
    Stopped,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct Session {
    #[schema(example = "f47ac10b-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub id:          SessionId,
    #[schema(example = "lot-2f9c1a")]
    pub subject_ref: SubjectRef,
    #[schema(example = 2000)]
    pub minimum_bid: Amount,
    #[schema(example = "2025-03-01T08:00:00Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub start_time:  OffsetDateTime,
    #[schema(example = "2025-03-31T18:29:59.999999999Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub end_time:    OffsetDateTime,
    #[schema(example = "2025-03-31T10:00:00Z", value_type = Option<String>)]
    #[serde(default, with = "crate::serde::nullable_datetime")]
    pub stop_time:   Option<OffsetDateTime>,
    pub status:      SessionStatus,
    pub phase:       SessionPhase,
    /// The highest amount currently on the ledger.
    #[schema(example = 2150)]
    pub highest_bid: Option<Amount>,
    /// Accepted bids in submission order.
    pub bids:        Vec<Bid>,
}

#[derive(Serialize, Deserialize, ToResponse, ToSchema, Clone, Debug)]
pub struct SessionWithSubject {
    pub session: Session,
    pub subject: SubjectSummary,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct ActiveSession {
    pub session:   Session,
    pub subject:   SubjectSummary,
    #[schema(example = 3)]
    pub bid_count: usize,
}

#[derive(Serialize, Deserialize, ToResponse, ToSchema, Clone, Debug)]
pub struct ActiveSessions {
    /// Open sessions, the one closing soonest first.
    pub items: Vec<ActiveSession>,
}

#[derive(Serialize, Deserialize, IntoParams, Clone)]
pub struct SessionParams {
    #[param(example = "f47ac10b-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub session_id: SessionId,
}

#[derive(Serialize, Deserialize, IntoParams, Clone)]
pub struct SubjectParams {
    #[param(example = "lot-2f9c1a")]
    pub subject_ref: SubjectRef,
}

#[derive(AsRefStr, Clone)]
#[strum(prefix = "/")]
pub enum Route {
    #[strum(serialize = "")]
    PostSession,
    #[strum(serialize = "")]
    GetSessions,
    #[strum(serialize = ":session_id")]
    GetSession,
    #[strum(serialize = ":session_id/bids")]
    PostBid,
    #[strum(serialize = ":session_id/bids/revise")]
    PostReviseBid,
    #[strum(serialize = ":session_id/stop")]
    PostStopSession,
}

impl Routable for Route {
    fn properties(&self) -> RouteProperties {
        let full_path = crate::full_path(crate::Route::Session, self);
        let (access_level, method) = match self {
            Route::PostSession => (AccessLevel::LoggedIn, http::Method::POST),
            Route::GetSessions => (AccessLevel::Public, http::Method::GET),
            Route::GetSession => (AccessLevel::Public, http::Method::GET),
            Route::PostBid => (AccessLevel::LoggedIn, http::Method::POST),
            Route::PostReviseBid => (AccessLevel::LoggedIn, http::Method::POST),
            Route::PostStopSession => (AccessLevel::LoggedIn, http::Method::POST),
        };
        RouteProperties {
            access_level,
            method,
            full_path,
        }
    }
}
