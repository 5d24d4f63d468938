use {
    super::{
        entities,
        service::{
            create_session::CreateSessionInput,
            get_active_session_for_subject::GetActiveSessionForSubjectInput,
            get_session::GetSessionInput,
            revise_bid::ReviseBidInput,
            stop_session::StopSessionInput,
            submit_bid::SubmitBidInput,
        },
    },
    crate::{
        api::{
            Auth,
            RestError,
            WrappedRouter,
        },
        models::Principal,
        state::Store,
        subject,
    },
    axum::{
        extract::{
            Path,
            State,
        },
        Json,
        Router,
    },
    crop_auction_api_types::{
        bid::{
            Bid,
            BidCreate,
            BidResult,
            BidRevise,
        },
        session::{
            ActiveSession,
            ActiveSessions,
            Route,
            Session,
            SessionCreate,
            SessionCreated,
            SessionParams,
            SessionPhase,
            SessionStatus,
            SessionWithSubject,
            SubjectParams,
        },
        subject::{
            Route as SubjectRoute,
            SubjectSummary,
        },
        ErrorBodyResponse,
    },
    std::sync::Arc,
    time::OffsetDateTime,
};

fn require_trader(auth: Auth) -> Result<Principal, RestError> {
    let principal = auth.principal()?;
    if !principal.is_trader() {
        return Err(RestError::Forbidden);
    }
    Ok(principal)
}

/// Create a bidding session for a crop lot.
///
/// The caller must own the lot or be an admin. Bidding stays open until the last instant of the harvesting month.
#[utoipa::path(post, path = "/v1/sessions", request_body = SessionCreate, responses(
    (status = 200, description = "Session was created successfully", body = SessionCreated),
    (status = 400, response = ErrorBodyResponse),
    (status = 401, description = "Caller identity is missing", body = ErrorBodyResponse),
    (status = 403, description = "Caller does not own the lot", body = ErrorBodyResponse),
    (status = 409, description = "The lot already has an ongoing session", body = ErrorBodyResponse),
),)]
pub async fn post_session(
    auth: Auth,
    State(store): State<Arc<Store>>,
    Json(session_create): Json<SessionCreate>,
) -> Result<Json<SessionCreated>, RestError> {
    let principal = auth.principal()?;
    let subject = store
        .subject_service
        .get_subject_summary(&session_create.subject_ref)
        .await;
    if !principal.may_manage(&subject) {
        return Err(RestError::Forbidden);
    }
    let session = store
        .auction_service
        .create_session(CreateSessionInput {
            subject_ref:    session_create.subject_ref,
            minimum_bid:    session_create.minimum_bid,
            harvest_period: session_create.harvest_period,
        })
        .await?;
    Ok(Json(SessionCreated {
        session_id: session.id,
    }))
}

/// List sessions open for bidding, the one closing soonest first.
#[utoipa::path(get, path = "/v1/sessions", responses(
    (status = 200, body = ActiveSessions),
    (status = 503, response = ErrorBodyResponse),
),)]
pub async fn get_sessions(
    State(store): State<Arc<Store>>,
) -> Result<Json<ActiveSessions>, RestError> {
    let now = OffsetDateTime::now_utc();
    let sessions = store.auction_service.list_active_sessions().await?;
    Ok(Json(ActiveSessions {
        items: sessions
            .into_iter()
            .map(|details| ActiveSession {
                bid_count: details.session.bids.len(),
                session:   to_session(details.session, now),
                subject:   details.subject.into(),
            })
            .collect(),
    }))
}

/// Query a session and the lot it is for.
#[utoipa::path(get, path = "/v1/sessions/{session_id}",
    params(SessionParams),
    responses(
    (status = 200, body = SessionWithSubject),
    (status = 404, description = "Session was not found", body = ErrorBodyResponse),
),)]
pub async fn get_session(
    State(store): State<Arc<Store>>,
    Path(params): Path<SessionParams>,
) -> Result<Json<SessionWithSubject>, RestError> {
    let details = store
        .auction_service
        .get_session(GetSessionInput {
            session_id: params.session_id,
        })
        .await?;
    Ok(Json(to_session_with_subject(details)))
}

/// Place a bid as the calling trader.
///
/// The amount must reach the minimum bid and match or beat the current highest bid.
#[utoipa::path(post, path = "/v1/sessions/{session_id}/bids", request_body = BidCreate,
    params(SessionParams),
    responses(
    (status = 200, description = "Bid was placed successfully", body = BidResult),
    (status = 400, response = ErrorBodyResponse),
    (status = 404, description = "Session was not found", body = ErrorBodyResponse),
    (status = 409, description = "Session is closed or the amount is below the highest bid", body = ErrorBodyResponse),
),)]
pub async fn post_bid(
    auth: Auth,
    State(store): State<Arc<Store>>,
    Path(params): Path<SessionParams>,
    Json(bid_create): Json<BidCreate>,
) -> Result<Json<BidResult>, RestError> {
    let principal = require_trader(auth)?;
    let bid = store
        .auction_service
        .submit_bid(SubmitBidInput {
            session_id:      params.session_id,
            bidder:          entities::Bidder::new(&principal.name, &principal.email),
            amount_per_unit: bid_create.amount_per_unit,
        })
        .await?;
    Ok(Json(BidResult {
        status: "OK".to_string(),
        bid:    bid.into(),
    }))
}

/// Revise one of the calling trader's bids.
#[utoipa::path(post, path = "/v1/sessions/{session_id}/bids/revise", request_body = BidRevise,
    params(SessionParams),
    responses(
    (status = 200, description = "Bid was revised successfully", body = BidResult),
    (status = 400, response = ErrorBodyResponse),
    (status = 404, description = "Session or bid was not found", body = ErrorBodyResponse),
    (status = 409, description = "Session is closed or the amount is below the highest bid", body = ErrorBodyResponse),
),)]
pub async fn post_revise_bid(
    auth: Auth,
    State(store): State<Arc<Store>>,
    Path(params): Path<SessionParams>,
    Json(bid_revise): Json<BidRevise>,
) -> Result<Json<BidResult>, RestError> {
    let principal = require_trader(auth)?;
    let bid = store
        .auction_service
        .revise_bid(ReviseBidInput {
            session_id:      params.session_id,
            bidder_email:    principal.email,
            bid_id:          bid_revise.bid_id,
            previous_amount: bid_revise.previous_amount,
            new_amount:      bid_revise.new_amount,
        })
        .await?;
    Ok(Json(BidResult {
        status: "OK".to_string(),
        bid:    bid.into(),
    }))
}

/// Stop a session. All bids are discarded and the lot can be listed again.
#[utoipa::path(post, path = "/v1/sessions/{session_id}/stop",
    params(SessionParams),
    responses(
    (status = 200, description = "Session was stopped"),
    (status = 401, description = "Caller identity is missing or the caller does not own the lot", body = ErrorBodyResponse),
    (status = 404, description = "Session was not found", body = ErrorBodyResponse),
),)]
pub async fn post_stop_session(
    auth: Auth,
    State(store): State<Arc<Store>>,
    Path(params): Path<SessionParams>,
) -> Result<Json<()>, RestError> {
    let principal = auth.principal()?;
    let details = store
        .auction_service
        .get_session(GetSessionInput {
            session_id: params.session_id,
        })
        .await?;
    store
        .auction_service
        .stop_session(StopSessionInput {
            session_id: params.session_id,
            authorized: principal.may_manage(&details.subject),
        })
        .await?;
    Ok(Json(()))
}

/// Query the ongoing session of a lot.
#[utoipa::path(get, path = "/v1/subjects/{subject_ref}/session",
    params(SubjectParams),
    responses(
    (status = 200, body = SessionWithSubject),
    (status = 404, description = "The lot has no ongoing session", body = ErrorBodyResponse),
),)]
pub async fn get_subject_session(
    State(store): State<Arc<Store>>,
    Path(params): Path<SubjectParams>,
) -> Result<Json<SessionWithSubject>, RestError> {
    let details = store
        .auction_service
        .get_active_session_for_subject(GetActiveSessionForSubjectInput {
            subject_ref: params.subject_ref,
        })
        .await?;
    Ok(Json(to_session_with_subject(details)))
}

pub fn get_routes() -> Router<Arc<Store>> {
    WrappedRouter::new()
        .route(Route::PostSession, post_session)
        .route(Route::GetSessions, get_sessions)
        .route(Route::GetSession, get_session)
        .route(Route::PostBid, post_bid)
        .route(Route::PostReviseBid, post_revise_bid)
        .route(Route::PostStopSession, post_stop_session)
        .router
}

pub fn get_subject_routes() -> Router<Arc<Store>> {
    WrappedRouter::new()
        .route(SubjectRoute::GetSubjectSession, get_subject_session)
        .router
}

impl From<entities::Bid> for Bid {
    fn from(bid: entities::Bid) -> Self {
        Self {
            id:              bid.id,
            bidder_name:     bid.bidder_name,
            bidder_email:    bid.bidder_email,
            amount_per_unit: bid.amount_per_unit,
            submitted_at:    bid.submitted_at,
            revised_at:      bid.revised_at,
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

impl From<entities::SessionPhase> for SessionPhase {
    fn from(phase: entities::SessionPhase) -> Self {
        match phase {
            entities::SessionPhase::Ongoing => SessionPhase::Ongoing,
            entities::SessionPhase::Ended => SessionPhase::Ended,
            entities::SessionPhase::Stopped => SessionPhase::Stopped,
        }
    }
}

impl From<subject::entities::SubjectSummary> for SubjectSummary {
    fn from(summary: subject::entities::SubjectSummary) -> Self {
        Self {
            subject_ref: summary.subject_ref,
            crop_type:   summary.crop_type,
            district:    summary.district,
            village:     summary.village,
            area_acres:  summary.area_acres,
        }
    }
}

fn to_session(session: entities::BiddingSession, now: OffsetDateTime) -> Session {
    Session {
        id:          session.id,
        phase:       session.phase_at(now).into(),
        highest_bid: session.highest_bid(),
        subject_ref: session.subject_ref,
        minimum_bid: session.minimum_bid,
        start_time:  session.start_time,
        end_time:    session.end_time,
        stop_time:   session.stop_time,
        status:      session.status.into(),
        bids:        session.bids.into_iter().map(Into::into).collect(),
    }
}

fn to_session_with_subject(details: entities::SessionWithSubject) -> SessionWithSubject {
    SessionWithSubject {
        session: to_session(details.session, OffsetDateTime::now_utc()),
        subject: details.subject.into(),
    }
}
