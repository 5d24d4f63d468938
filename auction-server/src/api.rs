use {
    crate::{
        auction::{
            self,
            entities::Amount,
        },
        config::RunOptions,
        models,
        server::{
            EXIT_CHECK_INTERVAL,
            SHOULD_EXIT,
        },
        state::Store,
    },
    anyhow::Result,
    axum::{
        async_trait,
        extract::{
            FromRequestParts,
            Request,
        },
        handler::Handler,
        http::{
            request::Parts,
            HeaderMap,
            Method,
            StatusCode,
        },
        middleware::{
            self,
            Next,
        },
        response::{
            IntoResponse,
            Response,
        },
        routing::{
            delete,
            get,
            post,
            put,
        },
        Json,
        Router,
    },
    clap::crate_version,
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
            Session,
            SessionCreate,
            SessionCreated,
            SessionPhase,
            SessionStatus,
            SessionWithSubject,
        },
        subject::SubjectSummary,
        AccessLevel,
        ErrorBodyResponse,
        Routable,
        Route,
    },
    std::{
        fmt::{
            Display,
            Formatter,
        },
        sync::{
            atomic::Ordering,
            Arc,
        },
    },
    time::OffsetDateTime,
    tower_http::cors::CorsLayer,
    utoipa::OpenApi,
    utoipa_redoc::{
        Redoc,
        Servable,
    },
};

async fn root() -> String {
    format!("Crop Auction Server API {}", crate_version!())
}

#[derive(Debug)]
pub enum RestError {
    /// The request contained invalid parameters
    BadParameters(String),
    /// The session was not found
    SessionNotFound,
    /// The subject already has an ongoing session
    SessionAlreadyActive,
    /// The session was stopped by its owner
    SessionClosed,
    /// The session reached its end time
    SessionExpired { end_time: OffsetDateTime },
    /// The amount is below the session floor price
    BelowMinimum { minimum: Amount },
    /// The amount is below the highest bid on the ledger
    BelowCurrentHighest { highest: Amount },
    /// No bid matched the revision request
    BidNotFound,
    /// The request carried no caller identity
    Unauthorized,
    /// The caller is not allowed to perform this action
    Forbidden,
    /// Internal error occurred during processing the request
    TemporarilyUnavailable,
}

impl RestError {
    pub fn to_status_and_message(&self) -> (StatusCode, String) {
        match self {
            RestError::BadParameters(msg) => {
                (StatusCode::BAD_REQUEST, format!("Bad parameters: {}", msg))
            }
            RestError::SessionNotFound => (
                StatusCode::NOT_FOUND,
                "Session with the specified id was not found".to_string(),
            ),
            RestError::SessionAlreadyActive => (
                StatusCode::CONFLICT,
                "An ongoing session already exists for this subject".to_string(),
            ),
            RestError::SessionClosed => (
                StatusCode::CONFLICT,
                "Bidding for this session has been closed".to_string(),
            ),
            RestError::SessionExpired { end_time } => (
                StatusCode::CONFLICT,
                format!("Bidding for this session ended at {}", end_time),
            ),
            RestError::BelowMinimum { minimum } => (
                StatusCode::BAD_REQUEST,
                format!("Bid amount must be at least the minimum bid of {}", minimum),
            ),
            RestError::BelowCurrentHighest { highest } => (
                StatusCode::CONFLICT,
                format!(
                    "Bid amount must be at least the current highest bid of {}",
                    highest
                ),
            ),
            RestError::BidNotFound => (
                StatusCode::NOT_FOUND,
                "No bid matched the given bidder and previous amount".to_string(),
            ),
            RestError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "A caller identity is required".to_string(),
            ),
            RestError::Forbidden => (
                StatusCode::FORBIDDEN,
                "The caller is not allowed to perform this action".to_string(),
            ),
            RestError::TemporarilyUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "This service is temporarily unavailable".to_string(),
            ),
        }
    }
}

impl Display for RestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_status_and_message().1)
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let (status, msg) = self.to_status_and_message();
        (status, Json(ErrorBodyResponse { error: msg })).into_response()
    }
}

pub async fn live() -> Response {
    (StatusCode::OK, "OK").into_response()
}

const PRINCIPAL_ID_HEADER: &str = "x-principal-id";
const PRINCIPAL_NAME_HEADER: &str = "x-principal-name";
const PRINCIPAL_EMAIL_HEADER: &str = "x-principal-email";
const PRINCIPAL_ROLE_HEADER: &str = "x-principal-role";

/// Caller identity as forwarded by the authenticating gateway.
#[derive(Clone, Debug)]
pub enum Auth {
    Authorized(models::Principal),
    Unauthenticated,
}

impl Auth {
    pub fn principal(self) -> Result<models::Principal, RestError> {
        match self {
            Auth::Authorized(principal) => Ok(principal),
            Auth::Unauthenticated => Err(RestError::Unauthorized),
        }
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, RestError> {
    headers
        .get(name)
        .ok_or_else(|| RestError::BadParameters(format!("Missing header {}", name)))?
        .to_str()
        .map(str::trim)
        .map_err(|_| RestError::BadParameters(format!("Invalid header {}", name)))
}

fn parse_principal(headers: &HeaderMap) -> Result<Auth, RestError> {
    if !headers.contains_key(PRINCIPAL_ID_HEADER) {
        return Ok(Auth::Unauthenticated);
    }
    let role = header_value(headers, PRINCIPAL_ROLE_HEADER)?;
    Ok(Auth::Authorized(models::Principal {
        id:    header_value(headers, PRINCIPAL_ID_HEADER)?.to_string(),
        name:  header_value(headers, PRINCIPAL_NAME_HEADER)?.to_string(),
        email: header_value(headers, PRINCIPAL_EMAIL_HEADER)?.to_string(),
        role:  role
            .parse()
            .map_err(|_| RestError::BadParameters(format!("Unknown role {}", role)))?,
    }))
}

#[async_trait]
impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = RestError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parse_principal(&parts.headers)
    }
}

async fn require_login(auth: Auth, req: Request, next: Next) -> Result<Response, RestError> {
    auth.principal()?;
    Ok(next.run(req).await)
}

pub struct WrappedRouter {
    pub router: Router<Arc<Store>>,
}

impl WrappedRouter {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    pub fn route<H, T>(self, route: impl Routable, handler: H) -> Self
    where
        H: Handler<T, Arc<Store>>,
        T: 'static,
    {
        let properties = route.properties();
        let mut method_router = match properties.method {
            Method::POST => post(handler),
            Method::PUT => put(handler),
            Method::DELETE => delete(handler),
            _ => get(handler),
        };
        if properties.access_level == AccessLevel::LoggedIn {
            method_router = method_router.route_layer(middleware::from_fn(require_login));
        }
        Self {
            router: self.router.route(&properties.full_path, method_router),
        }
    }
}

pub async fn start_api(run_options: RunOptions, store: Arc<Store>) -> Result<()> {
    // Make sure functions included in the paths section have distinct names, otherwise some api generators will fail
    #[derive(OpenApi)]
    #[openapi(
    paths(
    auction::api::post_session,
    auction::api::get_sessions,
    auction::api::get_session,
    auction::api::post_bid,
    auction::api::post_revise_bid,
    auction::api::post_stop_session,
    auction::api::get_subject_session,
    ),
    components(
    schemas(
    ActiveSession,
    ActiveSessions,
    Bid,
    BidCreate,
    BidResult,
    BidRevise,
    ErrorBodyResponse,
    Session,
    SessionCreate,
    SessionCreated,
    SessionPhase,
    SessionStatus,
    SessionWithSubject,
    SubjectSummary,
    ),
    responses(
    ErrorBodyResponse,
    ActiveSessions,
    BidResult,
    SessionCreated,
    SessionWithSubject,
    ),
    ),
    tags(
    (name = "Crop Auction Server", description = "Auction Server runs time-boxed bidding sessions for harvestable crop lots.\
    Producers list a lot with a floor price and traders compete with monotonically increasing bids until the harvesting month ends.")
    )
    )]
    struct ApiDoc;

    let app: Router<()> = Router::new()
        .merge(Redoc::with_url(Route::Docs.as_ref(), ApiDoc::openapi()))
        .route(
            Route::OpenApi.as_ref(),
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        .merge(auction::api::get_routes())
        .merge(auction::api::get_subject_routes())
        .route(Route::Root.as_ref(), get(root))
        .route(Route::Liveness.as_ref(), get(live))
        .layer(CorsLayer::permissive())
        .with_state(store);

    let listener = tokio::net::TcpListener::bind(&run_options.server.listen_addr).await?;
    tracing::info!(listen_addr = %run_options.server.listen_addr, "Starting RPC server...");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            while !SHOULD_EXIT.load(Ordering::Acquire) {
                tokio::time::sleep(EXIT_CHECK_INTERVAL).await;
            }
            tracing::info!("Shutting down RPC server...");
        })
        .await?;
    Ok(())
}
