use {
    ::serde::{
        Deserialize,
        Serialize,
    },
    strum::AsRefStr,
    utoipa::{
        ToResponse,
        ToSchema,
    },
};

pub mod bid;
pub mod serde;
pub mod session;
pub mod subject;

/// Price per unit of produce, in the smallest currency unit.
pub type Amount = u64;

#[derive(ToResponse, ToSchema, Serialize, Deserialize, Debug)]
#[response(description = "An error occurred processing the request")]
pub struct ErrorBodyResponse {
    pub error: String,
}

#[derive(AsRefStr, Clone, Copy, Debug)]
#[strum(prefix = "/")]
pub enum Route {
    #[strum(serialize = "v1")]
    V1,
    #[strum(serialize = "sessions")]
    Session,
    #[strum(serialize = "subjects")]
    Subject,
    #[strum(serialize = "")]
    Root,
    #[strum(serialize = "live")]
    Liveness,
    #[strum(serialize = "docs")]
    Docs,
    #[strum(serialize = "docs/openapi.json")]
    OpenApi,
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum AccessLevel {
    /// Requires a principal forwarded by the gateway.
    LoggedIn,
    Public,
}

pub struct RouteProperties {
    pub access_level: AccessLevel,
    pub method:       http::Method,
    pub full_path:    String,
}

pub trait Routable: AsRef<str> + Clone {
    fn properties(&self) -> RouteProperties;
}

fn full_path(group: Route, route: &impl AsRef<str>) -> String {
    format!("{}{}{}", Route::V1.as_ref(), group.as_ref(), route.as_ref())
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::{
        session,
        subject,
        AccessLevel,
        Routable,
        Route,
    };

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::V1.as_ref(), "/v1");
        assert_eq!(Route::Session.as_ref(), "/sessions");
        assert_eq!(Route::Root.as_ref(), "/");
        assert_eq!(Route::OpenApi.as_ref(), "/docs/openapi.json");
    }

    #[test]
    fn test_full_paths() {
        let list = session::Route::GetSessions.properties();
        assert_eq!(list.full_path, "/v1/sessions");
        assert_eq!(list.method, http::Method::GET);
        assert_eq!(list.access_level, AccessLevel::Public);

        let revise = session::Route::PostReviseBid.properties();
        assert_eq!(revise.full_path, "/v1/sessions/:session_id/bids/revise");
        assert_eq!(revise.access_level, AccessLevel::LoggedIn);

        assert_eq!(
            subject::Route::GetSubjectSession.properties().full_path,
            "/v1/subjects/:subject_ref/session"
        );
    }
}
