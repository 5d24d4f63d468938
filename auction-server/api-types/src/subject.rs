use {
    crate::{
        AccessLevel,
        Routable,
        RouteProperties,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    strum::AsRefStr,
    utoipa::ToSchema,
};

pub type SubjectRef = String;

/// Display attributes of the crop lot being auctioned.
///
/// Fields are null when the lot could not be resolved.
#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq)]
pub struct SubjectSummary {
    #[schema(example = "lot-2f9c1a")]
    pub subject_ref: SubjectRef,
    #[schema(example = "Wheat")]
    pub crop_type:   Option<String>,
    #[schema(example = "Nashik")]
    pub district:    Option<String>,
    #[schema(example = "Pimpalgaon")]
    pub village:     Option<String>,
    #[schema(example = 4.5)]
    pub area_acres:  Option<f64>,
}

#[derive(AsRefStr, Clone)]
#[strum(prefix = "/")]
pub enum Route {
    #[strum(serialize = ":subject_ref/session")]
    GetSubjectSession,
}

impl Routable for Route {
    fn properties(&self) -> RouteProperties {
        match self {
            Route::GetSubjectSession => RouteProperties {
                access_level: AccessLevel::Public,
                method:       http::Method::GET,
                full_path:    crate::full_path(crate::Route::Subject, self),
            },
        }
    }
}
