use {
    crate::{
        auction,
        subject,
    },
    axum_prometheus::metrics_exporter_prometheus::PrometheusHandle,
};

pub struct Store {
    pub auction_service: auction::service::Service,
    pub subject_service: subject::service::Service,
}

pub struct ServerState {
    pub metrics_recorder: PrometheusHandle,
}
