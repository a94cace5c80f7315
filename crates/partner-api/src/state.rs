//! Application state

use metrics_exporter_prometheus::PrometheusHandle;
use partner_auth::Authenticator;
use partner_core::SupportPartnerApi;
use std::sync::Arc;

/// Handle used to render the Prometheus exposition
pub type MetricsHandle = PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub api: SupportPartnerApi,
    pub auth: Arc<Authenticator>,
}

impl AppState {
    pub fn new(api: SupportPartnerApi, auth: Arc<Authenticator>) -> Self {
        Self { api, auth }
    }
}
