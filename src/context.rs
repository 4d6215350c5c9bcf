use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{ReportExporter, ServerConnector};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub connector: Arc<dyn ServerConnector>,
    pub exporter: Arc<dyn ReportExporter>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        connector: Arc<dyn ServerConnector>,
        exporter: Arc<dyn ReportExporter>,
    ) -> Self {
        Self {
            config,
            connector,
            exporter,
        }
    }
}
