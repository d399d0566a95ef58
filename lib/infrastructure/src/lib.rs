mod http;
mod monitoring;

pub use monitoring::{EnvFilterConfig, MonitoringConfig, OtlpConfig};

pub use http::server::HttpServerConfig;

pub mod meter {
    pub use super::monitoring::meter::{increment, set};
}
