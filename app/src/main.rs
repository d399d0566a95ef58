use std::time::Duration;

use settings::Settings;

use crate::adapter::http::HvacApiState;
use crate::building::Building;
use crate::core::register::SharedValue;
use crate::core::timeseries::TimeSeriesStore;
use crate::core::unit::{DutyCycle, Humidity, Quantity};

mod adapter;
mod building;
mod core;
mod settings;

#[tokio::main(flavor = "multi_thread")]
pub async fn main() {
    let settings = Settings::new().expect("Error reading configuration");
    settings.monitoring.init().expect("Error initializing monitoring");

    let target = Humidity::validated(settings.building.target_humidity as f64)
        .expect("Configured target humidity out of range");

    let state = HvacApiState {
        building: Building::new(&settings.building.rooms, settings.building.humidity_capacity),
        target: SharedValue::new(target),
        duty_cycle: TimeSeriesStore::new(settings.building.duty_cycle_capacity),
        chart_timeout: settings.building.chart_timeout(),
    };

    tracing::info!(
        "Monitoring humidity of {} rooms, chart timeout {:?}",
        state.building.len(),
        state.chart_timeout
    );

    let http_server_exec = {
        let state = state.clone();

        async move {
            settings
                .http_server
                .run_server(move || vec![adapter::http::new_routes(state.clone())])
                .await
                .expect("HTTP server execution failed");
        }
    };

    tokio::select!(
        _ = http_server_exec => {},
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
        },
    );

    shutdown(state).await;
}

async fn shutdown(state: HvacApiState) {
    let closing = async {
        if state.building.close().await.is_err() {
            tracing::warn!("Not all {} stores closed cleanly", Humidity::NAME);
        }
        if let Err(e) = state.duty_cycle.close().await {
            tracing::warn!("Error closing {} store: {}", DutyCycle::NAME, e);
        }
    };

    if tokio::time::timeout(Duration::from_secs(5), closing).await.is_err() {
        tracing::error!("Timeout closing stores");
    }

    tracing::info!("Shutdown completed");
}
