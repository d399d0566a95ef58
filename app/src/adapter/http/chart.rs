use actix_web::web;
use serde::Serialize;

use crate::building::build_sorted_series;
use crate::core::unit::Quantity;

use super::support::csv_response;
use super::{ApiError, ApiResponse, HvacApiState};

#[derive(Debug, Serialize)]
struct ChartRow {
    series: String,
    timestamp: String,
    value: String,
}

pub(super) async fn get_chart(state: web::Data<HvacApiState>) -> ApiResponse {
    let series = build_sorted_series(&state.building, state.chart_timeout)
        .await
        .map_err(ApiError::ChartIncomplete)?;

    csv_response(series.into_iter().flat_map(|s| {
        let name = s.name.to_string();
        s.points.into_iter().map(move |dp| ChartRow {
            series: name.clone(),
            timestamp: dp.timestamp.to_iso_string(),
            value: format!("{:.2}", dp.value.to_f32()),
        })
    }))
}
