use actix_web::{HttpRequest, HttpResponse, web};
use infrastructure::meter;
use serde::Serialize;

use crate::core::unit::{DutyCycle, Quantity};

use super::support::{csv_response, parse_quantity, value_response};
use super::{ApiError, ApiResponse, HvacApiState};

#[derive(Debug, Serialize)]
struct DutyCycleRow {
    timestamp: String,
    value: String,
}

pub(super) async fn post_duty_cycle(state: web::Data<HvacApiState>, req: HttpRequest) -> ApiResponse {
    let duty_cycle: DutyCycle = parse_quantity(req.query_string())?;

    state
        .duty_cycle
        .append(duty_cycle)
        .await
        .map_err(ApiError::StoreClosed)?;

    tracing::info!("Stored duty cycle {}", duty_cycle);
    meter::set("duty_cycle", duty_cycle.to_f32() as f64, &[]);

    Ok(HttpResponse::NoContent().finish())
}

pub(super) async fn get_duty_cycle(state: web::Data<HvacApiState>) -> ApiResponse {
    match state.duty_cycle.latest().await.map_err(ApiError::StoreClosed)? {
        Some(dp) => {
            tracing::debug!("Latest duty cycle {}", dp);
            Ok(value_response(dp.value))
        }
        None => Err(ApiError::NoData(DutyCycle::NAME)),
    }
}

pub(super) async fn get_history(state: web::Data<HvacApiState>) -> ApiResponse {
    let history = state.duty_cycle.history().await.map_err(ApiError::StoreClosed)?;

    csv_response(history.into_iter().map(|dp| DutyCycleRow {
        timestamp: dp.timestamp.to_iso_string(),
        value: format!("{:.2}", dp.value.to_f32()),
    }))
}
