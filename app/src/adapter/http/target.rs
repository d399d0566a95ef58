use actix_web::{HttpRequest, HttpResponse, web};

use crate::core::unit::{Humidity, Quantity};

use super::support::{parse_quantity, value_response};
use super::{ApiError, ApiResponse, HvacApiState};

//the whole query string is the value, as in `POST /target_humidity?40`
pub(super) async fn post_target(state: web::Data<HvacApiState>, req: HttpRequest) -> ApiResponse {
    let target: Humidity = parse_quantity(req.query_string())?;

    state.target.set(target).await;
    tracing::info!("Target humidity set to {}", target);

    Ok(HttpResponse::NoContent().finish())
}

pub(super) async fn get_target(state: web::Data<HvacApiState>) -> ApiResponse {
    state
        .target
        .get()
        .await
        .map(value_response)
        .ok_or(ApiError::NoData(Humidity::NAME))
}
