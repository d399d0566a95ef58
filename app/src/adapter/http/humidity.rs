use actix_web::{HttpRequest, HttpResponse, web};
use infrastructure::meter;

use crate::building::RoomId;
use crate::core::unit::{Humidity, Quantity};

use super::support::{parse_quantity, required_params, value_response};
use super::{ApiError, ApiResponse, HvacApiState};

pub(super) async fn post_reading(state: web::Data<HvacApiState>, req: HttpRequest) -> ApiResponse {
    let params = required_params(req.query_string(), &["room", "humidity"])?;
    let humidity: Humidity = parse_quantity(&params["humidity"])?;
    let room = RoomId::from(params["room"].as_str());

    let store = state
        .building
        .room(&room)
        .ok_or_else(|| ApiError::BadRequest(format!("invalid room ID: '{room}'")))?;

    store.append(humidity).await.map_err(ApiError::StoreClosed)?;

    tracing::info!("Stored {} for room '{}'", humidity, room);
    meter::increment("sensor_readings", &[("quantity", Humidity::NAME), ("room", room.as_str())]);
    meter::set(
        "sensor_value",
        humidity.to_f32() as f64,
        &[("quantity", Humidity::NAME), ("room", room.as_str())],
    );

    Ok(HttpResponse::NoContent().finish())
}

pub(super) async fn get_average(state: web::Data<HvacApiState>) -> ApiResponse {
    match state.building.average().await.map_err(ApiError::StoreClosed)? {
        Some(average) => Ok(value_response(average)),
        None => Err(ApiError::NoData(Humidity::NAME)),
    }
}
