use actix_web::{HttpResponse, web};

use crate::building::DashboardSnapshot;

use super::{ApiError, ApiResponse, HvacApiState};

pub(super) async fn get_dashboard(state: web::Data<HvacApiState>) -> ApiResponse {
    let snapshot = DashboardSnapshot::collect(&state.building, &state.target, &state.duty_cycle)
        .await
        .map_err(ApiError::StoreClosed)?;

    Ok(HttpResponse::Ok().json(snapshot))
}
