mod chart;
mod dashboard;
mod duty_cycle;
mod humidity;
mod support;
mod target;

use std::time::Duration;

use actix_web::{HttpResponse, ResponseError, http::StatusCode, web};
use derive_more::derive::{Display, Error};

use crate::building::{Building, CollectError};
use crate::core::register::SharedValue;
use crate::core::timeseries::{StoreError, TimeSeriesStore};
use crate::core::unit::{DutyCycle, Humidity};

#[derive(Clone)]
pub struct HvacApiState {
    pub building: Building<Humidity>,
    pub target: SharedValue<Humidity>,
    pub duty_cycle: TimeSeriesStore<DutyCycle>,
    pub chart_timeout: Duration,
}

pub fn new_routes(state: HvacApiState) -> actix_web::Scope {
    web::scope("")
        .service(web::resource("/").route(web::get().to(dashboard::get_dashboard)))
        .service(
            web::resource("/humidity")
                .route(web::post().to(humidity::post_reading))
                .route(web::get().to(humidity::get_average)),
        )
        .service(
            web::resource("/target_humidity")
                .route(web::post().to(target::post_target))
                .route(web::get().to(target::get_target)),
        )
        .service(
            web::resource("/duty_cycle")
                .route(web::post().to(duty_cycle::post_duty_cycle))
                .route(web::get().to(duty_cycle::get_duty_cycle)),
        )
        .service(web::resource("/duty_cycle/history").route(web::get().to(duty_cycle::get_history)))
        .service(web::resource("/chart").route(web::get().to(chart::get_chart)))
        .app_data(web::Data::new(state))
}

type ApiResponse = Result<HttpResponse, ApiError>;

#[derive(Debug, Error, Display)]
enum ApiError {
    #[display("{_0}")]
    BadRequest(#[error(not(source))] String),

    #[display("no {_0} data stored on server")]
    NoData(#[error(not(source))] &'static str),

    #[display("Data store unavailable")]
    StoreClosed(StoreError),

    #[display("Chart data unavailable: {_0}")]
    ChartIncomplete(CollectError),

    #[display("Internal error")]
    InternalError(#[error(not(source))] String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NoData(_) => StatusCode::GONE,
            ApiError::StoreClosed(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::ChartIncomplete(CollectError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::ChartIncomplete(CollectError::Store { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::ChartIncomplete(CollectError::TaskFailed(_)) | ApiError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("HvacApiError: {:?}", self);
        } else {
            tracing::warn!("HvacApiError: {:?}", self);
        }

        HttpResponse::build(status)
            .content_type(mime::TEXT_PLAIN_UTF_8)
            .body(self.to_string())
    }
}
