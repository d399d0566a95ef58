use std::collections::HashMap;

use actix_web::{HttpResponse, http::header, web};

use crate::core::unit::Quantity;

use super::{ApiError, ApiResponse};

/// Values of all `keys` in the query string. Missing and empty values are rejected.
pub(super) fn required_params(query: &str, keys: &[&str]) -> Result<HashMap<String, String>, ApiError> {
    let mut params = web::Query::<HashMap<String, String>>::from_query(query)
        .map_err(|e| ApiError::BadRequest(format!("invalid query: {e}")))?
        .into_inner();

    keys.iter()
        .map(|key| match params.remove(*key) {
            Some(value) if !value.is_empty() => Ok((key.to_string(), value)),
            _ => Err(ApiError::BadRequest(format!("invalid query: missing key '{key}'"))),
        })
        .collect()
}

pub(super) fn parse_quantity<Q: Quantity>(raw: &str) -> Result<Q, ApiError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .and_then(Q::validated)
        .ok_or_else(|| ApiError::BadRequest(format!("invalid {}: '{}'", Q::NAME, raw)))
}

pub(super) fn value_response<Q: Quantity>(value: Q) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(mime::TEXT_PLAIN_UTF_8)
        .body(format!("{:.2}", value.to_f32()))
}

pub(super) fn csv_response<S: serde::Serialize>(rows: impl IntoIterator<Item = S>) -> ApiResponse {
    let mut writer = csv::Writer::from_writer(vec![]);

    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| ApiError::InternalError(format!("Error serializing row to CSV: {e}")))?;
    }

    let csv = writer
        .into_inner()
        .map_err(|e| ApiError::InternalError(format!("Error creating CSV: {e}")))?;

    Ok(HttpResponse::Ok()
        .append_header(header::ContentType(mime::TEXT_CSV))
        .body(csv))
}
