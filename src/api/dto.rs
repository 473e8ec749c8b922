use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;

pub const ENERGY_USAGE_FIELD: &str = "energy-usage";

/// Request body for `POST /api/{device_id}`.
///
/// Only used to describe the body in the OpenAPI document; the handler
/// decodes through [`decode_energy_usage`] so missing and mistyped fields
/// are told apart.
#[derive(Debug, ToSchema)]
pub struct UsageReadingRequest {
    #[schema(rename = "energy-usage")]
    pub energy_usage: i64,
}

/// Response for `GET /api/{device_id}`. Readings are in arrival order.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TotalEnergyUsageResponse {
    #[serde(rename = "total-energy-usage")]
    pub total_energy_usage: Vec<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReadingError {
    #[error("request body has no `energy-usage` field")]
    MissingField,
    #[error("`energy-usage` is not an integer")]
    InvalidType,
}

/// Decode the `energy-usage` reading out of a raw request body.
///
/// The body is only parsed when `content_type` is `application/json`. Any
/// other content type, or a body that is empty, not JSON, or not a JSON
/// object, counts as an object with no fields and yields `MissingField`.
/// Integral floats such as `600.0` are accepted; anything with a fractional
/// part, or outside `i64`, is `InvalidType`.
pub fn decode_energy_usage(
    content_type: Option<&str>,
    body: &[u8],
) -> Result<i64, ReadingError> {
    let body: Value = if content_type.is_some_and(is_json) {
        serde_json::from_slice(body).unwrap_or(Value::Null)
    } else {
        Value::Null
    };
    let field = body
        .get(ENERGY_USAGE_FIELD)
        .ok_or(ReadingError::MissingField)?;
    as_integer(field).ok_or(ReadingError::InvalidType)
}

/// `application/json`, ignoring parameters such as `charset`.
fn is_json(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

fn as_integer(v: &Value) -> Option<i64> {
    if let Some(i) = v.as_i64() {
        return Some(i);
    }

    // 2^63 as f64; `i64::MAX as f64` rounds up to this, so compare strictly.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    let f = v.as_f64()?;
    (f.fract() == 0.0 && f >= -LIMIT && f < LIMIT).then_some(f as i64)
}
