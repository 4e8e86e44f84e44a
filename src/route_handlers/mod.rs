use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::{forwarder::DownstreamResponse, payload::FORWARDED_ASYNC};

pub mod actions;
pub mod legacy;
pub mod photos;
pub mod regenerate_all;

/// Replays a downstream reply: same status, same body bytes, same content type.
pub(crate) fn passthrough(response: DownstreamResponse) -> Response {
    let mut res = (response.status, response.body).into_response();

    match response
        .content_type
        .and_then(|ct| HeaderValue::from_str(&ct).ok())
    {
        Some(content_type) => {
            res.headers_mut().insert(header::CONTENT_TYPE, content_type);
        }
        None => {
            res.headers_mut().remove(header::CONTENT_TYPE);
        }
    }

    res
}

pub(crate) fn accepted() -> Response {
    (
        StatusCode::ACCEPTED,
        Json(json!({ "status": "accepted", "info": FORWARDED_ASYNC })),
    )
        .into_response()
}
