use axum::{extract::Path, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PhotosResponse {
    day: String,
    message: String,
}

// Placeholder until photo storage exists; nothing is looked up.
pub async fn handler(Path(day): Path<String>) -> Json<PhotosResponse> {
    let message = format!("Photos for {} are not available yet", day);
    Json(PhotosResponse { day, message })
}
