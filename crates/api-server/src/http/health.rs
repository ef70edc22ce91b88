use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use support_core::models::StatusResponse;

pub(super) async fn root_status() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(StatusResponse {
            status: "Server is running!".to_string(),
        }),
    )
}
