use axum::{Json, body::Bytes, extract::State};
use std::sync::Arc;

use super::{
    ApiError, ApiResponse, AppState, ScanStartedResponse, ScanStopResponse, StartScanRequest,
};
use crate::services::{ScanScope, ScanStatus};

pub async fn get_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ScanStatus>>, ApiError> {
    Ok(Json(ApiResponse::success(
        state.shared.scanner.status().await,
    )))
}

/// Body is optional; `{"show": 2}` limits the scan to one show.
pub async fn start_scan(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ApiResponse<ScanStartedResponse>>, ApiError> {
    let request: StartScanRequest = if body.iter().all(u8::is_ascii_whitespace) {
        StartScanRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::validation(format!("Invalid scan request: {e}")))?
    };

    let scope = match request.show {
        Some(index) => {
            state.shared.library.read().await.show(index)?;
            ScanScope::Show(index)
        }
        None => ScanScope::All,
    };

    if !state.shared.scanner.start(scope).await {
        return Err(ApiError::conflict("A scan is already running"));
    }

    Ok(Json(ApiResponse::success(ScanStartedResponse {
        started: true,
    })))
}

pub async fn stop_scan(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ScanStopResponse>>, ApiError> {
    let stopping = state.shared.scanner.stop().await;
    Ok(Json(ApiResponse::success(ScanStopResponse { stopping })))
}
