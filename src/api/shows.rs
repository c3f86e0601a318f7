use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, ShowDto};
use crate::models::ShowForm;
use crate::services::{Edit, EpisodeRow, episode_rows};

pub async fn list_shows(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<ShowDto>>>, ApiError> {
    let library = state.shared.library.read().await;
    let shows = library
        .shows
        .iter()
        .enumerate()
        .map(|(index, show)| ShowDto::new(index, show))
        .collect();
    Ok(Json(ApiResponse::success(shows)))
}

pub async fn get_show(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Json<ApiResponse<ShowDto>>, ApiError> {
    let library = state.shared.library.read().await;
    let show = library.show(index)?;
    Ok(Json(ApiResponse::success(ShowDto::new(index, show))))
}

pub async fn add_show(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ShowForm>,
) -> Result<Json<ApiResponse<ShowDto>>, ApiError> {
    let library = state.shared.edit(Edit::AddShow(form)).await?;
    let index = library.shows.len().saturating_sub(1);
    let show = library.show(index)?;
    tracing::info!(show = %show.primary_name(), index, "Added tracked show");
    Ok(Json(ApiResponse::success(ShowDto::new(index, show))))
}

pub async fn update_show(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
    Json(form): Json<ShowForm>,
) -> Result<Json<ApiResponse<ShowDto>>, ApiError> {
    let library = state.shared.edit(Edit::UpdateShow { index, form }).await?;
    let show = library.show(index)?;
    Ok(Json(ApiResponse::success(ShowDto::new(index, show))))
}

pub async fn remove_show(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.shared.edit(Edit::RemoveShow { index }).await?;
    tracing::info!(index, "Removed tracked show");
    Ok(Json(ApiResponse::success(())))
}

pub async fn reset_show(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Json<ApiResponse<ShowDto>>, ApiError> {
    let library = state.shared.edit(Edit::ResetShow { index }).await?;
    let show = library.show(index)?;
    Ok(Json(ApiResponse::success(ShowDto::new(index, show))))
}

pub async fn list_episodes(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Result<Json<ApiResponse<Vec<EpisodeRow>>>, ApiError> {
    let library = state.shared.library.read().await;
    let show = library.show(index)?;
    Ok(Json(ApiResponse::success(episode_rows(
        show,
        &library.catalog,
    ))))
}
