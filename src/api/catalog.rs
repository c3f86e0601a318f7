use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{
    ApiError, ApiResponse, AppState, CatalogEntryDto, LengthsInput, RenameCatalogEntryRequest,
    SetCatalogEntryRequest,
};
use crate::models::SeasonLengths;
use crate::services::Edit;

pub async fn list_catalog(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<CatalogEntryDto>>>, ApiError> {
    let library = state.shared.library.read().await;
    let entries = library
        .catalog
        .iter()
        .map(|(name, show)| CatalogEntryDto::new(name, show))
        .collect();
    Ok(Json(ApiResponse::success(entries)))
}

pub async fn set_entry(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(request): Json<SetCatalogEntryRequest>,
) -> Result<Json<ApiResponse<CatalogEntryDto>>, ApiError> {
    let lengths = match request.episodes_per_season {
        LengthsInput::Structured(lengths) => lengths,
        LengthsInput::Text(text) => text
            .parse::<SeasonLengths>()
            .map_err(|e| ApiError::validation(e.to_string()))?,
    };

    let library = state
        .shared
        .edit(Edit::SetCatalogEntry {
            name: name.clone(),
            lengths,
        })
        .await?;

    let name = name.trim();
    let entry = library
        .catalog
        .get(name)
        .map(|show| CatalogEntryDto::new(name, show))
        .ok_or_else(|| ApiError::NotFound(format!("catalog entry '{name}' not found")))?;
    Ok(Json(ApiResponse::success(entry)))
}

pub async fn rename_entry(
    State(state): State<Arc<AppState>>,
    Path(from): Path<String>,
    Json(request): Json<RenameCatalogEntryRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .shared
        .edit(Edit::RenameCatalogEntry {
            from,
            to: request.name,
        })
        .await?;
    Ok(Json(ApiResponse::success(())))
}

pub async fn remove_entry(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .shared
        .edit(Edit::RemoveCatalogEntry { name })
        .await?;
    Ok(Json(ApiResponse::success(())))
}
