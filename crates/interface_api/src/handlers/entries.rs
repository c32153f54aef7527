//! Journal entry handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use core_kernel::{EntryId, OwnerId};
use domain_ledger::JournalLine;

use crate::dto::entries::*;
use crate::dto::reports::PeriodQuery;
use crate::{error::ApiError, AppState};

fn parse_id(id: &str) -> Result<EntryId, ApiError> {
    Ok(id.parse()?)
}

/// Lists entries in a period ordered by date then number
pub async fn list_entries(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<EntryResponse>>, ApiError> {
    let range = query.range()?;
    let entries = state.service.list_entries(owner, Some(range)).await?;
    Ok(Json(entries.into_iter().map(EntryResponse::from).collect()))
}

/// Validates and creates a draft entry
pub async fn create_entry(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Json(request): Json<EntryRequest>,
) -> Result<(StatusCode, Json<EntryResponse>), ApiError> {
    request.validate()?;
    let entry = state.service.create_entry(owner, request.into()).await?;
    Ok((StatusCode::CREATED, Json(entry.into())))
}

/// Gets an entry by ID
pub async fn get_entry(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Path(id): Path<String>,
) -> Result<Json<EntryResponse>, ApiError> {
    let entry = state.service.get_entry(owner, parse_id(&id)?).await?;
    Ok(Json(entry.into()))
}

/// Overwrites header and lines of a draft entry
pub async fn update_entry(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Path(id): Path<String>,
    Json(request): Json<EntryRequest>,
) -> Result<Json<EntryResponse>, ApiError> {
    request.validate()?;
    let entry = state
        .service
        .update_entry(owner, parse_id(&id)?, request.into())
        .await?;
    Ok(Json(entry.into()))
}

/// Replaces only the lines of a draft entry
pub async fn replace_lines(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Path(id): Path<String>,
    Json(request): Json<ReplaceLinesRequest>,
) -> Result<Json<EntryResponse>, ApiError> {
    request.validate()?;
    let lines = request.lines.into_iter().map(JournalLine::from).collect();
    let entry = state
        .service
        .replace_lines(owner, parse_id(&id)?, lines)
        .await?;
    Ok(Json(entry.into()))
}

/// Deletes a draft or voided entry
pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_entry(owner, parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Posts a draft entry
pub async fn post_entry(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Path(id): Path<String>,
) -> Result<Json<EntryResponse>, ApiError> {
    let entry = state.service.post_entry(owner, parse_id(&id)?).await?;
    Ok(Json(entry.into()))
}

/// Voids a draft or posted entry
pub async fn void_entry(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Path(id): Path<String>,
) -> Result<Json<EntryResponse>, ApiError> {
    let entry = state.service.void_entry(owner, parse_id(&id)?).await?;
    Ok(Json(entry.into()))
}
