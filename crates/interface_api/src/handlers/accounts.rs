//! Account handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use validator::Validate;

use core_kernel::OwnerId;
use domain_ledger::{Account, AccountView};

use crate::dto::accounts::*;
use crate::{error::ApiError, AppState};

/// Lists the chart of accounts, optionally filtered by code or name
pub async fn list_accounts(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Query(query): Query<AccountQuery>,
) -> Result<Json<Vec<AccountView>>, ApiError> {
    let views = state
        .service
        .list_accounts(owner, query.search.as_deref())
        .await?;
    Ok(Json(views))
}

/// Creates an account
pub async fn create_account(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<Account>), ApiError> {
    request.validate()?;
    let account = state.service.create_account(owner, request.into()).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// Updates name, kind, description or active flag
pub async fn update_account(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Path(code): Path<String>,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<Json<Account>, ApiError> {
    request.validate()?;
    let account = state
        .service
        .update_account(owner, &code, request.into())
        .await?;
    Ok(Json(account))
}

/// Deletes an account without sub-accounts or postings
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Path(code): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_account(owner, &code).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Imports accounts, skipping codes that already exist
pub async fn import_accounts(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Json(requests): Json<Vec<CreateAccountRequest>>,
) -> Result<Json<ImportResponse>, ApiError> {
    for request in &requests {
        request.validate()?;
    }
    let accounts = requests.into_iter().map(Account::from).collect();
    let inserted = state.service.import_accounts(owner, accounts).await?;
    Ok(Json(ImportResponse { inserted }))
}

/// Imports the built-in standard chart of accounts
pub async fn load_standard_chart(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
) -> Result<Json<ImportResponse>, ApiError> {
    let inserted = state.service.load_standard_chart(owner).await?;
    Ok(Json(ImportResponse { inserted }))
}
