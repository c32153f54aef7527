//! Report handlers

use axum::{
    extract::{Query, State},
    Extension, Json,
};

use core_kernel::OwnerId;
use domain_ledger::{GeneralLedger, JournalReport, TrialBalance};

use crate::dto::reports::{GeneralLedgerQuery, PeriodQuery};
use crate::{error::ApiError, AppState};

/// General ledger of one account with running balances
pub async fn general_ledger(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Query(query): Query<GeneralLedgerQuery>,
) -> Result<Json<GeneralLedger>, ApiError> {
    let range = query.range()?;
    let ledger = state
        .service
        .general_ledger(owner, &query.account, range, query.carry_forward)
        .await?;
    Ok(Json(ledger))
}

/// Journal of every entry in the period
pub async fn journal(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<JournalReport>, ApiError> {
    let report = state.service.journal_report(owner, query.range()?).await?;
    Ok(Json(report))
}

/// Per-account sums and balances for the period
pub async fn trial_balance(
    State(state): State<AppState>,
    Extension(owner): Extension<OwnerId>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<TrialBalance>, ApiError> {
    let report = state.service.trial_balance(owner, query.range()?).await?;
    Ok(Json(report))
}
