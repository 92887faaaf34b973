//! Billing handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use core_kernel::SubjectId;
use domain_billing::BillingError;

use crate::dto::billing::*;
use crate::handlers::today;
use crate::{error::ApiError, AppState};

/// Runs the billing cycle for every subject
///
/// Returns 200 whenever the run itself completes; per-subject failures are
/// reported in `details`.
pub async fn generate_service_charges(
    State(state): State<AppState>,
    Query(query): Query<GenerateQuery>,
) -> Result<Json<BillingRunResponse>, ApiError> {
    let as_of = query.as_of.unwrap_or_else(today);
    let summary = state.generator.generate_due_bills(as_of).await?;
    info!(%as_of, total_bills = summary.total_bills, "Service charges generated");
    Ok(Json(summary.into()))
}

/// Registers a billing subject
pub async fn create_subject(
    State(state): State<AppState>,
    Json(request): Json<SubjectRequest>,
) -> Result<(StatusCode, Json<SubjectResponse>), ApiError> {
    request.validate()?;

    let subject = request.into_subject(state.ledger.currency())?;
    state.billing_store.save_subject(&subject).await?;

    Ok((StatusCode::CREATED, Json(subject.into())))
}

/// Replaces an existing subject's details
///
/// Deactivating a subject here makes later runs report it as skipped.
pub async fn update_subject(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SubjectRequest>,
) -> Result<Json<SubjectResponse>, ApiError> {
    request.validate()?;

    let subject_id = SubjectId::from_uuid(id);
    let existing = state
        .billing_store
        .get_subject(subject_id)
        .await?
        .ok_or(BillingError::SubjectNotFound(subject_id))?;

    let subject = request.apply_to(existing, state.ledger.currency())?;
    state.billing_store.save_subject(&subject).await?;
    info!(subject_id = %subject_id, active = subject.is_active, "Billing subject updated");

    Ok(Json(subject.into()))
}

/// Lists a subject's bills by period
pub async fn list_subject_bills(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<BillResponse>>, ApiError> {
    let subject_id = SubjectId::from_uuid(id);
    if state.billing_store.get_subject(subject_id).await?.is_none() {
        return Err(BillingError::SubjectNotFound(subject_id).into());
    }

    let on = today();
    let bills = state.billing_store.bills_for_subject(subject_id).await?;
    Ok(Json(
        bills.into_iter().map(|bill| BillResponse::new(bill, on)).collect(),
    ))
}
