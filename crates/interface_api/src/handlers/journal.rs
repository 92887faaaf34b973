//! Journal entry handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::JournalEntryId;

use crate::dto::journal::*;
use crate::{error::ApiError, AppState};

/// Posts a balanced entry
///
/// The entry is validated as a whole; nothing is written if any line fails.
pub async fn post_entry(
    State(state): State<AppState>,
    Json(request): Json<PostEntryRequest>,
) -> Result<(StatusCode, Json<EntryResponse>), ApiError> {
    request.validate()?;

    let poster = state.ledger.poster();
    let draft = request.into_draft(state.ledger.currency())?;
    let id = poster.post(draft).await?;
    let entry = poster.get_entry(id).await?;

    Ok((StatusCode::CREATED, Json(entry.into())))
}

pub async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EntryResponse>, ApiError> {
    let entry = state
        .ledger
        .poster()
        .get_entry(JournalEntryId::from_uuid(id))
        .await?;
    Ok(Json(entry.into()))
}

/// Posts the mirror image of an entry
pub async fn reverse_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReverseEntryRequest>,
) -> Result<(StatusCode, Json<EntryResponse>), ApiError> {
    request.validate()?;

    let poster = state.ledger.poster();
    let reversal_id = poster
        .reverse(JournalEntryId::from_uuid(id), request.entry_date, &request.reason)
        .await?;
    let reversal = poster.get_entry(reversal_id).await?;

    Ok((StatusCode::CREATED, Json(reversal.into())))
}
