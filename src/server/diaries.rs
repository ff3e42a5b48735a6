//! Diary entry endpoints.
//!
//! Store calls are blocking (redb), so they run on the blocking pool.

use axum::extract::{Path, Query, State};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::info;

use crate::diary::{resolve_date, DiaryEntry, DiaryStore, DiaryWrite, DATE_FORMAT};
use crate::error::AppError;
use crate::types::{DiaryDeleteResponse, DiaryListQuery, DiaryListResponse, DiaryUpsertRequest};

use super::extractors::MsgPackExtractor;
use super::routes::MsgPack;
use super::AppState;

fn store(state: &AppState) -> Result<Arc<dyn DiaryStore>, AppError> {
    state
        .diaries
        .clone()
        .ok_or_else(|| AppError::DiaryUnavailable("Diary storage not configured".to_string()))
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| AppError::InvalidInput(format!("date must be YYYY-MM-DD, got '{raw}'")))
}

async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(format!("Join error: {}", e)))?
}

/// Create or update the entry for one day
///
/// POST /api/v1/users/:user_id/diaries
pub async fn upsert_entry(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
    MsgPackExtractor(req): MsgPackExtractor<DiaryUpsertRequest>,
) -> Result<MsgPack<DiaryEntry>, AppError> {
    let store = store(&state)?;

    if let Some(label) = &req.emotion {
        label
            .parse::<crate::emotion::Emotion>()
            .map_err(|e| AppError::InvalidInput(e.to_string()))?;
    }

    let write = DiaryWrite {
        date: resolve_date(req.date.as_deref(), Utc::now().date_naive()),
        content: req.content,
        emotion: req.emotion,
        music: req.music,
    };

    let entry = blocking(move || store.upsert(user_id, write).map_err(AppError::from)).await?;

    info!(user_id, date = %entry.date, "Diary entry upserted");
    Ok(MsgPack(entry))
}

/// List a user's entries, newest first
///
/// GET /api/v1/users/:user_id/diaries?limit=30
pub async fn list_entries(
    State(state): State<AppState>,
    Path(user_id): Path<u64>,
    Query(query): Query<DiaryListQuery>,
) -> Result<MsgPack<DiaryListResponse>, AppError> {
    let store = store(&state)?;
    let limit = query.limit;

    let entries = blocking(move || store.list(user_id, limit).map_err(AppError::from)).await?;

    Ok(MsgPack(DiaryListResponse {
        user_id,
        count: entries.len(),
        entries,
    }))
}

/// Fetch one entry
///
/// GET /api/v1/users/:user_id/diaries/:date
pub async fn get_entry(
    State(state): State<AppState>,
    Path((user_id, date)): Path<(u64, String)>,
) -> Result<MsgPack<DiaryEntry>, AppError> {
    let store = store(&state)?;
    let day = parse_date(&date)?;

    blocking(move || store.get(user_id, day).map_err(AppError::from))
        .await?
        .map(MsgPack)
        .ok_or_else(|| AppError::NotFound(format!("No diary entry for user {user_id} on {date}")))
}

/// Delete one entry
///
/// DELETE /api/v1/users/:user_id/diaries/:date
pub async fn delete_entry(
    State(state): State<AppState>,
    Path((user_id, date)): Path<(u64, String)>,
) -> Result<MsgPack<DiaryDeleteResponse>, AppError> {
    let store = store(&state)?;
    let day = parse_date(&date)?;

    let removed = blocking(move || store.remove(user_id, day).map_err(AppError::from)).await?;

    if removed.is_some() {
        info!(user_id, date = %day, "Diary entry deleted");
    }

    Ok(MsgPack(DiaryDeleteResponse {
        user_id,
        date: day.format(DATE_FORMAT).to_string(),
        deleted: removed.is_some(),
    }))
}
