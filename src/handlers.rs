use crate::calendar::{YearMonth, parse_record_date, time_of_day_in, today_in};
use crate::errors::AppError;
use crate::models::{
    CreatedResponse, DashboardQuery, NewRecord, RecordUpdate, RecordsQuery, RowId, StoredRow,
    StreaksResponse, TodayResponse,
};
use crate::snapshot::Snapshot;
use crate::state::AppState;
use crate::stats::{ALL_CATEGORIES, Dashboard, build_dashboard, known_categories, today_totals};
use crate::storage::RecordStore;
use crate::streak::streaks;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::{info, warn};

/// Rows newest first; rows that are not readable records sort last.
pub async fn list_records<S: RecordStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<RecordsQuery>,
) -> Result<Json<Vec<StoredRow>>, AppError> {
    let mut rows = state.store.list_records().await?;
    let wanted = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != ALL_CATEGORIES);
    if let Some(wanted) = wanted {
        rows.retain(|row| {
            row.as_record()
                .is_some_and(|record| record.category.trim() == wanted)
        });
    }
    rows.sort_by_key(|row| {
        let date = row.as_record().and_then(|record| parse_record_date(&record.date));
        std::cmp::Reverse((date, row.row_id()))
    });
    Ok(Json(rows))
}

pub async fn create_record<S: RecordStore>(
    State(state): State<AppState<S>>,
    payload: Result<Json<NewRecord>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let Json(mut record) = payload.map_err(|err| AppError::bad_request(err.body_text()))?;

    record.category = record.category.trim().to_string();
    if record.category.is_empty() {
        return Err(AppError::bad_request("category must not be empty"));
    }
    if record.time.as_deref().is_none_or(|time| time.trim().is_empty()) {
        record.time = Some(time_of_day_in(state.settings.timezone));
    }

    let category = record.category.clone();
    let row_id = state.store.append_record(record).await?;
    info!(%row_id, %category, "record appended");

    Ok((StatusCode::CREATED, Json(CreatedResponse { row_id })))
}

pub async fn update_record<S: RecordStore>(
    State(state): State<AppState<S>>,
    Path(row_id): Path<u64>,
    payload: Result<Json<RecordUpdate>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(mut update) = payload.map_err(|err| AppError::bad_request(err.body_text()))?;
    if update.is_empty() {
        return Err(AppError::bad_request("update must change at least one field"));
    }
    if let Some(category) = update.category.take() {
        let category = category.trim().to_string();
        if category.is_empty() {
            return Err(AppError::bad_request("category must not be empty"));
        }
        update.category = Some(category);
    }

    let row_id = RowId(row_id);
    if state.store.update_record(row_id, update).await? {
        info!(%row_id, "record updated");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found(format!("no record with row id {row_id}")))
    }
}

pub async fn get_dashboard<S: RecordStore>(
    State(state): State<AppState<S>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<Dashboard>, AppError> {
    let today = today_in(state.settings.timezone);
    let current = YearMonth::of(today);
    let month = YearMonth::new(
        query.year.unwrap_or(current.year),
        query.month.unwrap_or(current.month),
    )?;

    let snapshot = load_snapshot(state.store.as_ref()).await;
    Ok(Json(build_dashboard(
        today,
        &snapshot,
        &state.settings,
        month,
        query.category.as_deref(),
    )))
}

pub async fn get_streaks<S: RecordStore>(
    State(state): State<AppState<S>>,
) -> Json<StreaksResponse> {
    let today = today_in(state.settings.timezone);
    let snapshot = load_snapshot(state.store.as_ref()).await;
    let categories = known_categories(&snapshot, &state.settings);

    Json(StreaksResponse {
        today,
        streaks: streaks(&snapshot.records, &categories, today),
        dropped_rows: snapshot.dropped,
    })
}

pub async fn get_today<S: RecordStore>(State(state): State<AppState<S>>) -> Json<TodayResponse> {
    let today = today_in(state.settings.timezone);
    let snapshot = load_snapshot(state.store.as_ref()).await;
    Json(today_totals(&snapshot.records, today))
}

/// Analytics read an unavailable store as an empty log.
async fn load_snapshot<S: RecordStore>(store: &S) -> Snapshot {
    match store.list_records().await {
        Ok(rows) => Snapshot::from_rows(&rows),
        Err(err) => {
            warn!("record store unavailable, using empty snapshot: {err}");
            Snapshot::default()
        }
    }
}
