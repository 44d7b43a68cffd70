// src/handlers/entry.rs

use crate::{
    errors::{AppError, AppResult},
    models::{AddEntryRequest, PayrollEntry, PayrollPeriod},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Record one employee's attendance facts for a period.
/// This is the ingestion path for the external time-tracking source.
#[utoipa::path(
    post,
    path = "/api/v1/periods/{period_id}/entries",
    params(("period_id" = Uuid, Path, description = "Payroll period ID")),
    request_body = AddEntryRequest,
    responses(
        (status = 201, description = "Entry recorded", body = PayrollEntry),
        (status = 400, description = "Negative hours or bonus"),
        (status = 404, description = "Period or employee not found"),
        (status = 409, description = "Entry already exists for this employee and period"),
        (status = 422, description = "Period is past the point of accepting entries"),
    ),
    tag = "Entries"
)]
pub async fn add_entry(
    State(state): State<AppState>,
    Path(period_id): Path<Uuid>,
    Json(body): Json<AddEntryRequest>,
) -> AppResult<(StatusCode, Json<PayrollEntry>)> {
    for (label, value) in [
        ("overtime_hours", body.overtime_hours),
        ("absence_hours", body.absence_hours),
        ("lateness_hours", body.lateness_hours),
        ("bonus_amount", body.bonus_amount),
    ] {
        if value < Decimal::ZERO {
            return Err(AppError::Validation(format!(
                "{} cannot be negative",
                label
            )));
        }
    }

    let period =
        sqlx::query_as::<_, PayrollPeriod>("SELECT * FROM payroll_periods WHERE id = $1")
            .bind(period_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Payroll period {} not found", period_id)))?;

    // Entries may only change while the period itself can still be
    // recalculated.
    period.status.ensure_can_calculate().map_err(|_| {
        AppError::invalid_state("record entries for", period.status)
    })?;

    let employee_exists =
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM employees WHERE id = $1 AND is_active = true")
            .bind(body.employee_id)
            .fetch_optional(&state.db)
            .await?;

    if employee_exists.is_none() {
        return Err(AppError::NotFound(format!(
            "Active employee {} not found",
            body.employee_id
        )));
    }

    let duplicate = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM payroll_entries WHERE period_id = $1 AND employee_id = $2",
    )
    .bind(period_id)
    .bind(body.employee_id)
    .fetch_optional(&state.db)
    .await?;

    if duplicate.is_some() {
        return Err(AppError::Conflict(format!(
            "Employee {} already has an entry in this period",
            body.employee_id
        )));
    }

    let entry = sqlx::query_as::<_, PayrollEntry>(
        r#"INSERT INTO payroll_entries (
            id, period_id, employee_id, overtime_hours, absence_hours,
            lateness_hours, bonus_amount, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,NOW())
        RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(period_id)
    .bind(body.employee_id)
    .bind(body.overtime_hours)
    .bind(body.absence_hours)
    .bind(body.lateness_hours)
    .bind(body.bonus_amount)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// List the attendance entries recorded for a period
#[utoipa::path(
    get,
    path = "/api/v1/periods/{period_id}/entries",
    params(("period_id" = Uuid, Path, description = "Payroll period ID")),
    responses(
        (status = 200, description = "Entries for the period", body = Vec<PayrollEntry>),
        (status = 404, description = "Period not found"),
    ),
    tag = "Entries"
)]
pub async fn list_entries(
    State(state): State<AppState>,
    Path(period_id): Path<Uuid>,
) -> AppResult<Json<Vec<PayrollEntry>>> {
    let exists = sqlx::query_scalar::<_, Uuid>("SELECT id FROM payroll_periods WHERE id = $1")
        .bind(period_id)
        .fetch_optional(&state.db)
        .await?;

    if exists.is_none() {
        return Err(AppError::NotFound(format!(
            "Payroll period {} not found",
            period_id
        )));
    }

    let entries = sqlx::query_as::<_, PayrollEntry>(
        "SELECT * FROM payroll_entries WHERE period_id = $1 ORDER BY created_at",
    )
    .bind(period_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(entries))
}
