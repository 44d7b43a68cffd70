// src/handlers/period.rs

use crate::{
    errors::AppResult,
    models::{
        ApprovePeriodRequest, CalculatePeriodRequest, CreatePeriodRequest, ListPeriodsQuery,
        MarkPaidRequest, PayrollPeriod, PeriodDetail,
    },
    services::period::PeriodService,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

/// Open a new payroll period in Draft
#[utoipa::path(
    post,
    path = "/api/v1/periods",
    request_body = CreatePeriodRequest,
    responses(
        (status = 201, description = "Period created", body = PayrollPeriod),
        (status = 400, description = "Invalid month"),
        (status = 409, description = "Period already exists for that month/year"),
    ),
    tag = "Periods"
)]
pub async fn create_period(
    State(state): State<AppState>,
    Json(body): Json<CreatePeriodRequest>,
) -> AppResult<(StatusCode, Json<PayrollPeriod>)> {
    let period =
        PeriodService::create(&state.db, body.month, body.year, &body.requested_by).await?;
    Ok((StatusCode::CREATED, Json(period)))
}

/// Calculate (or recalculate) every employee's payslip for the period.
/// The previous result set is replaced wholesale in a single transaction.
#[utoipa::path(
    post,
    path = "/api/v1/periods/{period_id}/calculate",
    params(("period_id" = Uuid, Path, description = "Payroll period ID")),
    request_body = CalculatePeriodRequest,
    responses(
        (status = 200, description = "Period calculated", body = PeriodDetail),
        (status = 404, description = "Period not found"),
        (status = 422, description = "Period status forbids calculation, or it has no entries"),
    ),
    tag = "Periods"
)]
pub async fn calculate_period(
    State(state): State<AppState>,
    Path(period_id): Path<Uuid>,
    Json(body): Json<CalculatePeriodRequest>,
) -> AppResult<Json<PeriodDetail>> {
    let detail = PeriodService::calculate(
        &state.db,
        &state.config.calculation,
        period_id,
        &body.requested_by,
    )
    .await?;
    Ok(Json(detail))
}

/// Approve a calculated period, freezing its result set
#[utoipa::path(
    post,
    path = "/api/v1/periods/{period_id}/approve",
    params(("period_id" = Uuid, Path, description = "Payroll period ID")),
    request_body = ApprovePeriodRequest,
    responses(
        (status = 200, description = "Period approved", body = PayrollPeriod),
        (status = 404, description = "Period not found"),
        (status = 422, description = "Period is not in Calculated status"),
    ),
    tag = "Periods"
)]
pub async fn approve_period(
    State(state): State<AppState>,
    Path(period_id): Path<Uuid>,
    Json(body): Json<ApprovePeriodRequest>,
) -> AppResult<Json<PayrollPeriod>> {
    let period =
        PeriodService::approve(&state.db, period_id, &body.requested_by, body.notes).await?;
    Ok(Json(period))
}

/// Record that an approved period has been paid out
#[utoipa::path(
    post,
    path = "/api/v1/periods/{period_id}/pay",
    params(("period_id" = Uuid, Path, description = "Payroll period ID")),
    request_body = MarkPaidRequest,
    responses(
        (status = 200, description = "Period marked paid", body = PayrollPeriod),
        (status = 404, description = "Period not found"),
        (status = 422, description = "Period is not in Approved status"),
    ),
    tag = "Periods"
)]
pub async fn mark_period_paid(
    State(state): State<AppState>,
    Path(period_id): Path<Uuid>,
    Json(body): Json<MarkPaidRequest>,
) -> AppResult<Json<PayrollPeriod>> {
    let period = PeriodService::mark_paid(
        &state.db,
        period_id,
        body.payment_date,
        &body.requested_by,
        body.notes,
    )
    .await?;
    Ok(Json(period))
}

/// Get a period with its results and their component lines
#[utoipa::path(
    get,
    path = "/api/v1/periods/{period_id}",
    params(("period_id" = Uuid, Path, description = "Payroll period ID")),
    responses(
        (status = 200, description = "Period detail", body = PeriodDetail),
        (status = 404, description = "Period not found"),
    ),
    tag = "Periods"
)]
pub async fn get_period(
    State(state): State<AppState>,
    Path(period_id): Path<Uuid>,
) -> AppResult<Json<PeriodDetail>> {
    let detail = PeriodService::get(&state.db, period_id).await?;
    Ok(Json(detail))
}

/// List periods, optionally filtered by year and status
#[utoipa::path(
    get,
    path = "/api/v1/periods",
    params(
        ("year" = Option<i32>, Query, description = "Filter by year"),
        ("status" = Option<String>, Query, description = "Filter by status"),
    ),
    responses((status = 200, description = "List of periods", body = Vec<PayrollPeriod>)),
    tag = "Periods"
)]
pub async fn list_periods(
    State(state): State<AppState>,
    Query(query): Query<ListPeriodsQuery>,
) -> AppResult<Json<Vec<PayrollPeriod>>> {
    let periods = PeriodService::list(&state.db, query.year, query.status).await?;
    Ok(Json(periods))
}
