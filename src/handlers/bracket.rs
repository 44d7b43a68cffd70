// src/handlers/bracket.rs

use crate::{
    errors::{AppError, AppResult},
    models::{ListBracketsQuery, SetBracketsRequest, TaxBracket},
    state::AppState,
};
use axum::{
    Json,
    extract::{Query, State},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Replace the configured bracket schedule for a tax kind.
/// The previous rows for that kind are deactivated, not deleted, so
/// historical calculations stay auditable.
#[utoipa::path(
    put,
    path = "/api/v1/tax-brackets",
    request_body = SetBracketsRequest,
    responses(
        (status = 200, description = "Schedule replaced", body = Vec<TaxBracket>),
        (status = 400, description = "Invalid schedule"),
    ),
    tag = "Tax Brackets"
)]
pub async fn set_brackets(
    State(state): State<AppState>,
    Json(body): Json<SetBracketsRequest>,
) -> AppResult<Json<Vec<TaxBracket>>> {
    validate_schedule(&body)?;

    let mut tx = state.db.begin().await?;

    sqlx::query("UPDATE tax_brackets SET is_active = false WHERE kind = $1 AND is_active = true")
        .bind(body.kind)
        .execute(&mut *tx)
        .await?;

    let mut saved = Vec::with_capacity(body.brackets.len());
    for (index, row) in body.brackets.iter().enumerate() {
        let bracket = sqlx::query_as::<_, TaxBracket>(
            r#"INSERT INTO tax_brackets (
                id, kind, range_start, range_end, rate, deduction,
                effective_from, effective_to, sort_order, is_active
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,true)
            RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(body.kind)
        .bind(row.range_start)
        .bind(row.range_end)
        .bind(row.rate)
        .bind(row.deduction)
        .bind(body.effective_from)
        .bind(body.effective_to)
        .bind((index + 1) as i32)
        .fetch_one(&mut *tx)
        .await?;
        saved.push(bracket);
    }

    tx.commit().await?;
    Ok(Json(saved))
}

/// List active configured brackets, optionally for one tax kind
#[utoipa::path(
    get,
    path = "/api/v1/tax-brackets",
    params(("kind" = Option<String>, Query, description = "Filter by tax kind")),
    responses((status = 200, description = "Active configured brackets", body = Vec<TaxBracket>)),
    tag = "Tax Brackets"
)]
pub async fn list_brackets(
    State(state): State<AppState>,
    Query(query): Query<ListBracketsQuery>,
) -> AppResult<Json<Vec<TaxBracket>>> {
    let brackets = sqlx::query_as::<_, TaxBracket>(
        r#"SELECT * FROM tax_brackets
           WHERE is_active = true
             AND ($1::tax_kind IS NULL OR kind = $1)
           ORDER BY kind, sort_order, range_start"#,
    )
    .bind(query.kind)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(brackets))
}

fn validate_schedule(body: &SetBracketsRequest) -> AppResult<()> {
    if body.brackets.is_empty() {
        return Err(AppError::Validation(
            "A schedule needs at least one bracket".to_string(),
        ));
    }

    for (index, row) in body.brackets.iter().enumerate() {
        if row.rate < Decimal::ZERO || row.rate > dec!(1) {
            return Err(AppError::Validation(format!(
                "Bracket {} rate must be a fraction between 0 and 1",
                index + 1
            )));
        }
        if row.deduction < Decimal::ZERO {
            return Err(AppError::Validation(format!(
                "Bracket {} deduction cannot be negative",
                index + 1
            )));
        }
        if let Some(end) = row.range_end {
            if end <= row.range_start {
                return Err(AppError::Validation(format!(
                    "Bracket {} range end must exceed its start",
                    index + 1
                )));
            }
        } else if index + 1 != body.brackets.len() {
            return Err(AppError::Validation(
                "Only the top bracket may be open-ended".to_string(),
            ));
        }
    }

    // Ordered and non-overlapping bottom-up. Non-top brackets are closed,
    // checked above.
    for (index, pair) in body.brackets.windows(2).enumerate() {
        if let Some(end) = pair[0].range_end {
            if pair[1].range_start <= end {
                return Err(AppError::Validation(format!(
                    "Bracket {} overlaps the one before it",
                    index + 2
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BracketRow, TaxKind};
    use chrono::NaiveDate;

    fn request(brackets: Vec<BracketRow>) -> SetBracketsRequest {
        SetBracketsRequest {
            kind: TaxKind::Contribution,
            effective_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            effective_to: None,
            brackets,
        }
    }

    fn row(start: Decimal, end: Option<Decimal>, rate: Decimal) -> BracketRow {
        BracketRow {
            range_start: start,
            range_end: end,
            rate,
            deduction: Decimal::ZERO,
        }
    }

    #[test]
    fn a_well_formed_schedule_passes() {
        let req = request(vec![
            row(dec!(0), Some(dec!(1412.00)), dec!(0.075)),
            row(dec!(1412.01), Some(dec!(2666.68)), dec!(0.09)),
            row(dec!(2666.69), None, dec!(0.12)),
        ]);
        assert!(validate_schedule(&req).is_ok());
    }

    #[test]
    fn empty_schedule_is_rejected() {
        assert!(validate_schedule(&request(vec![])).is_err());
    }

    #[test]
    fn overlapping_ranges_are_rejected() {
        let req = request(vec![
            row(dec!(0), Some(dec!(1500.00)), dec!(0.075)),
            row(dec!(1412.01), None, dec!(0.09)),
        ]);
        assert!(validate_schedule(&req).is_err());
    }

    #[test]
    fn open_ended_bracket_below_the_top_is_rejected() {
        let req = request(vec![
            row(dec!(0), None, dec!(0.075)),
            row(dec!(1412.01), None, dec!(0.09)),
        ]);
        assert!(validate_schedule(&req).is_err());
    }

    #[test]
    fn rate_above_one_is_rejected() {
        let req = request(vec![row(dec!(0), None, dec!(7.5))]);
        assert!(validate_schedule(&req).is_err());
    }
}
