// src/services/period.rs

use crate::{
    config::CalculationParams,
    errors::{AppError, AppResult},
    models::{
        Employee, PayrollComponent, PayrollEntry, PayrollPeriod, PayrollResult, PeriodDetail,
        PeriodStatus, ResultDetail, TaxKind,
    },
    services::{
        aggregate::PeriodAggregator,
        brackets::TaxBracketProvider,
        calculator::PayrollCalculator,
        components::ComponentBuilder,
    },
};
use chrono::{NaiveDate, Utc};
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

pub struct PeriodService;

impl PeriodService {
    pub async fn create(
        db: &PgPool,
        month: i32,
        year: i32,
        requested_by: &str,
    ) -> AppResult<PayrollPeriod> {
        if !(1..=12).contains(&month) {
            return Err(AppError::Validation(format!(
                "Month must be between 1 and 12, got {}",
                month
            )));
        }

        let existing = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM payroll_periods WHERE month = $1 AND year = $2",
        )
        .bind(month)
        .bind(year)
        .fetch_optional(db)
        .await?;

        if existing.is_some() {
            return Err(AppError::Conflict(format!(
                "Payroll period {:02}/{} already exists",
                month, year
            )));
        }

        let period = sqlx::query_as::<_, PayrollPeriod>(
            r#"INSERT INTO payroll_periods (id, month, year, status, created_by, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
               RETURNING *"#,
        )
        .bind(Uuid::new_v4())
        .bind(month)
        .bind(year)
        .bind(PeriodStatus::Draft)
        .bind(requested_by)
        .fetch_one(db)
        .await?;

        info!("Created payroll period {:02}/{}", month, year);
        Ok(period)
    }

    /// Run (or re-run) the full calculation for a period. The whole pass is
    /// one transaction: the previous result set is replaced wholesale and
    /// the period totals updated, or nothing is committed at all.
    pub async fn calculate(
        db: &PgPool,
        params: &CalculationParams,
        period_id: Uuid,
        requested_by: &str,
    ) -> AppResult<PeriodDetail> {
        let mut tx = db.begin().await?;

        let period = lock_period(&mut *tx, period_id).await?;
        period.status.ensure_can_calculate()?;

        let entries = sqlx::query_as::<_, PayrollEntry>(
            "SELECT * FROM payroll_entries WHERE period_id = $1 ORDER BY created_at",
        )
        .bind(period_id)
        .fetch_all(&mut *tx)
        .await?;

        if entries.is_empty() {
            return Err(AppError::EmptyPeriod(format!(
                "Period {:02}/{} has no attendance entries to calculate",
                period.month, period.year
            )));
        }

        let reference_date = period_reference_date(&period)?;
        let contribution_brackets =
            TaxBracketProvider::brackets_for(&mut *tx, TaxKind::Contribution, reference_date)
                .await?;
        let income_brackets =
            TaxBracketProvider::brackets_for(&mut *tx, TaxKind::Income, reference_date).await?;

        // Full replace: recalculation never patches prior rows.
        sqlx::query("DELETE FROM payroll_results WHERE period_id = $1")
            .bind(period_id)
            .execute(&mut *tx)
            .await?;

        let calculated_at = Utc::now();
        let mut details = Vec::with_capacity(entries.len());

        for entry in &entries {
            let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
                .bind(entry.employee_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!(
                        "Employee {} referenced by an attendance entry does not exist",
                        entry.employee_id
                    ))
                })?;

            let breakdown = PayrollCalculator::calculate(
                &employee,
                entry,
                &contribution_brackets,
                &income_brackets,
                params,
            );

            let result = PayrollResult {
                id: Uuid::new_v4(),
                period_id,
                employee_id: employee.id,
                // Frozen display snapshot; later master-data edits must not
                // alter this historical slip.
                employee_name: employee.full_name.clone(),
                tax_id: employee.tax_id.clone(),
                department: employee.department.clone(),
                position: employee.position.clone(),
                bank_name: employee.bank_name.clone(),
                bank_account: employee.bank_account.clone(),
                dependent_count: employee.dependent_count,
                base_salary: breakdown.base_salary,
                earnings_total: breakdown.earnings_total,
                deductions_total: breakdown.deductions_total,
                gross_amount: breakdown.gross_amount,
                net_amount: breakdown.net_amount,
                contribution_tax: breakdown.contribution_tax,
                income_tax: breakdown.income_tax,
                calculated_at,
                calculated_by: requested_by.to_string(),
            };

            let components = ComponentBuilder::build(result.id, &breakdown, entry);

            insert_result(&mut *tx, &result).await?;
            for component in &components {
                insert_component(&mut *tx, component).await?;
            }

            details.push(ResultDetail { result, components });
        }

        let results: Vec<PayrollResult> = details.iter().map(|d| d.result.clone()).collect();
        let totals = PeriodAggregator::aggregate(&results)?;

        let period = sqlx::query_as::<_, PayrollPeriod>(
            r#"UPDATE payroll_periods
               SET status = $2,
                   calculated_at = $3,
                   total_gross = $4,
                   total_net = $5,
                   total_contribution_tax = $6,
                   total_income_tax = $7,
                   total_employer_cost = $8,
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(period_id)
        .bind(PeriodStatus::Calculated)
        .bind(calculated_at)
        .bind(totals.gross)
        .bind(totals.net)
        .bind(totals.contribution_tax)
        .bind(totals.income_tax)
        .bind(totals.employer_cost)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Calculated period {:02}/{}: {} employees, total net {}",
            period.month,
            period.year,
            details.len(),
            totals.net
        );

        Ok(PeriodDetail {
            period,
            results: details,
        })
    }

    pub async fn approve(
        db: &PgPool,
        period_id: Uuid,
        requested_by: &str,
        notes: Option<String>,
    ) -> AppResult<PayrollPeriod> {
        let mut tx = db.begin().await?;

        let period = lock_period(&mut *tx, period_id).await?;
        period.status.ensure_can_approve()?;

        let period = sqlx::query_as::<_, PayrollPeriod>(
            r#"UPDATE payroll_periods
               SET status = $2,
                   approved_at = NOW(),
                   approved_by = $3,
                   notes = COALESCE($4, notes),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(period_id)
        .bind(PeriodStatus::Approved)
        .bind(requested_by)
        .bind(notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Approved period {:02}/{} by {}",
            period.month, period.year, requested_by
        );
        Ok(period)
    }

    pub async fn mark_paid(
        db: &PgPool,
        period_id: Uuid,
        payment_date: NaiveDate,
        requested_by: &str,
        notes: Option<String>,
    ) -> AppResult<PayrollPeriod> {
        let mut tx = db.begin().await?;

        let period = lock_period(&mut *tx, period_id).await?;
        period.status.ensure_can_mark_paid()?;

        let period = sqlx::query_as::<_, PayrollPeriod>(
            r#"UPDATE payroll_periods
               SET status = $2,
                   paid_at = NOW(),
                   paid_by = $3,
                   payment_date = $4,
                   notes = COALESCE($5, notes),
                   updated_at = NOW()
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(period_id)
        .bind(PeriodStatus::Paid)
        .bind(requested_by)
        .bind(payment_date)
        .bind(notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Marked period {:02}/{} paid on {} by {}",
            period.month, period.year, payment_date, requested_by
        );
        Ok(period)
    }

    pub async fn get(db: &PgPool, period_id: Uuid) -> AppResult<PeriodDetail> {
        let period =
            sqlx::query_as::<_, PayrollPeriod>("SELECT * FROM payroll_periods WHERE id = $1")
                .bind(period_id)
                .fetch_optional(db)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Payroll period {} not found", period_id))
                })?;

        let results = sqlx::query_as::<_, PayrollResult>(
            "SELECT * FROM payroll_results WHERE period_id = $1 ORDER BY employee_name",
        )
        .bind(period_id)
        .fetch_all(db)
        .await?;

        let result_ids: Vec<Uuid> = results.iter().map(|r| r.id).collect();
        let components = sqlx::query_as::<_, PayrollComponent>(
            "SELECT * FROM payroll_components WHERE result_id = ANY($1) ORDER BY sequence",
        )
        .bind(&result_ids)
        .fetch_all(db)
        .await?;

        let mut by_result: HashMap<Uuid, Vec<PayrollComponent>> = HashMap::new();
        for component in components {
            by_result.entry(component.result_id).or_default().push(component);
        }

        let details = results
            .into_iter()
            .map(|result| {
                let components = by_result.remove(&result.id).unwrap_or_default();
                ResultDetail { result, components }
            })
            .collect();

        Ok(PeriodDetail {
            period,
            results: details,
        })
    }

    pub async fn list(
        db: &PgPool,
        year: Option<i32>,
        status: Option<PeriodStatus>,
    ) -> AppResult<Vec<PayrollPeriod>> {
        let periods = sqlx::query_as::<_, PayrollPeriod>(
            r#"SELECT * FROM payroll_periods
               WHERE ($1::int IS NULL OR year = $1)
                 AND ($2::period_status IS NULL OR status = $2)
               ORDER BY year DESC, month DESC"#,
        )
        .bind(year)
        .bind(status)
        .fetch_all(db)
        .await?;

        Ok(periods)
    }
}

/// Lock the period row for the duration of the transaction so concurrent
/// calculate/approve/pay requests for the same period serialize.
async fn lock_period(conn: &mut PgConnection, period_id: Uuid) -> AppResult<PayrollPeriod> {
    sqlx::query_as::<_, PayrollPeriod>("SELECT * FROM payroll_periods WHERE id = $1 FOR UPDATE")
        .bind(period_id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Payroll period {} not found", period_id)))
}

fn period_reference_date(period: &PayrollPeriod) -> AppResult<NaiveDate> {
    NaiveDate::from_ymd_opt(period.year, period.month as u32, 1).ok_or_else(|| {
        AppError::Internal(format!(
            "Period {} holds an invalid month/year {:02}/{}",
            period.id, period.month, period.year
        ))
    })
}

async fn insert_result(conn: &mut PgConnection, result: &PayrollResult) -> AppResult<()> {
    sqlx::query(
        r#"INSERT INTO payroll_results (
            id, period_id, employee_id, employee_name, tax_id, department, position,
            bank_name, bank_account, dependent_count, base_salary,
            earnings_total, deductions_total, gross_amount, net_amount,
            contribution_tax, income_tax, calculated_at, calculated_by
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19)"#,
    )
    .bind(result.id)
    .bind(result.period_id)
    .bind(result.employee_id)
    .bind(&result.employee_name)
    .bind(&result.tax_id)
    .bind(&result.department)
    .bind(&result.position)
    .bind(&result.bank_name)
    .bind(&result.bank_account)
    .bind(result.dependent_count)
    .bind(result.base_salary)
    .bind(result.earnings_total)
    .bind(result.deductions_total)
    .bind(result.gross_amount)
    .bind(result.net_amount)
    .bind(result.contribution_tax)
    .bind(result.income_tax)
    .bind(result.calculated_at)
    .bind(&result.calculated_by)
    .execute(conn)
    .await?;

    Ok(())
}

async fn insert_component(conn: &mut PgConnection, component: &PayrollComponent) -> AppResult<()> {
    sqlx::query(
        r#"INSERT INTO payroll_components (
            id, result_id, kind, code, description, amount,
            base_amount, reference_hours, taxable, severance_accruable, sequence
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)"#,
    )
    .bind(component.id)
    .bind(component.result_id)
    .bind(component.kind)
    .bind(&component.code)
    .bind(&component.description)
    .bind(component.amount)
    .bind(component.base_amount)
    .bind(component.reference_hours)
    .bind(component.taxable)
    .bind(component.severance_accruable)
    .bind(component.sequence)
    .execute(conn)
    .await?;

    Ok(())
}
