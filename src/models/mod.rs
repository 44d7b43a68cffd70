// src/models/mod.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ─── Employee directory ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Employee {
    pub id: Uuid,
    pub full_name: String,
    pub tax_id: String,
    pub department: String,
    pub position: String,
    pub bank_name: String,
    pub bank_account: String,
    /// Missing salary is allowed and computes as an all-zero payslip.
    pub base_salary: Option<Decimal>,
    pub dependent_count: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEmployeeRequest {
    pub full_name: String,
    pub tax_id: String,
    pub department: String,
    pub position: String,
    pub bank_name: String,
    pub bank_account: String,
    pub base_salary: Option<Decimal>,
    pub dependent_count: i32,
}

// ─── Payroll Period ───────────────────────────────────────────────────────────

// sqlx 0.8: custom Postgres enums need #[sqlx(type_name = "...")] on the enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "period_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    Draft,
    Calculated,
    Approved,
    Paid,
    Locked,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PayrollPeriod {
    pub id: Uuid,
    /// 1..=12
    pub month: i32,
    pub year: i32,
    pub status: PeriodStatus,
    pub calculated_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub paid_by: Option<String>,
    pub payment_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub total_gross: Option<Decimal>,
    pub total_net: Option<Decimal>,
    pub total_contribution_tax: Option<Decimal>,
    pub total_income_tax: Option<Decimal>,
    pub total_employer_cost: Option<Decimal>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePeriodRequest {
    /// 1..=12
    pub month: i32,
    pub year: i32,
    pub requested_by: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CalculatePeriodRequest {
    pub requested_by: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApprovePeriodRequest {
    pub requested_by: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkPaidRequest {
    /// Calendar date of the payment; stored normalized, no time component.
    pub payment_date: NaiveDate,
    pub requested_by: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListPeriodsQuery {
    pub year: Option<i32>,
    pub status: Option<PeriodStatus>,
}

// ─── Attendance entries ───────────────────────────────────────────────────────

/// One employee's raw attendance facts for a period. Supplied by the
/// time-tracking collaborator; the engine never mutates these.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PayrollEntry {
    pub id: Uuid,
    pub period_id: Uuid,
    pub employee_id: Uuid,
    pub overtime_hours: Decimal,
    pub absence_hours: Decimal,
    pub lateness_hours: Decimal,
    pub bonus_amount: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddEntryRequest {
    pub employee_id: Uuid,
    pub overtime_hours: Decimal,
    pub absence_hours: Decimal,
    pub lateness_hours: Decimal,
    pub bonus_amount: Decimal,
}

// ─── Payroll results ──────────────────────────────────────────────────────────

/// The computed outcome for one employee in one period. Employee display
/// fields are frozen copies taken at calculation time; later edits to the
/// live employee record must never alter an already-computed slip.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PayrollResult {
    pub id: Uuid,
    pub period_id: Uuid,
    pub employee_id: Uuid,
    pub employee_name: String,
    pub tax_id: String,
    pub department: String,
    pub position: String,
    pub bank_name: String,
    pub bank_account: String,
    pub dependent_count: i32,
    pub base_salary: Decimal,
    pub earnings_total: Decimal,
    pub deductions_total: Decimal,
    pub gross_amount: Decimal,
    pub net_amount: Decimal,
    pub contribution_tax: Decimal,
    pub income_tax: Decimal,
    pub calculated_at: DateTime<Utc>,
    pub calculated_by: String,
}

// ─── Payroll components ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq)]
#[sqlx(type_name = "component_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Earning,
    Deduction,
}

/// One labeled earning or deduction line belonging to a result.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PayrollComponent {
    pub id: Uuid,
    pub result_id: Uuid,
    pub kind: ComponentKind,
    pub code: String,
    pub description: String,
    pub amount: Decimal,
    pub base_amount: Option<Decimal>,
    pub reference_hours: Option<Decimal>,
    pub taxable: bool,
    pub severance_accruable: bool,
    pub sequence: i32,
}

// ─── Tax brackets ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, ToSchema, PartialEq, Eq, Hash)]
#[sqlx(type_name = "tax_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaxKind {
    Contribution,
    Income,
}

/// One slice of a progressive schedule. `range_end` is `None` for the
/// open-ended top bracket; `rate` is a fraction (0.075 means 7.5%).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TaxBracket {
    pub id: Uuid,
    pub kind: TaxKind,
    pub range_start: Decimal,
    pub range_end: Option<Decimal>,
    pub rate: Decimal,
    pub deduction: Decimal,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    pub sort_order: i32,
    pub is_active: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BracketRow {
    pub range_start: Decimal,
    pub range_end: Option<Decimal>,
    pub rate: Decimal,
    #[serde(default)]
    pub deduction: Decimal,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetBracketsRequest {
    pub kind: TaxKind,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    /// Ordered bottom-up; sort_order is assigned from the list position.
    pub brackets: Vec<BracketRow>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListBracketsQuery {
    pub kind: Option<TaxKind>,
}

// ─── Composite responses ──────────────────────────────────────────────────────

#[derive(Debug, Serialize, ToSchema)]
pub struct ResultDetail {
    #[serde(flatten)]
    pub result: PayrollResult,
    pub components: Vec<PayrollComponent>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PeriodDetail {
    #[serde(flatten)]
    pub period: PayrollPeriod,
    pub results: Vec<ResultDetail>,
}
