// src/openapi.rs

use crate::models::{
    AddEntryRequest, ApprovePeriodRequest, BracketRow, CalculatePeriodRequest, ComponentKind,
    CreateEmployeeRequest, CreatePeriodRequest, Employee, MarkPaidRequest, PayrollComponent,
    PayrollEntry, PayrollPeriod, PayrollResult, PeriodDetail, PeriodStatus, ResultDetail,
    SetBracketsRequest, TaxBracket, TaxKind,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Payroll Period Engine",
        version = "0.1.0",
        description = "Computes earnings, statutory deductions, and net pay for every employee \
            with attendance entries in a payroll period, and governs the period through an \
            auditable Draft → Calculated → Approved → Paid lifecycle. Taxes use configurable \
            progressive bracket schedules with built-in reference defaults.",
        license(name = "MIT")
    ),
    paths(
        // Periods
        crate::handlers::period::create_period,
        crate::handlers::period::list_periods,
        crate::handlers::period::get_period,
        crate::handlers::period::calculate_period,
        crate::handlers::period::approve_period,
        crate::handlers::period::mark_period_paid,
        // Entries
        crate::handlers::entry::add_entry,
        crate::handlers::entry::list_entries,
        // Employees
        crate::handlers::employee::create_employee,
        crate::handlers::employee::list_employees,
        crate::handlers::employee::get_employee,
        // Tax brackets
        crate::handlers::bracket::set_brackets,
        crate::handlers::bracket::list_brackets,
    ),
    components(
        schemas(
            CreatePeriodRequest, CalculatePeriodRequest, ApprovePeriodRequest, MarkPaidRequest,
            PayrollPeriod, PeriodStatus, PeriodDetail, ResultDetail,
            PayrollResult, PayrollComponent, ComponentKind,
            AddEntryRequest, PayrollEntry,
            CreateEmployeeRequest, Employee,
            SetBracketsRequest, BracketRow, TaxBracket, TaxKind,
        )
    ),
    tags(
        (name = "Periods", description = "Create, calculate, approve, and pay payroll periods"),
        (name = "Entries", description = "Attendance entry ingestion per period"),
        (name = "Employees", description = "Employee directory used for salary and snapshot data"),
        (name = "Tax Brackets", description = "Configured progressive tax schedules"),
    )
)]
pub struct ApiDoc;
