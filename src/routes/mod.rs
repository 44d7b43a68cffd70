// src/routes/mod.rs

use crate::{
    handlers::{
        bracket::{list_brackets, set_brackets},
        employee::{create_employee, get_employee, list_employees},
        entry::{add_entry, list_entries},
        period::{
            approve_period, calculate_period, create_period, get_period, list_periods,
            mark_period_paid,
        },
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // ─── Periods ──────────────────────────────────────────
        .route("/periods", post(create_period).get(list_periods))
        .route("/periods/{period_id}", get(get_period))
        .route("/periods/{period_id}/calculate", post(calculate_period))
        .route("/periods/{period_id}/approve", post(approve_period))
        .route("/periods/{period_id}/pay", post(mark_period_paid))
        // ─── Attendance entries ───────────────────────────────
        .route(
            "/periods/{period_id}/entries",
            post(add_entry).get(list_entries),
        )
        // ─── Employees ────────────────────────────────────────
        .route("/employees", post(create_employee).get(list_employees))
        .route("/employees/{employee_id}", get(get_employee))
        // ─── Tax Brackets ─────────────────────────────────────
        .route("/tax-brackets", put(set_brackets).get(list_brackets))
}
