// src/handlers/employee.rs

use crate::{
    errors::{AppError, AppResult},
    models::{CreateEmployeeRequest, Employee},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

/// Register an employee in the directory
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Invalid dependent count"),
        (status = 409, description = "Tax ID already registered"),
    ),
    tag = "Employees"
)]
pub async fn create_employee(
    State(state): State<AppState>,
    Json(body): Json<CreateEmployeeRequest>,
) -> AppResult<(StatusCode, Json<Employee>)> {
    if body.dependent_count < 0 {
        return Err(AppError::Validation(
            "Dependent count cannot be negative".to_string(),
        ));
    }

    let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM employees WHERE tax_id = $1")
        .bind(&body.tax_id)
        .fetch_optional(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "An employee with tax ID '{}' already exists",
            body.tax_id
        )));
    }

    let employee = sqlx::query_as::<_, Employee>(
        r#"INSERT INTO employees (
            id, full_name, tax_id, department, position, bank_name, bank_account,
            base_salary, dependent_count, is_active, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,true,NOW(),NOW())
        RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(&body.full_name)
    .bind(&body.tax_id)
    .bind(&body.department)
    .bind(&body.position)
    .bind(&body.bank_name)
    .bind(&body.bank_account)
    .bind(body.base_salary)
    .bind(body.dependent_count)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(employee)))
}

/// List all active employees
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    responses((status = 200, description = "List of employees", body = Vec<Employee>)),
    tag = "Employees"
)]
pub async fn list_employees(State(state): State<AppState>) -> AppResult<Json<Vec<Employee>>> {
    let employees = sqlx::query_as::<_, Employee>(
        "SELECT * FROM employees WHERE is_active = true ORDER BY full_name",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(employees))
}

/// Get a specific employee
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee detail", body = Employee),
        (status = 404, description = "Employee not found"),
    ),
    tag = "Employees"
)]
pub async fn get_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> AppResult<Json<Employee>> {
    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
        .bind(employee_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))?;

    Ok(Json(employee))
}
