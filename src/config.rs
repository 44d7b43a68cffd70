use dotenvy::dotenv;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub calculation: CalculationParams,
}

/// Jurisdiction-tunable constants used by the per-employee calculation.
/// Injected rather than hard-coded so a tenant can override them via
/// environment without a code change.
#[derive(Debug, Clone, Copy)]
pub struct CalculationParams {
    /// Standard paid hours in a month; divisor for the hourly rate.
    pub standard_monthly_hours: Decimal,
    /// Multiplier applied to the hourly rate for overtime hours.
    pub overtime_multiplier: Decimal,
    /// Amount subtracted from the income-tax base per dependent.
    pub per_dependent_deduction: Decimal,
}

impl Default for CalculationParams {
    fn default() -> Self {
        Self {
            standard_monthly_hours: dec!(220),
            overtime_multiplier: dec!(1.5),
            per_dependent_deduction: dec!(189.59),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let defaults = CalculationParams::default();

        Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("SERVER_PORT must be a valid port number"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            calculation: CalculationParams {
                standard_monthly_hours: decimal_env(
                    "STANDARD_MONTHLY_HOURS",
                    defaults.standard_monthly_hours,
                ),
                overtime_multiplier: decimal_env(
                    "OVERTIME_MULTIPLIER",
                    defaults.overtime_multiplier,
                ),
                per_dependent_deduction: decimal_env(
                    "PER_DEPENDENT_DEDUCTION",
                    defaults.per_dependent_deduction,
                ),
            },
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn decimal_env(key: &str, default: Decimal) -> Decimal {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{} must be a decimal number", key)),
        Err(_) => default,
    }
}
