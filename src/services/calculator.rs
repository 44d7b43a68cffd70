// src/services/calculator.rs

use crate::{
    config::CalculationParams,
    models::{Employee, PayrollEntry, TaxBracket},
};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;

pub struct PayrollCalculator;

/// The full monetary breakdown for one employee in one period, before it is
/// persisted as a result row and expanded into components.
#[derive(Debug, Clone, PartialEq)]
pub struct Breakdown {
    pub base_salary: Decimal,
    pub hourly_rate: Decimal,
    pub overtime_amount: Decimal,
    pub bonus_amount: Decimal,
    pub absence_amount: Decimal,
    pub lateness_amount: Decimal,
    pub earnings_total: Decimal,
    pub pre_tax_deductions: Decimal,
    pub gross_amount: Decimal,
    pub contribution_tax: Decimal,
    pub income_tax: Decimal,
    pub deductions_total: Decimal,
    pub net_amount: Decimal,
}

/// Currency rounding used after every intermediate monetary computation:
/// two decimals, half away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

impl PayrollCalculator {
    /// Calculate one employee's payslip amounts from their base salary,
    /// dependent count, and the period's attendance entry.
    ///
    /// An employee without a configured salary yields an all-zero breakdown
    /// rather than failing the batch; the row is logged so it stays visible.
    pub fn calculate(
        employee: &Employee,
        entry: &PayrollEntry,
        contribution_brackets: &[TaxBracket],
        income_brackets: &[TaxBracket],
        params: &CalculationParams,
    ) -> Breakdown {
        let base_salary = match employee.base_salary {
            Some(salary) => salary,
            None => {
                warn!(
                    "Employee {} ({}) has no configured salary; computing an all-zero slip",
                    employee.id, employee.full_name
                );
                Decimal::ZERO
            }
        };

        let hourly_rate = if params.standard_monthly_hours.is_zero() {
            Decimal::ZERO
        } else {
            round_money(base_salary / params.standard_monthly_hours)
        };

        let overtime_amount =
            round_money(hourly_rate * entry.overtime_hours * params.overtime_multiplier);
        let absence_amount = round_money(hourly_rate * entry.absence_hours);
        let lateness_amount = round_money(hourly_rate * entry.lateness_hours);
        let bonus_amount = round_money(entry.bonus_amount);

        let earnings_total = round_money(base_salary + overtime_amount + bonus_amount);
        let pre_tax_deductions = round_money(absence_amount + lateness_amount);
        let gross_amount = round_money((earnings_total - pre_tax_deductions).max(Decimal::ZERO));

        let contribution_tax = progressive_sum(gross_amount, contribution_brackets);

        let dependent_deduction =
            round_money(Decimal::from(employee.dependent_count) * params.per_dependent_deduction);
        let income_tax_base =
            round_money((gross_amount - contribution_tax - dependent_deduction).max(Decimal::ZERO));
        let income_tax = single_bracket_with_deduction(income_tax_base, income_brackets);

        let deductions_total = round_money(pre_tax_deductions + contribution_tax + income_tax);
        let net_amount = round_money((earnings_total - deductions_total).max(Decimal::ZERO));

        Breakdown {
            base_salary,
            hourly_rate,
            overtime_amount,
            bonus_amount,
            absence_amount,
            lateness_amount,
            earnings_total,
            pre_tax_deductions,
            gross_amount,
            contribution_tax,
            income_tax,
            deductions_total,
            net_amount,
        }
    }
}

/// Bracket-summed progressive tax: each bracket taxes the slice of `base`
/// that falls inside its range; the walk stops at the first bracket whose
/// range the base does not exceed. A closed top bracket acts as a cap —
/// amounts above it are untaxed.
pub fn progressive_sum(base: Decimal, brackets: &[TaxBracket]) -> Decimal {
    let mut total = Decimal::ZERO;

    for bracket in brackets {
        if base <= bracket.range_start {
            break;
        }

        let upper = match bracket.range_end {
            Some(end) => base.min(end),
            None => base,
        };
        total += round_money((upper - bracket.range_start) * bracket.rate);

        match bracket.range_end {
            Some(end) if base > end => continue,
            _ => break,
        }
    }

    round_money(total.max(Decimal::ZERO))
}

/// Single-bracket tax with a fixed deduction: pick the bracket with the
/// largest `range_start` not exceeding `base`, then `base * rate - deduction`
/// clamped to zero. No matching bracket means no tax.
pub fn single_bracket_with_deduction(base: Decimal, brackets: &[TaxBracket]) -> Decimal {
    let bracket = brackets
        .iter()
        .filter(|b| base >= b.range_start)
        .max_by_key(|b| b.range_start);

    match bracket {
        Some(b) => {
            let tax = round_money(base * b.rate) - b.deduction;
            round_money(tax.max(Decimal::ZERO))
        }
        None => Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::brackets::{default_contribution_brackets, default_income_brackets};
    use chrono::Utc;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn test_employee(base_salary: Option<Decimal>, dependent_count: i32) -> Employee {
        Employee {
            id: Uuid::new_v4(),
            full_name: "Ana Souza".to_string(),
            tax_id: "123.456.789-00".to_string(),
            department: "Operations".to_string(),
            position: "Analyst".to_string(),
            bank_name: "Banco Azul".to_string(),
            bank_account: "0001-12345-6".to_string(),
            base_salary,
            dependent_count,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_entry(
        overtime: Decimal,
        absence: Decimal,
        lateness: Decimal,
        bonus: Decimal,
    ) -> PayrollEntry {
        PayrollEntry {
            id: Uuid::new_v4(),
            period_id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            overtime_hours: overtime,
            absence_hours: absence,
            lateness_hours: lateness,
            bonus_amount: bonus,
            created_at: Utc::now(),
        }
    }

    fn params() -> CalculationParams {
        CalculationParams::default()
    }

    #[test]
    fn overtime_at_standard_hours_and_multiplier() {
        // 2200.00 over 220h → hourly 10.00; 10h overtime at 1.5 → 150.00
        let employee = test_employee(Some(dec!(2200.00)), 0);
        let entry = test_entry(dec!(10), dec!(0), dec!(0), dec!(0));

        let b = PayrollCalculator::calculate(
            &employee,
            &entry,
            &default_contribution_brackets(),
            &default_income_brackets(),
            &params(),
        );

        assert_eq!(b.hourly_rate, dec!(10.00));
        assert_eq!(b.overtime_amount, dec!(150.00));
        assert_eq!(b.earnings_total, dec!(2350.00));
        assert_eq!(b.gross_amount, dec!(2350.00));
    }

    #[test]
    fn contribution_tax_at_first_bracket_boundary() {
        // A gross sitting exactly on the first bracket ceiling is taxed
        // entirely at the first rate: 1412.00 × 7.5% = 105.90.
        let tax = progressive_sum(dec!(1412.00), &default_contribution_brackets());
        assert_eq!(tax, dec!(105.90));
    }

    #[test]
    fn contribution_tax_spans_two_brackets() {
        // 2000.00: 1412.00 × 7.5% + (2000.00 − 1412.01) × 9% = 105.90 + 52.92
        let tax = progressive_sum(dec!(2000.00), &default_contribution_brackets());
        assert_eq!(tax, dec!(158.82));
    }

    #[test]
    fn contribution_tax_is_capped_at_top_bracket_end() {
        let brackets = default_contribution_brackets();
        let at_cap = progressive_sum(dec!(7786.02), &brackets);
        let above_cap = progressive_sum(dec!(20000.00), &brackets);
        assert_eq!(at_cap, above_cap);
    }

    #[test]
    fn income_tax_zero_inside_exempt_bracket() {
        let tax = single_bracket_with_deduction(dec!(2259.20), &default_income_brackets());
        assert_eq!(tax, dec!(0.00));
    }

    #[test]
    fn income_tax_zero_just_past_exempt_boundary() {
        // 2259.21 × 7.5% rounds to 169.44, exactly cancelled by the bracket
        // deduction of 169.44.
        let tax = single_bracket_with_deduction(dec!(2259.21), &default_income_brackets());
        assert_eq!(tax, dec!(0.00));
    }

    #[test]
    fn income_tax_positive_in_second_bracket() {
        // 2500.00 × 7.5% − 169.44 = 18.06
        let tax = single_bracket_with_deduction(dec!(2500.00), &default_income_brackets());
        assert_eq!(tax, dec!(18.06));
    }

    #[test]
    fn income_tax_with_no_matching_bracket_is_zero() {
        let brackets = vec![TaxBracket {
            range_start: dec!(1000.00),
            ..default_income_brackets()[1].clone()
        }];
        assert_eq!(
            single_bracket_with_deduction(dec!(500.00), &brackets),
            Decimal::ZERO
        );
    }

    #[test]
    fn missing_salary_yields_all_zero_breakdown() {
        let employee = test_employee(None, 2);
        let entry = test_entry(dec!(12), dec!(4), dec!(1), dec!(0));

        let b = PayrollCalculator::calculate(
            &employee,
            &entry,
            &default_contribution_brackets(),
            &default_income_brackets(),
            &params(),
        );

        assert_eq!(b.earnings_total, Decimal::ZERO);
        assert_eq!(b.gross_amount, Decimal::ZERO);
        assert_eq!(b.net_amount, Decimal::ZERO);
    }

    #[test]
    fn zero_standard_hours_means_zero_hourly_rate() {
        let employee = test_employee(Some(dec!(3000.00)), 0);
        let entry = test_entry(dec!(10), dec!(0), dec!(0), dec!(0));
        let p = CalculationParams {
            standard_monthly_hours: Decimal::ZERO,
            ..CalculationParams::default()
        };

        let b = PayrollCalculator::calculate(
            &employee,
            &entry,
            &default_contribution_brackets(),
            &default_income_brackets(),
            &p,
        );

        assert_eq!(b.hourly_rate, Decimal::ZERO);
        assert_eq!(b.overtime_amount, Decimal::ZERO);
        assert_eq!(b.earnings_total, dec!(3000.00));
    }

    #[test]
    fn absences_and_lateness_reduce_gross_but_not_earnings() {
        let employee = test_employee(Some(dec!(2200.00)), 0);
        let entry = test_entry(dec!(0), dec!(8), dec!(2), dec!(0));

        let b = PayrollCalculator::calculate(
            &employee,
            &entry,
            &default_contribution_brackets(),
            &default_income_brackets(),
            &params(),
        );

        assert_eq!(b.absence_amount, dec!(80.00));
        assert_eq!(b.lateness_amount, dec!(20.00));
        assert_eq!(b.earnings_total, dec!(2200.00));
        assert_eq!(b.pre_tax_deductions, dec!(100.00));
        assert_eq!(b.gross_amount, dec!(2100.00));
    }

    #[test]
    fn dependents_shrink_the_income_tax_base() {
        let employee_without = test_employee(Some(dec!(3200.00)), 0);
        let employee_with = test_employee(Some(dec!(3200.00)), 2);
        let entry = test_entry(dec!(0), dec!(0), dec!(0), dec!(0));

        let without = PayrollCalculator::calculate(
            &employee_without,
            &entry,
            &default_contribution_brackets(),
            &default_income_brackets(),
            &params(),
        );
        let with = PayrollCalculator::calculate(
            &employee_with,
            &entry,
            &default_contribution_brackets(),
            &default_income_brackets(),
            &params(),
        );

        assert!(with.income_tax < without.income_tax);
        assert_eq!(with.contribution_tax, without.contribution_tax);
    }

    #[test]
    fn net_is_earnings_minus_all_deductions() {
        let employee = test_employee(Some(dec!(4500.00)), 1);
        let entry = test_entry(dec!(6), dec!(2), dec!(0), dec!(300.00));

        let b = PayrollCalculator::calculate(
            &employee,
            &entry,
            &default_contribution_brackets(),
            &default_income_brackets(),
            &params(),
        );

        assert_eq!(
            b.deductions_total,
            b.pre_tax_deductions + b.contribution_tax + b.income_tax
        );
        assert_eq!(b.net_amount, b.earnings_total - b.deductions_total);
        assert!(b.net_amount >= Decimal::ZERO);
    }

    #[test]
    fn identical_inputs_produce_identical_breakdowns() {
        let employee = test_employee(Some(dec!(3751.06)), 1);
        let entry = test_entry(dec!(3.5), dec!(1), dec!(0.5), dec!(120.00));

        let run = || {
            PayrollCalculator::calculate(
                &employee,
                &entry,
                &default_contribution_brackets(),
                &default_income_brackets(),
                &params(),
            )
        };

        assert_eq!(run(), run());
    }

    proptest! {
        #[test]
        fn progressive_sum_is_non_negative(cents in 0u64..3_000_000) {
            let base = Decimal::new(cents as i64, 2);
            let tax = progressive_sum(base, &default_contribution_brackets());
            prop_assert!(tax >= Decimal::ZERO);
        }

        #[test]
        fn progressive_sum_is_non_decreasing(
            a in 0u64..3_000_000,
            b in 0u64..3_000_000,
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let brackets = default_contribution_brackets();
            let tax_lo = progressive_sum(Decimal::new(lo as i64, 2), &brackets);
            let tax_hi = progressive_sum(Decimal::new(hi as i64, 2), &brackets);
            prop_assert!(tax_lo <= tax_hi);
        }

        #[test]
        fn net_amount_never_negative(
            salary_cents in 0u64..2_000_000,
            overtime in 0u32..80,
            absence in 0u32..80,
            lateness in 0u32..40,
            bonus_cents in 0u64..500_000,
            dependents in 0i32..6,
        ) {
            let employee = test_employee(Some(Decimal::new(salary_cents as i64, 2)), dependents);
            let entry = test_entry(
                Decimal::from(overtime),
                Decimal::from(absence),
                Decimal::from(lateness),
                Decimal::new(bonus_cents as i64, 2),
            );

            let b = PayrollCalculator::calculate(
                &employee,
                &entry,
                &default_contribution_brackets(),
                &default_income_brackets(),
                &params(),
            );

            prop_assert!(b.net_amount >= Decimal::ZERO);
            prop_assert!(b.gross_amount >= Decimal::ZERO);
        }
    }
}
