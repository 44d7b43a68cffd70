// src/services/aggregate.rs

use crate::{
    errors::{AppError, AppResult},
    models::PayrollResult,
};
use rust_decimal::Decimal;

pub struct PeriodAggregator;

/// Period-level totals rolled up from a full result set.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodTotals {
    pub gross: Decimal,
    pub net: Decimal,
    pub contribution_tax: Decimal,
    pub income_tax: Decimal,
    pub employer_cost: Decimal,
}

impl PeriodAggregator {
    /// Sum a period's results into its totals. An empty result set aborts
    /// the calculation: a period with no computable employees cannot be
    /// marked Calculated.
    pub fn aggregate(results: &[PayrollResult]) -> AppResult<PeriodTotals> {
        Self::aggregate_with(results, |_| Decimal::ZERO)
    }

    /// Like [`aggregate`](Self::aggregate), with a per-result extra
    /// employer-side cost added to the employer cost total.
    pub fn aggregate_with<F>(results: &[PayrollResult], extra_employer_cost: F) -> AppResult<PeriodTotals>
    where
        F: Fn(&PayrollResult) -> Decimal,
    {
        if results.is_empty() {
            return Err(AppError::EmptyPeriod(
                "aggregation requires at least one result".to_string(),
            ));
        }

        let mut totals = PeriodTotals {
            gross: Decimal::ZERO,
            net: Decimal::ZERO,
            contribution_tax: Decimal::ZERO,
            income_tax: Decimal::ZERO,
            employer_cost: Decimal::ZERO,
        };

        for result in results {
            totals.gross += result.gross_amount;
            totals.net += result.net_amount;
            totals.contribution_tax += result.contribution_tax;
            totals.income_tax += result.income_tax;
            totals.employer_cost += result.gross_amount + extra_employer_cost(result);
        }

        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn result(gross: Decimal, net: Decimal, contribution: Decimal, income: Decimal) -> PayrollResult {
        PayrollResult {
            id: Uuid::new_v4(),
            period_id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            employee_name: "Maria Dias".to_string(),
            tax_id: "111.222.333-44".to_string(),
            department: "Finance".to_string(),
            position: "Clerk".to_string(),
            bank_name: "Banco Sul".to_string(),
            bank_account: "0003-99999-1".to_string(),
            dependent_count: 0,
            base_salary: gross,
            earnings_total: gross,
            deductions_total: contribution + income,
            gross_amount: gross,
            net_amount: net,
            contribution_tax: contribution,
            income_tax: income,
            calculated_at: Utc::now(),
            calculated_by: "tests".to_string(),
        }
    }

    #[test]
    fn totals_are_exact_sums_of_the_result_rows() {
        let results = vec![
            result(dec!(2350.00), dec!(2173.85), dec!(176.15), dec!(0.00)),
            result(dec!(5000.00), dec!(4100.50), dec!(608.86), dec!(290.64)),
            result(dec!(0.00), dec!(0.00), dec!(0.00), dec!(0.00)),
        ];

        let totals = PeriodAggregator::aggregate(&results).unwrap();

        assert_eq!(totals.gross, dec!(7350.00));
        assert_eq!(totals.net, dec!(6274.35));
        assert_eq!(totals.contribution_tax, dec!(785.01));
        assert_eq!(totals.income_tax, dec!(290.64));
        assert_eq!(totals.employer_cost, dec!(7350.00));
    }

    #[test]
    fn empty_result_set_is_rejected() {
        let err = PeriodAggregator::aggregate(&[]).unwrap_err();
        assert!(matches!(err, AppError::EmptyPeriod(_)));
    }

    #[test]
    fn extra_employer_cost_raises_only_the_employer_total() {
        let results = vec![result(dec!(1000.00), dec!(900.00), dec!(100.00), dec!(0.00))];

        let totals =
            PeriodAggregator::aggregate_with(&results, |r| r.gross_amount * dec!(0.08)).unwrap();

        assert_eq!(totals.gross, dec!(1000.00));
        assert_eq!(totals.employer_cost, dec!(1080.00));
    }
}
