// src/services/brackets.rs

use crate::{
    errors::AppResult,
    models::{TaxBracket, TaxKind},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::PgConnection;
use tracing::info;
use uuid::Uuid;

pub struct TaxBracketProvider;

impl TaxBracketProvider {
    /// Resolve the bracket schedule active for `kind` on `reference_date`:
    /// the configured rows whose effective window contains the date, ordered
    /// by sort order then range start. No configured rows is not an error —
    /// the built-in reference schedule is used instead.
    pub async fn brackets_for(
        conn: &mut PgConnection,
        kind: TaxKind,
        reference_date: NaiveDate,
    ) -> AppResult<Vec<TaxBracket>> {
        let configured = sqlx::query_as::<_, TaxBracket>(
            r#"SELECT * FROM tax_brackets
               WHERE kind = $1
                 AND is_active = true
                 AND effective_from <= $2
                 AND (effective_to IS NULL OR effective_to >= $2)
               ORDER BY sort_order, range_start"#,
        )
        .bind(kind)
        .bind(reference_date)
        .fetch_all(conn)
        .await?;

        if configured.is_empty() {
            info!(
                "No configured {:?} brackets for {}; using the built-in default schedule",
                kind, reference_date
            );
            return Ok(default_schedule(kind));
        }

        Ok(configured)
    }
}

pub fn default_schedule(kind: TaxKind) -> Vec<TaxBracket> {
    match kind {
        TaxKind::Contribution => default_contribution_brackets(),
        TaxKind::Income => default_income_brackets(),
    }
}

/// Built-in contribution schedule. The top bracket has a closed end: it is
/// a contribution cap, and gross above it is untaxed.
pub fn default_contribution_brackets() -> Vec<TaxBracket> {
    vec![
        bracket(TaxKind::Contribution, 1, dec!(0), Some(dec!(1412.00)), dec!(0.075), dec!(0)),
        bracket(TaxKind::Contribution, 2, dec!(1412.01), Some(dec!(2666.68)), dec!(0.09), dec!(0)),
        bracket(TaxKind::Contribution, 3, dec!(2666.69), Some(dec!(4000.03)), dec!(0.12), dec!(0)),
        bracket(TaxKind::Contribution, 4, dec!(4000.04), Some(dec!(7786.02)), dec!(0.14), dec!(0)),
    ]
}

/// Built-in income schedule: a single bracket applies, with a fixed
/// deduction subtracted from the computed tax.
pub fn default_income_brackets() -> Vec<TaxBracket> {
    vec![
        bracket(TaxKind::Income, 1, dec!(0), Some(dec!(2259.20)), dec!(0), dec!(0)),
        bracket(TaxKind::Income, 2, dec!(2259.21), Some(dec!(2826.65)), dec!(0.075), dec!(169.44)),
        bracket(TaxKind::Income, 3, dec!(2826.66), Some(dec!(3751.05)), dec!(0.15), dec!(381.44)),
        bracket(TaxKind::Income, 4, dec!(3751.06), Some(dec!(4664.68)), dec!(0.225), dec!(662.77)),
        bracket(TaxKind::Income, 5, dec!(4664.69), None, dec!(0.275), dec!(896.00)),
    ]
}

fn bracket(
    kind: TaxKind,
    sort_order: i32,
    range_start: Decimal,
    range_end: Option<Decimal>,
    rate: Decimal,
    deduction: Decimal,
) -> TaxBracket {
    TaxBracket {
        id: Uuid::new_v4(),
        kind,
        range_start,
        range_end,
        rate,
        deduction,
        effective_from: NaiveDate::MIN,
        effective_to: None,
        sort_order,
        is_active: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_contribution_schedule_is_ordered_and_contiguous() {
        let brackets = default_contribution_brackets();
        assert_eq!(brackets.len(), 4);

        for pair in brackets.windows(2) {
            assert!(pair[0].sort_order < pair[1].sort_order);
            let end = pair[0].range_end.expect("only the top bracket may be open");
            assert!(end < pair[1].range_start);
            // Contiguous to the cent.
            assert_eq!(pair[1].range_start - end, dec!(0.01));
        }
    }

    #[test]
    fn default_contribution_schedule_is_capped() {
        let mut brackets = default_contribution_brackets();
        let top = brackets.pop().unwrap();
        assert_eq!(top.range_end, Some(dec!(7786.02)));
    }

    #[test]
    fn default_income_schedule_has_open_top_bracket() {
        let brackets = default_income_brackets();
        assert_eq!(brackets.len(), 5);
        assert_eq!(brackets[0].rate, Decimal::ZERO);
        assert!(brackets.last().unwrap().range_end.is_none());
    }

    #[test]
    fn default_income_deductions_grow_with_rate() {
        let brackets = default_income_brackets();
        for pair in brackets.windows(2) {
            assert!(pair[0].rate < pair[1].rate);
            assert!(pair[0].deduction <= pair[1].deduction);
        }
    }
}
