// src/services/components.rs

use crate::{
    models::{ComponentKind, PayrollComponent, PayrollEntry},
    services::calculator::Breakdown,
};
use rust_decimal::Decimal;
use uuid::Uuid;

pub struct ComponentBuilder;

impl ComponentBuilder {
    /// Expand a breakdown into its ordered line items: base, overtime,
    /// bonus, absences, lateness, contribution tax, income tax. Zero-amount
    /// lines are omitted except the base salary, which is always present.
    /// Base salary, overtime, and bonus are taxable and accrue toward the
    /// severance base; absences, lateness, and taxes do not.
    pub fn build(
        result_id: Uuid,
        breakdown: &Breakdown,
        entry: &PayrollEntry,
    ) -> Vec<PayrollComponent> {
        let mut components = Vec::new();
        let mut sequence = 0;

        let mut push = |kind: ComponentKind,
                        code: &str,
                        description: &str,
                        amount: Decimal,
                        base_amount: Option<Decimal>,
                        reference_hours: Option<Decimal>,
                        accruable: bool,
                        always: bool| {
            if amount.is_zero() && !always {
                return;
            }
            sequence += 1;
            components.push(PayrollComponent {
                id: Uuid::new_v4(),
                result_id,
                kind,
                code: code.to_string(),
                description: description.to_string(),
                amount,
                base_amount,
                reference_hours,
                taxable: accruable,
                severance_accruable: accruable,
                sequence,
            });
        };

        push(
            ComponentKind::Earning,
            "BASE",
            "Base salary",
            breakdown.base_salary,
            None,
            None,
            true,
            true,
        );
        push(
            ComponentKind::Earning,
            "OVERTIME",
            "Overtime",
            breakdown.overtime_amount,
            Some(breakdown.hourly_rate),
            Some(entry.overtime_hours),
            true,
            false,
        );
        push(
            ComponentKind::Earning,
            "BONUS",
            "Bonus",
            breakdown.bonus_amount,
            None,
            None,
            true,
            false,
        );
        push(
            ComponentKind::Deduction,
            "ABSENCE",
            "Absences",
            breakdown.absence_amount,
            Some(breakdown.hourly_rate),
            Some(entry.absence_hours),
            false,
            false,
        );
        push(
            ComponentKind::Deduction,
            "LATENESS",
            "Lateness",
            breakdown.lateness_amount,
            Some(breakdown.hourly_rate),
            Some(entry.lateness_hours),
            false,
            false,
        );
        push(
            ComponentKind::Deduction,
            "CONTRIBUTION_TAX",
            "Contribution tax",
            breakdown.contribution_tax,
            Some(breakdown.gross_amount),
            None,
            false,
            false,
        );
        push(
            ComponentKind::Deduction,
            "INCOME_TAX",
            "Income tax",
            breakdown.income_tax,
            None,
            None,
            false,
            false,
        );

        components
    }
}
