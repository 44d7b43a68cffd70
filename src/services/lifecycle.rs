// src/services/lifecycle.rs

use crate::{
    errors::{AppError, AppResult},
    models::PeriodStatus,
};

/// Guarded transitions of the period state machine:
/// Draft → Calculated → Approved → Paid, with Locked as a terminal state
/// set outside this subsystem. Every rejected transition is a typed
/// business error, never a silent no-op.
impl PeriodStatus {
    /// Calculation (and recalculation) is allowed while the period is still
    /// mutable; once approved the result set is frozen.
    pub fn can_calculate(self) -> bool {
        matches!(self, PeriodStatus::Draft | PeriodStatus::Calculated)
    }

    pub fn can_approve(self) -> bool {
        self == PeriodStatus::Calculated
    }

    pub fn can_mark_paid(self) -> bool {
        self == PeriodStatus::Approved
    }

    pub fn ensure_can_calculate(self) -> AppResult<()> {
        if self.can_calculate() {
            Ok(())
        } else {
            Err(AppError::invalid_state("calculate", self))
        }
    }

    pub fn ensure_can_approve(self) -> AppResult<()> {
        if self.can_approve() {
            Ok(())
        } else {
            Err(AppError::invalid_state("approve", self))
        }
    }

    pub fn ensure_can_mark_paid(self) -> AppResult<()> {
        if self.can_mark_paid() {
            Ok(())
        } else {
            Err(AppError::invalid_state("mark as paid", self))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [PeriodStatus; 5] = [
        PeriodStatus::Draft,
        PeriodStatus::Calculated,
        PeriodStatus::Approved,
        PeriodStatus::Paid,
        PeriodStatus::Locked,
    ];

    #[test]
    fn calculate_is_allowed_only_from_draft_or_calculated() {
        for status in ALL {
            let allowed = matches!(status, PeriodStatus::Draft | PeriodStatus::Calculated);
            assert_eq!(status.can_calculate(), allowed, "status {:?}", status);
        }
    }

    #[test]
    fn approve_is_allowed_only_from_calculated() {
        for status in ALL {
            assert_eq!(
                status.can_approve(),
                status == PeriodStatus::Calculated,
                "status {:?}",
                status
            );
        }
    }

    #[test]
    fn mark_paid_is_allowed_only_from_approved() {
        for status in ALL {
            assert_eq!(
                status.can_mark_paid(),
                status == PeriodStatus::Approved,
                "status {:?}",
                status
            );
        }
    }

    #[test]
    fn rejected_transitions_surface_as_invalid_state() {
        let err = PeriodStatus::Draft.ensure_can_approve().unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidState {
                action: "approve",
                status: PeriodStatus::Draft
            }
        ));

        let err = PeriodStatus::Paid.ensure_can_calculate().unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidState {
                action: "calculate",
                status: PeriodStatus::Paid
            }
        ));
    }

    #[test]
    fn approve_succeeds_once_then_fails_from_approved() {
        // Calculated → Approved passes the guard; a second approval attempt
        // runs against Approved and is rejected.
        assert!(PeriodStatus::Calculated.ensure_can_approve().is_ok());
        let err = PeriodStatus::Approved.ensure_can_approve().unwrap_err();
        assert!(matches!(err, AppError::InvalidState { .. }));
    }

    #[test]
    fn paid_and_locked_are_terminal() {
        for status in [PeriodStatus::Paid, PeriodStatus::Locked] {
            assert!(!status.can_calculate());
            assert!(!status.can_approve());
            assert!(!status.can_mark_paid());
        }
    }
}
