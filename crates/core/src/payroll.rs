//! Payroll arithmetic.
//!
//! Only the gross/net bookkeeping lives here; tax withholding is entered by
//! the user as part of `deductions`.

use crate::error::CoreError;
use crate::finance::{checked_sum, round_money};
use crate::types::{Date, Money};

/// Computed amounts for one payroll record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayrollAmounts {
    pub base_salary: Money,
    pub bonus: Money,
    pub deductions: Money,
    pub gross_pay: Money,
    pub net_pay: Money,
}

impl PayrollAmounts {
    /// `gross = base + bonus`, `net = gross - deductions`.
    ///
    /// Every component must be non-negative, the gross pay must fit a money
    /// column and the net pay may not go below zero.
    pub fn compute(base_salary: Money, bonus: Money, deductions: Money) -> Result<Self, CoreError> {
        for (field, value) in [
            ("base_salary", base_salary),
            ("bonus", bonus),
            ("deductions", deductions),
        ] {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(CoreError::Validation(format!("{field}: must not be negative")));
            }
        }

        let base_salary = round_money(base_salary);
        let bonus = round_money(bonus);
        let deductions = round_money(deductions);
        let gross_pay = checked_sum("gross_pay", base_salary, bonus)?;
        let net_pay = gross_pay - deductions;

        if net_pay.is_sign_negative() && !net_pay.is_zero() {
            return Err(CoreError::BusinessRule(format!(
                "Deductions ({deductions}) exceed gross pay ({gross_pay})"
            )));
        }

        Ok(Self {
            base_salary,
            bonus,
            deductions,
            gross_pay,
            net_pay,
        })
    }

    /// Amounts for a generated record: no bonus, no deductions.
    pub fn from_base_salary(base_salary: Money) -> Self {
        let base_salary = round_money(base_salary);
        Self {
            base_salary,
            bonus: Money::ZERO,
            deductions: Money::ZERO,
            gross_pay: base_salary,
            net_pay: base_salary,
        }
    }
}

/// Validate a pay period: the end may not precede the start.
pub fn validate_period(start: Date, end: Date) -> Result<(), CoreError> {
    if end < start {
        return Err(CoreError::Validation(
            "period_end: must not precede period_start".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use assert_matches::assert_matches;

    use super::*;

    fn m(s: &str) -> Money {
        Money::from_str(s).unwrap()
    }

    #[test]
    fn computes_gross_and_net() {
        let amounts = PayrollAmounts::compute(m("3000.00"), m("250.50"), m("400.25")).unwrap();
        assert_eq!(amounts.gross_pay, m("3250.50"));
        assert_eq!(amounts.net_pay, m("2850.25"));
    }

    #[test]
    fn net_pay_may_be_exactly_zero() {
        let amounts = PayrollAmounts::compute(m("100"), m("0"), m("100")).unwrap();
        assert!(amounts.net_pay.is_zero());
    }

    #[test]
    fn negative_net_pay_is_business_rule_violation() {
        assert_matches!(
            PayrollAmounts::compute(m("100"), m("0"), m("100.01")),
            Err(CoreError::BusinessRule(_))
        );
    }

    #[test]
    fn negative_components_rejected() {
        assert_matches!(
            PayrollAmounts::compute(m("100"), m("-1"), m("0")),
            Err(CoreError::Validation(msg)) if msg == "bonus: must not be negative"
        );
    }

    #[test]
    fn oversized_gross_pay_is_validation_error() {
        assert_matches!(
            PayrollAmounts::compute(m("999999999999.99"), m("0.01"), m("0")),
            Err(CoreError::Validation(msg)) if msg.starts_with("gross_pay")
        );
        assert_matches!(
            PayrollAmounts::compute(
                m("79228162514264337593543950335"),
                m("79228162514264337593543950335"),
                m("0")
            ),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn amounts_are_rounded_to_cents() {
        let amounts = PayrollAmounts::compute(m("1000.005"), m("0"), m("0")).unwrap();
        assert_eq!(amounts.base_salary, m("1000.01"));
    }

    #[test]
    fn generated_amounts_use_base_salary_only() {
        let amounts = PayrollAmounts::from_base_salary(m("2500"));
        assert_eq!(amounts.gross_pay, m("2500"));
        assert_eq!(amounts.net_pay, m("2500"));
        assert!(amounts.bonus.is_zero() && amounts.deductions.is_zero());
    }

    #[test]
    fn period_validation() {
        let start = Date::from_ymd_opt(2024, 5, 1).unwrap();
        let end = Date::from_ymd_opt(2024, 5, 31).unwrap();
        assert!(validate_period(start, end).is_ok());
        assert!(validate_period(start, start).is_ok());
        assert_matches!(validate_period(end, start), Err(CoreError::Validation(_)));
    }
}
