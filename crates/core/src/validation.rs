//! Input validation helpers shared by DTOs.
//!
//! DTOs derive [`validator::Validate`]; the helpers here cover the handful of
//! domain formats the derive attributes cannot express directly, plus the
//! conversion of a [`ValidationErrors`] tree into one readable message.

use validator::{ValidationError, ValidationErrors};

use crate::finance::{max_amount, max_quantity};
use crate::types::{Date, Money};

/// Flatten validation errors into a stable, human-readable message.
///
/// Fields are sorted so the message does not depend on hash-map ordering,
/// e.g. `"email: must be a valid email; name: must not be empty"`.
pub fn describe(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let message = fields
        .into_iter()
        .map(|(field, errs)| {
            let reasons: Vec<String> = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            format!("{field}: {}", reasons.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ");

    // Nested (struct/list) errors have no flat field entries.
    if message.is_empty() {
        errors.to_string()
    } else {
        message
    }
}

/// ISO 4217 style currency code: exactly three ASCII uppercase letters.
pub fn currency_code(value: &str) -> Result<(), ValidationError> {
    if value.len() == 3 && value.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(ValidationError::new("currency")
            .with_message("must be a three-letter uppercase currency code".into()))
    }
}

fn too_large(limit: Money) -> ValidationError {
    ValidationError::new("max_amount").with_message(format!("must not exceed {limit}").into())
}

/// Strictly positive amount that fits a money column.
pub fn positive_amount(value: &Money) -> Result<(), ValidationError> {
    if !value.is_sign_positive() || value.is_zero() {
        return Err(
            ValidationError::new("positive").with_message("must be greater than zero".into())
        );
    }
    if *value > max_amount() {
        return Err(too_large(max_amount()));
    }
    Ok(())
}

/// Zero or positive amount that fits a money column.
pub fn non_negative_amount(value: &Money) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(
            ValidationError::new("non_negative").with_message("must not be negative".into())
        );
    }
    if *value > max_amount() {
        return Err(too_large(max_amount()));
    }
    Ok(())
}

/// Strictly positive purchase order quantity.
pub fn positive_quantity(value: &Money) -> Result<(), ValidationError> {
    if !value.is_sign_positive() || value.is_zero() {
        return Err(
            ValidationError::new("positive").with_message("must be greater than zero".into())
        );
    }
    if *value > max_quantity() {
        return Err(too_large(max_quantity()));
    }
    Ok(())
}

/// Reject blank strings that pass a plain `length(min = 1)` check.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank").with_message("must not be blank".into()))
    } else {
        Ok(())
    }
}

/// Check that an optional end date does not precede the start date.
///
/// `what` names the pair in the error message (e.g. `"contract"`).
pub fn date_range(start: Date, end: Option<Date>, what: &str) -> Result<(), String> {
    match end {
        Some(end) if end < start => Err(format!("{what} end date must not precede its start date")),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "must not be empty"))]
        name: String,
        #[validate(email(message = "must be a valid email"))]
        email: String,
    }

    #[test]
    fn describe_sorts_fields_and_uses_messages() {
        let sample = Sample {
            name: String::new(),
            email: "nope".into(),
        };
        let errors = sample.validate().unwrap_err();
        assert_eq!(
            describe(&errors),
            "email: must be a valid email; name: must not be empty"
        );
    }

    #[test]
    fn currency_code_accepts_iso_codes_only() {
        assert!(currency_code("USD").is_ok());
        assert!(currency_code("usd").is_err());
        assert!(currency_code("EURO").is_err());
        assert!(currency_code("").is_err());
    }

    #[test]
    fn amount_checks() {
        let zero = Money::ZERO;
        let ten = Money::from_str("10.00").unwrap();
        let minus = Money::from_str("-0.01").unwrap();

        assert!(positive_amount(&ten).is_ok());
        assert!(positive_amount(&zero).is_err());
        assert!(positive_amount(&minus).is_err());

        assert!(non_negative_amount(&zero).is_ok());
        assert!(non_negative_amount(&ten).is_ok());
        assert!(non_negative_amount(&minus).is_err());
    }

    #[test]
    fn amounts_beyond_column_limit_rejected() {
        let limit = Money::from_str("999999999999.99").unwrap();
        let over = Money::from_str("1000000000000").unwrap();
        let absurd = Money::from_str("79228162514264337593543950").unwrap();

        assert!(positive_amount(&limit).is_ok());
        assert!(non_negative_amount(&limit).is_ok());
        for value in [over, absurd] {
            let err = positive_amount(&value).unwrap_err();
            assert_eq!(err.code, "max_amount");
            assert!(non_negative_amount(&value).is_err());
        }
    }

    #[test]
    fn quantity_limit() {
        assert!(positive_quantity(&Money::from_str("99999999999.999").unwrap()).is_ok());
        assert!(positive_quantity(&Money::from_str("100000000000").unwrap()).is_err());
        assert!(positive_quantity(&Money::ZERO).is_err());
    }

    #[test]
    fn blank_strings_rejected() {
        assert!(not_blank("   ").is_err());
        assert!(not_blank(" a ").is_ok());
    }

    #[test]
    fn date_range_allows_open_end_and_same_day() {
        let start = Date::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(date_range(start, None, "contract").is_ok());
        assert!(date_range(start, Some(start), "contract").is_ok());
        let err = date_range(start, Date::from_ymd_opt(2023, 12, 31), "contract").unwrap_err();
        assert_eq!(err, "contract end date must not precede its start date");
    }
}
