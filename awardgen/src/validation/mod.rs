//! Record validation.
//!
//! Turns a [`RawRecord`] into a [`ValidatedRecipient`] or a
//! [`ValidationError`]. Checks run in a fixed order:
//!
//! 1. `FIRST-NAME`, `LAST-NAME`, `CONCEPT` and `AMOUNT` are all present
//!    (otherwise `missing-field`)
//! 2. first and last name are non-empty after trimming (otherwise
//!    `empty-name`)
//! 3. concept is trimmed and the amount is parsed and formatted with two
//!    fraction digits (an unparsable amount is `missing-field`)
//!
//! # Example
//!
//! ```rust,ignore
//! use awardgen::models::RawRecord;
//! use awardgen::validation::validate;
//!
//! let record: RawRecord = [
//!     ("FIRST-NAME", " Ana "),
//!     ("LAST-NAME", "García"),
//!     ("CONCEPT", "Merit Scholarship"),
//!     ("AMOUNT", "500"),
//! ]
//! .into_iter()
//! .collect();
//!
//! let recipient = validate(&record).unwrap();
//! assert_eq!(recipient.first_name, "Ana");
//! assert_eq!(recipient.amount, "500.00");
//! ```

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{ValidationError, ValidationResult};
use crate::models::{columns, RawRecord, ValidatedRecipient};

/// Fraction digits of a rendered amount.
pub const AMOUNT_SCALE: u32 = 2;

/// Validate one record.
pub fn validate(record: &RawRecord) -> ValidationResult<ValidatedRecipient> {
    for column in columns::REQUIRED {
        if record.get(column).is_none() {
            return Err(ValidationError::MissingField(column.to_string()));
        }
    }

    let first_name = required_name(record, columns::FIRST_NAME)?;
    let last_name = required_name(record, columns::LAST_NAME)?;

    let concept = record.get(columns::CONCEPT).unwrap_or_default().trim();
    let raw_amount = record.get(columns::AMOUNT).unwrap_or_default();
    let amount = format_amount(raw_amount)
        .ok_or_else(|| ValidationError::UnparsableAmount(raw_amount.trim().to_string()))?;

    Ok(ValidatedRecipient {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        concept: concept.to_string(),
        amount,
    })
}

/// Parse a decimal amount and format it with exactly two fraction digits.
///
/// Midpoints round away from zero (`1200.005` → `1200.01`). Plain and
/// scientific notation are accepted, surrounding whitespace is ignored.
/// Returns `None` for anything that is not a number, including the empty
/// string and digit separators (`1_000`), and for magnitudes too large to
/// carry two fraction digits.
pub fn format_amount(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.contains('_') {
        return None;
    }

    let value = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()?;

    let mut rounded = value.round_dp_with_strategy(AMOUNT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(AMOUNT_SCALE);
    if rounded.scale() != AMOUNT_SCALE {
        return None;
    }
    Some(rounded.to_string())
}

fn required_name<'a>(record: &'a RawRecord, column: &str) -> ValidationResult<&'a str> {
    let value = record.get(column).unwrap_or_default().trim();
    if value.is_empty() {
        Err(ValidationError::EmptyName(column.to_string()))
    } else {
        Ok(value)
    }
}
