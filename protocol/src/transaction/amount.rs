//! Overflow-checked arithmetic over untrusted amounts.
//!
//! UTXO amounts come from a remote source. A wrapped sum would let the
//! engine understate what it needs, so every accumulation here returns
//! [`EngineError::AmountOverflow`] instead of wrapping.

use crate::error::{EngineError, Result};

/// `a + b`, or `AmountOverflow`.
pub fn checked_add(a: u64, b: u64) -> Result<u64> {
    a.checked_add(b).ok_or(EngineError::AmountOverflow)
}

/// Sum of `values`, or `AmountOverflow` at the first wrap.
pub fn checked_sum<I>(values: I) -> Result<u64>
where
    I: IntoIterator<Item = u64>,
{
    values.into_iter().try_fold(0u64, checked_add)
}

/// Formats sompi as a decimal coin amount, e.g. `150000000` -> `"1.50000000"`.
pub fn format_sompi(sompi: u64) -> String {
    let per = crate::config::SOMPI_PER_KASPA;
    format!("{}.{:08}", sompi / per, sompi % per)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_within_range() {
        assert_eq!(checked_add(2, 3).unwrap(), 5);
        assert_eq!(checked_add(u64::MAX - 1, 1).unwrap(), u64::MAX);
    }

    #[test]
    fn add_overflow_is_an_error() {
        assert!(matches!(checked_add(u64::MAX, 1), Err(EngineError::AmountOverflow)));
        assert!(matches!(checked_add(u64::MAX / 2 + 1, u64::MAX / 2 + 1), Err(EngineError::AmountOverflow)));
    }

    #[test]
    fn sum_of_empty_is_zero() {
        assert_eq!(checked_sum(std::iter::empty()).unwrap(), 0);
    }

    #[test]
    fn sum_overflow_never_wraps() {
        assert!(matches!(checked_sum([u64::MAX, 0, 1]), Err(EngineError::AmountOverflow)));
        assert_eq!(checked_sum([1, 2, 3]).unwrap(), 6);
    }

    #[test]
    fn sompi_formatting() {
        assert_eq!(format_sompi(150_000_000), "1.50000000");
        assert_eq!(format_sompi(20_000_000), "0.20000000");
        assert_eq!(format_sompi(1), "0.00000001");
    }
}
