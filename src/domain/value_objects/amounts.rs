use anyhow::{Result, anyhow, bail};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

/// Amounts are persisted as integer hundredths of the currency unit.
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Converts a caller supplied amount into minor units.
///
/// The value is rounded half away from zero to two decimal places. Zero and
/// negative amounts are rejected, including positive values that round to zero.
pub fn to_minor_units(sum: Decimal) -> Result<i64> {
    if sum.is_sign_negative() && !sum.is_zero() {
        bail!("sum must not be negative");
    }

    let rounded = sum.round_dp_with_strategy(MINOR_UNIT_SCALE, RoundingStrategy::MidpointAwayFromZero);
    let minor = rounded
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|minor| minor.to_i64())
        .ok_or_else(|| anyhow!("sum is out of range"))?;

    if minor == 0 {
        bail!("sum must be non-zero");
    }

    Ok(minor)
}

pub fn from_minor_units(amount_minor: i64) -> Decimal {
    Decimal::new(amount_minor, MINOR_UNIT_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn converts_to_minor_units() {
        assert_eq!(to_minor_units(dec!(502.3)).unwrap(), 50230);
        assert_eq!(to_minor_units(dec!(1000)).unwrap(), 100000);
        assert_eq!(to_minor_units(dec!(0.01)).unwrap(), 1);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(to_minor_units(dec!(10.005)).unwrap(), 1001);
        assert_eq!(to_minor_units(dec!(10.004)).unwrap(), 1000);
    }

    #[test]
    fn rejects_zero_and_negative_sums() {
        assert!(to_minor_units(dec!(0)).is_err());
        assert!(to_minor_units(dec!(0.004)).is_err());
        assert!(to_minor_units(dec!(-5)).is_err());
    }

    #[test]
    fn rejects_out_of_range_sums() {
        let huge: Decimal = "70000000000000000000000000000".parse().unwrap();
        let err = to_minor_units(huge).unwrap_err();
        assert!(err.to_string().contains("out of range"), "{err}");

        // Fits a Decimal but not i64 minor units.
        assert!(to_minor_units(dec!(100000000000000000)).is_err());
        assert_eq!(
            to_minor_units(dec!(92233720368547758.07)).unwrap(),
            i64::MAX
        );
    }

    #[test]
    fn restores_decimal_from_minor_units() {
        assert_eq!(from_minor_units(50230), dec!(502.30));
        assert_eq!(from_minor_units(1), dec!(0.01));
    }
}
