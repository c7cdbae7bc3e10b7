//! Decimal ↔ fixed-point amount conversion.
//!
//! Amounts travel on-chain as fixed-point integer strings and are entered
//! and displayed as decimal strings. All arithmetic is integer-only (u128)
//! to avoid floating-point error. The decimals parameter is always supplied
//! by the caller for a specific bridge side; a logical asset may carry a
//! different precision on each side.

use trestle_types::BridgeError;

fn pow10(decimals: u8) -> Result<u128, BridgeError> {
    10u128
        .checked_pow(decimals as u32)
        .ok_or_else(|| BridgeError::InvalidAmount(format!("unsupported decimals {decimals}")))
}

fn parse_digits(s: &str, original: &str) -> Result<u128, BridgeError> {
    if s.is_empty() {
        return Ok(0);
    }
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BridgeError::InvalidAmount(original.to_string()));
    }
    s.parse::<u128>()
        .map_err(|_| BridgeError::InvalidAmount(format!("amount out of range: {original}")))
}

/// Convert a human-readable decimal amount to a chain-native fixed-point
/// integer string, scaling by `10^decimals`.
///
/// Rounds toward zero: fractional digits beyond `decimals` are truncated.
/// Negative input is a distinct [`BridgeError::NegativeAmount`] error, never
/// a silent clamp.
pub fn to_chain_integer(decimal: &str, decimals: u8) -> Result<String, BridgeError> {
    let trimmed = decimal.trim();
    if trimmed.is_empty() {
        return Err(BridgeError::InvalidAmount("empty amount".to_string()));
    }
    if trimmed.starts_with('-') {
        return Err(BridgeError::NegativeAmount(decimal.to_string()));
    }

    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (trimmed, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(BridgeError::InvalidAmount(decimal.to_string()));
    }

    let scale = pow10(decimals)?;
    let whole = parse_digits(int_part, decimal)?;

    if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BridgeError::InvalidAmount(decimal.to_string()));
    }

    // Truncate the fraction to at most `decimals` digits, then pad the
    // remainder up to full precision.
    let kept = &frac_part[..frac_part.len().min(decimals as usize)];
    let mut frac = parse_digits(kept, decimal)?;
    for _ in kept.len()..decimals as usize {
        frac = frac
            .checked_mul(10)
            .ok_or_else(|| BridgeError::InvalidAmount(format!("amount out of range: {decimal}")))?;
    }

    let scaled = whole
        .checked_mul(scale)
        .and_then(|v| v.checked_add(frac))
        .ok_or_else(|| BridgeError::InvalidAmount(format!("amount out of range: {decimal}")))?;
    Ok(scaled.to_string())
}

/// Convert a chain-native fixed-point integer string back to a decimal
/// amount. A missing or empty integer string is zero.
pub fn to_decimal(integer: &str, decimals: u8) -> Result<String, BridgeError> {
    let trimmed = integer.trim();
    if trimmed.is_empty() {
        return Ok("0".to_string());
    }
    if trimmed.starts_with('-') {
        return Err(BridgeError::NegativeAmount(integer.to_string()));
    }
    let value = parse_digits(trimmed, integer)?;
    let scale = pow10(decimals)?;

    let whole = value / scale;
    let frac = value % scale;
    if frac == 0 {
        return Ok(whole.to_string());
    }
    let frac_str = format!("{:0width$}", frac, width = decimals as usize);
    let frac_trimmed = frac_str.trim_end_matches('0');
    Ok(format!("{whole}.{frac_trimmed}"))
}

/// Decimal subtraction `a − b`, floored at zero, carried out in fixed-point
/// at the given precision. Used by the fee-aware max-transferable rule.
pub fn sub_decimal_floor(a: &str, b: &str, decimals: u8) -> Result<String, BridgeError> {
    let a_scaled: u128 = to_chain_integer(a, decimals)?
        .parse()
        .map_err(|_| BridgeError::InvalidAmount(a.to_string()))?;
    let b_scaled: u128 = to_chain_integer(b, decimals)?
        .parse()
        .map_err(|_| BridgeError::InvalidAmount(b.to_string()))?;
    to_decimal(&a_scaled.saturating_sub(b_scaled).to_string(), decimals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_whole_amounts() {
        assert_eq!(to_chain_integer("100", 12).unwrap(), "100000000000000");
        assert_eq!(to_chain_integer("0", 12).unwrap(), "0");
        assert_eq!(to_chain_integer("7", 0).unwrap(), "7");
    }

    #[test]
    fn scales_fractional_amounts() {
        assert_eq!(to_chain_integer("1.5", 6).unwrap(), "1500000");
        assert_eq!(to_chain_integer("0.000001", 6).unwrap(), "1");
        assert_eq!(to_chain_integer(".5", 2).unwrap(), "50");
    }

    #[test]
    fn truncates_toward_zero() {
        // The residual 9s beyond the chain precision are dropped, not rounded.
        assert_eq!(to_chain_integer("1.999999", 2).unwrap(), "199");
        assert_eq!(to_chain_integer("0.0009", 3).unwrap(), "0");
    }

    #[test]
    fn negative_is_a_distinct_error() {
        let err = to_chain_integer("-1", 6).unwrap_err();
        assert!(matches!(err, BridgeError::NegativeAmount(_)));
        let err = to_chain_integer("-0.5", 6).unwrap_err();
        assert!(matches!(err, BridgeError::NegativeAmount(_)));
    }

    #[test]
    fn garbage_is_invalid_not_negative() {
        assert!(matches!(
            to_chain_integer("12a.4", 6).unwrap_err(),
            BridgeError::InvalidAmount(_)
        ));
        assert!(matches!(
            to_chain_integer("1.2.3", 6).unwrap_err(),
            BridgeError::InvalidAmount(_)
        ));
        assert!(matches!(
            to_chain_integer("", 6).unwrap_err(),
            BridgeError::InvalidAmount(_)
        ));
        assert!(matches!(
            to_chain_integer(".", 6).unwrap_err(),
            BridgeError::InvalidAmount(_)
        ));
    }

    #[test]
    fn to_decimal_inverse_scaling() {
        assert_eq!(to_decimal("1500000", 6).unwrap(), "1.5");
        assert_eq!(to_decimal("100000000000000", 12).unwrap(), "100");
        assert_eq!(to_decimal("1", 6).unwrap(), "0.000001");
    }

    #[test]
    fn to_decimal_empty_is_zero() {
        assert_eq!(to_decimal("", 12).unwrap(), "0");
        assert_eq!(to_decimal("   ", 12).unwrap(), "0");
    }

    #[test]
    fn to_decimal_trims_trailing_zeros() {
        assert_eq!(to_decimal("1230000", 6).unwrap(), "1.23");
        assert_eq!(to_decimal("1000000", 6).unwrap(), "1");
    }

    #[test]
    fn overflow_is_reported() {
        let huge = "9".repeat(40);
        assert!(matches!(
            to_chain_integer(&huge, 18).unwrap_err(),
            BridgeError::InvalidAmount(_)
        ));
    }

    #[test]
    fn fee_subtraction_floors_at_zero() {
        assert_eq!(sub_decimal_floor("100", "0.5", 12).unwrap(), "99.5");
        assert_eq!(sub_decimal_floor("0.3", "0.5", 12).unwrap(), "0");
        assert_eq!(sub_decimal_floor("1", "1", 12).unwrap(), "0");
    }
}
