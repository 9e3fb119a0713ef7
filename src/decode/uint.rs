//! 256-bit integers split across two 128-bit payload slots

use super::cursor::FeltCursor;
use crate::error::DecodeError;
use crate::felt::Felt;
use alloy_primitives::U256;

/// Recombine `lo + hi * 2^128`
///
/// Both halves are unsigned. Only a `hi` of 2^128 or more can push the result past 256 bits,
/// which is reported as [`DecodeError::Overflow`].
pub fn decode_u256(lo: Felt, hi: Felt) -> Result<U256, DecodeError> {
    let hi = hi.value();
    if !(hi >> 128usize).is_zero() {
        return Err(DecodeError::Overflow(format!("high half {:#x} exceeds 128 bits", hi)));
    }

    (hi << 128usize)
        .checked_add(lo.value())
        .ok_or_else(|| DecodeError::Overflow(format!("{:#x} + {:#x} * 2^128", lo.value(), hi)))
}

/// Read a `(lo, hi)` pair at the cursor
pub fn read_u256(cursor: &mut FeltCursor<'_>, field: &str) -> Result<U256, DecodeError> {
    let lo = cursor.next(field)?;
    let hi = cursor.next(field)?;
    decode_u256(lo, hi)
}

/// Split a `U256` into its `(lo, hi)` payload halves
pub fn split_u256(value: U256) -> (Felt, Felt) {
    let mask = (U256::from(1u8) << 128usize) - U256::from(1u8);
    (Felt::new(value & mask), Felt::new(value >> 128usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_pow_128() -> U256 {
        U256::from(1u8) << 128usize
    }

    #[test]
    fn test_reconstruction_boundaries() {
        assert_eq!(decode_u256(Felt::ZERO, Felt::ZERO).unwrap(), U256::ZERO);
        assert_eq!(
            decode_u256(Felt::from(u128::MAX), Felt::ZERO).unwrap(),
            U256::from(u128::MAX)
        );
        assert_eq!(
            decode_u256(Felt::ZERO, Felt::from(1u64)).unwrap(),
            two_pow_128()
        );
        assert_eq!(
            decode_u256(Felt::from(u128::MAX), Felt::from(u128::MAX)).unwrap(),
            U256::MAX
        );
    }

    #[test]
    fn test_wide_low_half_still_adds() {
        // lo is not range-checked; it only overflows when the sum leaves 256 bits
        let lo = Felt::new(two_pow_128() + U256::from(5u8));
        let value = decode_u256(lo, Felt::from(1u64)).unwrap();
        assert_eq!(value, two_pow_128() * U256::from(2u8) + U256::from(5u8));

        let err = decode_u256(Felt::new(U256::MAX), Felt::from(u128::MAX)).unwrap_err();
        assert!(matches!(err, DecodeError::Overflow(_)));
    }

    #[test]
    fn test_high_half_overflow() {
        let err = decode_u256(Felt::ZERO, Felt::new(two_pow_128())).unwrap_err();
        assert!(matches!(err, DecodeError::Overflow(_)));
    }

    #[test]
    fn test_read_and_split() {
        let value = two_pow_128() * U256::from(3u8) + U256::from(42u8);
        let (lo, hi) = split_u256(value);
        assert_eq!(lo, Felt::from(42u64));
        assert_eq!(hi, Felt::from(3u64));

        let words = [lo, hi, Felt::from(7u64)];
        let mut cursor = FeltCursor::new(&words);
        assert_eq!(read_u256(&mut cursor, "amount").unwrap(), value);
        assert_eq!(cursor.position(), 2);

        let mut short = FeltCursor::at(&words, 2);
        assert!(matches!(
            read_u256(&mut short, "amount").unwrap_err(),
            DecodeError::Truncated { .. }
        ));
    }
}
