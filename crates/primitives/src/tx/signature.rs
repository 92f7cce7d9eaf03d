//! Signature slot helpers shared by every transaction kind.

use alloy_primitives::U256;

/// The raw `(v, r, s)` triple reported by kinds that carry no signature.
pub const ZERO_SIGNATURE_VALUES: (U256, U256, U256) = (U256::ZERO, U256::ZERO, U256::ZERO);

const V_OFFSET: u64 = 35;

/// Derives the chain id encoded into a signature `v` value.
///
/// Pre-EIP-155 values (`27`/`28`) map to chain id zero. Values that fit in 64 bits are
/// computed with wrapping arithmetic, so a `v` below `35` yields a large id rather than an
/// error; wider values are reduced as `(v - 35) >> 1`.
pub fn derive_chain_id(v: U256) -> U256 {
    if v.bit_len() <= 64 {
        let v = v.to::<u64>();
        if v == 27 || v == 28 {
            return U256::ZERO;
        }
        return U256::from(v.wrapping_sub(V_OFFSET) / 2);
    }
    (v - U256::from(V_OFFSET)) >> 1usize
}

/// Computes the EIP-155 `v` value for the given chain id and y-parity.
pub fn eip155_v(chain_id: u64, y_parity: bool) -> U256 {
    U256::from(chain_id) * U256::from(2) + U256::from(V_OFFSET) + U256::from(y_parity as u8)
}

/// The `v` of a legacy signature: EIP-155 encoded when a chain id is present, `27`/`28`
/// otherwise.
pub fn legacy_v(chain_id: Option<u64>, y_parity: bool) -> U256 {
    match chain_id {
        Some(chain_id) => eip155_v(chain_id, y_parity),
        None => U256::from(27 + y_parity as u8),
    }
}

/// Splits a legacy `v` into its y-parity and chain id, the inverse of [`legacy_v`].
///
/// Values outside `27`/`28` are read as EIP-155 with the same arithmetic as
/// [`derive_chain_id`]. Chain ids wider than 64 bits saturate.
pub fn split_legacy_v(v: U256) -> (bool, Option<u64>) {
    if v == U256::from(27) || v == U256::from(28) {
        return (v == U256::from(28), None);
    }
    let y_parity = if v.bit_len() <= 64 {
        v.to::<u64>().wrapping_sub(V_OFFSET) & 1 == 1
    } else {
        (v - U256::from(V_OFFSET)).bit(0)
    };
    (y_parity, Some(saturating_chain_id(derive_chain_id(v))))
}

pub(crate) fn saturating_chain_id(chain_id: U256) -> u64 {
    u64::try_from(chain_id).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn pre_eip155_values_map_to_zero() {
        assert_eq!(derive_chain_id(U256::from(27)), U256::ZERO);
        assert_eq!(derive_chain_id(U256::from(28)), U256::ZERO);
    }

    #[test]
    fn zero_v_wraps() {
        // (0 - 35) in u64 arithmetic, halved.
        assert_eq!(derive_chain_id(U256::ZERO), U256::from(9_223_372_036_854_775_790u64));
    }

    #[test]
    fn wide_v_is_shifted() {
        let v = U256::from(u64::MAX) + U256::from(100);
        assert_eq!(derive_chain_id(v), (v - U256::from(35)) >> 1usize);
    }

    #[test]
    fn legacy_v_splits_back() {
        assert_eq!(legacy_v(None, false), U256::from(27));
        assert_eq!(split_legacy_v(U256::from(28)), (true, None));
        assert_eq!(split_legacy_v(eip155_v(1, true)), (true, Some(1)));
        assert_eq!(split_legacy_v(U256::from(37)), (false, Some(1)));
    }

    #[test]
    fn split_keeps_wrapped_chain_id() {
        let (y_parity, chain_id) = split_legacy_v(U256::ZERO);
        assert!(y_parity);
        assert_eq!(chain_id, Some(9_223_372_036_854_775_790));
        let v = legacy_v(chain_id, y_parity);
        assert_eq!(derive_chain_id(v), derive_chain_id(U256::ZERO));
    }

    #[test]
    fn wide_chain_id_saturates() {
        assert_eq!(split_legacy_v(U256::MAX).1, Some(u64::MAX));
    }

    proptest! {
        #[test]
        fn legacy_v_roundtrip(chain_id in proptest::option::of(1u64..(u64::MAX / 4)), parity in any::<bool>()) {
            prop_assert_eq!(split_legacy_v(legacy_v(chain_id, parity)), (parity, chain_id));
        }

        #[test]
        fn eip155_roundtrip(chain_id in 1u64..(u64::MAX / 4), parity in any::<bool>()) {
            prop_assert_eq!(derive_chain_id(eip155_v(chain_id, parity)), U256::from(chain_id));
        }
    }
}
