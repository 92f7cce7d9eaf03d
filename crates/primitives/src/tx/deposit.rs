//! Deposit transaction type.

use alloy_consensus::Typed2718;
use alloy_eips::eip2930::AccessList;
use alloy_primitives::{Address, Bytes, U256};
use alloy_rlp::BufMut;
use core::mem;
use reth_primitives_traits::InMemorySize;
use reth_tracing::tracing::error;

use super::{
    signature::{derive_chain_id, ZERO_SIGNATURE_VALUES},
    tx_type::LedgerTxType,
    TxData, EMPTY_ACCESS_LIST,
};
use crate::Result;

/// Deposit transactions are injected by the protocol rather than signed by a user key.
///
/// They have no fee market: every fee accessor resolves to [`DepositTx::gas_price`]. The `v`,
/// `r` and `s` slots exist so the kind has the same shape as signed kinds, but they are never
/// reported back through [`TxData::raw_signature_values`], which is always the zero triple.
///
/// Deposits are serialized by the envelope as a whole, see
/// [`LedgerTxEnvelope`](super::envelope::LedgerTxEnvelope). The per-field codec of this type
/// halts if reached.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DepositTx {
    /// Nonce of the sender account.
    #[serde(with = "alloy_serde::quantity")]
    pub nonce: u64,
    /// Wei per gas.
    pub gas_price: U256,
    /// Gas limit.
    #[serde(with = "alloy_serde::quantity")]
    pub gas: u64,
    /// Recipient, `None` means contract creation.
    pub to: Option<Address>,
    /// Wei amount.
    pub value: U256,
    /// Contract invocation input data.
    #[serde(alias = "input")]
    pub data: Bytes,
    /// Signature slot `v`. Only used to derive [`TxData::chain_id`].
    pub v: U256,
    /// Signature slot `r`.
    pub r: U256,
    /// Signature slot `s`.
    pub s: U256,
}

impl DepositTx {
    /// Calculates a heuristic for the in-memory size of the [`DepositTx`] transaction.
    #[inline]
    pub fn size(&self) -> usize {
        mem::size_of::<u64>() + // nonce
        mem::size_of::<U256>() + // gas_price
        mem::size_of::<u64>() + // gas
        mem::size_of::<Option<Address>>() + // to
        mem::size_of::<U256>() + // value
        self.data.len() + // data
        3 * mem::size_of::<U256>() // v, r, s
    }
}

impl Typed2718 for DepositTx {
    fn ty(&self) -> u8 {
        LedgerTxType::Deposit as u8
    }
}

impl TxData for DepositTx {
    fn tx_type(&self) -> LedgerTxType {
        LedgerTxType::Deposit
    }

    /// Derived from the `v` slot. Deposits have no real signature, so the value carries no
    /// chain binding; that is enforced where deposits are created.
    fn chain_id(&self) -> U256 {
        derive_chain_id(self.v)
    }

    fn nonce(&self) -> u64 {
        self.nonce
    }

    fn gas(&self) -> u64 {
        self.gas
    }

    fn to(&self) -> Option<Address> {
        self.to
    }

    fn value(&self) -> U256 {
        self.value
    }

    fn data(&self) -> &Bytes {
        &self.data
    }

    fn access_list(&self) -> &AccessList {
        &EMPTY_ACCESS_LIST
    }

    fn gas_price(&self) -> U256 {
        self.gas_price
    }

    fn gas_tip_cap(&self) -> U256 {
        self.gas_price
    }

    fn gas_fee_cap(&self) -> U256 {
        self.gas_price
    }

    fn effective_gas_price(&self, _base_fee: Option<U256>) -> U256 {
        self.gas_price
    }

    fn raw_signature_values(&self) -> (U256, U256, U256) {
        ZERO_SIGNATURE_VALUES
    }

    fn set_signature_values(&mut self, _chain_id: U256, v: U256, r: U256, s: U256) {
        self.v = v;
        self.r = r;
        self.s = s;
    }

    fn copy(&self) -> Self {
        Self {
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas: self.gas,
            to: self.to,
            value: self.value,
            data: Bytes::copy_from_slice(&self.data),
            v: self.v,
            r: self.r,
            s: self.s,
        }
    }

    fn encode(&self, _out: &mut dyn BufMut) {
        error!(target: "ledger::tx", "per-field encode reached for a deposit transaction");
        panic!("encode called on deposit transaction");
    }

    fn decode(&mut self, _buf: &[u8]) -> Result<()> {
        error!(target: "ledger::tx", "per-field decode reached for a deposit transaction");
        panic!("decode called on deposit transaction");
    }
}

impl InMemorySize for DepositTx {
    fn size(&self) -> usize {
        Self::size(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::WireFormat;
    use alloy_primitives::address;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn any_u256() -> impl Strategy<Value = U256> {
        any::<[u64; 4]>().prop_map(U256::from_limbs)
    }

    fn sample() -> DepositTx {
        DepositTx {
            nonce: 5,
            gas_price: U256::from(100),
            gas: 21_000,
            to: None,
            value: U256::ZERO,
            data: Bytes::new(),
            ..Default::default()
        }
    }

    #[test]
    fn copy_then_sign_leaves_original_untouched() {
        let tx = sample();
        let mut cpy = tx.copy();
        assert_eq!(cpy, tx);

        cpy.set_signature_values(U256::from(1), U256::from(7), U256::from(8), U256::from(9));
        assert_eq!(cpy.raw_signature_values(), ZERO_SIGNATURE_VALUES);
        assert_eq!((cpy.v, cpy.r, cpy.s), (U256::from(7), U256::from(8), U256::from(9)));

        assert_eq!(tx, sample());
        assert_eq!((tx.v, tx.r, tx.s), ZERO_SIGNATURE_VALUES);
    }

    #[test]
    fn copy_of_empty_deposit_is_zeroed() {
        let cpy = DepositTx::default().copy();
        assert_eq!(cpy.gas_price, U256::ZERO);
        assert_eq!(cpy.value, U256::ZERO);
        assert_eq!((cpy.v, cpy.r, cpy.s), ZERO_SIGNATURE_VALUES);
        assert!(cpy.to.is_none());
        assert!(cpy.data.is_empty());
    }

    #[test]
    fn copy_is_independent_both_ways() {
        let mut tx = DepositTx {
            nonce: 1,
            gas_price: U256::from(3),
            gas: 50_000,
            to: Some(address!("0x4200000000000000000000000000000000000015")),
            value: U256::from(10),
            data: Bytes::from_static(&[1, 2, 3]),
            v: U256::from(37),
            r: U256::from(1),
            s: U256::from(2),
        };
        let mut cpy = tx.copy();
        assert_eq!(cpy, tx);
        assert_ne!(cpy.data.as_ptr(), tx.data.as_ptr());

        cpy.value = U256::from(11);
        cpy.gas_price = U256::from(4);
        cpy.data = Bytes::from_static(&[9]);
        cpy.to = None;
        assert_eq!(tx.value, U256::from(10));
        assert_eq!(tx.gas_price, U256::from(3));
        assert_eq!(tx.data, Bytes::from_static(&[1, 2, 3]));
        assert!(tx.to.is_some());

        tx.nonce = 99;
        tx.s = U256::from(77);
        assert_eq!(cpy.nonce, 1);
        assert_eq!(cpy.s, U256::from(2));
    }

    #[test]
    fn access_list_is_always_empty() {
        assert!(sample().access_list().is_empty());
        let tx = DepositTx { data: Bytes::from_static(&[0xff; 64]), ..sample() };
        assert!(tx.access_list().is_empty());
    }

    #[test]
    fn reports_whole_envelope_format() {
        let tx = sample();
        assert_eq!(tx.tx_type(), LedgerTxType::Deposit);
        assert_eq!(tx.ty(), 0x7E);
        assert_eq!(tx.wire_format(), WireFormat::WholeEnvelope);
    }

    #[test]
    #[should_panic(expected = "encode called on deposit transaction")]
    fn encode_halts() {
        let mut buf = Vec::new();
        sample().encode(&mut buf);
    }

    #[test]
    #[should_panic(expected = "decode called on deposit transaction")]
    fn decode_halts() {
        let _ = sample().decode(&[0xc0]);
    }

    #[test]
    fn concurrent_readers_see_the_same_values() {
        let tx = Arc::new(DepositTx { to: Some(Address::repeat_byte(0x11)), ..sample() });
        std::thread::scope(|scope| {
            for _ in 0..4 {
                let tx = Arc::clone(&tx);
                scope.spawn(move || {
                    assert_eq!(tx.effective_gas_price(Some(U256::from(7))), U256::from(100));
                    assert_eq!(tx.to(), Some(Address::repeat_byte(0x11)));
                    assert_eq!(tx.raw_signature_values(), ZERO_SIGNATURE_VALUES);
                });
            }
        });
    }

    #[test]
    fn json_shape() {
        let tx = DepositTx { to: Some(Address::repeat_byte(0x22)), ..sample() };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["nonce"], "0x5");
        assert_eq!(json["gas"], "0x5208");
        assert_eq!(json["gasPrice"], "0x64");
        let back: DepositTx = serde_json::from_value(json).unwrap();
        assert_eq!(back, tx);

        let sparse: DepositTx = serde_json::from_str(r#"{"nonce":"0x1","input":"0xab"}"#).unwrap();
        assert_eq!(sparse.nonce, 1);
        assert_eq!(sparse.data, Bytes::from_static(&[0xab]));
        assert_eq!(sparse.gas_price, U256::ZERO);
    }

    proptest! {
        #[test]
        fn signature_is_always_erased(v in any_u256(), r in any_u256(), s in any_u256()) {
            let mut tx = sample();
            tx.set_signature_values(U256::from(1), v, r, s);
            prop_assert_eq!(tx.raw_signature_values(), ZERO_SIGNATURE_VALUES);
            prop_assert_eq!((tx.v, tx.r, tx.s), (v, r, s));
        }

        #[test]
        fn fees_collapse_to_gas_price(price in any_u256(), base_fee in proptest::option::of(any_u256())) {
            let tx = DepositTx { gas_price: price, ..sample() };
            prop_assert_eq!(tx.effective_gas_price(base_fee), price);
            prop_assert_eq!(tx.gas_price(), tx.gas_tip_cap());
            prop_assert_eq!(tx.gas_tip_cap(), tx.gas_fee_cap());
        }

        #[test]
        fn chain_id_passes_through_v(v in any_u256()) {
            let tx = DepositTx { v, ..sample() };
            prop_assert_eq!(tx.chain_id(), derive_chain_id(v));
        }

        #[test]
        fn copy_is_independent_for_any_fields(
            nonce in any::<u64>(),
            gas in any::<u64>(),
            price in any_u256(),
            value in any_u256(),
            data in proptest::collection::vec(any::<u8>(), 0..64),
            to in proptest::option::of(any::<[u8; 20]>()),
            v in any_u256(),
            r in any_u256(),
            s in any_u256(),
        ) {
            let mut tx = DepositTx {
                nonce,
                gas_price: price,
                gas,
                to: to.map(Address::from),
                value,
                data: data.into(),
                v,
                r,
                s,
            };
            let snapshot = tx.clone();
            let mut cpy = tx.copy();
            prop_assert_eq!(&cpy, &tx);

            cpy.nonce = cpy.nonce.wrapping_add(1);
            cpy.gas_price = cpy.gas_price.wrapping_add(U256::from(1));
            cpy.gas = cpy.gas.wrapping_add(1);
            cpy.to = match cpy.to {
                Some(_) => None,
                None => Some(Address::repeat_byte(0xaa)),
            };
            cpy.value = cpy.value.wrapping_add(U256::from(1));
            cpy.data = Bytes::from(vec![0xee; cpy.data.len() + 1]);
            cpy.set_signature_values(
                U256::ZERO,
                v.wrapping_add(U256::from(1)),
                r.wrapping_add(U256::from(1)),
                s.wrapping_add(U256::from(1)),
            );
            prop_assert_eq!(&tx, &snapshot);

            let cpy_snapshot = cpy.clone();
            tx.nonce = tx.nonce.wrapping_sub(1);
            tx.gas_price = tx.gas_price.wrapping_sub(U256::from(1));
            tx.gas = tx.gas.wrapping_sub(1);
            tx.to = Some(Address::repeat_byte(0xbb));
            tx.value = tx.value.wrapping_sub(U256::from(1));
            tx.data = Bytes::new();
            tx.set_signature_values(
                U256::ZERO,
                v.wrapping_sub(U256::from(1)),
                r.wrapping_sub(U256::from(1)),
                s.wrapping_sub(U256::from(1)),
            );
            prop_assert_eq!(&cpy, &cpy_snapshot);
            prop_assert_ne!(&cpy, &tx);
        }
    }
}
