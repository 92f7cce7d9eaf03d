//! Signed Ethereum transaction kinds carried next to deposits.
//!
//! The transaction bodies and their RLP codecs come from [`alloy_consensus`]. This module maps
//! them onto [`TxData`]: fee quantities are widened to [`U256`], and the signature slots are read
//! from and written to the [`Signature`] held by [`Signed`].

use alloy_consensus::{
    transaction::{RlpEcdsaDecodableTx, RlpEcdsaEncodableTx},
    SignableTransaction, Signed, TxEip1559, TxEip2930, TxLegacy,
};
use alloy_eips::eip2930::AccessList;
use alloy_primitives::{Address, Bytes, Signature, U256};
use alloy_rlp::BufMut;

use super::{
    signature::{derive_chain_id, legacy_v, saturating_chain_id, split_legacy_v},
    tx_type::LedgerTxType,
    TxData, EMPTY_ACCESS_LIST,
};
use crate::{Result, TxError};

/// A signed legacy transaction. Its chain id is carried inside `v` (EIP-155).
pub type LegacyTx = Signed<TxLegacy>;

/// A signed [EIP-2930](https://eips.ethereum.org/EIPS/eip-2930) access list transaction.
pub type AccessListTx = Signed<TxEip2930>;

/// A signed [EIP-1559](https://eips.ethereum.org/EIPS/eip-1559) dynamic fee transaction.
pub type DynamicFeeTx = Signed<TxEip1559>;

/// Decodes one signed RLP list that must span all of `buf`.
fn decode_signed<T: RlpEcdsaDecodableTx>(buf: &[u8]) -> Result<Signed<T>> {
    let mut buf = buf;
    let tx = T::rlp_decode_signed(&mut buf)?;
    if !buf.is_empty() {
        return Err(TxError::TrailingBytes(buf.len()));
    }
    Ok(tx)
}

/// `v` of a typed transaction is the bare y-parity.
fn typed_v(signature: &Signature) -> U256 {
    U256::from(signature.v() as u8)
}

impl TxData for Signed<TxLegacy> {
    fn tx_type(&self) -> LedgerTxType {
        LedgerTxType::Legacy
    }

    fn chain_id(&self) -> U256 {
        derive_chain_id(self.raw_signature_values().0)
    }

    fn nonce(&self) -> u64 {
        self.tx().nonce
    }

    fn gas(&self) -> u64 {
        self.tx().gas_limit
    }

    fn to(&self) -> Option<Address> {
        self.tx().to.to().copied()
    }

    fn value(&self) -> U256 {
        self.tx().value
    }

    fn data(&self) -> &Bytes {
        &self.tx().input
    }

    fn access_list(&self) -> &AccessList {
        &EMPTY_ACCESS_LIST
    }

    fn gas_price(&self) -> U256 {
        U256::from(self.tx().gas_price)
    }

    fn gas_tip_cap(&self) -> U256 {
        self.gas_price()
    }

    fn gas_fee_cap(&self) -> U256 {
        self.gas_price()
    }

    fn effective_gas_price(&self, _base_fee: Option<U256>) -> U256 {
        self.gas_price()
    }

    fn raw_signature_values(&self) -> (U256, U256, U256) {
        let signature = self.signature();
        (legacy_v(self.tx().chain_id, signature.v()), signature.r(), signature.s())
    }

    /// The chain id is carried inside `v` for this kind, so the argument is ignored.
    fn set_signature_values(&mut self, _chain_id: U256, v: U256, r: U256, s: U256) {
        let (y_parity, chain_id) = split_legacy_v(v);
        let mut tx = self.tx().clone();
        tx.chain_id = chain_id;
        *self = tx.into_signed(Signature::new(r, s, y_parity));
    }

    fn copy(&self) -> Self {
        let mut tx = self.tx().clone();
        tx.input = Bytes::copy_from_slice(&tx.input);
        tx.into_signed(*self.signature())
    }

    fn encode(&self, out: &mut dyn BufMut) {
        self.tx().rlp_encode_signed(self.signature(), out);
    }

    fn decode(&mut self, buf: &[u8]) -> Result<()> {
        *self = decode_signed(buf)?;
        Ok(())
    }
}

impl TxData for Signed<TxEip2930> {
    fn tx_type(&self) -> LedgerTxType {
        LedgerTxType::AccessList
    }

    fn chain_id(&self) -> U256 {
        U256::from(self.tx().chain_id)
    }

    fn nonce(&self) -> u64 {
        self.tx().nonce
    }

    fn gas(&self) -> u64 {
        self.tx().gas_limit
    }

    fn to(&self) -> Option<Address> {
        self.tx().to.to().copied()
    }

    fn value(&self) -> U256 {
        self.tx().value
    }

    fn data(&self) -> &Bytes {
        &self.tx().input
    }

    fn access_list(&self) -> &AccessList {
        &self.tx().access_list
    }

    fn gas_price(&self) -> U256 {
        U256::from(self.tx().gas_price)
    }

    fn gas_tip_cap(&self) -> U256 {
        self.gas_price()
    }

    fn gas_fee_cap(&self) -> U256 {
        self.gas_price()
    }

    fn effective_gas_price(&self, _base_fee: Option<U256>) -> U256 {
        self.gas_price()
    }

    fn raw_signature_values(&self) -> (U256, U256, U256) {
        let signature = self.signature();
        (typed_v(signature), signature.r(), signature.s())
    }

    fn set_signature_values(&mut self, chain_id: U256, v: U256, r: U256, s: U256) {
        let mut tx = self.tx().clone();
        tx.chain_id = saturating_chain_id(chain_id);
        *self = tx.into_signed(Signature::new(r, s, v.bit(0)));
    }

    fn copy(&self) -> Self {
        let mut tx = self.tx().clone();
        tx.input = Bytes::copy_from_slice(&tx.input);
        tx.into_signed(*self.signature())
    }

    fn encode(&self, out: &mut dyn BufMut) {
        self.tx().rlp_encode_signed(self.signature(), out);
    }

    fn decode(&mut self, buf: &[u8]) -> Result<()> {
        *self = decode_signed(buf)?;
        Ok(())
    }
}

impl TxData for Signed<TxEip1559> {
    fn tx_type(&self) -> LedgerTxType {
        LedgerTxType::DynamicFee
    }

    fn chain_id(&self) -> U256 {
        U256::from(self.tx().chain_id)
    }

    fn nonce(&self) -> u64 {
        self.tx().nonce
    }

    fn gas(&self) -> u64 {
        self.tx().gas_limit
    }

    fn to(&self) -> Option<Address> {
        self.tx().to.to().copied()
    }

    fn value(&self) -> U256 {
        self.tx().value
    }

    fn data(&self) -> &Bytes {
        &self.tx().input
    }

    fn access_list(&self) -> &AccessList {
        &self.tx().access_list
    }

    fn gas_price(&self) -> U256 {
        self.gas_fee_cap()
    }

    fn gas_tip_cap(&self) -> U256 {
        U256::from(self.tx().max_priority_fee_per_gas)
    }

    fn gas_fee_cap(&self) -> U256 {
        U256::from(self.tx().max_fee_per_gas)
    }

    /// `min(gas_tip_cap + base_fee, gas_fee_cap)`, or the fee cap when no base fee is known.
    fn effective_gas_price(&self, base_fee: Option<U256>) -> U256 {
        match base_fee {
            Some(base_fee) => self.gas_tip_cap().saturating_add(base_fee).min(self.gas_fee_cap()),
            None => self.gas_fee_cap(),
        }
    }

    fn raw_signature_values(&self) -> (U256, U256, U256) {
        let signature = self.signature();
        (typed_v(signature), signature.r(), signature.s())
    }

    fn set_signature_values(&mut self, chain_id: U256, v: U256, r: U256, s: U256) {
        let mut tx = self.tx().clone();
        tx.chain_id = saturating_chain_id(chain_id);
        *self = tx.into_signed(Signature::new(r, s, v.bit(0)));
    }

    fn copy(&self) -> Self {
        let mut tx = self.tx().clone();
        tx.input = Bytes::copy_from_slice(&tx.input);
        tx.into_signed(*self.signature())
    }

    fn encode(&self, out: &mut dyn BufMut) {
        self.tx().rlp_encode_signed(self.signature(), out);
    }

    fn decode(&mut self, buf: &[u8]) -> Result<()> {
        *self = decode_signed(buf)?;
        Ok(())
    }
}
