use alloy_consensus::{
    transaction::{RlpEcdsaDecodableTx, RlpEcdsaEncodableTx},
    Signed, TxEip1559, TxEip2930, TxLegacy, Typed2718,
};
use alloy_eips::{
    eip2718::{Decodable2718, Eip2718Error, Eip2718Result, Encodable2718},
    eip2930::AccessList,
};
use alloy_primitives::{keccak256, Address, Bytes, Signature, TxHash, TxKind, U256};
use alloy_rlp::{BufMut, Decodable, Encodable, Header};
use core::mem;
use reth_primitives_traits::InMemorySize;
use reth_tracing::tracing::{debug, trace};

use super::{
    deposit::DepositTx,
    signed::{AccessListTx, DynamicFeeTx, LegacyTx},
    tx_type::LedgerTxType,
    TxData, WireFormat,
};
use crate::{settings::CodecSettings, Result, TxError};

/// The ledger [EIP-2718] transaction envelope.
///
/// Owns exactly one transaction kind and dispatches every [`TxData`] call to it. Legacy
/// transactions are encoded untagged, the other kinds as `type || payload`. The signed kinds use
/// the standard signed RLP payloads of [`alloy_consensus`].
///
/// Kinds whose [`WireFormat`] is [`WireFormat::WholeEnvelope`] (deposits) are serialized here:
///
/// ```text
/// 0x7E || rlp([nonce, gas_price, gas, to, value, data])
/// ```
///
/// Deposits carry no signature on the wire, so a decoded deposit has zero `v`, `r` and `s`.
///
/// [EIP-2718]: https://eips.ethereum.org/EIPS/eip-2718
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum LedgerTxEnvelope {
    /// An untagged [`TxLegacy`].
    Legacy(Signed<TxLegacy>),
    /// A [`TxEip2930`] tagged with type 1.
    AccessList(Signed<TxEip2930>),
    /// A [`TxEip1559`] tagged with type 2.
    DynamicFee(Signed<TxEip1559>),
    /// A [`DepositTx`] tagged with type 0x7E.
    Deposit(DepositTx),
}

impl From<Signed<TxLegacy>> for LedgerTxEnvelope {
    fn from(v: Signed<TxLegacy>) -> Self {
        Self::Legacy(v)
    }
}

impl From<Signed<TxEip2930>> for LedgerTxEnvelope {
    fn from(v: Signed<TxEip2930>) -> Self {
        Self::AccessList(v)
    }
}

impl From<Signed<TxEip1559>> for LedgerTxEnvelope {
    fn from(v: Signed<TxEip1559>) -> Self {
        Self::DynamicFee(v)
    }
}

impl From<DepositTx> for LedgerTxEnvelope {
    fn from(v: DepositTx) -> Self {
        Self::Deposit(v)
    }
}

impl LedgerTxEnvelope {
    /// Returns true if the transaction is a legacy transaction.
    #[inline]
    pub const fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }

    /// Returns true if the transaction is a deposit transaction.
    #[inline]
    pub const fn is_deposit(&self) -> bool {
        matches!(self, Self::Deposit(_))
    }

    /// Return the inner legacy transaction if it exists.
    pub const fn as_legacy(&self) -> Option<&LegacyTx> {
        match self {
            Self::Legacy(tx) => Some(tx),
            _ => None,
        }
    }

    /// Return the inner access list transaction if it exists.
    pub const fn as_access_list(&self) -> Option<&AccessListTx> {
        match self {
            Self::AccessList(tx) => Some(tx),
            _ => None,
        }
    }

    /// Return the inner dynamic fee transaction if it exists.
    pub const fn as_dynamic_fee(&self) -> Option<&DynamicFeeTx> {
        match self {
            Self::DynamicFee(tx) => Some(tx),
            _ => None,
        }
    }

    /// Return the inner deposit transaction if it exists.
    pub const fn as_deposit(&self) -> Option<&DepositTx> {
        match self {
            Self::Deposit(tx) => Some(tx),
            _ => None,
        }
    }

    /// Returns the transaction hash, the keccak of the EIP-2718 encoding.
    pub fn tx_hash(&self) -> TxHash {
        match self {
            Self::Legacy(tx) => *tx.hash(),
            Self::AccessList(tx) => *tx.hash(),
            Self::DynamicFee(tx) => *tx.hash(),
            Self::Deposit(_) => keccak256(self.encoded_2718()),
        }
    }

    /// Decodes a single transaction from untrusted bytes, applying the limits in `settings`.
    ///
    /// The whole input must be consumed.
    pub fn decode_with_settings(bytes: &[u8], settings: &CodecSettings) -> Result<Self> {
        let Some(&first) = bytes.first() else {
            debug!(target: "ledger::tx", "rejected empty transaction input");
            return Err(TxError::EmptyInput);
        };
        if bytes.len() > settings.max_tx_size {
            debug!(target: "ledger::tx", size = bytes.len(), max = settings.max_tx_size, "rejected oversized transaction");
            return Err(TxError::Oversized { size: bytes.len(), max: settings.max_tx_size });
        }
        let is_deposit = LedgerTxType::try_from(first).is_ok_and(|ty| ty.is_deposit());
        if is_deposit && !settings.allow_deposits {
            debug!(target: "ledger::tx", "rejected deposit transaction");
            return Err(TxError::DepositNotAllowed);
        }

        let mut buf = bytes;
        let tx = Self::decode_2718(&mut buf)?;
        if !buf.is_empty() {
            debug!(target: "ledger::tx", trailing = buf.len(), "rejected transaction with trailing bytes");
            return Err(TxError::TrailingBytes(buf.len()));
        }
        trace!(target: "ledger::tx", tx_type = %tx.tx_type(), len = bytes.len(), "decoded transaction");
        Ok(tx)
    }

    /// Length of the per-kind payload, excluding the type byte.
    fn payload_length(&self) -> usize {
        match self {
            Self::Legacy(tx) => tx.tx().rlp_encoded_length_with_signature(tx.signature()),
            Self::AccessList(tx) => tx.tx().rlp_encoded_length_with_signature(tx.signature()),
            Self::DynamicFee(tx) => tx.tx().rlp_encoded_length_with_signature(tx.signature()),
            Self::Deposit(tx) => deposit_header(tx).length_with_payload(),
        }
    }

    /// Writes the per-kind payload, branching on the kind's wire capability so the per-field
    /// codec of a whole-envelope kind is never reached.
    fn encode_payload(&self, out: &mut dyn BufMut) {
        match (self.wire_format(), self) {
            (WireFormat::WholeEnvelope, Self::Deposit(tx)) => encode_deposit(tx, out),
            (WireFormat::PerField, Self::Legacy(tx)) => TxData::encode(tx, out),
            (WireFormat::PerField, Self::AccessList(tx)) => TxData::encode(tx, out),
            (WireFormat::PerField, Self::DynamicFee(tx)) => TxData::encode(tx, out),
            (format, tx) => unreachable!("{} reported wire format {format:?}", tx.tx_type()),
        }
    }
}

fn deposit_fields_length(tx: &DepositTx) -> usize {
    tx.nonce.length()
        + tx.gas_price.length()
        + tx.gas.length()
        + TxKind::from(tx.to).length()
        + tx.value.length()
        + tx.data.length()
}

fn deposit_header(tx: &DepositTx) -> Header {
    Header { list: true, payload_length: deposit_fields_length(tx) }
}

fn encode_deposit(tx: &DepositTx, out: &mut dyn BufMut) {
    deposit_header(tx).encode(out);
    tx.nonce.encode(out);
    tx.gas_price.encode(out);
    tx.gas.encode(out);
    TxKind::from(tx.to).encode(out);
    tx.value.encode(out);
    tx.data.encode(out);
}

fn decode_deposit(buf: &mut &[u8]) -> alloy_rlp::Result<DepositTx> {
    let mut fields = Header::decode_bytes(buf, true)?;
    let tx = DepositTx {
        nonce: Decodable::decode(&mut fields)?,
        gas_price: Decodable::decode(&mut fields)?,
        gas: Decodable::decode(&mut fields)?,
        to: TxKind::decode(&mut fields)?.to().copied(),
        value: Decodable::decode(&mut fields)?,
        data: Decodable::decode(&mut fields)?,
        ..Default::default()
    };
    if !fields.is_empty() {
        return Err(alloy_rlp::Error::UnexpectedLength);
    }
    Ok(tx)
}

fn signed_size<T: InMemorySize>(tx: &Signed<T>) -> usize {
    mem::size_of::<TxHash>() + tx.tx().size() + mem::size_of::<Signature>()
}

impl From<TxError> for Eip2718Error {
    fn from(err: TxError) -> Self {
        match err {
            TxError::Rlp(err) => Self::RlpError(err),
            TxError::Eip2718(err) => err,
            _ => Self::RlpError(alloy_rlp::Error::Custom("invalid transaction payload")),
        }
    }
}

impl Typed2718 for LedgerTxEnvelope {
    fn ty(&self) -> u8 {
        match self {
            Self::Legacy(tx) => tx.tx().ty(),
            Self::AccessList(tx) => tx.tx().ty(),
            Self::DynamicFee(tx) => tx.tx().ty(),
            Self::Deposit(tx) => tx.ty(),
        }
    }
}

impl Encodable2718 for LedgerTxEnvelope {
    fn type_flag(&self) -> Option<u8> {
        match self {
            Self::Legacy(_) => None,
            _ => Some(self.ty()),
        }
    }

    fn encode_2718_len(&self) -> usize {
        self.type_flag().map_or(0, |_| 1) + self.payload_length()
    }

    fn encode_2718(&self, out: &mut dyn BufMut) {
        if let Some(ty) = self.type_flag() {
            out.put_u8(ty);
        }
        self.encode_payload(out);
    }
}

impl Decodable2718 for LedgerTxEnvelope {
    fn typed_decode(ty: u8, buf: &mut &[u8]) -> Eip2718Result<Self> {
        let ty = LedgerTxType::try_from(ty)?;
        trace!(target: "ledger::tx", tx_type = %ty, "decoding typed transaction");
        match (ty.wire_format(), ty) {
            (WireFormat::WholeEnvelope, _) => Ok(Self::Deposit(decode_deposit(buf)?)),
            (WireFormat::PerField, LedgerTxType::AccessList) => {
                Ok(Self::AccessList(TxEip2930::rlp_decode_signed(buf)?))
            }
            (WireFormat::PerField, LedgerTxType::DynamicFee) => {
                Ok(Self::DynamicFee(TxEip1559::rlp_decode_signed(buf)?))
            }
            (WireFormat::PerField, _) => Err(Eip2718Error::UnexpectedType(ty as u8)),
        }
    }

    fn fallback_decode(buf: &mut &[u8]) -> Eip2718Result<Self> {
        Ok(Self::Legacy(TxLegacy::rlp_decode_signed(buf)?))
    }
}

impl TxData for LedgerTxEnvelope {
    fn tx_type(&self) -> LedgerTxType {
        match self {
            Self::Legacy(tx) => tx.tx_type(),
            Self::AccessList(tx) => tx.tx_type(),
            Self::DynamicFee(tx) => tx.tx_type(),
            Self::Deposit(tx) => tx.tx_type(),
        }
    }

    fn wire_format(&self) -> WireFormat {
        match self {
            Self::Legacy(tx) => tx.wire_format(),
            Self::AccessList(tx) => tx.wire_format(),
            Self::DynamicFee(tx) => tx.wire_format(),
            Self::Deposit(tx) => tx.wire_format(),
        }
    }

    fn chain_id(&self) -> U256 {
        match self {
            Self::Legacy(tx) => tx.chain_id(),
            Self::AccessList(tx) => tx.chain_id(),
            Self::DynamicFee(tx) => tx.chain_id(),
            Self::Deposit(tx) => tx.chain_id(),
        }
    }

    fn nonce(&self) -> u64 {
        match self {
            Self::Legacy(tx) => tx.nonce(),
            Self::AccessList(tx) => tx.nonce(),
            Self::DynamicFee(tx) => tx.nonce(),
            Self::Deposit(tx) => tx.nonce(),
        }
    }

    fn gas(&self) -> u64 {
        match self {
            Self::Legacy(tx) => tx.gas(),
            Self::AccessList(tx) => tx.gas(),
            Self::DynamicFee(tx) => tx.gas(),
            Self::Deposit(tx) => tx.gas(),
        }
    }

    fn to(&self) -> Option<Address> {
        match self {
            Self::Legacy(tx) => tx.to(),
            Self::AccessList(tx) => tx.to(),
            Self::DynamicFee(tx) => tx.to(),
            Self::Deposit(tx) => tx.to(),
        }
    }

    fn value(&self) -> U256 {
        match self {
            Self::Legacy(tx) => tx.value(),
            Self::AccessList(tx) => tx.value(),
            Self::DynamicFee(tx) => tx.value(),
            Self::Deposit(tx) => tx.value(),
        }
    }

    fn data(&self) -> &Bytes {
        match self {
            Self::Legacy(tx) => tx.data(),
            Self::AccessList(tx) => tx.data(),
            Self::DynamicFee(tx) => tx.data(),
            Self::Deposit(tx) => tx.data(),
        }
    }

    fn access_list(&self) -> &AccessList {
        match self {
            Self::Legacy(tx) => tx.access_list(),
            Self::AccessList(tx) => tx.access_list(),
            Self::DynamicFee(tx) => tx.access_list(),
            Self::Deposit(tx) => tx.access_list(),
        }
    }

    fn gas_price(&self) -> U256 {
        match self {
            Self::Legacy(tx) => tx.gas_price(),
            Self::AccessList(tx) => tx.gas_price(),
            Self::DynamicFee(tx) => tx.gas_price(),
            Self::Deposit(tx) => tx.gas_price(),
        }
    }

    fn gas_tip_cap(&self) -> U256 {
        match self {
            Self::Legacy(tx) => tx.gas_tip_cap(),
            Self::AccessList(tx) => tx.gas_tip_cap(),
            Self::DynamicFee(tx) => tx.gas_tip_cap(),
            Self::Deposit(tx) => tx.gas_tip_cap(),
        }
    }

    fn gas_fee_cap(&self) -> U256 {
        match self {
            Self::Legacy(tx) => tx.gas_fee_cap(),
            Self::AccessList(tx) => tx.gas_fee_cap(),
            Self::DynamicFee(tx) => tx.gas_fee_cap(),
            Self::Deposit(tx) => tx.gas_fee_cap(),
        }
    }

    fn effective_gas_price(&self, base_fee: Option<U256>) -> U256 {
        match self {
            Self::Legacy(tx) => tx.effective_gas_price(base_fee),
            Self::AccessList(tx) => tx.effective_gas_price(base_fee),
            Self::DynamicFee(tx) => tx.effective_gas_price(base_fee),
            Self::Deposit(tx) => tx.effective_gas_price(base_fee),
        }
    }

    fn raw_signature_values(&self) -> (U256, U256, U256) {
        match self {
            Self::Legacy(tx) => tx.raw_signature_values(),
            Self::AccessList(tx) => tx.raw_signature_values(),
            Self::DynamicFee(tx) => tx.raw_signature_values(),
            Self::Deposit(tx) => tx.raw_signature_values(),
        }
    }

    fn set_signature_values(&mut self, chain_id: U256, v: U256, r: U256, s: U256) {
        match self {
            Self::Legacy(tx) => tx.set_signature_values(chain_id, v, r, s),
            Self::AccessList(tx) => tx.set_signature_values(chain_id, v, r, s),
            Self::DynamicFee(tx) => tx.set_signature_values(chain_id, v, r, s),
            Self::Deposit(tx) => tx.set_signature_values(chain_id, v, r, s),
        }
    }

    fn copy(&self) -> Self {
        match self {
            Self::Legacy(tx) => Self::Legacy(tx.copy()),
            Self::AccessList(tx) => Self::AccessList(tx.copy()),
            Self::DynamicFee(tx) => Self::DynamicFee(tx.copy()),
            Self::Deposit(tx) => Self::Deposit(tx.copy()),
        }
    }

    /// Per-field encoding of the held kind. Halts for deposits; use
    /// [`Encodable2718::encode_2718`] to serialize any kind.
    fn encode(&self, out: &mut dyn BufMut) {
        match self {
            Self::Legacy(tx) => TxData::encode(tx, out),
            Self::AccessList(tx) => TxData::encode(tx, out),
            Self::DynamicFee(tx) => TxData::encode(tx, out),
            Self::Deposit(tx) => TxData::encode(tx, out),
        }
    }

    /// Per-field decoding into the held kind. Halts for deposits; use
    /// [`LedgerTxEnvelope::decode_with_settings`] to decode any kind.
    fn decode(&mut self, buf: &[u8]) -> Result<()> {
        match self {
            Self::Legacy(tx) => tx.decode(buf),
            Self::AccessList(tx) => tx.decode(buf),
            Self::DynamicFee(tx) => tx.decode(buf),
            Self::Deposit(tx) => tx.decode(buf),
        }
    }
}

impl InMemorySize for LedgerTxEnvelope {
    fn size(&self) -> usize {
        match self {
            Self::Legacy(tx) => signed_size(tx),
            Self::AccessList(tx) => signed_size(tx),
            Self::DynamicFee(tx) => signed_size(tx),
            Self::Deposit(tx) => tx.size(),
        }
    }
}
