//! Ledger transaction types

pub mod deposit;
pub mod envelope;
pub mod signature;
pub mod signed;
pub mod tx_type;

use alloy_eips::eip2930::AccessList;
use alloy_primitives::{Address, Bytes, U256};
use alloy_rlp::BufMut;

use crate::Result;
use tx_type::LedgerTxType;

/// Shared empty access list returned by kinds that cannot carry one.
pub(crate) static EMPTY_ACCESS_LIST: AccessList = AccessList(Vec::new());

/// How a transaction kind reaches the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireFormat {
    /// The kind encodes its own fields through [`TxData::encode`] and [`TxData::decode`].
    PerField,
    /// The kind is serialized as a whole by the envelope. Its per-field codec must never be
    /// called.
    WholeEnvelope,
}

/// The operations every transaction kind provides to the envelope and to downstream consumers
/// (fee estimation, execution, RPC serialization).
///
/// Implementations are read-only apart from [`TxData::set_signature_values`], which must only be
/// called before the value is shared.
pub trait TxData {
    /// The type tag of this kind.
    fn tx_type(&self) -> LedgerTxType;

    /// The per-kind wire capability. Defaults to the capability of the type tag.
    fn wire_format(&self) -> WireFormat {
        self.tx_type().wire_format()
    }

    fn chain_id(&self) -> U256;

    fn nonce(&self) -> u64;

    /// Gas limit.
    fn gas(&self) -> u64;

    /// Recipient, `None` for contract creation.
    fn to(&self) -> Option<Address>;

    fn value(&self) -> U256;

    fn data(&self) -> &Bytes;

    fn access_list(&self) -> &AccessList;

    fn gas_price(&self) -> U256;

    fn gas_tip_cap(&self) -> U256;

    fn gas_fee_cap(&self) -> U256;

    /// The price per gas actually paid under the given base fee.
    fn effective_gas_price(&self, base_fee: Option<U256>) -> U256;

    /// The `(v, r, s)` signature values as seen by signers and RPC consumers.
    fn raw_signature_values(&self) -> (U256, U256, U256);

    /// Stores signature values. No validation is performed.
    fn set_signature_values(&mut self, chain_id: U256, v: U256, r: U256, s: U256);

    /// Returns an independent copy. Mutating either value afterwards never affects the other.
    fn copy(&self) -> Self
    where
        Self: Sized;

    /// Appends the RLP list of this kind's fields to `out`.
    fn encode(&self, out: &mut dyn BufMut);

    /// Replaces `self` with the fields decoded from a complete RLP list in `buf`.
    fn decode(&mut self, buf: &[u8]) -> Result<()>;
}
