//! Ledger transaction primitives: the closed set of transaction kinds, the contract they share,
//! and the envelope that dispatches between them.

mod error;
mod settings;
pub mod tx;

pub use error::{Result, TxError};
pub use settings::{CodecSettings, DEFAULT_MAX_TX_SIZE};
pub use tx::{
    deposit::DepositTx,
    envelope::LedgerTxEnvelope,
    signature::{derive_chain_id, ZERO_SIGNATURE_VALUES},
    signed::{AccessListTx, DynamicFeeTx, LegacyTx},
    tx_type::{LedgerTxType, DEPOSIT_TX_TYPE_ID},
    TxData, WireFormat,
};
