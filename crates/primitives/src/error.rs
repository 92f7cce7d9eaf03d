use alloy_eips::eip2718::Eip2718Error;
use thiserror::Error;

/// Errors raised while decoding or validating transaction bytes.
///
/// A deposit reaching the per-field codec is not represented here: that is a dispatch bug and
/// halts instead of returning.
#[derive(Debug, Error)]
pub enum TxError {
    #[error("RLP error: {0}")]
    Rlp(#[from] alloy_rlp::Error),

    #[error("EIP-2718 error: {0}")]
    Eip2718(#[from] Eip2718Error),

    #[error("empty transaction input")]
    EmptyInput,

    #[error("transaction of {size} bytes exceeds the {max} byte limit")]
    Oversized { size: usize, max: usize },

    #[error("deposit transactions are not accepted from this source")]
    DepositNotAllowed,

    #[error("{0} trailing bytes after transaction")]
    TrailingBytes(usize),

    #[error("Invalid settings: {0}")]
    Settings(String),
}

pub type Result<T> = core::result::Result<T, TxError>;
