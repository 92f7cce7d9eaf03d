//! Contains the transaction type identifier for the ledger.

use alloy_consensus::Typed2718;
use alloy_eips::eip2718::Eip2718Error;
use alloy_primitives::{U64, U8};
use alloy_rlp::{BufMut, Decodable, Encodable};
use derive_more::Display;

use super::WireFormat;

/// Identifier for a protocol-injected deposit transaction.
pub const DEPOSIT_TX_TYPE_ID: u8 = 126; // 0x7E

/// Ledger `TransactionType` flags as specified in EIPs [2718], [1559] and [2930], plus the
/// protocol deposit kind.
///
/// The set is closed: every kind the envelope can hold has exactly one tag here.
///
/// [2718]: https://eips.ethereum.org/EIPS/eip-2718
/// [1559]: https://eips.ethereum.org/EIPS/eip-1559
/// [2930]: https://eips.ethereum.org/EIPS/eip-2930
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, Default, PartialEq, PartialOrd, Ord, Hash, Display)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(into = "U8", try_from = "U64")]
pub enum LedgerTxType {
    /// Legacy transaction type.
    #[default]
    #[display("legacy")]
    Legacy = 0,
    /// EIP-2930 access list transaction type.
    #[display("access_list")]
    AccessList = 1,
    /// EIP-1559 dynamic fee transaction type.
    #[display("dynamic_fee")]
    DynamicFee = 2,
    /// Protocol deposit transaction type.
    #[display("deposit")]
    Deposit = DEPOSIT_TX_TYPE_ID,
}

impl LedgerTxType {
    /// List of all variants.
    pub const ALL: [Self; 4] = [Self::Legacy, Self::AccessList, Self::DynamicFee, Self::Deposit];

    /// Returns how transactions of this kind reach the wire.
    pub const fn wire_format(&self) -> WireFormat {
        match self {
            Self::Legacy | Self::AccessList | Self::DynamicFee => WireFormat::PerField,
            Self::Deposit => WireFormat::WholeEnvelope,
        }
    }

    /// Returns `true` for the deposit kind.
    pub const fn is_deposit(&self) -> bool {
        matches!(self, Self::Deposit)
    }
}

impl From<LedgerTxType> for U8 {
    fn from(tx_type: LedgerTxType) -> Self {
        Self::from(u8::from(tx_type))
    }
}

impl From<LedgerTxType> for u8 {
    fn from(v: LedgerTxType) -> Self {
        v as Self
    }
}

impl TryFrom<u8> for LedgerTxType {
    type Error = Eip2718Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Legacy,
            1 => Self::AccessList,
            2 => Self::DynamicFee,
            DEPOSIT_TX_TYPE_ID => Self::Deposit,
            _ => return Err(Eip2718Error::UnexpectedType(value)),
        })
    }
}

impl TryFrom<u64> for LedgerTxType {
    type Error = &'static str;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        let err = || "invalid tx type";
        let value: u8 = value.try_into().map_err(|_| err())?;
        Self::try_from(value).map_err(|_| err())
    }
}

impl TryFrom<U64> for LedgerTxType {
    type Error = &'static str;

    fn try_from(value: U64) -> Result<Self, Self::Error> {
        value.to::<u64>().try_into()
    }
}

impl PartialEq<u8> for LedgerTxType {
    fn eq(&self, other: &u8) -> bool {
        (*self as u8) == *other
    }
}

impl PartialEq<LedgerTxType> for u8 {
    fn eq(&self, other: &LedgerTxType) -> bool {
        *self == *other as Self
    }
}

impl Encodable for LedgerTxType {
    fn encode(&self, out: &mut dyn BufMut) {
        (*self as u8).encode(out);
    }

    fn length(&self) -> usize {
        1
    }
}

impl Decodable for LedgerTxType {
    fn decode(buf: &mut &[u8]) -> alloy_rlp::Result<Self> {
        let ty = u8::decode(buf)?;

        Self::try_from(ty).map_err(|_| alloy_rlp::Error::Custom("invalid transaction type"))
    }
}

impl Typed2718 for LedgerTxType {
    fn ty(&self) -> u8 {
        (*self).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_tx_types() {
        assert_eq!(LedgerTxType::ALL.len(), 4);
        let all = vec![
            LedgerTxType::Legacy,
            LedgerTxType::AccessList,
            LedgerTxType::DynamicFee,
            LedgerTxType::Deposit,
        ];
        assert_eq!(LedgerTxType::ALL.to_vec(), all);
    }

    #[test]
    fn tags_are_unique() {
        let mut tags: Vec<u8> = LedgerTxType::ALL.iter().map(|ty| u8::from(*ty)).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), LedgerTxType::ALL.len());
    }

    #[test]
    fn tx_type_rlp_roundtrip() {
        for &tx_type in &LedgerTxType::ALL {
            let mut buf = Vec::new();
            tx_type.encode(&mut buf);
            let decoded = LedgerTxType::decode(&mut &buf[..]).unwrap();
            assert_eq!(tx_type, decoded);
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert!(matches!(LedgerTxType::try_from(3u8), Err(Eip2718Error::UnexpectedType(3))));
        assert!(LedgerTxType::try_from(0x7Fu64).is_err());
        assert!(LedgerTxType::try_from(u64::MAX).is_err());
    }

    #[test]
    fn only_deposit_is_whole_envelope() {
        for ty in LedgerTxType::ALL {
            assert_eq!(ty.wire_format() == WireFormat::WholeEnvelope, ty.is_deposit());
        }
        assert_eq!(LedgerTxType::Deposit, 0x7Eu8);
        assert_eq!(LedgerTxType::Deposit.to_string(), "deposit");
    }

    #[test]
    fn serde_uses_hex_quantity() {
        let json = serde_json::to_string(&LedgerTxType::Deposit).unwrap();
        assert_eq!(json, "\"0x7e\"");
        let back: LedgerTxType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, LedgerTxType::Deposit);
    }
}
