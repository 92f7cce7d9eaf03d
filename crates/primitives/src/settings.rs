use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Result, TxError};

/// Default upper bound on an encoded transaction, matching the usual pool limit of 128 KiB.
pub const DEFAULT_MAX_TX_SIZE: usize = 128 * 1024;

/// Limits applied by the envelope when decoding untrusted bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecSettings {
    /// Whether deposit transactions may be decoded. Sources that only carry user transactions,
    /// such as the pool, should turn this off.
    pub allow_deposits: bool,
    pub max_tx_size: usize,
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self { allow_deposits: true, max_tx_size: DEFAULT_MAX_TX_SIZE }
    }
}

impl CodecSettings {
    /// Settings for user-submitted transactions: deposits are refused.
    pub fn user_only() -> Self {
        Self { allow_deposits: false, ..Default::default() }
    }

    pub fn from_toml_str(toml: &str) -> Result<Self> {
        toml::from_str(toml).map_err(|e| TxError::Settings(e.to_string()))
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let toml = std::fs::read_to_string(path).map_err(|e| TxError::Settings(e.to_string()))?;
        Self::from_toml_str(&toml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let settings = CodecSettings::from_toml_str("allow_deposits = false").unwrap();
        assert!(!settings.allow_deposits);
        assert_eq!(settings.max_tx_size, DEFAULT_MAX_TX_SIZE);
        assert_eq!(CodecSettings::from_toml_str("").unwrap(), CodecSettings::default());
    }

    #[test]
    fn reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_tx_size = 64").unwrap();
        let settings = CodecSettings::from_toml_file(file.path()).unwrap();
        assert_eq!(settings, CodecSettings { allow_deposits: true, max_tx_size: 64 });
    }

    #[test]
    fn bad_input_is_a_settings_error() {
        assert!(matches!(
            CodecSettings::from_toml_str("max_tx_size = \"big\""),
            Err(TxError::Settings(_))
        ));
        assert!(matches!(
            CodecSettings::from_toml_file("/nonexistent/ledger.toml"),
            Err(TxError::Settings(_))
        ));
    }
}
