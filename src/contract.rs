//! The shared identity contract.
//!
//! Every service that computes event identifiers must agree on these four
//! values. Changing any of them changes every identifier, so the contract is
//! versioned and published as a single YAML artifact.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Width of an event start-time bucket in milliseconds (contract v1).
pub const BUCKET_WIDTH_MS: i64 = 100;

/// Separator placed between identity parts before hashing (contract v1).
pub const DELIMITER: &str = ":";

/// Text encoding of the joined parts (contract v1).
pub const ENCODING: &str = "utf-8";

/// Digest algorithm (contract v1).
pub const DIGEST: &str = "sha256";

/// Versioned identity constants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdContract {
    /// Contract revision; bump on any change below
    pub version: u32,

    /// Bucket width for event start times, in milliseconds
    pub bucket_width_ms: i64,

    /// Separator between parts
    pub delimiter: String,

    /// Encoding of the joined text
    pub encoding: String,

    /// Digest algorithm name
    pub digest: String,
}

/// Errors from an invalid contract.
#[derive(Debug, Clone, PartialEq)]
pub enum ContractError {
    NonPositiveBucketWidth(i64),
    EmptyDelimiter,
    UnsupportedEncoding(String),
}

impl std::fmt::Display for ContractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContractError::NonPositiveBucketWidth(width) => {
                write!(f, "bucket width must be positive, got {}ms", width)
            }
            ContractError::EmptyDelimiter => write!(f, "delimiter cannot be empty"),
            ContractError::UnsupportedEncoding(encoding) => {
                write!(f, "unsupported encoding '{}': only utf-8 is supported", encoding)
            }
        }
    }
}

impl std::error::Error for ContractError {}

impl IdContract {
    /// The frozen v1 contract.
    pub fn v1() -> Self {
        Self {
            version: 1,
            bucket_width_ms: BUCKET_WIDTH_MS,
            delimiter: DELIMITER.to_string(),
            encoding: ENCODING.to_string(),
            digest: DIGEST.to_string(),
        }
    }

    /// Load and validate a contract from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read contract file {}", path.display()))?;
        let contract: IdContract = serde_yaml::from_str(&text).context("Failed to parse contract YAML")?;
        contract.validate().map_err(|e| eyre::eyre!(e))?;
        log::info!("Loaded identity contract v{} from {}", contract.version, path.display());
        Ok(contract)
    }

    /// Render the contract as YAML for publishing.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize contract")
    }

    /// Check the structural fields. Digest availability is checked by the generator.
    pub fn validate(&self) -> Result<(), ContractError> {
        if self.bucket_width_ms <= 0 {
            return Err(ContractError::NonPositiveBucketWidth(self.bucket_width_ms));
        }
        if self.delimiter.is_empty() {
            return Err(ContractError::EmptyDelimiter);
        }
        match self.encoding.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(()),
            _ => Err(ContractError::UnsupportedEncoding(self.encoding.clone())),
        }
    }
}

impl Default for IdContract {
    fn default() -> Self {
        Self::v1()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_v1_values() {
        let c = IdContract::v1();
        assert_eq!(c.version, 1);
        assert_eq!(c.bucket_width_ms, 100);
        assert_eq!(c.delimiter, ":");
        assert_eq!(c.encoding, "utf-8");
        assert_eq!(c.digest, "sha256");
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_width() {
        let c = IdContract {
            bucket_width_ms: 0,
            ..IdContract::v1()
        };
        assert_eq!(c.validate(), Err(ContractError::NonPositiveBucketWidth(0)));
    }

    #[test]
    fn test_validate_rejects_empty_delimiter() {
        let c = IdContract {
            delimiter: String::new(),
            ..IdContract::v1()
        };
        assert_eq!(c.validate(), Err(ContractError::EmptyDelimiter));
    }

    #[test]
    fn test_validate_encoding() {
        let utf8 = IdContract {
            encoding: "UTF8".to_string(),
            ..IdContract::v1()
        };
        assert!(utf8.validate().is_ok());

        let latin1 = IdContract {
            encoding: "latin-1".to_string(),
            ..IdContract::v1()
        };
        assert!(matches!(latin1.validate(), Err(ContractError::UnsupportedEncoding(_))));
    }

    #[test]
    fn test_yaml_roundtrip_through_file() {
        let yaml = IdContract::v1().to_yaml().unwrap();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let loaded = IdContract::load(file.path()).unwrap();
        assert_eq!(loaded, IdContract::v1());
    }

    #[test]
    fn test_load_invalid_contract_fails() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "version: 2\nbucket_width_ms: -5\ndelimiter: \":\"\nencoding: utf-8\ndigest: sha256"
        )
        .unwrap();

        assert!(IdContract::load(file.path()).is_err());
    }
}
