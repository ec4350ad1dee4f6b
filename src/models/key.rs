//! The 50-digit numeric key of a Costa Rican electronic document
//!
//! Every invoice, ticket and credit note issued through Hacienda carries a
//! fixed-layout 50-digit key. The key is the primary identifier across the
//! registry, the ledger and the accounting tree.
//!
//! Layout (byte offsets):
//!
//! ```text
//! 0..3    country prefix (506)
//! 3..5    issue day
//! 5..7    issue month
//! 7..9    issue year, two digits
//! 9..21   issuer tax id (12 digits)
//! 21..41  consecutive number (20 digits)
//! 41..42  situation code
//! 42..50  security code
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FactureroError;

/// Number of digits in a document key
pub const KEY_LEN: usize = 50;

/// A validated 50-digit document key
///
/// Construction goes through [`InvoiceKey::parse`], which guarantees the
/// value is exactly 50 ASCII digits. Lexicographic order equals numeric
/// order because the length is fixed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InvoiceKey(String);

impl InvoiceKey {
    /// Parse and validate a document key
    ///
    /// Leading/trailing whitespace is tolerated. Anything that is not
    /// exactly 50 ASCII digits is rejected.
    pub fn parse(value: &str) -> Result<Self, FactureroError> {
        let trimmed = value.trim();

        if trimmed.len() != KEY_LEN {
            return Err(FactureroError::InvalidKey {
                value: trimmed.to_string(),
                reason: format!("expected {} digits, got {}", KEY_LEN, trimmed.len()),
            });
        }

        if !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FactureroError::InvalidKey {
                value: trimmed.to_string(),
                reason: "contains non-digit characters".to_string(),
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    /// The full 50-digit string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Country prefix, `506` for documents issued in Costa Rica
    pub fn country_prefix(&self) -> &str {
        &self.0[0..3]
    }

    /// Issue day from the key layout
    pub fn issue_day(&self) -> u8 {
        self.two_digits(3)
    }

    /// Issue month from the key layout
    pub fn issue_month(&self) -> u8 {
        self.two_digits(5)
    }

    /// Two-digit issue year from the key layout
    pub fn year_two_digits(&self) -> u8 {
        self.two_digits(7)
    }

    /// The issuer's 12-digit tax id
    pub fn issuer_id(&self) -> &str {
        &self.0[9..21]
    }

    /// The 20-digit consecutive number
    pub fn consecutive(&self) -> &str {
        &self.0[21..41]
    }

    /// The document type code inside the consecutive number
    ///
    /// `01` factura, `02` nota de débito, `03` nota de crédito, `04`
    /// tiquete, `08` factura de compra, `09` factura de exportación.
    pub fn document_type_code(&self) -> &str {
        &self.0[29..31]
    }

    /// Situation code digit
    pub fn situation(&self) -> &str {
        &self.0[41..42]
    }

    /// The 8-digit security code
    pub fn security_code(&self) -> &str {
        &self.0[42..50]
    }

    fn two_digits(&self, start: usize) -> u8 {
        let bytes = self.0.as_bytes();
        (bytes[start] - b'0') * 10 + (bytes[start + 1] - b'0')
    }
}

impl fmt::Display for InvoiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for InvoiceKey {
    type Err = FactureroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for InvoiceKey {
    type Error = FactureroError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<InvoiceKey> for String {
    fn from(key: InvoiceKey) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = "50614032401011234560000100001010000000011199999999";

    #[test]
    fn test_parse_valid_key() {
        let key = InvoiceKey::parse(VALID).unwrap();
        assert_eq!(key.as_str(), VALID);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let key = InvoiceKey::parse(&format!("  {}\n", VALID)).unwrap();
        assert_eq!(key.as_str(), VALID);
    }

    #[test]
    fn test_rejects_wrong_length() {
        let err = InvoiceKey::parse(&VALID[..49]).unwrap_err();
        assert!(err.to_string().contains("expected 50 digits, got 49"));

        let long = format!("{}0", VALID);
        assert!(InvoiceKey::parse(&long).is_err());
    }

    #[test]
    fn test_rejects_non_digits() {
        let bad = format!("{}X", &VALID[..49]);
        let err = InvoiceKey::parse(&bad).unwrap_err();
        assert!(err.to_string().contains("non-digit"));
    }

    #[test]
    fn test_segment_accessors() {
        let key = InvoiceKey::parse(VALID).unwrap();
        assert_eq!(key.country_prefix(), "506");
        assert_eq!(key.issue_day(), 14);
        assert_eq!(key.issue_month(), 3);
        assert_eq!(key.year_two_digits(), 24);
        assert_eq!(key.issuer_id(), "010112345600");
        assert_eq!(key.consecutive(), "00100001010000000011");
        assert_eq!(key.document_type_code(), "01");
        assert_eq!(key.situation(), "1");
        assert_eq!(key.security_code(), "99999999");
    }

    #[test]
    fn test_serde_round_trip() {
        let key = InvoiceKey::parse(VALID).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, format!("\"{}\"", VALID));

        let back: InvoiceKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
    }

    #[test]
    fn test_serde_rejects_invalid() {
        let result: Result<InvoiceKey, _> = serde_json::from_str("\"12345\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_ordering_is_numeric() {
        let a = InvoiceKey::parse(VALID).unwrap();
        let b = InvoiceKey::parse(&format!("{}8", &VALID[..49])).unwrap();
        assert!(a > b); // last digit 9 vs 8
    }
}
