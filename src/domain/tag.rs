//! Domain tags for off-chain attribution of settlement calls.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{keccak256, Bytes, FixedBytes};

/// Four-byte marker appended to the tail of a settlement call's calldata.
///
/// The settlement contract ignores trailing bytes; indexers read them back to
/// attribute fills to a marketplace or integrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomainTag(FixedBytes<4>);

impl DomainTag {
    /// Tag length in bytes.
    pub const LEN: usize = 4;

    /// Derive the conventional tag for a domain: the first four bytes of
    /// `keccak256(domain)`.
    #[must_use]
    pub fn from_domain(domain: &str) -> Self {
        let hash = keccak256(domain.as_bytes());
        Self(FixedBytes::from_slice(&hash[..Self::LEN]))
    }

    #[must_use]
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(FixedBytes(bytes))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0 .0
    }

    /// Calldata with this tag appended.
    #[must_use]
    pub fn append_to(&self, calldata: &[u8]) -> Bytes {
        let mut tagged = Vec::with_capacity(calldata.len() + Self::LEN);
        tagged.extend_from_slice(calldata);
        tagged.extend_from_slice(self.as_bytes());
        Bytes::from(tagged)
    }
}

impl FromStr for DomainTag {
    type Err = String;

    /// Parse a `0x`-prefixed four-byte hex tag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FixedBytes::<4>::from_str(s)
            .map(Self)
            .map_err(|e| format!("invalid domain tag '{s}': {e}"))
    }
}

impl fmt::Display for DomainTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_known_marketplace_tag() {
        assert_eq!(
            DomainTag::from_domain("opensea.io"),
            DomainTag::from_bytes([0x36, 0x0c, 0x6e, 0xbe])
        );
    }

    #[test]
    fn appends_to_calldata_tail() {
        let tag = DomainTag::from_bytes([0xde, 0xad, 0xbe, 0xef]);
        let tagged = tag.append_to(&[0x01, 0x02]);
        assert_eq!(tagged.as_ref(), &[0x01, 0x02, 0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn parses_hex_tag() {
        let tag: DomainTag = "0x360c6ebe".parse().unwrap();
        assert_eq!(tag, DomainTag::from_domain("opensea.io"));
        assert_eq!(tag.to_string(), "0x360c6ebe");
    }

    #[test]
    fn rejects_wrong_length() {
        assert!("0x360c6e".parse::<DomainTag>().is_err());
    }
}
