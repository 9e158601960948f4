/// Document identifier validation
/// Identifiers are 12-byte values rendered as 24 lowercase hex characters.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Number of raw bytes in a document identifier
pub const ID_BYTES: usize = 12;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidId {
    #[error("identifier must be {expected} characters, got {actual}")]
    Length { expected: usize, actual: usize },
    #[error("identifier is not valid hex")]
    NotHex,
    #[error("identifier is not in canonical lowercase form")]
    NotCanonical,
}

/// A structurally valid document identifier.
///
/// The only way to obtain one is through [`DocumentId::parse`] (or from raw
/// bytes handed back by the store), so anything holding a `DocumentId` has
/// already passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId([u8; ID_BYTES]);

impl DocumentId {
    /// Parse a path parameter into an identifier.
    ///
    /// The input is decoded and re-encoded; only strings equal to their own
    /// canonical encoding are accepted, so `"5F..."` is rejected even though it
    /// decodes.
    pub fn parse(raw: &str) -> Result<Self, InvalidId> {
        if raw.len() != ID_BYTES * 2 {
            return Err(InvalidId::Length {
                expected: ID_BYTES * 2,
                actual: raw.len(),
            });
        }

        let mut bytes = [0u8; ID_BYTES];
        hex::decode_to_slice(raw, &mut bytes).map_err(|_| InvalidId::NotHex)?;

        let id = Self(bytes);
        if id.to_hex() != raw {
            return Err(InvalidId::NotCanonical);
        }
        Ok(id)
    }

    pub fn from_bytes(bytes: [u8; ID_BYTES]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> [u8; ID_BYTES] {
        self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for DocumentId {
    type Err = InvalidId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for DocumentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(de::Error::custom)
    }
}
