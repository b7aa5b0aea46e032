//! Self-describing content addresses.
//!
//! A [`ContentAddress`] is encoded as
//! `version (0x01) | codec | multihash code (0x1e, blake3) | digest length (0x20) | digest`
//! and rendered as a lowercase base32 multibase string. Parsing accepts any
//! multibase alphabet but rejects every other layout.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::Hash;

const ADDRESS_VERSION: u8 = 0x01;
const MULTIHASH_BLAKE3: u8 = 0x1e;
const ENCODED_LEN: usize = 4 + Hash::SIZE;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentAddressError {
    #[error("invalid multibase string: {0}")]
    Multibase(String),
    #[error("invalid length: expected {ENCODED_LEN} bytes, got {0}")]
    InvalidLength(usize),
    #[error("unsupported address version {0:#x}")]
    UnsupportedVersion(u8),
    #[error("unknown codec {0:#x}")]
    UnknownCodec(u8),
    #[error("unsupported multihash {0:#x}, only blake3 is accepted")]
    UnsupportedMultihash(u8),
    #[error("invalid digest length {0}")]
    InvalidDigestLength(u8),
}

impl From<multibase::Error> for ContentAddressError {
    fn from(err: multibase::Error) -> Self {
        ContentAddressError::Multibase(err.to_string())
    }
}

/// How the addressed bytes should be interpreted.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Codec {
    Raw,
    DagPb,
    DagCbor,
}

impl Codec {
    pub const fn code(self) -> u8 {
        match self {
            Codec::Raw => 0x55,
            Codec::DagPb => 0x70,
            Codec::DagCbor => 0x71,
        }
    }

    pub fn from_code(code: u8) -> Result<Self, ContentAddressError> {
        match code {
            0x55 => Ok(Codec::Raw),
            0x70 => Ok(Codec::DagPb),
            0x71 => Ok(Codec::DagCbor),
            other => Err(ContentAddressError::UnknownCodec(other)),
        }
    }
}

/// Immutable identifier of a piece of content, used as the key for every
/// storage operation.
///
/// ```
/// use strata_core::{Codec, ContentAddress};
///
/// let addr = ContentAddress::for_bytes(b"hello");
/// assert_eq!(addr.codec(), Codec::Raw);
/// let parsed: ContentAddress = addr.to_string().parse().unwrap();
/// assert_eq!(parsed, addr);
/// ```
#[derive(Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ContentAddress {
    codec: Codec,
    hash: Hash,
}

impl ContentAddress {
    pub fn new(codec: Codec, hash: Hash) -> Self {
        Self { codec, hash }
    }

    /// Address of `data` stored as raw bytes.
    pub fn for_bytes(data: impl AsRef<[u8]>) -> Self {
        Self::new(Codec::Raw, Hash::new(data))
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    pub fn parse(s: &str) -> Result<Self, ContentAddressError> {
        let (_, bytes) = multibase::decode(s)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ContentAddressError> {
        if bytes.len() != ENCODED_LEN {
            return Err(ContentAddressError::InvalidLength(bytes.len()));
        }
        if bytes[0] != ADDRESS_VERSION {
            return Err(ContentAddressError::UnsupportedVersion(bytes[0]));
        }
        let codec = Codec::from_code(bytes[1])?;
        if bytes[2] != MULTIHASH_BLAKE3 {
            return Err(ContentAddressError::UnsupportedMultihash(bytes[2]));
        }
        if bytes[3] as usize != Hash::SIZE {
            return Err(ContentAddressError::InvalidDigestLength(bytes[3]));
        }
        let digest: [u8; 32] = bytes[4..]
            .try_into()
            .map_err(|_| ContentAddressError::InvalidLength(bytes.len()))?;
        Ok(Self::new(codec, digest.into()))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(ENCODED_LEN);
        out.extend_from_slice(&[
            ADDRESS_VERSION,
            self.codec.code(),
            MULTIHASH_BLAKE3,
            Hash::SIZE as u8,
        ]);
        out.extend_from_slice(self.hash.as_bytes());
        out
    }
}

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&multibase::encode(
            multibase::Base::Base32Lower,
            self.to_bytes(),
        ))
    }
}

impl fmt::Debug for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentAddress({self})")
    }
}

impl FromStr for ContentAddress {
    type Err = ContentAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentAddress::parse(s)
    }
}

impl Serialize for ContentAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ContentAddress::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_form_roundtrips() {
        let addr = ContentAddress::new(Codec::DagCbor, Hash::new(b"node"));
        let s = addr.to_string();
        assert!(s.starts_with('b'));
        assert_eq!(ContentAddress::parse(&s).unwrap(), addr);
    }

    #[test]
    fn accepts_other_multibase_alphabets() {
        let addr = ContentAddress::for_bytes(b"data");
        let b58 = multibase::encode(multibase::Base::Base58Btc, addr.to_bytes());
        assert_eq!(ContentAddress::parse(&b58).unwrap(), addr);
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            ContentAddress::parse("not-an-address"),
            Err(ContentAddressError::Multibase(_))
        ));
        assert!(matches!(
            ContentAddress::parse(""),
            Err(ContentAddressError::Multibase(_))
        ));
    }

    #[test]
    fn rejects_wrong_layout() {
        let mut bytes = ContentAddress::for_bytes(b"x").to_bytes();
        bytes[0] = 0x00;
        assert_eq!(
            ContentAddress::from_bytes(&bytes),
            Err(ContentAddressError::UnsupportedVersion(0))
        );

        let mut bytes = ContentAddress::for_bytes(b"x").to_bytes();
        bytes[1] = 0x01;
        assert_eq!(
            ContentAddress::from_bytes(&bytes),
            Err(ContentAddressError::UnknownCodec(0x01))
        );

        let mut bytes = ContentAddress::for_bytes(b"x").to_bytes();
        bytes[2] = 0x12;
        assert_eq!(
            ContentAddress::from_bytes(&bytes),
            Err(ContentAddressError::UnsupportedMultihash(0x12))
        );

        let bytes = ContentAddress::for_bytes(b"x").to_bytes();
        assert_eq!(
            ContentAddress::from_bytes(&bytes[..20]),
            Err(ContentAddressError::InvalidLength(20))
        );
    }

    #[test]
    fn empty_content_has_an_address() {
        let addr = ContentAddress::for_bytes(b"");
        assert_eq!(addr.hash(), &Hash::new(b""));
    }
}
