//! BLAKE3 digest used inside content addresses.

use std::fmt;

/// A 32 byte BLAKE3 digest.
#[derive(Clone, Copy, Hash, PartialEq, Eq)]
pub struct Hash(blake3::Hash);

impl Hash {
    /// The size of the digest in bytes.
    pub const SIZE: usize = 32;

    /// Hash the provided bytes.
    pub fn new(buf: impl AsRef<[u8]>) -> Self {
        Hash(blake3::hash(buf.as_ref()))
    }

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(blake3::Hash::from_bytes(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex().to_string()
    }

    /// First five bytes as lowercase hex, for log lines.
    pub fn fmt_short(&self) -> String {
        data_encoding::HEXLOWER.encode(&self.as_bytes()[..5])
    }
}

impl From<blake3::Hash> for Hash {
    fn from(value: blake3::Hash) -> Self {
        Hash(value)
    }
}

impl From<[u8; 32]> for Hash {
    fn from(value: [u8; 32]) -> Self {
        Hash::from_bytes(value)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl PartialOrd for Hash {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Hash {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Hash").field(&self.to_hex()).finish()
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest() {
        let hash = Hash::new(b"hello");
        assert_eq!(
            hash.to_hex(),
            "ea8f163db38682925e4491c5e58d4bb3506ef8c14eb78a86e908c5624a67200f"
        );
        assert!(hash.to_hex().starts_with(&hash.fmt_short()));
    }

    #[test]
    fn ordering_follows_bytes() {
        assert!(Hash::from_bytes([0u8; 32]) < Hash::from_bytes([1u8; 32]));
    }
}
