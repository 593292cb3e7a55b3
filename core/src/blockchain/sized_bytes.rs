use crate::clvm::program::Program;
use blst::min_pk::{PublicKey, SecretKey, Signature};
use bytes::Buf;
use dg_wallet_serialize::ChiaSerialize;
use hex::FromHexError;
use hex::{decode, encode};
use log::warn;
use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::io::{Cursor, Error, ErrorKind, Read};

pub fn prep_hex_str(to_fix: &str) -> String {
    let lc = to_fix.to_lowercase();
    if let Some(s) = lc.strip_prefix("0x") {
        s.to_string()
    } else {
        lc
    }
}

pub fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, FromHexError> {
    decode(prep_hex_str(hex))
}

/// Minimal big endian encoding of an unsigned amount as a clvm atom.
#[must_use]
pub fn u64_to_bytes(v: u64) -> Vec<u8> {
    let bytes = v.to_be_bytes();
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    let mut rtn = Vec::with_capacity(9);
    if start < bytes.len() && bytes[start] & 0x80 != 0 {
        rtn.push(0);
    }
    rtn.extend_from_slice(&bytes[start..]);
    rtn
}

pub trait SizedBytes: Sized + fmt::Display {
    const SIZE: usize;
    /// Copies `bytes` into a fixed buffer, truncating or zero padding as needed.
    fn new(bytes: &[u8]) -> Self;
    /// Like [`SizedBytes::new`] but fails unless `bytes` has exactly the right length.
    fn parse(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() == Self::SIZE {
            Ok(Self::new(bytes))
        } else {
            Err(Error::new(
                ErrorKind::InvalidData,
                format!("Expected {} bytes, got {}", Self::SIZE, bytes.len()),
            ))
        }
    }
    fn as_slice(&self) -> &[u8];
    fn is_null(&self) -> bool {
        self.as_slice().iter().all(|v| *v == 0)
    }
}

macro_rules! impl_sized_bytes {
    ($($name: ident, $size:expr, $visitor:ident);*) => {
        $(
            #[derive(Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
            pub struct $name {
                pub bytes: [u8; $size]
            }
            impl SizedBytes for $name {
                const SIZE: usize = $size;
                fn new(bytes: &[u8]) -> Self {
                    if bytes.len() > $size {
                        warn!("Too Many Bytes Sent to {}, expected {} got {}", stringify!($name), $size, bytes.len());
                    }
                    let mut buf = [0u8; $size];
                    let len = bytes.len().min($size);
                    buf[..len].copy_from_slice(&bytes[..len]);
                    Self { bytes: buf }
                }
                fn as_slice(&self) -> &[u8] {
                    &self.bytes
                }
            }
            impl $name {
                #[must_use]
                pub const fn from_sized_bytes(bytes: [u8; $size]) -> Self {
                    $name { bytes }
                }
                #[must_use]
                pub fn to_sized_bytes(&self) -> &[u8; $size] {
                    &self.bytes
                }
            }

            impl Serialize for $name {
                fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
                where
                    S: Serializer,
                {
                    serializer.serialize_str(&format!("0x{}", encode(&self.bytes)))
                }
            }

            impl AsRef<[u8]> for $name {
                fn as_ref(&self) -> &[u8] {
                    &self.bytes
                }
            }

            impl From<[u8; $size]> for $name {
                fn from(bytes: [u8; $size]) -> Self {
                    $name::from_sized_bytes(bytes)
                }
            }

            impl From<&[u8; $size]> for $name {
                fn from(bytes: &[u8; $size]) -> Self {
                    $name::from_sized_bytes(*bytes)
                }
            }

            impl TryFrom<&str> for $name {
                type Error = Error;

                fn try_from(hex: &str) -> Result<Self, Self::Error> {
                    let bytes = hex_to_bytes(hex).map_err(|e| {
                        Error::new(ErrorKind::InvalidData, format!("Invalid hex for {}: {e:?}", stringify!($name)))
                    })?;
                    $name::parse(&bytes)
                }
            }

            impl TryFrom<&Program> for $name {
                type Error = Error;

                fn try_from(value: &Program) -> Result<Self, Self::Error> {
                    let vec = value.as_vec().ok_or_else(|| {
                        Error::new(ErrorKind::InvalidInput, format!("Program is not a valid {}", stringify!($name)))
                    })?;
                    $name::parse(&vec)
                }
            }

            struct $visitor;

            impl Visitor<'_> for $visitor {
                type Value = $name;

                fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                    formatter.write_str(format!("Expecting a hex String of {} bytes", $size).as_str())
                }

                fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
                where
                    E: serde::de::Error,
                {
                    $name::try_from(value).map_err(serde::de::Error::custom)
                }
            }

            impl<'a> Deserialize<'a> for $name {
                fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
                where
                    D: Deserializer<'a>,
                {
                    deserializer.deserialize_str($visitor)
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", encode(&self.bytes))
                }
            }

            impl Default for $name {
                fn default() -> $name {
                    $name::from([0; $size])
                }
            }

            impl fmt::Debug for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", encode(&self.bytes))
                }
            }

            impl ChiaSerialize for $name {
                fn to_bytes(&self) -> Vec<u8> {
                    self.bytes.to_vec()
                }
                fn from_bytes<T: AsRef<[u8]>>(bytes: &mut Cursor<T>) -> Result<Self, Error> {
                    if bytes.remaining() < $size {
                        return Err(Error::new(
                            ErrorKind::UnexpectedEof,
                            format!("Failed to parse {}, expected {} bytes, found {}", stringify!($name), $size, bytes.remaining()),
                        ));
                    }
                    let mut buf = [0u8; $size];
                    bytes.read_exact(&mut buf)?;
                    Ok(buf.into())
                }
            }
        )*
    };
}

impl_sized_bytes!(
    Bytes32, 32, Bytes32Visitor;
    Bytes48, 48, Bytes48Visitor;
    Bytes96, 96, Bytes96Visitor
);

fn blst_error(e: blst::BLST_ERROR) -> Error {
    Error::new(ErrorKind::InvalidInput, format!("{e:?}"))
}

impl TryFrom<&Bytes32> for SecretKey {
    type Error = Error;

    fn try_from(val: &Bytes32) -> Result<SecretKey, Error> {
        SecretKey::from_bytes(val.to_sized_bytes()).map_err(blst_error)
    }
}

impl TryFrom<&Bytes48> for PublicKey {
    type Error = Error;

    fn try_from(val: &Bytes48) -> Result<PublicKey, Error> {
        PublicKey::from_bytes(val.to_sized_bytes()).map_err(blst_error)
    }
}

impl TryFrom<&Bytes96> for Signature {
    type Error = Error;

    fn try_from(val: &Bytes96) -> Result<Signature, Error> {
        Signature::from_bytes(val.to_sized_bytes()).map_err(blst_error)
    }
}

impl TryFrom<Bytes96> for Signature {
    type Error = Error;

    fn try_from(val: Bytes96) -> Result<Signature, Error> {
        Signature::try_from(&val)
    }
}

impl From<SecretKey> for Bytes32 {
    fn from(val: SecretKey) -> Bytes32 {
        Bytes32::from_sized_bytes(val.to_bytes())
    }
}

impl From<&SecretKey> for Bytes32 {
    fn from(val: &SecretKey) -> Bytes32 {
        Bytes32::from_sized_bytes(val.to_bytes())
    }
}

impl From<PublicKey> for Bytes48 {
    fn from(val: PublicKey) -> Bytes48 {
        Bytes48::from_sized_bytes(val.to_bytes())
    }
}

impl From<&PublicKey> for Bytes48 {
    fn from(val: &PublicKey) -> Bytes48 {
        Bytes48::from_sized_bytes(val.to_bytes())
    }
}

impl From<Signature> for Bytes96 {
    fn from(val: Signature) -> Bytes96 {
        Bytes96::from_sized_bytes(val.to_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u64_to_bytes() {
        assert_eq!(u64_to_bytes(0), Vec::<u8>::new());
        assert_eq!(u64_to_bytes(127), vec![0x7f]);
        assert_eq!(u64_to_bytes(128), vec![0x00, 0x80]);
        assert_eq!(u64_to_bytes(u64::MAX)[0], 0);
    }

    #[test]
    fn test_hex_parsing() {
        let hex = "0x711d6c4e32c92e53179b199484cf8c897542bc57f2b22582799f9d657eec4699";
        let parsed = Bytes32::try_from(hex).unwrap();
        assert_eq!(format!("0x{parsed}"), hex);
        assert!(Bytes32::try_from("0x1234").is_err());
        assert!(Bytes48::try_from("zz").is_err());
    }

    #[test]
    fn test_json_uses_prefixed_hex() {
        let value = Bytes32::new(&[1u8; 32]);
        let json = serde_json::to_string(&value).unwrap();
        assert!(json.starts_with("\"0x0101"));
        assert_eq!(serde_json::from_str::<Bytes32>(&json).unwrap(), value);
    }

    #[test]
    fn test_new_pads_short_input() {
        let value = Bytes32::new(&[9u8; 4]);
        assert_eq!(&value.as_slice()[..4], &[9u8; 4]);
        assert!(value.as_slice()[4..].iter().all(|b| *b == 0));
    }
}
