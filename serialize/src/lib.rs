use bytes::Buf;
use log::warn;
use sha2::{Digest, Sha256};
use std::io::{Cursor, Error, ErrorKind, Read};

const LARGE_LIST_WARNING: u32 = 2048;

pub fn hash_256(input: impl AsRef<[u8]>) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hasher.finalize().to_vec()
}

/// Hashes the concatenation of every part without building the joined buffer.
pub fn hash_all<I, T>(parts: I) -> Vec<u8>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().to_vec()
}

/// Big endian, length prefixed encoding used for coins, spends and bundles.
pub trait ChiaSerialize {
    fn to_bytes(&self) -> Vec<u8>
    where
        Self: Sized;
    fn from_bytes<T: AsRef<[u8]>>(bytes: &mut Cursor<T>) -> Result<Self, Error>
    where
        Self: Sized;
}

pub fn read_array<const N: usize, T: AsRef<[u8]>>(bytes: &mut Cursor<T>) -> Result<[u8; N], Error> {
    if bytes.remaining() < N {
        return Err(Error::new(
            ErrorKind::UnexpectedEof,
            format!("Expected {N} bytes, found {}", bytes.remaining()),
        ));
    }
    let mut buf = [0u8; N];
    bytes.read_exact(&mut buf)?;
    Ok(buf)
}

fn read_len<T: AsRef<[u8]>>(bytes: &mut Cursor<T>) -> Result<u32, Error> {
    let len = u32::from_be_bytes(read_array(bytes)?);
    if len > LARGE_LIST_WARNING {
        warn!("Reading large list: {len}");
    }
    Ok(len)
}

impl ChiaSerialize for bool {
    fn to_bytes(&self) -> Vec<u8> {
        vec![*self as u8]
    }
    fn from_bytes<T: AsRef<[u8]>>(bytes: &mut Cursor<T>) -> Result<Self, Error> {
        match read_array::<1, T>(bytes)?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::new(
                ErrorKind::InvalidData,
                format!("Invalid bool byte: {other}"),
            )),
        }
    }
}

impl ChiaSerialize for String {
    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = (self.len() as u32).to_be_bytes().to_vec();
        bytes.extend(self.as_bytes());
        bytes
    }
    fn from_bytes<T: AsRef<[u8]>>(bytes: &mut Cursor<T>) -> Result<Self, Error> {
        let len = read_len(bytes)? as usize;
        let mut buf = vec![0u8; len];
        bytes.read_exact(&mut buf)?;
        String::from_utf8(buf)
            .map_err(|e| Error::new(ErrorKind::InvalidData, format!("Invalid utf-8: {e:?}")))
    }
}

impl<T: ChiaSerialize> ChiaSerialize for Option<T> {
    fn to_bytes(&self) -> Vec<u8> {
        match self {
            Some(t) => {
                let mut bytes = vec![1u8];
                bytes.extend(t.to_bytes());
                bytes
            }
            None => vec![0u8],
        }
    }
    fn from_bytes<B: AsRef<[u8]>>(bytes: &mut Cursor<B>) -> Result<Self, Error> {
        if read_array::<1, B>(bytes)?[0] > 0 {
            Ok(Some(T::from_bytes(bytes)?))
        } else {
            Ok(None)
        }
    }
}

impl<T: ChiaSerialize> ChiaSerialize for Vec<T> {
    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = (self.len() as u32).to_be_bytes().to_vec();
        for item in self {
            bytes.extend(item.to_bytes());
        }
        bytes
    }
    fn from_bytes<B: AsRef<[u8]>>(bytes: &mut Cursor<B>) -> Result<Self, Error> {
        let len = read_len(bytes)?;
        (0..len).try_fold(Vec::new(), |mut items, _| {
            items.push(T::from_bytes(bytes)?);
            Ok(items)
        })
    }
}

macro_rules! impl_ints {
    ($($name: ident),*) => {
        $(
            impl ChiaSerialize for $name {
                fn to_bytes(&self) -> Vec<u8> {
                    self.to_be_bytes().to_vec()
                }
                fn from_bytes<T: AsRef<[u8]>>(bytes: &mut Cursor<T>) -> Result<Self, Error> {
                    Ok($name::from_be_bytes(read_array(bytes)?))
                }
            }
        )*
    };
}
impl_ints!(u8, u16, u32, u64, u128, i8, i16, i32, i64);
