use crate::blockchain::condition_opcode::ConditionOpcode;
use crate::blockchain::sized_bytes::{Bytes32, Bytes48, Bytes96, SizedBytes};
use crate::clvm::parser::{sexp_from_bytes, sexp_to_bytes};
use crate::clvm::program::Program;
use dg_wallet_serialize::{hash_256, ChiaSerialize};
use hex::encode;
use num_bigint::BigInt;
use once_cell::sync::Lazy;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::io::{Cursor, Error, ErrorKind};
use std::sync::Arc;

pub static NULL: Lazy<SExp> = Lazy::new(|| SExp::Atom(AtomBuf::new(vec![])));
pub static ONE: Lazy<SExp> = Lazy::new(|| SExp::Atom(AtomBuf::new(vec![1u8])));

#[derive(Clone, Hash, PartialEq, Eq)]
pub enum SExp {
    Atom(AtomBuf),
    Pair(PairBuf),
}

impl<'a> IntoIterator for &'a SExp {
    type Item = &'a SExp;
    type IntoIter = SExpIter<'a>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Default for SExp {
    fn default() -> SExp {
        NULL.clone()
    }
}

impl SExp {
    pub fn atom(&self) -> Result<&AtomBuf, Error> {
        match self {
            SExp::Atom(a) => Ok(a),
            SExp::Pair(_) => Err(Error::new(
                ErrorKind::InvalidData,
                "Expected Atom, got Pair",
            )),
        }
    }
    pub fn pair(&self) -> Result<&PairBuf, Error> {
        match self {
            SExp::Atom(_) => Err(Error::new(
                ErrorKind::InvalidData,
                "Expected Pair, got Atom",
            )),
            SExp::Pair(p) => Ok(p),
        }
    }
    pub fn first(&self) -> Result<&SExp, Error> {
        self.pair().map(|p| p.first.as_ref())
    }
    pub fn rest(&self) -> Result<&SExp, Error> {
        self.pair().map(|p| p.rest.as_ref())
    }
    pub fn split(&self) -> Result<(&SExp, &SExp), Error> {
        self.pair().map(|p| (p.first.as_ref(), p.rest.as_ref()))
    }
    #[must_use]
    pub fn as_vec(&self) -> Option<Vec<u8>> {
        match self {
            SExp::Atom(a) => Some(a.data.clone()),
            SExp::Pair(_) => None,
        }
    }
    pub fn as_int(&self) -> Result<BigInt, Error> {
        self.atom().map(AtomBuf::as_int)
    }
    #[must_use]
    pub fn cons(self, other: SExp) -> SExp {
        SExp::Pair(PairBuf {
            first: Arc::new(self),
            rest: Arc::new(other),
        })
    }
    #[must_use]
    pub fn nullp(&self) -> bool {
        matches!(self, SExp::Atom(a) if a.data.is_empty())
    }
    #[must_use]
    pub fn non_nil(&self) -> bool {
        !self.nullp()
    }
    #[must_use]
    pub fn as_bool(&self) -> bool {
        self.non_nil()
    }
    #[must_use]
    pub fn from_bool(b: bool) -> &'static SExp {
        if b {
            &ONE
        } else {
            &NULL
        }
    }

    /// Counts list items, stopping once `return_early_if_exceeds` is passed.
    #[must_use]
    pub fn arg_count(&self, return_early_if_exceeds: usize) -> usize {
        let mut count = 0;
        let mut ptr = self;
        while let SExp::Pair(pair) = ptr {
            ptr = &pair.rest;
            count += 1;
            if count > return_early_if_exceeds {
                break;
            }
        }
        count
    }

    #[must_use]
    pub fn arg_count_is(&self, count: usize) -> bool {
        let mut ptr = self;
        for _ in 0..count {
            match ptr {
                SExp::Pair(pair) => ptr = &pair.rest,
                SExp::Atom(_) => return false,
            }
        }
        ptr.nullp()
    }

    /// Items of a nil terminated list, `None` for an improper list.
    #[must_use]
    pub fn proper_list(&self) -> Option<Vec<SExp>> {
        let mut items = vec![];
        let mut ptr = self;
        loop {
            match ptr {
                SExp::Atom(a) => {
                    return if a.data.is_empty() { Some(items) } else { None };
                }
                SExp::Pair(pair) => {
                    items.push(pair.first.as_ref().clone());
                    ptr = &pair.rest;
                }
            }
        }
    }

    #[must_use]
    pub fn tree_hash(&self) -> Bytes32 {
        match self {
            SExp::Pair(pair) => {
                let mut buf = Vec::with_capacity(65);
                buf.push(2);
                buf.extend(pair.first.tree_hash().as_slice());
                buf.extend(pair.rest.tree_hash().as_slice());
                Bytes32::new(&hash_256(&buf))
            }
            SExp::Atom(atom) => {
                let mut buf = Vec::with_capacity(atom.data.len() + 1);
                buf.push(1);
                buf.extend(&atom.data);
                Bytes32::new(&hash_256(&buf))
            }
        }
    }

    #[must_use]
    pub fn iter(&self) -> SExpIter<'_> {
        SExpIter { c: self }
    }

    pub fn concat(nodes: &[&SExp]) -> Result<SExp, Error> {
        let mut buf = vec![];
        for node in nodes {
            buf.extend(&node.atom()?.data);
        }
        Ok(SExp::Atom(AtomBuf::new(buf)))
    }
}

impl Display for SExp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SExp::Atom(a) => write!(f, "{a}"),
            SExp::Pair(p) => write!(f, "{p}"),
        }
    }
}

impl Debug for SExp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl TryFrom<&BigInt> for SExp {
    type Error = Error;
    fn try_from(value: &BigInt) -> Result<Self, Self::Error> {
        Ok(SExp::Atom(AtomBuf::new(int_to_bytes(value))))
    }
}

/// Minimal signed big endian encoding, zero encodes as the empty atom.
#[must_use]
pub fn int_to_bytes(value: &BigInt) -> Vec<u8> {
    let bytes = value.to_signed_bytes_be();
    let mut slice = bytes.as_slice();
    while !slice.is_empty() {
        let redundant = match slice.get(1) {
            Some(next) => {
                (slice[0] == 0x00 && next & 0x80 == 0) || (slice[0] == 0xff && next & 0x80 != 0)
            }
            None => slice[0] == 0x00,
        };
        if !redundant {
            break;
        }
        slice = &slice[1..];
    }
    slice.to_vec()
}

#[must_use]
pub fn number_from_slice(v: &[u8]) -> BigInt {
    if v.is_empty() {
        0.into()
    } else {
        BigInt::from_signed_bytes_be(v)
    }
}

pub struct SExpIter<'a> {
    c: &'a SExp,
}

impl<'a> Iterator for SExpIter<'a> {
    type Item = &'a SExp;

    fn next(&mut self) -> Option<Self::Item> {
        match self.c {
            SExp::Atom(_) => None,
            SExp::Pair(pair) => {
                self.c = &pair.rest;
                Some(&pair.first)
            }
        }
    }
}

#[derive(Hash, Clone, PartialEq, Eq)]
pub struct AtomBuf {
    pub data: Vec<u8>,
}

impl AtomBuf {
    #[must_use]
    pub fn new(v: Vec<u8>) -> Self {
        AtomBuf { data: v }
    }
    #[must_use]
    pub fn as_int(&self) -> BigInt {
        number_from_slice(&self.data)
    }
    pub fn as_bytes32(&self) -> Result<Bytes32, Error> {
        Bytes32::parse(&self.data)
    }
}

impl<T: AsRef<[u8]>> From<T> for AtomBuf {
    fn from(v: T) -> Self {
        Self::new(v.as_ref().to_vec())
    }
}

impl Debug for AtomBuf {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl Display for AtomBuf {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.data.is_empty() {
            f.write_str("()")
        } else if self.data.len() <= 4 && int_to_bytes(&self.as_int()) == self.data {
            write!(f, "{}", self.as_int())
        } else {
            write!(f, "0x{}", encode(&self.data))
        }
    }
}

#[derive(Hash, Clone, PartialEq, Eq)]
pub struct PairBuf {
    pub first: Arc<SExp>,
    pub rest: Arc<SExp>,
}

impl Display for PairBuf {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.first)?;
        let mut current = self.rest.as_ref();
        while let SExp::Pair(p) = current {
            write!(f, " {}", p.first)?;
            current = &p.rest;
        }
        if current.non_nil() {
            write!(f, " . {current}")?;
        }
        f.write_str(")")
    }
}

impl From<(&SExp, &SExp)> for PairBuf {
    fn from(v: (&SExp, &SExp)) -> Self {
        PairBuf {
            first: Arc::new(v.0.clone()),
            rest: Arc::new(v.1.clone()),
        }
    }
}

impl From<(SExp, SExp)> for PairBuf {
    fn from(v: (SExp, SExp)) -> Self {
        PairBuf {
            first: Arc::new(v.0),
            rest: Arc::new(v.1),
        }
    }
}

pub trait IntoSExp {
    fn to_sexp(self) -> SExp;
}

impl IntoSExp for SExp {
    fn to_sexp(self) -> SExp {
        self
    }
}

impl IntoSExp for &SExp {
    fn to_sexp(self) -> SExp {
        self.clone()
    }
}

impl<T: IntoSExp> IntoSExp for Vec<T> {
    fn to_sexp(self) -> SExp {
        self.into_iter()
            .map(IntoSExp::to_sexp)
            .collect::<Vec<SExp>>()
            .into_iter()
            .rev()
            .fold(NULL.clone(), |rest, first| first.cons(rest))
    }
}

impl<T: IntoSExp + Clone> IntoSExp for &[T] {
    fn to_sexp(self) -> SExp {
        self.to_vec().to_sexp()
    }
}

impl<T: IntoSExp> IntoSExp for Option<T> {
    fn to_sexp(self) -> SExp {
        match self {
            None => NULL.clone(),
            Some(s) => s.to_sexp(),
        }
    }
}

impl<T: IntoSExp, U: IntoSExp> IntoSExp for (T, U) {
    fn to_sexp(self) -> SExp {
        self.0.to_sexp().cons(self.1.to_sexp())
    }
}

impl IntoSExp for &str {
    fn to_sexp(self) -> SExp {
        SExp::Atom(AtomBuf::new(self.as_bytes().to_vec()))
    }
}

impl IntoSExp for Program {
    fn to_sexp(self) -> SExp {
        self.sexp
    }
}

impl IntoSExp for &Program {
    fn to_sexp(self) -> SExp {
        self.sexp.clone()
    }
}

impl IntoSExp for ConditionOpcode {
    fn to_sexp(self) -> SExp {
        SExp::Atom(AtomBuf::new(vec![self as u8]))
    }
}

impl IntoSExp for &BigInt {
    fn to_sexp(self) -> SExp {
        SExp::Atom(AtomBuf::new(int_to_bytes(self)))
    }
}

impl IntoSExp for BigInt {
    fn to_sexp(self) -> SExp {
        (&self).to_sexp()
    }
}

macro_rules! impl_sized_bytes_to_sexp {
    ($($name: ident);*) => {
        $(
            impl IntoSExp for $name {
                fn to_sexp(self) -> SExp {
                    SExp::Atom(AtomBuf::new(self.as_slice().to_vec()))
                }
            }
            impl IntoSExp for &$name {
                fn to_sexp(self) -> SExp {
                    SExp::Atom(AtomBuf::new(self.as_slice().to_vec()))
                }
            }
        )*
    };
}

impl_sized_bytes_to_sexp!(Bytes32; Bytes48; Bytes96);

macro_rules! impl_ints_to_sexp {
    ($($name: ident);*) => {
        $(
            impl IntoSExp for $name {
                fn to_sexp(self) -> SExp {
                    BigInt::from(self).to_sexp()
                }
            }
        )*
    };
}

impl_ints_to_sexp!(u8; u16; u32; u64; u128; i8; i16; i32; i64; i128);

impl ChiaSerialize for SExp {
    fn to_bytes(&self) -> Vec<u8> {
        sexp_to_bytes(self)
    }
    fn from_bytes<T: AsRef<[u8]>>(bytes: &mut Cursor<T>) -> Result<Self, Error> {
        sexp_from_bytes(bytes)
    }
}
