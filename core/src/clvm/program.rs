use crate::blockchain::sized_bytes::{hex_to_bytes, Bytes32, Bytes48, Bytes96, SizedBytes};
use crate::clvm::curry_utils::{curry, uncurry};
use crate::clvm::dialect::ChiaDialect;
use crate::clvm::parser::{sexp_from_bytes, sexp_from_slice, sexp_to_bytes};
use crate::clvm::run_program::run_program;
use crate::clvm::sexp::{AtomBuf, IntoSExp, SExp, NULL as SNULL};
use crate::clvm::utils::INFINITE_COST;
use dg_wallet_serialize::ChiaSerialize;
use hex::encode;
use num_bigint::BigInt;
use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::io::{Cursor, Error, ErrorKind};
use std::path::Path;

/// A parsed program together with its canonical serialization.
#[derive(Clone, Eq)]
pub struct Program {
    pub serialized: Vec<u8>,
    pub sexp: SExp,
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.sexp)
    }
}

impl Debug for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.sexp)
    }
}

impl Default for Program {
    fn default() -> Self {
        Program::null()
    }
}

impl Program {
    pub fn new(serialized: Vec<u8>) -> Result<Self, Error> {
        let sexp = sexp_from_slice(&serialized)?;
        Ok(Program { serialized, sexp })
    }
    pub fn from_hex(hex_str: &str) -> Result<Self, Error> {
        let bytes = hex_to_bytes(hex_str).map_err(|e| {
            Error::new(ErrorKind::InvalidData, format!("Invalid program hex: {e:?}"))
        })?;
        Program::new(bytes)
    }
    #[must_use]
    pub fn null() -> Self {
        Program::to(SNULL.clone())
    }
    pub fn to<T: IntoSExp>(vals: T) -> Self {
        let sexp = vals.to_sexp();
        Program {
            serialized: sexp_to_bytes(&sexp),
            sexp,
        }
    }
    pub fn first(&self) -> Result<Self, Error> {
        Ok(Program::to(self.sexp.first()?))
    }
    pub fn rest(&self) -> Result<Self, Error> {
        Ok(Program::to(self.sexp.rest()?))
    }
    /// Navigates with a string of `f` (first) and `r` (rest), e.g. `"rrf"`.
    pub fn at(&self, path: &str) -> Result<Program, Error> {
        let mut node = &self.sexp;
        for c in path.chars() {
            node = match c {
                'f' | 'F' => node.first()?,
                'r' | 'R' => node.rest()?,
                _ => {
                    return Err(Error::new(
                        ErrorKind::InvalidInput,
                        format!("`at` got illegal character `{c}`. Only `f` & `r` allowed"),
                    ));
                }
            };
        }
        Ok(Program::to(node))
    }
    #[must_use]
    pub fn tree_hash(&self) -> Bytes32 {
        self.sexp.tree_hash()
    }
    #[must_use]
    pub fn curry(&self, args: &[Program]) -> Program {
        curry(self, args)
    }
    /// Splits `(a (q . mod) (c (q . arg) ... 1))` into the mod and its arguments.
    #[must_use]
    pub fn uncurry(&self) -> Option<(Program, Vec<Program>)> {
        uncurry(self)
    }
    #[must_use]
    pub fn as_list(&self) -> Vec<Program> {
        self.sexp.iter().map(Program::to).collect()
    }
    #[must_use]
    pub fn is_atom(&self) -> bool {
        matches!(self.sexp, SExp::Atom(_))
    }
    #[must_use]
    pub fn is_pair(&self) -> bool {
        matches!(self.sexp, SExp::Pair(_))
    }
    #[must_use]
    pub fn as_vec(&self) -> Option<Vec<u8>> {
        self.sexp.as_vec()
    }
    #[must_use]
    pub fn as_pair(&self) -> Option<(Program, Program)> {
        match &self.sexp {
            SExp::Pair(pair) => Some((
                Program::to(pair.first.as_ref()),
                Program::to(pair.rest.as_ref()),
            )),
            SExp::Atom(_) => None,
        }
    }
    #[must_use]
    pub fn cons(&self, other: &Program) -> Program {
        Program::to(self.sexp.clone().cons(other.sexp.clone()))
    }
    pub fn as_int(&self) -> Result<BigInt, Error> {
        self.sexp.as_int()
    }
    pub fn as_bytes32(&self) -> Result<Bytes32, Error> {
        Bytes32::parse(&self.sexp.atom()?.data)
    }
    /// Runs this program against `args` with the default operator set.
    pub fn run(&self, max_cost: u64, flags: u32, args: &Program) -> Result<(u64, Program), Error> {
        let (cost, result) = run_program(ChiaDialect::new(flags), &self.sexp, &args.sexp, max_cost)?;
        Ok((cost, Program::to(result)))
    }
    pub fn run_unbounded(&self, args: &Program) -> Result<Program, Error> {
        self.run(INFINITE_COST, 0, args).map(|(_, result)| result)
    }
}

impl Hash for Program {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.serialized.hash(state);
    }
}

impl PartialEq for Program {
    fn eq(&self, other: &Self) -> bool {
        self.serialized == other.serialized
    }
}

impl From<&[u8]> for Program {
    fn from(bytes: &[u8]) -> Self {
        Program::to(SExp::Atom(AtomBuf::from(bytes)))
    }
}

impl From<Vec<u8>> for Program {
    fn from(bytes: Vec<u8>) -> Self {
        Program::to(SExp::Atom(AtomBuf::new(bytes)))
    }
}

macro_rules! impl_sized_bytes_program {
    ($($name: ident);*) => {
        $(
            impl From<$name> for Program {
                fn from(bytes: $name) -> Self {
                    bytes.as_slice().into()
                }
            }
            impl From<&$name> for Program {
                fn from(bytes: &$name) -> Self {
                    bytes.as_slice().into()
                }
            }
        )*
    };
}

impl_sized_bytes_program!(Bytes32; Bytes48; Bytes96);

macro_rules! impl_ints_program {
    ($($name: ident);*) => {
        $(
            impl From<$name> for Program {
                fn from(int_val: $name) -> Self {
                    Program::to(int_val)
                }
            }
            impl TryFrom<&Program> for $name {
                type Error = Error;
                fn try_from(program: &Program) -> Result<$name, Self::Error> {
                    $name::try_from(program.as_int()?).map_err(|e| {
                        Error::new(
                            ErrorKind::InvalidData,
                            format!("Program is not a valid {}: {e:?}", stringify!($name)),
                        )
                    })
                }
            }
        )*
    };
}

impl_ints_program!(u8; u32; u64; i32; i64);

/// Hex serialized program as exchanged with the full node.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct SerializedProgram {
    buffer: Vec<u8>,
}

impl Display for SerializedProgram {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", encode(&self.buffer))
    }
}

impl Debug for SerializedProgram {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", encode(&self.buffer))
    }
}

impl SerializedProgram {
    pub fn from_file(path: &Path) -> Result<SerializedProgram, Error> {
        let text = std::fs::read_to_string(path)?;
        SerializedProgram::from_hex(text.trim())
    }
    pub fn from_hex(hex_str: &str) -> Result<SerializedProgram, Error> {
        let buffer = hex_to_bytes(hex_str).map_err(|_| {
            Error::new(
                ErrorKind::InvalidData,
                "Failed to convert str to SerializedProgram",
            )
        })?;
        sexp_from_slice(&buffer)?;
        Ok(SerializedProgram { buffer })
    }
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }
    pub fn to_program(&self) -> Result<Program, Error> {
        Program::new(self.buffer.clone())
    }
    pub fn run_with_cost(&self, max_cost: u64, args: &Program) -> Result<(u64, Program), Error> {
        self.to_program()?.run(max_cost, 0, args)
    }
}

impl From<Program> for SerializedProgram {
    fn from(program: Program) -> Self {
        SerializedProgram {
            buffer: program.serialized,
        }
    }
}

impl From<&Program> for SerializedProgram {
    fn from(program: &Program) -> Self {
        SerializedProgram {
            buffer: program.serialized.clone(),
        }
    }
}

impl TryFrom<&str> for SerializedProgram {
    type Error = Error;
    fn try_from(hex: &str) -> Result<SerializedProgram, Error> {
        SerializedProgram::from_hex(hex)
    }
}

impl ChiaSerialize for SerializedProgram {
    fn to_bytes(&self) -> Vec<u8> {
        self.buffer.clone()
    }
    fn from_bytes<T: AsRef<[u8]>>(bytes: &mut Cursor<T>) -> Result<Self, Error> {
        let start = bytes.position() as usize;
        sexp_from_bytes(bytes)?;
        let end = bytes.position() as usize;
        Ok(SerializedProgram {
            buffer: bytes.get_ref().as_ref()[start..end].to_vec(),
        })
    }
}

struct SerializedProgramVisitor;

impl Visitor<'_> for SerializedProgramVisitor {
    type Value = SerializedProgram;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        formatter.write_str("Expecting a hex String")
    }

    fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        SerializedProgram::from_hex(value).map_err(serde::de::Error::custom)
    }
}

impl Serialize for SerializedProgram {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

impl<'a> Deserialize<'a> for SerializedProgram {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'a>,
    {
        deserializer.deserialize_str(SerializedProgramVisitor)
    }
}
