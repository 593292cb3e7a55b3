use crate::clvm::sexp::{AtomBuf, PairBuf, SExp};
use std::io::{Cursor, Error, ErrorKind, Read};
use std::sync::Arc;

const MAX_SINGLE_BYTE: u8 = 0x7F;
const CONS_BOX_MARKER: u8 = 0xFF;
const NIL_MARKER: u8 = 0x80;

enum ParseOp {
    SExp,
    Cons,
}

fn encode_size(f: &mut Vec<u8>, size: u64) -> Result<(), Error> {
    if size < 0x40 {
        f.push(0x80 | size as u8);
    } else if size < 0x2000 {
        f.push(0xC0 | (size >> 8) as u8);
        f.push(size as u8);
    } else if size < 0x10_0000 {
        f.push(0xE0 | (size >> 16) as u8);
        f.push((size >> 8) as u8);
        f.push(size as u8);
    } else if size < 0x800_0000 {
        f.push(0xF0 | (size >> 24) as u8);
        f.push((size >> 16) as u8);
        f.push((size >> 8) as u8);
        f.push(size as u8);
    } else if size < 0x4_0000_0000 {
        f.push(0xF8 | (size >> 32) as u8);
        f.push((size >> 24) as u8);
        f.push((size >> 16) as u8);
        f.push((size >> 8) as u8);
        f.push(size as u8);
    } else {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("atom too large to serialize: {size}"),
        ));
    }
    Ok(())
}

fn write_atom(f: &mut Vec<u8>, atom: &[u8]) -> Result<(), Error> {
    if atom.is_empty() {
        f.push(NIL_MARKER);
    } else if atom.len() == 1 && atom[0] <= MAX_SINGLE_BYTE {
        f.push(atom[0]);
    } else {
        encode_size(f, atom.len() as u64)?;
        f.extend_from_slice(atom);
    }
    Ok(())
}

/// Canonical serialization. Pairs are written depth first with a `0xff` prefix.
pub fn sexp_to_bytes(sexp: &SExp) -> Vec<u8> {
    let mut buffer = Vec::new();
    let mut stack = vec![sexp];
    while let Some(node) = stack.pop() {
        match node {
            SExp::Atom(atom) => {
                if let Err(e) = write_atom(&mut buffer, &atom.data) {
                    log::error!("Failed to serialize atom: {e:?}");
                }
            }
            SExp::Pair(pair) => {
                buffer.push(CONS_BOX_MARKER);
                stack.push(&pair.rest);
                stack.push(&pair.first);
            }
        }
    }
    buffer
}

fn decode_size<T: AsRef<[u8]>>(f: &mut Cursor<T>, initial_b: u8) -> Result<u64, Error> {
    let mut bit_mask: u8 = 0x80;
    let mut b = initial_b;
    let mut bit_count = 0;
    while b & bit_mask != 0 {
        bit_count += 1;
        b &= 0xff ^ bit_mask;
        bit_mask >>= 1;
    }
    let mut size_blob = vec![b];
    if bit_count > 1 {
        let mut remaining = vec![0u8; bit_count - 1];
        f.read_exact(&mut remaining)?;
        size_blob.extend(remaining);
    }
    if size_blob.len() > 6 {
        return Err(Error::new(ErrorKind::InvalidData, "bad encoding"));
    }
    let size = size_blob
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));
    if size >= 0x4_0000_0000 {
        return Err(Error::new(ErrorKind::InvalidData, "bad encoding"));
    }
    Ok(size)
}

fn read_atom<T: AsRef<[u8]>>(f: &mut Cursor<T>, b: u8) -> Result<SExp, Error> {
    if b == NIL_MARKER {
        return Ok(SExp::Atom(AtomBuf::new(vec![])));
    }
    if b <= MAX_SINGLE_BYTE {
        return Ok(SExp::Atom(AtomBuf::new(vec![b])));
    }
    let size = decode_size(f, b)?;
    let remaining = (f.get_ref().as_ref().len() as u64).saturating_sub(f.position());
    if size > remaining {
        return Err(Error::new(
            ErrorKind::UnexpectedEof,
            format!("atom of {size} bytes exceeds remaining input"),
        ));
    }
    let mut blob = vec![0u8; size as usize];
    f.read_exact(&mut blob)?;
    Ok(SExp::Atom(AtomBuf::new(blob)))
}

/// Reads exactly one program from the cursor, leaving it positioned after the program.
pub fn sexp_from_bytes<T: AsRef<[u8]>>(f: &mut Cursor<T>) -> Result<SExp, Error> {
    let mut values: Vec<SExp> = Vec::new();
    let mut ops = vec![ParseOp::SExp];
    let mut b = [0u8; 1];
    while let Some(op) = ops.pop() {
        match op {
            ParseOp::SExp => {
                f.read_exact(&mut b)?;
                if b[0] == CONS_BOX_MARKER {
                    ops.push(ParseOp::Cons);
                    ops.push(ParseOp::SExp);
                    ops.push(ParseOp::SExp);
                } else {
                    values.push(read_atom(f, b[0])?);
                }
            }
            ParseOp::Cons => {
                let rest = values.pop();
                let first = values.pop();
                match (first, rest) {
                    (Some(first), Some(rest)) => values.push(SExp::Pair(PairBuf {
                        first: Arc::new(first),
                        rest: Arc::new(rest),
                    })),
                    _ => {
                        return Err(Error::new(
                            ErrorKind::InvalidData,
                            "malformed program: missing pair element",
                        ))
                    }
                }
            }
        }
    }
    values
        .pop()
        .ok_or_else(|| Error::new(ErrorKind::InvalidData, "empty program"))
}

pub fn sexp_from_slice(bytes: &[u8]) -> Result<SExp, Error> {
    let mut cursor = Cursor::new(bytes);
    let sexp = sexp_from_bytes(&mut cursor)?;
    if cursor.position() as usize != bytes.len() {
        return Err(Error::new(
            ErrorKind::InvalidData,
            "trailing bytes after program",
        ));
    }
    Ok(sexp)
}
