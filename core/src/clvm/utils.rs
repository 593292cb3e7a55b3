use crate::clvm::sexp::{number_from_slice, SExp};
use num_bigint::BigInt;
use std::io::{Error, ErrorKind};

pub const NO_NEG_DIV: u32 = 0x0001;
pub const NO_UNKNOWN_OPS: u32 = 0x0002;
pub const MEMPOOL_MODE: u32 = NO_NEG_DIV | NO_UNKNOWN_OPS;
pub const INFINITE_COST: u64 = 0x7FFF_FFFF_FFFF_FFFF;

pub fn check_cost(cost: u64, max_cost: u64) -> Result<(), Error> {
    if cost > max_cost {
        Err(Error::new(
            ErrorKind::InvalidData,
            format!("cost exceeded: {cost} > {max_cost}"),
        ))
    } else {
        Ok(())
    }
}

pub fn check_arg_count(args: &SExp, expected: usize, name: &str) -> Result<(), Error> {
    if args.arg_count(expected) == expected {
        Ok(())
    } else {
        Err(Error::new(
            ErrorKind::InvalidData,
            format!(
                "{name} takes exactly {expected} argument{}",
                if expected == 1 { "" } else { "s" }
            ),
        ))
    }
}

pub fn atom<'a>(args: &'a SExp, op_name: &str) -> Result<&'a [u8], Error> {
    args.atom()
        .map(|b| b.data.as_slice())
        .map_err(|_| Error::new(ErrorKind::InvalidData, format!("{op_name} on list")))
}

pub fn int_atom<'a>(args: &'a SExp, op_name: &str) -> Result<&'a [u8], Error> {
    args.atom().map(|b| b.data.as_slice()).map_err(|_| {
        Error::new(
            ErrorKind::InvalidData,
            format!("{op_name} requires int args: Got {args}"),
        )
    })
}

pub fn two_ints(args: &SExp, op_name: &str) -> Result<(BigInt, usize, BigInt, usize), Error> {
    check_arg_count(args, 2, op_name)?;
    let n0 = int_atom(args.first()?, op_name)?;
    let n1 = int_atom(args.rest()?.first()?, op_name)?;
    Ok((
        number_from_slice(n0),
        n0.len(),
        number_from_slice(n1),
        n1.len(),
    ))
}

pub fn i32_atom(args: &SExp, op_name: &str) -> Result<i32, Error> {
    let buf = int_atom(args, op_name)?;
    if buf.len() > 4 {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("{op_name} requires int32 args"),
        ));
    }
    i32::try_from(number_from_slice(buf)).map_err(|_| {
        Error::new(
            ErrorKind::InvalidData,
            format!("{op_name} requires int32 args"),
        )
    })
}
