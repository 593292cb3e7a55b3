use crate::clvm::sexp::{SExp, NULL, ONE};
use crate::clvm::utils::{atom, check_arg_count};
use std::io::{Error, ErrorKind};

const FIRST_COST: u64 = 30;
const IF_COST: u64 = 33;
const CONS_COST: u64 = 50;
const REST_COST: u64 = 30;
const LISTP_COST: u64 = 19;
const EQ_BASE_COST: u64 = 117;
const EQ_COST_PER_BYTE: u64 = 1;

pub fn op_if(args: &SExp, _max_cost: u64) -> Result<(u64, SExp), Error> {
    check_arg_count(args, 3, "i")?;
    let (cond, mut chosen) = args.split()?;
    if cond.nullp() {
        chosen = chosen.rest()?;
    }
    Ok((IF_COST, chosen.first()?.clone()))
}

pub fn op_cons(args: &SExp, _max_cost: u64) -> Result<(u64, SExp), Error> {
    check_arg_count(args, 2, "c")?;
    let (first, rest) = args.split()?;
    Ok((CONS_COST, first.clone().cons(rest.first()?.clone())))
}

pub fn op_first(args: &SExp, _max_cost: u64) -> Result<(u64, SExp), Error> {
    check_arg_count(args, 1, "f")?;
    Ok((FIRST_COST, args.first()?.first()?.clone()))
}

pub fn op_rest(args: &SExp, _max_cost: u64) -> Result<(u64, SExp), Error> {
    check_arg_count(args, 1, "r")?;
    Ok((REST_COST, args.first()?.rest()?.clone()))
}

pub fn op_listp(args: &SExp, _max_cost: u64) -> Result<(u64, SExp), Error> {
    check_arg_count(args, 1, "l")?;
    match args.first()? {
        SExp::Pair(_) => Ok((LISTP_COST, ONE.clone())),
        SExp::Atom(_) => Ok((LISTP_COST, NULL.clone())),
    }
}

pub fn op_raise(args: &SExp, _max_cost: u64) -> Result<(u64, SExp), Error> {
    Err(Error::new(
        ErrorKind::InvalidData,
        format!("clvm raise: {args}"),
    ))
}

pub fn op_eq(args: &SExp, _max_cost: u64) -> Result<(u64, SExp), Error> {
    check_arg_count(args, 2, "=")?;
    let s0 = atom(args.first()?, "=")?;
    let s1 = atom(args.rest()?.first()?, "=")?;
    let cost = EQ_BASE_COST + (s0.len() as u64 + s1.len() as u64) * EQ_COST_PER_BYTE;
    Ok((cost, SExp::from_bool(s0 == s1).clone()))
}
