use crate::blockchain::coin::Coin;
use crate::blockchain::sized_bytes::{Bytes32, SizedBytes};
use crate::clvm::sexp::{number_from_slice, AtomBuf, SExp, NULL};
use crate::clvm::utils::{atom, check_arg_count, check_cost, i32_atom, int_atom, two_ints};
use bls12_381::{G1Affine, G1Projective, Scalar};
use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{Signed, ToPrimitive, Zero};
use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};
use std::io::{Error, ErrorKind};
use std::ops::{BitAndAssign, BitOrAssign, BitXorAssign};

const MALLOC_COST_PER_BYTE: u64 = 10;

const ARITH_BASE_COST: u64 = 99;
const ARITH_COST_PER_ARG: u64 = 320;
const ARITH_COST_PER_BYTE: u64 = 3;

const LOG_BASE_COST: u64 = 100;
const LOG_COST_PER_ARG: u64 = 264;
const LOG_COST_PER_BYTE: u64 = 3;

const LOG_NOT_BASE_COST: u64 = 331;
const LOG_NOT_COST_PER_BYTE: u64 = 3;

const MUL_BASE_COST: u64 = 92;
const MUL_COST_PER_OP: u64 = 885;
const MUL_LINEAR_COST_PER_BYTE: u64 = 6;
const MUL_SQUARE_COST_PER_BYTE_DIVIDER: u64 = 128;

const GR_BASE_COST: u64 = 498;
const GR_COST_PER_BYTE: u64 = 2;

const GRS_BASE_COST: u64 = 117;
const GRS_COST_PER_BYTE: u64 = 1;

const STRLEN_BASE_COST: u64 = 173;
const STRLEN_COST_PER_BYTE: u64 = 1;

const CONCAT_BASE_COST: u64 = 142;
const CONCAT_COST_PER_ARG: u64 = 135;
const CONCAT_COST_PER_BYTE: u64 = 3;

const DIV_MOD_BASE_COST: u64 = 1116;
const DIV_MOD_COST_PER_BYTE: u64 = 6;

const DIV_BASE_COST: u64 = 988;
const DIV_COST_PER_BYTE: u64 = 4;

const SHA256_BASE_COST: u64 = 87;
const SHA256_COST_PER_ARG: u64 = 134;
const SHA256_COST_PER_BYTE: u64 = 2;

const A_SHIFT_BASE_COST: u64 = 596;
const A_SHIFT_COST_PER_BYTE: u64 = 3;

const LSHIFT_BASE_COST: u64 = 277;
const LSHIFT_COST_PER_BYTE: u64 = 3;

const BOOL_BASE_COST: u64 = 200;
const BOOL_COST_PER_ARG: u64 = 300;

const POINT_ADD_BASE_COST: u64 = 101_094;
const POINT_ADD_COST_PER_ARG: u64 = 1_343_980;

const PUBKEY_BASE_COST: u64 = 1_325_730;
const PUBKEY_COST_PER_BYTE: u64 = 38;

const COIN_ID_COST: u64 =
    SHA256_BASE_COST + SHA256_COST_PER_ARG * 3 + SHA256_COST_PER_BYTE * (32 + 32 + 8) - 153;

pub static GROUP_ORDER: Lazy<BigInt> = Lazy::new(|| {
    BigUint::from_bytes_be(&[
        0x73, 0xed, 0xa7, 0x53, 0x29, 0x9d, 0x7d, 0x48, 0x33, 0x39, 0xd8, 0x08, 0x09, 0xa1, 0xd8,
        0x05, 0x53, 0xbd, 0xa4, 0x02, 0xff, 0xfe, 0x5b, 0xfe, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00,
        0x00, 0x01,
    ])
    .into()
});

fn limbs_for_int(v: &BigInt) -> u64 {
    v.bits().div_ceil(8)
}

fn new_atom_and_cost(cost: u64, buf: &[u8]) -> (u64, SExp) {
    let c = buf.len() as u64 * MALLOC_COST_PER_BYTE;
    (cost + c, SExp::Atom(buf.to_vec().into()))
}

fn int_and_cost(cost: u64, value: &BigInt) -> Result<(u64, SExp), Error> {
    let node = SExp::try_from(value)?;
    let c = node.atom()?.data.len() as u64 * MALLOC_COST_PER_BYTE;
    Ok((cost + c, node))
}

pub fn op_unknown(o: &SExp, args: &SExp, max_cost: u64) -> Result<(u64, SExp), Error> {
    let op = &o.atom()?.data;
    if op.is_empty() || (op.len() >= 2 && op[0] == 0xff && op[1] == 0xff) {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("reserved operator: {}", hex::encode(op)),
        ));
    }
    let cost_function = (op[op.len() - 1] & 0b1100_0000) >> 6;
    let prefix = &op[0..op.len() - 1];
    if prefix.len() > 4 {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("invalid operator: {}", hex::encode(op)),
        ));
    }
    let cost_multiplier = prefix
        .iter()
        .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
    let mut cost = match cost_function {
        1 => {
            let mut cost = ARITH_BASE_COST;
            let mut byte_count: u64 = 0;
            for arg in args {
                cost += ARITH_COST_PER_ARG;
                byte_count += int_atom(arg, "unknown op")?.len() as u64;
                check_cost(cost + byte_count * ARITH_COST_PER_BYTE, max_cost)?;
            }
            cost + byte_count * ARITH_COST_PER_BYTE
        }
        2 => {
            let mut cost = MUL_BASE_COST;
            let mut l0: Option<u64> = None;
            for arg in args {
                let l1 = int_atom(arg, "unknown op")?.len() as u64;
                match l0 {
                    None => l0 = Some(l1),
                    Some(prev) => {
                        cost += MUL_COST_PER_OP;
                        cost += (prev + l1) * MUL_LINEAR_COST_PER_BYTE;
                        cost += (prev * l1) / MUL_SQUARE_COST_PER_BYTE_DIVIDER;
                        l0 = Some(prev + l1);
                        check_cost(cost, max_cost)?;
                    }
                }
            }
            cost
        }
        3 => {
            let mut cost = CONCAT_BASE_COST;
            let mut total_size: u64 = 0;
            for arg in args {
                cost += CONCAT_COST_PER_ARG;
                total_size += atom(arg, "unknown op")?.len() as u64;
                check_cost(cost + total_size * CONCAT_COST_PER_BYTE, max_cost)?;
            }
            cost + total_size * CONCAT_COST_PER_BYTE
        }
        _ => 1,
    };
    check_cost(cost, max_cost)?;
    cost *= cost_multiplier + 1;
    if cost > u64::from(u32::MAX) {
        Err(Error::new(
            ErrorKind::InvalidData,
            format!("invalid operator: {o}"),
        ))
    } else {
        Ok((cost, NULL.clone()))
    }
}

pub fn op_sha256(args: &SExp, max_cost: u64) -> Result<(u64, SExp), Error> {
    let mut cost = SHA256_BASE_COST;
    let mut byte_count: u64 = 0;
    let mut hasher = Sha256::new();
    for arg in args {
        cost += SHA256_COST_PER_ARG;
        check_cost(cost + byte_count * SHA256_COST_PER_BYTE, max_cost)?;
        let blob = atom(arg, "sha256")?;
        byte_count += blob.len() as u64;
        hasher.update(blob);
    }
    cost += byte_count * SHA256_COST_PER_BYTE;
    Ok(new_atom_and_cost(cost, &hasher.finalize()))
}

pub fn op_add(args: &SExp, max_cost: u64) -> Result<(u64, SExp), Error> {
    let mut cost = ARITH_BASE_COST;
    let mut byte_count: u64 = 0;
    let mut total = BigInt::zero();
    for arg in args {
        cost += ARITH_COST_PER_ARG;
        check_cost(cost + byte_count * ARITH_COST_PER_BYTE, max_cost)?;
        let blob = int_atom(arg, "+")?;
        byte_count += blob.len() as u64;
        total += number_from_slice(blob);
    }
    cost += byte_count * ARITH_COST_PER_BYTE;
    int_and_cost(cost, &total)
}

pub fn op_subtract(args: &SExp, max_cost: u64) -> Result<(u64, SExp), Error> {
    let mut cost = ARITH_BASE_COST;
    let mut byte_count: u64 = 0;
    let mut total = BigInt::zero();
    for (index, arg) in args.iter().enumerate() {
        cost += ARITH_COST_PER_ARG;
        check_cost(cost + byte_count * ARITH_COST_PER_BYTE, max_cost)?;
        let blob = int_atom(arg, "-")?;
        byte_count += blob.len() as u64;
        if index == 0 {
            total += number_from_slice(blob);
        } else {
            total -= number_from_slice(blob);
        }
    }
    cost += byte_count * ARITH_COST_PER_BYTE;
    int_and_cost(cost, &total)
}

pub fn op_multiply(args: &SExp, max_cost: u64) -> Result<(u64, SExp), Error> {
    let mut cost = MUL_BASE_COST;
    let mut total: Option<BigInt> = None;
    let mut l0 = 0u64;
    for arg in args {
        check_cost(cost, max_cost)?;
        let blob = int_atom(arg, "*")?;
        match total.as_mut() {
            None => {
                l0 = blob.len() as u64;
                total = Some(number_from_slice(blob));
            }
            Some(running) => {
                let l1 = blob.len() as u64;
                *running *= number_from_slice(blob);
                cost += MUL_COST_PER_OP;
                cost += (l0 + l1) * MUL_LINEAR_COST_PER_BYTE;
                cost += (l0 * l1) / MUL_SQUARE_COST_PER_BYTE_DIVIDER;
                l0 = limbs_for_int(running);
            }
        }
    }
    int_and_cost(cost, &total.unwrap_or_else(|| BigInt::from(1)))
}

pub fn op_div(args: &SExp, _max_cost: u64, no_neg_div: bool) -> Result<(u64, SExp), Error> {
    let (a0, l0, a1, l1) = two_ints(args, "/")?;
    let cost = DIV_BASE_COST + ((l0 + l1) as u64) * DIV_COST_PER_BYTE;
    if a1.is_zero() {
        return Err(Error::new(ErrorKind::InvalidData, "div with 0"));
    }
    if no_neg_div && (a0.is_negative() || a1.is_negative()) {
        return Err(Error::new(
            ErrorKind::InvalidData,
            "div operator with negative operands is deprecated",
        ));
    }
    int_and_cost(cost, &a0.div_floor(&a1))
}

pub fn op_divmod(args: &SExp, _max_cost: u64) -> Result<(u64, SExp), Error> {
    let (a0, l0, a1, l1) = two_ints(args, "divmod")?;
    let cost = DIV_MOD_BASE_COST + ((l0 + l1) as u64) * DIV_MOD_COST_PER_BYTE;
    if a1.is_zero() {
        return Err(Error::new(ErrorKind::InvalidData, "divmod with 0"));
    }
    let (q, r) = a0.div_mod_floor(&a1);
    let q = SExp::try_from(&q)?;
    let r = SExp::try_from(&r)?;
    let c = (q.atom()?.data.len() + r.atom()?.data.len()) as u64 * MALLOC_COST_PER_BYTE;
    Ok((cost + c, q.cons(r)))
}

pub fn op_gr(args: &SExp, _max_cost: u64) -> Result<(u64, SExp), Error> {
    check_arg_count(args, 2, ">")?;
    let v0 = int_atom(args.first()?, ">")?;
    let v1 = int_atom(args.rest()?.first()?, ">")?;
    let cost = GR_BASE_COST + (v0.len() + v1.len()) as u64 * GR_COST_PER_BYTE;
    Ok((
        cost,
        SExp::from_bool(number_from_slice(v0) > number_from_slice(v1)).clone(),
    ))
}

pub fn op_gr_bytes(args: &SExp, _max_cost: u64) -> Result<(u64, SExp), Error> {
    check_arg_count(args, 2, ">s")?;
    let v0 = atom(args.first()?, ">s")?;
    let v1 = atom(args.rest()?.first()?, ">s")?;
    let cost = GRS_BASE_COST + (v0.len() + v1.len()) as u64 * GRS_COST_PER_BYTE;
    Ok((cost, SExp::from_bool(v0 > v1).clone()))
}

pub fn op_strlen(args: &SExp, _max_cost: u64) -> Result<(u64, SExp), Error> {
    check_arg_count(args, 1, "strlen")?;
    let size = atom(args.first()?, "strlen")?.len();
    let cost = STRLEN_BASE_COST + size as u64 * STRLEN_COST_PER_BYTE;
    int_and_cost(cost, &BigInt::from(size))
}

pub fn op_substr(args: &SExp, _max_cost: u64) -> Result<(u64, SExp), Error> {
    let arg_count = args.arg_count(3);
    if !(2..=3).contains(&arg_count) {
        return Err(Error::new(
            ErrorKind::InvalidData,
            "substr takes exactly 2 or 3 arguments",
        ));
    }
    let s0 = atom(args.first()?, "substr")?;
    let rest = args.rest()?;
    let start = i32_atom(rest.first()?, "substr")?;
    let end = if arg_count == 3 {
        i32_atom(rest.rest()?.first()?, "substr")?
    } else {
        s0.len() as i32
    };
    if start < 0 || end < 0 || end as usize > s0.len() || end < start {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("invalid indices for substr: {args}"),
        ));
    }
    Ok((1, SExp::Atom(AtomBuf::new(s0[start as usize..end as usize].to_vec()))))
}

pub fn op_concat(args: &SExp, max_cost: u64) -> Result<(u64, SExp), Error> {
    let mut cost = CONCAT_BASE_COST;
    let mut total_size: u64 = 0;
    let mut terms = Vec::new();
    for arg in args {
        cost += CONCAT_COST_PER_ARG;
        check_cost(cost + total_size * CONCAT_COST_PER_BYTE, max_cost)?;
        total_size += atom(arg, "concat")?.len() as u64;
        terms.push(arg);
    }
    cost += total_size * (CONCAT_COST_PER_BYTE + MALLOC_COST_PER_BYTE);
    check_cost(cost, max_cost)?;
    Ok((cost, SExp::concat(&terms)?))
}

fn shift_amount(args: &SExp, op_name: &str) -> Result<i32, Error> {
    let shift = i32_atom(args.rest()?.first()?, op_name)?;
    if !(-65535..=65535).contains(&shift) {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("{op_name} shift too large: {shift}"),
        ));
    }
    Ok(shift)
}

pub fn op_ash(args: &SExp, _max_cost: u64) -> Result<(u64, SExp), Error> {
    check_arg_count(args, 2, "ash")?;
    let b0 = int_atom(args.first()?, "ash")?;
    let shift = shift_amount(args, "ash")?;
    let i0 = number_from_slice(b0);
    let v: BigInt = if shift > 0 { i0 << shift } else { i0 >> -shift };
    let cost = A_SHIFT_BASE_COST + (b0.len() as u64 + limbs_for_int(&v)) * A_SHIFT_COST_PER_BYTE;
    int_and_cost(cost, &v)
}

pub fn op_lsh(args: &SExp, _max_cost: u64) -> Result<(u64, SExp), Error> {
    check_arg_count(args, 2, "lsh")?;
    let b0 = int_atom(args.first()?, "lsh")?;
    let shift = shift_amount(args, "lsh")?;
    let i0: BigInt = BigUint::from_bytes_be(b0).into();
    let v: BigInt = if shift > 0 { i0 << shift } else { i0 >> -shift };
    let cost = LSHIFT_BASE_COST + (b0.len() as u64 + limbs_for_int(&v)) * LSHIFT_COST_PER_BYTE;
    int_and_cost(cost, &v)
}

fn binop_reduction(
    op_name: &str,
    initial_value: BigInt,
    args: &SExp,
    max_cost: u64,
    op_f: fn(&mut BigInt, &BigInt),
) -> Result<(u64, SExp), Error> {
    let mut total = initial_value;
    let mut arg_size: u64 = 0;
    let mut cost = LOG_BASE_COST;
    for arg in args {
        let blob = int_atom(arg, op_name)?;
        op_f(&mut total, &number_from_slice(blob));
        arg_size += blob.len() as u64;
        cost += LOG_COST_PER_ARG;
        check_cost(cost + arg_size * LOG_COST_PER_BYTE, max_cost)?;
    }
    cost += arg_size * LOG_COST_PER_BYTE;
    int_and_cost(cost, &total)
}

pub fn op_logand(args: &SExp, max_cost: u64) -> Result<(u64, SExp), Error> {
    binop_reduction("logand", BigInt::from(-1), args, max_cost, |a, b| {
        a.bitand_assign(b)
    })
}

pub fn op_logior(args: &SExp, max_cost: u64) -> Result<(u64, SExp), Error> {
    binop_reduction("logior", BigInt::zero(), args, max_cost, |a, b| {
        a.bitor_assign(b)
    })
}

pub fn op_logxor(args: &SExp, max_cost: u64) -> Result<(u64, SExp), Error> {
    binop_reduction("logxor", BigInt::zero(), args, max_cost, |a, b| {
        a.bitxor_assign(b)
    })
}

pub fn op_lognot(args: &SExp, _max_cost: u64) -> Result<(u64, SExp), Error> {
    check_arg_count(args, 1, "lognot")?;
    let v0 = int_atom(args.first()?, "lognot")?;
    let cost = LOG_NOT_BASE_COST + (v0.len() as u64) * LOG_NOT_COST_PER_BYTE;
    int_and_cost(cost, &!number_from_slice(v0))
}

pub fn op_not(args: &SExp, _max_cost: u64) -> Result<(u64, SExp), Error> {
    check_arg_count(args, 1, "not")?;
    Ok((
        BOOL_BASE_COST,
        SExp::from_bool(!args.first()?.as_bool()).clone(),
    ))
}

pub fn op_any(args: &SExp, max_cost: u64) -> Result<(u64, SExp), Error> {
    let mut cost = BOOL_BASE_COST;
    let mut is_any = false;
    for arg in args {
        cost += BOOL_COST_PER_ARG;
        check_cost(cost, max_cost)?;
        is_any = is_any || arg.as_bool();
    }
    Ok((cost, SExp::from_bool(is_any).clone()))
}

pub fn op_all(args: &SExp, max_cost: u64) -> Result<(u64, SExp), Error> {
    let mut cost = BOOL_BASE_COST;
    let mut is_all = true;
    for arg in args {
        cost += BOOL_COST_PER_ARG;
        check_cost(cost, max_cost)?;
        is_all = is_all && arg.as_bool();
    }
    Ok((cost, SExp::from_bool(is_all).clone()))
}

pub fn op_softfork(args: &SExp, max_cost: u64) -> Result<(u64, SExp), Error> {
    let n = number_from_slice(int_atom(args.first()?, "softfork")?);
    if n.sign() != Sign::Plus {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("softfork cost must be > 0, found {n}"),
        ));
    }
    let cost = n.to_u64().ok_or_else(|| {
        Error::new(ErrorKind::InvalidData, format!("softfork cost too large: {n}"))
    })?;
    check_cost(cost, max_cost)?;
    Ok((cost, NULL.clone()))
}

fn number_to_scalar(n: &BigInt) -> Result<Scalar, Error> {
    let reduced = n.mod_floor(&GROUP_ORDER);
    let (_, le_bytes) = reduced.to_bytes_le();
    let mut scalar_array = [0u8; 32];
    scalar_array[..le_bytes.len()].copy_from_slice(&le_bytes);
    Option::<Scalar>::from(Scalar::from_bytes(&scalar_array))
        .ok_or_else(|| Error::new(ErrorKind::InvalidData, "exponent is not a valid scalar"))
}

pub fn op_pubkey_for_exp(args: &SExp, _max_cost: u64) -> Result<(u64, SExp), Error> {
    check_arg_count(args, 1, "pubkey_for_exp")?;
    let v0 = int_atom(args.first()?, "pubkey_for_exp")?;
    let exp = number_to_scalar(&number_from_slice(v0))?;
    let cost = PUBKEY_BASE_COST + (v0.len() as u64) * PUBKEY_COST_PER_BYTE;
    let point: G1Affine = (G1Affine::generator() * exp).into();
    Ok(new_atom_and_cost(cost, &point.to_compressed()))
}

pub fn op_point_add(args: &SExp, max_cost: u64) -> Result<(u64, SExp), Error> {
    let mut cost = POINT_ADD_BASE_COST;
    let mut total = G1Projective::identity();
    for arg in args {
        let blob = atom(arg, "point_add")?;
        let as_array: [u8; 48] = blob.try_into().map_err(|_| {
            Error::new(
                ErrorKind::InvalidData,
                format!("point_add expects 48 byte G1 points, got {} bytes", blob.len()),
            )
        })?;
        let point = Option::<G1Affine>::from(G1Affine::from_compressed(&as_array))
            .ok_or_else(|| Error::new(ErrorKind::InvalidData, "point_add got invalid G1 point"))?;
        cost += POINT_ADD_COST_PER_ARG;
        check_cost(cost, max_cost)?;
        total += point;
    }
    let total: G1Affine = total.into();
    Ok(new_atom_and_cost(cost, &total.to_compressed()))
}

pub fn op_coinid(args: &SExp, _max_cost: u64) -> Result<(u64, SExp), Error> {
    check_arg_count(args, 3, "coinid")?;
    let parent_coin_info = atom(args.first()?, "coinid")?;
    let rest = args.rest()?;
    let puzzle_hash = atom(rest.first()?, "coinid")?;
    let amount = int_atom(rest.rest()?.first()?, "coinid")?;
    if parent_coin_info.len() != 32 {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("invalid parent coin id: {}", hex::encode(parent_coin_info)),
        ));
    }
    if puzzle_hash.len() != 32 {
        return Err(Error::new(
            ErrorKind::InvalidData,
            format!("invalid puzzle hash: {}", hex::encode(puzzle_hash)),
        ));
    }
    let amount = number_from_slice(amount);
    let amount = amount.to_u64().ok_or_else(|| {
        Error::new(ErrorKind::InvalidData, format!("invalid coin amount: {amount}"))
    })?;
    let coin = Coin {
        parent_coin_info: Bytes32::parse(parent_coin_info)?,
        puzzle_hash: Bytes32::parse(puzzle_hash)?,
        amount,
    };
    Ok((
        COIN_ID_COST,
        SExp::Atom(AtomBuf::new(coin.coin_id().as_slice().to_vec())),
    ))
}
