use crate::clvm::core_ops::{op_cons, op_eq, op_first, op_if, op_listp, op_raise, op_rest};
use crate::clvm::more_ops::{
    op_add, op_all, op_any, op_ash, op_coinid, op_concat, op_div, op_divmod, op_gr, op_gr_bytes,
    op_logand, op_logior, op_lognot, op_logxor, op_lsh, op_multiply, op_not, op_point_add,
    op_pubkey_for_exp, op_sha256, op_softfork, op_strlen, op_substr, op_subtract, op_unknown,
};
use crate::clvm::sexp::SExp;
use crate::clvm::utils::{NO_NEG_DIV, NO_UNKNOWN_OPS};
use std::io::{Error, ErrorKind};

pub const QUOTE_KW: u8 = 1;
pub const APPLY_KW: u8 = 2;

pub trait Dialect {
    fn quote_kw(&self) -> &[u8];
    fn apply_kw(&self) -> &[u8];
    fn op(&self, op: SExp, args: SExp, max_cost: u64) -> Result<(u64, SExp), Error>;
}

/// Operator table for the mainnet instruction set.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChiaDialect {
    flags: u32,
}

impl ChiaDialect {
    #[must_use]
    pub fn new(flags: u32) -> ChiaDialect {
        ChiaDialect { flags }
    }
}

impl Dialect for ChiaDialect {
    fn quote_kw(&self) -> &[u8] {
        &[QUOTE_KW]
    }

    fn apply_kw(&self) -> &[u8] {
        &[APPLY_KW]
    }

    fn op(&self, o: SExp, args: SExp, max_cost: u64) -> Result<(u64, SExp), Error> {
        let op = o.atom()?;
        if op.data.len() != 1 {
            return if self.flags & NO_UNKNOWN_OPS != 0 {
                Err(Error::new(
                    ErrorKind::InvalidData,
                    format!("unimplemented operator: {o}"),
                ))
            } else {
                op_unknown(&o, &args, max_cost)
            };
        }
        let f = match op.data[0] {
            3 => op_if,
            4 => op_cons,
            5 => op_first,
            6 => op_rest,
            7 => op_listp,
            8 => op_raise,
            9 => op_eq,
            10 => op_gr_bytes,
            11 => op_sha256,
            12 => op_substr,
            13 => op_strlen,
            14 => op_concat,
            16 => op_add,
            17 => op_subtract,
            18 => op_multiply,
            19 => {
                return op_div(&args, max_cost, self.flags & NO_NEG_DIV != 0);
            }
            20 => op_divmod,
            21 => op_gr,
            22 => op_ash,
            23 => op_lsh,
            24 => op_logand,
            25 => op_logior,
            26 => op_logxor,
            27 => op_lognot,
            29 => op_point_add,
            30 => op_pubkey_for_exp,
            32 => op_not,
            33 => op_any,
            34 => op_all,
            36 => op_softfork,
            48 => op_coinid,
            _ => {
                return if self.flags & NO_UNKNOWN_OPS != 0 {
                    Err(Error::new(
                        ErrorKind::InvalidData,
                        format!("unimplemented operator: {o}"),
                    ))
                } else {
                    op_unknown(&o, &args, max_cost)
                };
            }
        };
        f(&args, max_cost)
    }
}
