use crate::clvm::dialect::Dialect;
use crate::clvm::sexp::{SExp, NULL};
use std::io::{Error, ErrorKind};

const QUOTE_COST: u64 = 20;
const APPLY_COST: u64 = 90;
// base cost for every operator executed
const OP_COST: u64 = 1;

const TRAVERSE_BASE_COST: u64 = 40;
const TRAVERSE_COST_PER_ZERO_BYTE: u64 = 4;
const TRAVERSE_COST_PER_BIT: u64 = 4;

enum Operation {
    Apply,
    Cons,
    Eval,
    SwapEval,
}

// Two stacks: operands (SExp) and pending operations.
struct RunProgramContext<D> {
    dialect: D,
    val_stack: Vec<SExp>,
    op_stack: Vec<Operation>,
}

// bitmask with a single bit set at the most significant set bit of the byte
fn msb_mask(byte: u8) -> u8 {
    let mut byte = u32::from(byte | (byte >> 1));
    byte |= byte >> 2;
    byte |= byte >> 4;
    ((byte + 1) >> 1) as u8
}

fn first_non_zero(buf: &[u8]) -> usize {
    buf.iter().position(|b| *b != 0).unwrap_or(buf.len())
}

/// Walks the environment following the bits of `node_index`, least significant first.
fn traverse_path(node_index: &[u8], args: &SExp) -> Result<(u64, SExp), Error> {
    let first_bit_byte_index = first_non_zero(node_index);
    let mut cost = TRAVERSE_BASE_COST
        + (first_bit_byte_index as u64) * TRAVERSE_COST_PER_ZERO_BYTE
        + TRAVERSE_COST_PER_BIT;
    if first_bit_byte_index >= node_index.len() {
        return Ok((cost, NULL.clone()));
    }
    let last_bitmask = msb_mask(node_index[first_bit_byte_index]);
    let mut arg_list = args;
    let mut byte_idx = node_index.len() - 1;
    let mut bitmask = 0x01;
    while byte_idx > first_bit_byte_index || bitmask < last_bitmask {
        let is_bit_set = (node_index[byte_idx] & bitmask) != 0;
        match arg_list {
            SExp::Atom(_) => {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    format!("path into atom: {arg_list}"),
                ));
            }
            SExp::Pair(pair) => {
                arg_list = if is_bit_set { &pair.rest } else { &pair.first };
            }
        }
        if bitmask == 0x80 {
            bitmask = 0x01;
            byte_idx -= 1;
        } else {
            bitmask <<= 1;
        }
        cost += TRAVERSE_COST_PER_BIT;
    }
    Ok((cost, arg_list.clone()))
}

impl<D: Dialect> RunProgramContext<D> {
    fn new(dialect: D) -> Self {
        RunProgramContext {
            dialect,
            val_stack: Vec::new(),
            op_stack: Vec::new(),
        }
    }

    fn pop(&mut self) -> Result<SExp, Error> {
        self.val_stack.pop().ok_or_else(|| {
            Error::new(ErrorKind::InvalidData, "runtime error: value stack empty")
        })
    }

    fn push(&mut self, node: SExp) {
        self.val_stack.push(node);
    }

    fn cons_op(&mut self) -> Result<u64, Error> {
        let first = self.pop()?;
        let rest = self.pop()?;
        self.push(first.cons(rest));
        Ok(0)
    }

    fn eval_op_atom(
        &mut self,
        operator_node: &SExp,
        operand_list: &SExp,
        args: &SExp,
    ) -> Result<u64, Error> {
        let op_atom = operator_node.atom()?;
        if op_atom.data == self.dialect.quote_kw() {
            self.push(operand_list.clone());
            return Ok(QUOTE_COST);
        }
        self.op_stack.push(Operation::Apply);
        self.push(operator_node.clone());
        let mut operands = operand_list;
        loop {
            match operands {
                SExp::Atom(buf) => {
                    if buf.data.is_empty() {
                        break;
                    }
                    return Err(Error::new(
                        ErrorKind::InvalidData,
                        format!("bad operand list: {operand_list}"),
                    ));
                }
                SExp::Pair(pair) => {
                    self.op_stack.push(Operation::SwapEval);
                    self.push(args.clone());
                    self.push(pair.first.as_ref().clone());
                    operands = &pair.rest;
                }
            }
        }
        self.push(NULL.clone());
        Ok(OP_COST)
    }

    fn eval_pair(&mut self, program: &SExp, args: &SExp) -> Result<u64, Error> {
        let (op_node, op_list) = match program {
            SExp::Atom(path) => {
                let (cost, node) = traverse_path(&path.data, args)?;
                self.push(node);
                return Ok(cost);
            }
            SExp::Pair(pair) => (pair.first.as_ref(), pair.rest.as_ref()),
        };
        if let SExp::Pair(pair) = op_node {
            if let (SExp::Atom(_), true) = (pair.first.as_ref(), pair.rest.nullp()) {
                self.push(pair.first.as_ref().clone());
                self.push(op_list.clone());
                self.op_stack.push(Operation::Apply);
                return Ok(APPLY_COST);
            }
            return Err(Error::new(
                ErrorKind::InvalidData,
                format!("in ((X)...) syntax X must be lone atom: {op_node}"),
            ));
        }
        self.eval_op_atom(op_node, op_list, args)
    }

    fn swap_eval_op(&mut self) -> Result<u64, Error> {
        let v2 = self.pop()?;
        let program = self.pop()?;
        let args = self.pop()?;
        self.push(v2);
        self.op_stack.push(Operation::Cons);
        self.eval_pair(&program, &args)
    }

    fn eval_op(&mut self) -> Result<u64, Error> {
        match self.pop()? {
            SExp::Atom(a) => Err(Error::new(
                ErrorKind::InvalidData,
                format!("pair expected: {a}"),
            )),
            SExp::Pair(pair) => self.eval_pair(&pair.first, &pair.rest),
        }
    }

    fn apply_op(&mut self, max_cost: u64) -> Result<u64, Error> {
        let operand_list = self.pop()?;
        let operator = self.pop()?;
        let op_atom = operator
            .atom()
            .map_err(|_| Error::new(ErrorKind::InvalidData, format!("internal error: {operator}")))?;
        if op_atom.data == self.dialect.apply_kw() {
            if !operand_list.arg_count_is(2) {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    format!("apply requires exactly 2 parameters: {operand_list}"),
                ));
            }
            let (new_program, arg_wrap) = operand_list.split()?;
            let new_args = arg_wrap.first()?;
            self.eval_pair(new_program, new_args).map(|c| c + APPLY_COST)
        } else {
            let (cost, result) = self.dialect.op(operator, operand_list, max_cost)?;
            self.push(result);
            Ok(cost)
        }
    }

    fn run_program(&mut self, program: &SExp, args: &SExp, max_cost: u64) -> Result<(u64, SExp), Error> {
        self.val_stack = vec![program.clone().cons(args.clone())];
        self.op_stack = vec![Operation::Eval];
        let max_cost = if max_cost == 0 { u64::MAX } else { max_cost };
        let mut cost: u64 = 0;
        while let Some(op) = self.op_stack.pop() {
            cost = cost.saturating_add(match op {
                Operation::Apply => self.apply_op(max_cost - cost)?,
                Operation::Cons => self.cons_op()?,
                Operation::Eval => self.eval_op()?,
                Operation::SwapEval => self.swap_eval_op()?,
            });
            if cost > max_cost {
                return Err(Error::new(
                    ErrorKind::InvalidData,
                    format!("cost exceeded: {max_cost}"),
                ));
            }
        }
        Ok((cost, self.pop()?))
    }
}

pub fn run_program<D: Dialect>(
    dialect: D,
    program: &SExp,
    args: &SExp,
    max_cost: u64,
) -> Result<(u64, SExp), Error> {
    RunProgramContext::new(dialect).run_program(program, args, max_cost)
}
