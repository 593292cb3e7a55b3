pub mod bls_bindings;
pub mod core_ops;
pub mod curry_utils;
pub mod dialect;
pub mod more_ops;
pub mod parser;
pub mod program;
pub mod run_program;
pub mod sexp;
pub mod utils;
