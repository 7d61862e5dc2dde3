//! Arithmetic expressions for finreport calculated rows.
//!
//! The language is numeric arithmetic only: decimal literals, variable names,
//! order references to earlier rows (`@10`), `+ - * /`, unary signs and
//! parentheses. There are no functions, strings or boolean operators.
//!
//! # Example
//!
//! ```
//! use finreport_expr::{EvalContext, Evaluator};
//! use rust_decimal_macros::dec;
//!
//! let mut evaluator = Evaluator::new();
//! let mut context = EvalContext::new();
//! context.insert("revenue".to_string(), dec!(1000));
//! context.insert("@20".to_string(), dec!(400));
//!
//! let margin = evaluator.evaluate("(revenue - @20) / revenue * 100", &context).unwrap();
//! assert_eq!(margin, Some(dec!(60)));
//!
//! // Division by zero is a blank cell, not an error.
//! assert_eq!(evaluator.evaluate("revenue / 0", &context).unwrap(), None);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ast;
mod error;
mod evaluator;
pub mod lexer;
mod parser;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use error::{ExprError, SyntaxError, SyntaxErrorKind};
pub use evaluator::{eval, EvalContext, Evaluator};
pub use lexer::{tokenize, Span, Token};
pub use parser::{parse, MAX_DEPTH};
