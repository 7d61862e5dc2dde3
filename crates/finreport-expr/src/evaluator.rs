//! Cached expression evaluation.
//!
//! The [`Evaluator`] memoizes parsed ASTs keyed by the exact expression text.
//! Two expressions that differ only in whitespace are cached separately.
//!
//! Evaluation works on `Option<Decimal>`: a division whose denominator is zero
//! yields `None` (a blank cell), and a blank operand makes the enclosing
//! operation blank as well.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::ExprError;
use crate::parser;
use finreport_core::{Decimal, ValidationResult};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// Name to value bindings for evaluation.
///
/// Variables are keyed by name; earlier rows by `@order`.
pub type EvalContext = HashMap<String, Decimal>;

/// Expression evaluator with an instance-owned AST cache.
#[derive(Debug, Default)]
pub struct Evaluator {
    cache: HashMap<String, Arc<Expr>>,
}

impl Evaluator {
    /// Create an evaluator with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `source`, returning the cached AST when the same text was parsed before.
    pub fn parse(&mut self, source: &str) -> Result<Arc<Expr>, ExprError> {
        if source.is_empty() {
            return Err(ExprError::InvalidExpression);
        }

        if let Some(ast) = self.cache.get(source) {
            trace!(expression = source, "AST cache hit");
            return Ok(Arc::clone(ast));
        }

        let ast = Arc::new(parser::parse(source)?);
        self.cache.insert(source.to_string(), Arc::clone(&ast));
        Ok(ast)
    }

    /// Evaluate `source` against `context`.
    ///
    /// Returns `Ok(None)` when a division by zero blanks the result.
    pub fn evaluate(
        &mut self,
        source: &str,
        context: &EvalContext,
    ) -> Result<Option<Decimal>, ExprError> {
        let ast = self.parse(source)?;
        eval(&ast, context)
    }

    /// Check `source` for syntax errors without evaluating it.
    ///
    /// Unknown identifiers are not reported; there is no context here.
    pub fn validate(&mut self, source: &str) -> ValidationResult {
        let mut result = ValidationResult::new();
        if let Err(e) = self.parse(source) {
            result.error("expression", e.to_string());
        }
        result
    }

    /// Unique variable names and `@N` order references used by `source`.
    pub fn dependencies(&mut self, source: &str) -> Result<Vec<String>, ExprError> {
        self.parse(source)
            .map(|ast| ast.dependencies())
            .map_err(|e| ExprError::Dependencies(Box::new(e)))
    }

    /// Drop every cached AST.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Number of cached ASTs.
    #[must_use]
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

/// Evaluate a parsed expression.
pub fn eval(expr: &Expr, context: &EvalContext) -> Result<Option<Decimal>, ExprError> {
    match expr {
        Expr::Number(n) => Ok(Some(*n)),
        Expr::Variable(name) => context
            .get(name)
            .copied()
            .map(Some)
            .ok_or_else(|| ExprError::UndefinedVariable(name.clone())),
        Expr::Order(name) => context
            .get(name)
            .copied()
            .map(Some)
            .ok_or_else(|| ExprError::UndefinedOrderReference(name.clone())),
        Expr::Unary { op, operand } => {
            let value = eval(operand, context)?;
            Ok(value.map(|v| match op {
                UnaryOp::Plus => v,
                UnaryOp::Minus => -v,
            }))
        }
        Expr::Binary { op, left, right } => {
            let left = eval(left, context)?;
            let right = eval(right, context)?;
            let (Some(l), Some(r)) = (left, right) else {
                return Ok(None);
            };
            apply_binary(*op, l, r)
        }
    }
}

fn apply_binary(op: BinaryOp, l: Decimal, r: Decimal) -> Result<Option<Decimal>, ExprError> {
    let result = match op {
        BinaryOp::Add => l.checked_add(r),
        BinaryOp::Sub => l.checked_sub(r),
        BinaryOp::Mul => l.checked_mul(r),
        BinaryOp::Div => {
            if r.is_zero() {
                return Ok(None);
            }
            l.checked_div(r)
        }
    };
    result.map(Some).ok_or(ExprError::Overflow)
}
