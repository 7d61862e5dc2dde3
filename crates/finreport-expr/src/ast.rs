//! Expression AST.

use rust_decimal::Decimal;
use std::fmt;

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `+x`
    Plus,
    /// `-x`
    Minus,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `a + b`
    Add,
    /// `a - b`
    Sub,
    /// `a * b`
    Mul,
    /// `a / b`
    Div,
}

impl BinaryOp {
    /// Operator symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
        }
    }
}

/// A parsed expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Numeric literal.
    Number(Decimal),
    /// Named variable.
    Variable(String),
    /// Order reference, kept in its `@N` form.
    Order(String),
    /// Unary operation.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        operand: Box<Expr>,
    },
    /// Binary operation.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
}

impl Expr {
    /// Unique variable names and order references, in order of first appearance.
    #[must_use]
    pub fn dependencies(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_dependencies(&mut names);
        names
    }

    fn collect_dependencies(&self, names: &mut Vec<String>) {
        match self {
            Self::Number(_) => {}
            Self::Variable(name) | Self::Order(name) => {
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
            Self::Unary { operand, .. } => operand.collect_dependencies(names),
            Self::Binary { left, right, .. } => {
                left.collect_dependencies(names);
                right.collect_dependencies(names);
            }
        }
    }

    /// Variable names referenced by the expression, without order references.
    #[must_use]
    pub fn variables(&self) -> Vec<String> {
        self.dependencies()
            .into_iter()
            .filter(|n| !n.starts_with('@'))
            .collect()
    }

    /// Order references (`@N`) read by the expression, as written.
    #[must_use]
    pub fn order_references(&self) -> Vec<String> {
        self.dependencies()
            .into_iter()
            .filter(|n| n.starts_with('@'))
            .collect()
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Variable(name) | Self::Order(name) => write!(f, "{name}"),
            Self::Unary { op, operand } => match op {
                UnaryOp::Plus => write!(f, "+{operand}"),
                UnaryOp::Minus => write!(f, "-{operand}"),
            },
            Self::Binary { op, left, right } => {
                write!(f, "({left} {} {right})", op.symbol())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Box<Expr> {
        Box::new(Expr::Variable(name.to_string()))
    }

    #[test]
    fn test_dependencies_unique_in_first_appearance_order() {
        let expr = Expr::Binary {
            op: BinaryOp::Add,
            left: Box::new(Expr::Binary {
                op: BinaryOp::Mul,
                left: var("b"),
                right: Box::new(Expr::Order("@10".to_string())),
            }),
            right: Box::new(Expr::Binary {
                op: BinaryOp::Sub,
                left: var("a"),
                right: var("b"),
            }),
        };

        assert_eq!(expr.dependencies(), vec!["b", "@10", "a"]);
        assert_eq!(expr.variables(), vec!["b", "a"]);
        assert_eq!(expr.order_references(), vec!["@10"]);
    }

    #[test]
    fn test_order_references_keep_out_of_range_numbers() {
        let expr = Expr::Binary {
            op: BinaryOp::Add,
            left: Box::new(Expr::Order("@99999999999".to_string())),
            right: Box::new(Expr::Order("@5".to_string())),
        };
        assert_eq!(expr.order_references(), vec!["@99999999999", "@5"]);
    }

    #[test]
    fn test_display_is_fully_parenthesized() {
        let expr = Expr::Binary {
            op: BinaryOp::Div,
            left: Box::new(Expr::Unary {
                op: UnaryOp::Minus,
                operand: var("x"),
            }),
            right: Box::new(Expr::Number(Decimal::TWO)),
        };
        assert_eq!(expr.to_string(), "(-x / 2)");
    }
}
