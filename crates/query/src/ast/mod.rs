//! AST module for query expressions.

mod expr;

pub use expr::{BinaryOp, Expr, ExprArena, ExprId, PathPattern, UnaryOp};
