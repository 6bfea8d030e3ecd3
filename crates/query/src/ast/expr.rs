//! Expression AST definitions.
//!
//! Expressions are stored in an `ExprArena` and addressed by `ExprId`. The arena is
//! built once by the parser (or by tests through the builder methods below) and is
//! read-only afterwards; evaluators and detectors only borrow it.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use strata_core::{Error, Result};

/// Index of a node in an `ExprArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExprId(pub u32);

impl ExprId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    // Logical
    And,
    Or,
    Xor,
    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    // Membership
    In,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinaryOp {
    /// Operator symbol used in messages.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "^",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Xor => "XOR",
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::In => "IN",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
        }
    }
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// Chain of pattern aliases checked by an `EXISTS` predicate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathPattern {
    /// Node and relationship aliases, in path order.
    pub aliases: Vec<String>,
}

impl PathPattern {
    pub fn new<S: Into<String>>(aliases: impl IntoIterator<Item = S>) -> Self {
        Self {
            aliases: aliases.into_iter().map(Into::into).collect(),
        }
    }
}

/// Expression AST node.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Floating point literal.
    Double(f64),
    /// String literal.
    String(String),
    /// NULL literal.
    Null,
    /// Variable reference, resolved through the symbol table.
    Ref(String),
    /// Query parameter (`$name`).
    Param(String),
    /// Unary operation.
    Unary { op: UnaryOp, expr: ExprId },
    /// Binary operation.
    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    /// Property access (`n.age`).
    GetField { expr: ExprId, field: String },
    /// Built-in or plugin function call.
    Function { name: String, args: Vec<ExprId> },
    /// Aggregate function call. Empty `args` is `count(*)`.
    Aggregate {
        func: String,
        distinct: bool,
        args: Vec<ExprId>,
    },
    /// CASE expression. `input` is set for the simple form.
    Case {
        input: Option<ExprId>,
        branches: Vec<(ExprId, ExprId)>,
        else_: Option<ExprId>,
    },
    /// IF(cond, then, else).
    If {
        cond: ExprId,
        then: ExprId,
        else_: Option<ExprId>,
    },
    /// List literal.
    MkList(Vec<ExprId>),
    /// Map literal.
    MkMap(Vec<(String, ExprId)>),
    /// Record constructor, evaluated like a map.
    MkRecord(Vec<(String, ExprId)>),
    /// Set constructor; duplicates are dropped.
    MkSet(Vec<ExprId>),
    /// Tuple constructor, evaluated like a list.
    MkTuple(Vec<ExprId>),
    /// `IS NULL` / `IS NOT NULL`.
    IsNull { expr: ExprId, negated: bool },
    /// Label predicate (`n:Person`).
    IsLabeled { expr: ExprId, label: String },
    /// Path existence predicate.
    Exists(PathPattern),
    /// `[variable IN list WHERE filter | projection]`.
    ListComprehension {
        variable: String,
        list: ExprId,
        filter: Option<ExprId>,
        projection: Option<ExprId>,
    },
}

impl Expr {
    /// Returns the direct children of this node, in evaluation order.
    pub fn children(&self) -> Vec<ExprId> {
        match self {
            Expr::Bool(_)
            | Expr::Int(_)
            | Expr::Double(_)
            | Expr::String(_)
            | Expr::Null
            | Expr::Ref(_)
            | Expr::Param(_)
            | Expr::Exists(_) => Vec::new(),
            Expr::Unary { expr, .. }
            | Expr::GetField { expr, .. }
            | Expr::IsNull { expr, .. }
            | Expr::IsLabeled { expr, .. } => vec![*expr],
            Expr::Binary { left, right, .. } => vec![*left, *right],
            Expr::Function { args, .. } | Expr::Aggregate { args, .. } => args.clone(),
            Expr::MkList(items) | Expr::MkSet(items) | Expr::MkTuple(items) => items.clone(),
            Expr::MkMap(pairs) | Expr::MkRecord(pairs) => pairs.iter().map(|(_, id)| *id).collect(),
            Expr::Case {
                input,
                branches,
                else_,
            } => {
                let mut out = Vec::with_capacity(branches.len() * 2 + 2);
                out.extend(input.iter().copied());
                for (when, then) in branches {
                    out.push(*when);
                    out.push(*then);
                }
                out.extend(else_.iter().copied());
                out
            }
            Expr::If { cond, then, else_ } => {
                let mut out = vec![*cond, *then];
                out.extend(else_.iter().copied());
                out
            }
            Expr::ListComprehension {
                list,
                filter,
                projection,
                ..
            } => {
                let mut out = vec![*list];
                out.extend(filter.iter().copied());
                out.extend(projection.iter().copied());
                out
            }
        }
    }

    /// Returns true for aggregate function calls.
    #[inline]
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Expr::Aggregate { .. })
    }
}

/// Owner of all expression nodes of a query.
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    nodes: Vec<Expr>,
}

impl ExprArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node and returns its id.
    pub fn push(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(self.nodes.len() as u32);
        self.nodes.push(expr);
        id
    }

    /// Returns the node for `id`, if it belongs to this arena.
    #[inline]
    pub fn get(&self, id: ExprId) -> Option<&Expr> {
        self.nodes.get(id.index())
    }

    /// Returns the node for `id` or an invariant error for foreign ids.
    pub fn node(&self, id: ExprId) -> Result<&Expr> {
        self.get(id)
            .ok_or_else(|| Error::internal(alloc::format!("expression id {} out of range", id.0)))
    }

    /// Returns the number of nodes.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ---- literal builders ----

    pub fn boolean(&mut self, v: bool) -> ExprId {
        self.push(Expr::Bool(v))
    }

    pub fn int(&mut self, v: i64) -> ExprId {
        self.push(Expr::Int(v))
    }

    pub fn double(&mut self, v: f64) -> ExprId {
        self.push(Expr::Double(v))
    }

    pub fn string(&mut self, v: impl Into<String>) -> ExprId {
        self.push(Expr::String(v.into()))
    }

    pub fn null(&mut self) -> ExprId {
        self.push(Expr::Null)
    }

    /// Creates a variable reference.
    pub fn var(&mut self, name: impl Into<String>) -> ExprId {
        self.push(Expr::Ref(name.into()))
    }

    /// Creates a parameter reference.
    pub fn param(&mut self, name: impl Into<String>) -> ExprId {
        self.push(Expr::Param(name.into()))
    }

    /// Creates a property access on the given base expression.
    pub fn prop(&mut self, base: ExprId, field: impl Into<String>) -> ExprId {
        self.push(Expr::GetField {
            expr: base,
            field: field.into(),
        })
    }

    /// Creates `var.field` in one step.
    pub fn var_prop(&mut self, var: impl Into<String>, field: impl Into<String>) -> ExprId {
        let base = self.var(var);
        self.prop(base, field)
    }

    // ---- operator builders ----

    pub fn unary(&mut self, op: UnaryOp, expr: ExprId) -> ExprId {
        self.push(Expr::Unary { op, expr })
    }

    pub fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        self.push(Expr::Binary { op, left, right })
    }

    pub fn add(&mut self, left: ExprId, right: ExprId) -> ExprId {
        self.binary(BinaryOp::Add, left, right)
    }

    pub fn sub(&mut self, left: ExprId, right: ExprId) -> ExprId {
        self.binary(BinaryOp::Sub, left, right)
    }

    pub fn mul(&mut self, left: ExprId, right: ExprId) -> ExprId {
        self.binary(BinaryOp::Mul, left, right)
    }

    pub fn div(&mut self, left: ExprId, right: ExprId) -> ExprId {
        self.binary(BinaryOp::Div, left, right)
    }

    pub fn eq(&mut self, left: ExprId, right: ExprId) -> ExprId {
        self.binary(BinaryOp::Eq, left, right)
    }

    pub fn gt(&mut self, left: ExprId, right: ExprId) -> ExprId {
        self.binary(BinaryOp::Gt, left, right)
    }

    pub fn and(&mut self, left: ExprId, right: ExprId) -> ExprId {
        self.binary(BinaryOp::And, left, right)
    }

    pub fn or(&mut self, left: ExprId, right: ExprId) -> ExprId {
        self.binary(BinaryOp::Or, left, right)
    }

    pub fn not(&mut self, expr: ExprId) -> ExprId {
        self.unary(UnaryOp::Not, expr)
    }

    pub fn neg(&mut self, expr: ExprId) -> ExprId {
        self.unary(UnaryOp::Neg, expr)
    }

    // ---- calls ----

    /// Creates a function call.
    pub fn call(&mut self, name: impl Into<String>, args: Vec<ExprId>) -> ExprId {
        self.push(Expr::Function {
            name: name.into(),
            args,
        })
    }

    /// Creates an aggregate call.
    pub fn agg(&mut self, func: impl Into<String>, distinct: bool, args: Vec<ExprId>) -> ExprId {
        self.push(Expr::Aggregate {
            func: func.into(),
            distinct,
            args,
        })
    }

    /// Creates `sum(expr)`.
    pub fn sum(&mut self, expr: ExprId) -> ExprId {
        self.agg("sum", false, vec![expr])
    }

    /// Creates `count(expr)`.
    pub fn count(&mut self, expr: ExprId) -> ExprId {
        self.agg("count", false, vec![expr])
    }

    /// Creates `count(*)`.
    pub fn count_star(&mut self) -> ExprId {
        self.agg("count", false, Vec::new())
    }

    // ---- conditionals and constructors ----

    /// Creates a searched CASE.
    pub fn case_when(&mut self, branches: Vec<(ExprId, ExprId)>, else_: Option<ExprId>) -> ExprId {
        self.push(Expr::Case {
            input: None,
            branches,
            else_,
        })
    }

    /// Creates a simple CASE over `input`.
    pub fn case_of(
        &mut self,
        input: ExprId,
        branches: Vec<(ExprId, ExprId)>,
        else_: Option<ExprId>,
    ) -> ExprId {
        self.push(Expr::Case {
            input: Some(input),
            branches,
            else_,
        })
    }

    pub fn list(&mut self, items: Vec<ExprId>) -> ExprId {
        self.push(Expr::MkList(items))
    }

    pub fn map(&mut self, pairs: Vec<(String, ExprId)>) -> ExprId {
        self.push(Expr::MkMap(pairs))
    }

    pub fn is_null(&mut self, expr: ExprId) -> ExprId {
        self.push(Expr::IsNull {
            expr,
            negated: false,
        })
    }

    pub fn is_not_null(&mut self, expr: ExprId) -> ExprId {
        self.push(Expr::IsNull {
            expr,
            negated: true,
        })
    }

    pub fn labeled(&mut self, expr: ExprId, label: impl Into<String>) -> ExprId {
        self.push(Expr::IsLabeled {
            expr,
            label: label.into(),
        })
    }

    pub fn exists(&mut self, pattern: PathPattern) -> ExprId {
        self.push(Expr::Exists(pattern))
    }

    /// Creates a list comprehension.
    pub fn comprehension(
        &mut self,
        variable: impl Into<String>,
        list: ExprId,
        filter: Option<ExprId>,
        projection: Option<ExprId>,
    ) -> ExprId {
        self.push(Expr::ListComprehension {
            variable: variable.into(),
            list,
            filter,
            projection,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_builders() {
        let mut arena = ExprArena::new();
        let age = arena.var_prop("a", "age");
        let one = arena.int(1);
        let sum = arena.add(age, one);

        assert_eq!(arena.len(), 4);
        match arena.get(sum) {
            Some(Expr::Binary { op, left, right }) => {
                assert_eq!(*op, BinaryOp::Add);
                assert_eq!(*left, age);
                assert_eq!(*right, one);
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_foreign_id_is_invariant_error() {
        let arena = ExprArena::new();
        assert!(matches!(
            arena.node(ExprId(3)),
            Err(Error::InternalInvariant { .. })
        ));
    }

    #[test]
    fn test_children_order() {
        let mut arena = ExprArena::new();
        let input = arena.var("x");
        let w = arena.int(1);
        let t = arena.string("one");
        let e = arena.string("other");
        let case = arena.case_of(input, vec![(w, t)], Some(e));
        assert_eq!(arena.get(case).unwrap().children(), vec![input, w, t, e]);

        let star = arena.count_star();
        assert!(arena.get(star).unwrap().children().is_empty());
        assert!(arena.get(star).unwrap().is_aggregate());
    }
}
