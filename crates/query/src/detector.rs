//! Aggregate detection and validation.
//!
//! A return item is either a pure group-by expression or an aggregated one. The
//! detector finds the aggregate calls of an expression tree and rejects two shapes
//! before grouping begins:
//!
//! - an aggregate nested inside another aggregate, such as `sum(max(x))`
//! - a property access outside any aggregate mixed with an aggregate, such as
//!   `sum(n.age) + m.name`

use crate::aggregate;
use crate::ast::{Expr, ExprArena, ExprId};
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use strata_core::{Error, Result};

const MIXED_SCOPE_MESSAGE: &str =
    "Aggregated and non-aggregated variables cannot be mixed in one expression";

/// Scans one expression tree for aggregate calls.
#[derive(Debug)]
pub struct AggregateDetector {
    aggregates: Vec<ExprId>,
    nested: Option<String>,
    outside_variable: bool,
    message: Option<String>,
}

impl AggregateDetector {
    /// Walks the tree rooted at `root`.
    pub fn new(arena: &ExprArena, root: ExprId) -> Self {
        let mut detector = Self {
            aggregates: Vec::new(),
            nested: None,
            outside_variable: false,
            message: None,
        };
        let mut walk = Walk {
            arena,
            enclosing: Vec::new(),
            bound: Vec::new(),
        };
        walk.visit(root, &mut detector);
        detector
    }

    /// Returns true if the expression is acceptable as a return item.
    ///
    /// On failure the reason is available through [`error_message`](Self::error_message).
    pub fn validate(&mut self) -> bool {
        self.message = None;
        if let Some(shape) = &self.nested {
            self.message = Some(format!("Nested aggregation is not allowed: {}", shape));
        } else if !self.aggregates.is_empty() && self.outside_variable {
            self.message = Some(String::from(MIXED_SCOPE_MESSAGE));
        }
        self.message.is_none()
    }

    /// Message recorded by the last failed [`validate`](Self::validate).
    pub fn error_message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Typed form of [`validate`](Self::validate).
    pub fn validate_result(&self) -> Result<()> {
        if let Some(shape) = &self.nested {
            return Err(Error::nested_aggregate(shape.clone()));
        }
        if !self.aggregates.is_empty() && self.outside_variable {
            return Err(Error::mixed_scope(MIXED_SCOPE_MESSAGE));
        }
        Ok(())
    }

    /// Returns true if the tree calls at least one registered aggregate.
    #[inline]
    pub fn has_valid_agg_func(&self) -> bool {
        !self.aggregates.is_empty()
    }

    /// Registered aggregate calls in visit order, nested ones included.
    pub fn aggregate_nodes(&self) -> &[ExprId] {
        &self.aggregates
    }
}

struct Walk<'a> {
    arena: &'a ExprArena,
    /// Names of the aggregate calls enclosing the current node.
    enclosing: Vec<String>,
    /// Comprehension variables in scope.
    bound: Vec<String>,
}

impl Walk<'_> {
    fn visit(&mut self, id: ExprId, out: &mut AggregateDetector) {
        let Some(node) = self.arena.get(id) else {
            return;
        };
        match node {
            Expr::Aggregate { func, args, .. } => {
                if let Some(outer) = self.enclosing.first() {
                    if out.nested.is_none() {
                        out.nested = Some(format!("{}({}(...))", outer, func));
                    }
                }
                if aggregate::is_aggregate(func) {
                    out.aggregates.push(id);
                }
                self.enclosing.push(func.clone());
                for arg in args {
                    self.visit(*arg, out);
                }
                self.enclosing.pop();
            }
            Expr::GetField { expr, .. } => {
                if self.enclosing.is_empty() && !self.is_bound(*expr) {
                    out.outside_variable = true;
                }
                self.visit(*expr, out);
            }
            Expr::ListComprehension {
                variable,
                list,
                filter,
                projection,
            } => {
                self.visit(*list, out);
                self.bound.push(variable.clone());
                for id in filter.iter().chain(projection.iter()) {
                    self.visit(*id, out);
                }
                self.bound.pop();
            }
            other => {
                for child in other.children() {
                    self.visit(child, out);
                }
            }
        }
    }

    /// True when `base` is a reference to a comprehension variable.
    fn is_bound(&self, base: ExprId) -> bool {
        matches!(self.arena.get(base), Some(Expr::Ref(name)) if self.bound.contains(name))
    }
}
