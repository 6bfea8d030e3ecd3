//! Error types for Strata expression evaluation and aggregation.

use alloc::string::String;
use thiserror::Error;

/// Result type alias for Strata operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised while evaluating expressions or driving aggregation.
///
/// Every error aborts the query that raised it; there is no per-row recovery.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Operand kinds are incompatible with the operator.
    #[error("Type mismatch in {op}: {detail}")]
    TypeMismatch { op: String, detail: String },

    /// Division or modulo by zero.
    #[error("Division by zero")]
    DivisionByZero,

    /// Node kind or operator shape not handled by this engine.
    #[error("Not implemented: {what}")]
    Unimplemented { what: String },

    /// A condition the engine relies on did not hold.
    #[error("Internal invariant violated: {message}")]
    InternalInvariant { message: String },

    /// Variable is unknown or its record slot is unbound.
    #[error("Undefined variable: {name}")]
    UndefinedVariable { name: String },

    /// Query parameter has no bound value.
    #[error("Undefined parameter: ${name}")]
    UndefinedParameter { name: String },

    /// Aggregate call nested inside another aggregate call.
    #[error("Nested aggregation is not allowed: {func}")]
    NestedAggregate { func: String },

    /// Aggregated and bare variables mixed in one expression.
    #[error("Mixed aggregate scope: {message}")]
    MixedAggregateScope { message: String },

    /// Percentile argument outside [0, 1].
    #[error("Invalid percentile {value}: must be within [0, 1]")]
    InvalidPercentile { value: f64 },

    /// Function is neither a built-in nor a registered plugin.
    #[error("Function not found: {name}")]
    PluginNotFound { name: String },

    /// Wrong arity or argument type for a built-in function.
    #[error("Invalid argument for {function}(): {message}")]
    InvalidArgument { function: String, message: String },

    /// An accumulator rejected a value.
    #[error("{func}: {message}")]
    AggregateStep { func: String, message: String },

    /// Simple CASE with no matching branch and no ELSE.
    #[error("No CASE branch matched and no ELSE was given")]
    CaseNoMatch,
}

impl Error {
    /// Creates a type mismatch error.
    pub fn type_mismatch(op: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::TypeMismatch {
            op: op.into(),
            detail: detail.into(),
        }
    }

    /// Creates an unimplemented error.
    pub fn unimplemented(what: impl Into<String>) -> Self {
        Error::Unimplemented { what: what.into() }
    }

    /// Creates an internal invariant error.
    pub fn internal(message: impl Into<String>) -> Self {
        Error::InternalInvariant {
            message: message.into(),
        }
    }

    /// Creates an undefined variable error.
    pub fn undefined_variable(name: impl Into<String>) -> Self {
        Error::UndefinedVariable { name: name.into() }
    }

    /// Creates an undefined parameter error.
    pub fn undefined_parameter(name: impl Into<String>) -> Self {
        Error::UndefinedParameter { name: name.into() }
    }

    /// Creates a nested aggregate error.
    pub fn nested_aggregate(func: impl Into<String>) -> Self {
        Error::NestedAggregate { func: func.into() }
    }

    /// Creates a mixed aggregate scope error.
    pub fn mixed_scope(message: impl Into<String>) -> Self {
        Error::MixedAggregateScope {
            message: message.into(),
        }
    }

    /// Creates a function-not-found error.
    pub fn plugin_not_found(name: impl Into<String>) -> Self {
        Error::PluginNotFound { name: name.into() }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(function: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            function: function.into(),
            message: message.into(),
        }
    }

    /// Creates an aggregate step error carrying the accumulator's message.
    pub fn aggregate_step(func: impl Into<String>, message: impl Into<String>) -> Self {
        Error::AggregateStep {
            func: func.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_error_display() {
        let err = Error::type_mismatch("Add", "Bool + String");
        assert!(err.to_string().contains("Type mismatch"));

        let err = Error::undefined_parameter("limit");
        assert_eq!(err.to_string(), "Undefined parameter: $limit");

        let err = Error::InvalidPercentile { value: 1.5 };
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn test_aggregate_step_message_is_verbatim() {
        let err = Error::aggregate_step("sum", "cannot add String to sum");
        assert_eq!(err.to_string(), "sum: cannot add String to sum");
    }

    #[test]
    fn test_error_constructors() {
        match Error::invalid_argument("substring", "start out of range") {
            Error::InvalidArgument { function, .. } => assert_eq!(function, "substring"),
            _ => panic!("Wrong error type"),
        }
    }
}
