//! Unified error types for graph-delta.
//!
//! The error hierarchy follows a simple rule: failures of the underlying
//! graph store and precondition violations surface to the caller; a key
//! that cannot be resolved to a path is recovered locally (logged and
//! skipped) and never appears here.

use thiserror::Error;

/// Main error type for graph-delta operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GraphDeltaError {
    /// A read or write against a graph snapshot failed. Fatal for the
    /// current diff job; the caller owns the transaction and decides
    /// whether to roll back.
    #[error("Store failure in snapshot '{snapshot}': {context}")]
    Store {
        /// Identity of the offending snapshot.
        snapshot: String,
        context: String,
        #[source]
        source: StoreErrorKind,
    },

    /// Input violated an engine precondition (e.g. a duplicate entity key
    /// within one collection). The engine fails fast rather than silently
    /// picking an entry and corrupting the diff.
    #[error("Precondition violated: {0}")]
    Precondition(String),

    /// Invalid engine configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Specific store error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StoreErrorKind {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Transaction cannot commit: {0}")]
    TransactionFailed(String),

    #[error("Dangling path handle {0}")]
    DanglingHandle(usize),

    #[error("Store rejected property write: {0}")]
    PropertyWrite(String),
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for graph-delta operations
pub type Result<T> = std::result::Result<T, GraphDeltaError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl GraphDeltaError {
    /// Create a store error with snapshot identity and context
    pub fn store(
        snapshot: impl Into<String>,
        context: impl Into<String>,
        source: StoreErrorKind,
    ) -> Self {
        Self::Store {
            snapshot: snapshot.into(),
            context: context.into(),
            source,
        }
    }

    /// Create a precondition error
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    /// Create a precondition error for a duplicate entity key
    pub fn duplicate_key(key: impl Into<String>) -> Self {
        Self::Precondition(format!(
            "duplicate entity key '{}' within one collection",
            key.into()
        ))
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// The context string is prepended to the error's existing context,
/// creating a chain that shows the path through the code.
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure (lazy evaluation).
    ///
    /// The closure is only called if the result is an error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<GraphDeltaError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: GraphDeltaError, new_ctx: &str) -> GraphDeltaError {
    match err {
        GraphDeltaError::Store {
            snapshot,
            context: existing,
            source,
        } => GraphDeltaError::Store {
            snapshot,
            context: chain_context(new_ctx, &existing),
            source,
        },
        GraphDeltaError::Precondition(msg) => {
            GraphDeltaError::Precondition(chain_context(new_ctx, &msg))
        }
        GraphDeltaError::Config(msg) => GraphDeltaError::Config(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together.
///
/// If the existing context is empty, returns just the new context.
/// Otherwise, returns "`new_context`: `existing_context`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

/// Extension trait for Option types to convert to errors with context.
pub trait OptionContext<T> {
    /// Convert None to a precondition error with the given context.
    fn context_none(self, context: impl Into<String>) -> Result<T>;
}

impl<T> OptionContext<T> for Option<T> {
    fn context_none(self, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| GraphDeltaError::Precondition(context.into()))
    }
}
