//! # Error Types
//!
//! Error handling for the symbol core.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! Almost nothing in this crate is error-shaped: a query that matches nothing
//! returns an empty result, a query the engine cannot answer (register names,
//! for example) returns an empty result, and structurally suspicious debug
//! info is skipped so one bad compile unit cannot poison unrelated lookups.
//! The variants below cover the two places a real error can surface: malformed
//! provider data detected when a module is loaded, and a location-expression
//! evaluation that failed outright.

use thiserror::Error;

/// Main error type for symbol operations
///
/// ## Error Categories
///
/// 1. **Load errors**: MalformedDebugInfo (raised once at module-load time)
/// 2. **Evaluation errors**: EvaluationFailed (surfaced to frame-base callers)
#[derive(Error, Debug)]
pub enum SymbolError
{
    /// The debug-entry provider handed us structurally invalid data
    ///
    /// This happens when:
    /// - A parent or child link points outside the entry table
    /// - An abstract-origin link names a compile unit that does not exist
    /// - A line table row references a file index outside the unit's file table
    ///
    /// Detected during `ModuleInfo::validate`, never during lookups.
    #[error("Malformed debug info: {0}")]
    MalformedDebugInfo(String),

    /// A location-expression evaluation failed
    ///
    /// Queries degrade to "address unavailable" instead of propagating this;
    /// it exists so frame-base completion can describe what went wrong.
    #[error("Location expression evaluation failed: {0}")]
    EvaluationFailed(String),
}

/// Convenience type alias for `Result<T, SymbolError>`
pub type Result<T> = std::result::Result<T, SymbolError>;
