//! Location-expression evaluator interface.
//!
//! The evaluator itself — a small bytecode interpreter over register/memory
//! reads — lives outside this crate. This core consumes it through the result
//! contract below: an evaluation either completes synchronously with a value
//! (or "unavailable"), or goes asynchronous and completes through the
//! callback handed to [`ExpressionEvaluator::evaluate`].
//!
//! Callers that cannot wait (static variable addresses, a dropped frame)
//! simply discard their interest; the evaluator's eventual completion then
//! lands in a callback that checks a shared detached flag and does nothing.

/// Outcome of a location-expression evaluation.
///
/// `Unavailable` covers both outright failure and "requires runtime state we
/// do not have" — an optimized-away variable, a thread-local without a live
/// thread. Neither is an error at this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalResult
{
    /// The expression produced a memory address.
    Address(u64),
    /// The expression produced a plain value (register contents, constant).
    Value(u64),
    /// No result is available.
    Unavailable,
}

impl EvalResult
{
    /// The numeric result regardless of kind, if one exists.
    pub fn value(self) -> Option<u64>
    {
        match self {
            EvalResult::Address(v) | EvalResult::Value(v) => Some(v),
            EvalResult::Unavailable => None,
        }
    }
}

/// How an [`ExpressionEvaluator::evaluate`] call finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalDisposition
{
    /// The evaluation completed synchronously with this result; the
    /// completion callback was dropped unused.
    Complete(EvalResult),
    /// The evaluation is in flight; the completion callback fires later.
    Pending,
}

/// Runtime-state reads an evaluation may need.
pub trait EvalDataProvider
{
    /// Read a register by name. `None` when unavailable.
    fn read_register(&self, name: &str) -> Option<u64>;

    /// Read `size` bytes of memory. `None` when unavailable.
    fn read_memory(&self, address: u64, size: usize) -> Option<Vec<u8>>;

    /// The established frame base, when one exists.
    fn frame_base(&self) -> Option<u64>;
}

/// A provider with no runtime state at all; every read fails.
///
/// Static (global) variable locations must not depend on live CPU state, so
/// they are evaluated against this provider: any expression that asks for a
/// register, memory, or a frame base degrades to "unlocated".
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDataProvider;

impl EvalDataProvider for NullDataProvider
{
    fn read_register(&self, _name: &str) -> Option<u64>
    {
        None
    }

    fn read_memory(&self, _address: u64, _size: usize) -> Option<Vec<u8>>
    {
        None
    }

    fn frame_base(&self) -> Option<u64>
    {
        None
    }
}

/// Completion callback for an asynchronous evaluation.
pub type EvalCallback = Box<dyn FnOnce(EvalResult)>;

/// The external location-expression evaluator.
pub trait ExpressionEvaluator
{
    /// Evaluate `expression` against `provider`.
    ///
    /// On a synchronous completion the disposition carries the result and
    /// `on_complete` is never invoked. On `Pending` the evaluator owns
    /// `on_complete` and invokes it exactly once when the evaluation
    /// finishes; cancellation is the caller's business (detach, not destroy).
    fn evaluate(
        &self,
        expression: &[u8],
        provider: &dyn EvalDataProvider,
        on_complete: EvalCallback,
    ) -> EvalDisposition;
}
