//! Physical stack-frame view.
//!
//! A [`FrameView`] is one physical (non-inlined) frame: stack pointer, a
//! captured register snapshot, and a [`Location`] that starts unsymbolized
//! and is filled in on first access. Frame-base computation is the one
//! asynchronous operation in the core: the function's frame-base expression
//! is dispatched to the external evaluator, interested callers queue
//! callbacks in a mailbox, and the mailbox is drained exactly once on
//! completion. A synchronous completion posts its callbacks through the
//! frame's deferred-task queue so the caller is never reentered inline.
//!
//! Dropping the frame detaches any in-flight evaluation rather than tearing
//! it down: the evaluator's eventual callback finds the detached flag set
//! and discards the result.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::mpsc;

use once_cell::unsync::OnceCell;

use crate::eval::{EvalDataProvider, EvalDisposition};
use crate::location::{InputLocation, ModuleSymbols, ResolveOptions};
use crate::types::{Address, Location, SymbolContext};

/// Work postponed so it runs from the owner's loop, not inside a call.
pub type DeferredTask = Box<dyn FnOnce()>;
/// Sender side of a frame's deferred-task queue.
pub type DeferredTaskSender = mpsc::Sender<DeferredTask>;
/// Receiver side of a frame's deferred-task queue.
pub type DeferredTaskReceiver = mpsc::Receiver<DeferredTask>;

/// Create a deferred-task queue. The owner of the frame drains the receiver.
pub fn task_queue() -> (DeferredTaskSender, DeferredTaskReceiver)
{
    mpsc::channel()
}

/// Run every task currently queued, in posting order.
pub fn drain_tasks(receiver: &DeferredTaskReceiver)
{
    while let Ok(task) = receiver.try_recv() {
        task();
    }
}

/// Captured register values for one frame.
#[derive(Debug, Clone, Default)]
pub struct RegisterSnapshot
{
    values: HashMap<String, u64>,
}

impl RegisterSnapshot
{
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: u64)
    {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<u64>
    {
        self.values.get(name).copied()
    }
}

/// Register reads backed by the frame's snapshot; no memory, no frame base.
struct FrameDataProvider<'a>
{
    registers: &'a RegisterSnapshot,
}

impl EvalDataProvider for FrameDataProvider<'_>
{
    fn read_register(&self, name: &str) -> Option<u64>
    {
        self.registers.get(name)
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

/// Callback invoked with the frame base, or `None` when evaluation failed.
pub type FrameBaseCallback = Box<dyn FnOnce(Option<u64>)>;

enum FrameBaseState
{
    NotRequested,
    /// Evaluation in flight; the mailbox of waiting callers.
    Pending(Vec<FrameBaseCallback>),
    Complete(Option<u64>),
}

enum Step
{
    Post(Option<u64>),
    Queued,
    Start,
}

/// One physical stack frame.
pub struct FrameView<'a>
{
    symbols: &'a ModuleSymbols<'a>,
    symbol_context: SymbolContext,
    instruction_pointer: Address,
    stack_pointer: Address,
    registers: RegisterSnapshot,
    location: OnceCell<Location>,
    frame_base: Rc<RefCell<FrameBaseState>>,
    detached: Rc<Cell<bool>>,
    tasks: DeferredTaskSender,
}

impl<'a> FrameView<'a>
{
    pub fn new(
        symbols: &'a ModuleSymbols<'a>,
        symbol_context: SymbolContext,
        instruction_pointer: Address,
        stack_pointer: Address,
        registers: RegisterSnapshot,
        tasks: DeferredTaskSender,
    ) -> Self
    {
        Self {
            symbols,
            symbol_context,
            instruction_pointer,
            stack_pointer,
            registers,
            location: OnceCell::new(),
            frame_base: Rc::new(RefCell::new(FrameBaseState::NotRequested)),
            detached: Rc::new(Cell::new(false)),
            tasks,
        }
    }

    pub fn instruction_pointer(&self) -> Address
    {
        self.instruction_pointer
    }

    pub fn stack_pointer(&self) -> Address
    {
        self.stack_pointer
    }

    pub fn registers(&self) -> &RegisterSnapshot
    {
        &self.registers
    }

    /// The frame's symbolized location, computed on first access and cached
    /// for the frame's lifetime.
    pub fn location(&self) -> &Location
    {
        self.location.get_or_init(|| {
            self.symbols
                .resolve_input_location(
                    &self.symbol_context,
                    &InputLocation::Address(self.instruction_pointer),
                    &ResolveOptions::default(),
                )
                .into_iter()
                .next()
                .unwrap_or_else(|| {
                    Location::symbolized_no_match(self.instruction_pointer, self.symbol_context)
                })
        })
    }

    /// Request the frame base, delivering it through `callback`.
    ///
    /// The first request starts evaluation; later requests while it is in
    /// flight join the mailbox and fire in registration order. A frame with
    /// no frame-base expression (or an unsymbolized address) completes
    /// immediately with 0. Completion callbacks never run inline from this
    /// call: an already-known value is posted through the deferred-task
    /// queue.
    pub fn frame_base(&self, callback: FrameBaseCallback)
    {
        let mut callback = Some(callback);
        let step = {
            let mut state = self.frame_base.borrow_mut();
            match &mut *state {
                FrameBaseState::Complete(value) => Step::Post(*value),
                FrameBaseState::Pending(mailbox) => {
                    if let Some(cb) = callback.take() {
                        mailbox.push(cb);
                    }
                    Step::Queued
                }
                FrameBaseState::NotRequested => Step::Start,
            }
        };

        match step {
            Step::Post(value) => {
                if let Some(cb) = callback.take() {
                    self.post(cb, value);
                }
            }
            Step::Queued => {}
            Step::Start => {
                if let Some(cb) = callback.take() {
                    self.start_evaluation(cb);
                }
            }
        }
    }

    fn start_evaluation(&self, callback: FrameBaseCallback)
    {
        let Some(expression) = self.frame_base_expression() else {
            *self.frame_base.borrow_mut() = FrameBaseState::Complete(Some(0));
            self.post(callback, Some(0));
            return;
        };

        // The mailbox must exist before the evaluator runs so a reentrant
        // request lands in it.
        *self.frame_base.borrow_mut() = FrameBaseState::Pending(vec![callback]);

        let state = Rc::clone(&self.frame_base);
        let detached = Rc::clone(&self.detached);
        let provider = FrameDataProvider {
            registers: &self.registers,
        };
        let disposition = self.symbols.evaluator.evaluate(
            &expression,
            &provider,
            Box::new(move |result| {
                if detached.get() {
                    // The frame is gone; the result has no audience.
                    return;
                }
                let value = result.value();
                let mailbox = {
                    let mut state = state.borrow_mut();
                    match std::mem::replace(&mut *state, FrameBaseState::Complete(value)) {
                        FrameBaseState::Pending(mailbox) => mailbox,
                        other => {
                            *state = other;
                            return;
                        }
                    }
                };
                for cb in mailbox {
                    cb(value);
                }
            }),
        );

        if let EvalDisposition::Complete(result) = disposition {
            // Synchronous completion: cache the value, then flush the
            // mailbox through the deferred-task queue so nothing reenters
            // the caller inline.
            let value = result.value();
            let mailbox = {
                let mut state = self.frame_base.borrow_mut();
                match std::mem::replace(&mut *state, FrameBaseState::Complete(value)) {
                    FrameBaseState::Pending(mailbox) => mailbox,
                    other => {
                        *state = other;
                        return;
                    }
                }
            };
            for cb in mailbox {
                self.post(cb, value);
            }
        }
    }

    /// The frame-base expression applicable at the current address, if the
    /// covering function declares one.
    fn frame_base_expression(&self) -> Option<Vec<u8>>
    {
        let relative = self.symbol_context.absolute_to_relative(self.instruction_pointer);
        let function_ref = self.symbols.function_at(relative)?;
        let entry = self.symbols.info().entry(function_ref)?;
        let frame_base = entry.frame_base.as_ref()?;
        frame_base.expression_for(relative).map(<[u8]>::to_vec)
    }

    fn post(&self, callback: FrameBaseCallback, value: Option<u64>)
    {
        // The owner dropping the receiver means nobody is left to care.
        let _ = self.tasks.send(Box::new(move || callback(value)));
    }
}

impl Drop for FrameView<'_>
{
    fn drop(&mut self)
    {
        // Detach, never destroy: an in-flight evaluation completes into a
        // callback that now finds this flag set and discards the result.
        self.detached.set(true);
    }
}
