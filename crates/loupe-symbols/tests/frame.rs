//! Tests for the frame view and its asynchronous frame base.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::*;
use loupe_symbols::eval::EvalResult;
use loupe_symbols::frame::{drain_tasks, task_queue, FrameView, RegisterSnapshot};
use loupe_symbols::location::ModuleSymbols;
use loupe_symbols::module::{LineRow, LineTable};
use loupe_symbols::types::{Address, LocationSymbol, SymbolContext, VariableLocation};
use loupe_symbols::SymbolIndex;

fn frame_fixture() -> loupe_symbols::ModuleInfo
{
    let mut unit = UnitBuilder::new("a.cc", "/src");
    let mut entry = function("compute", 0x100, 0x180);
    entry.frame_base = Some(VariableLocation::always(vec![0x91]));
    unit.add(0, entry);
    unit.add(0, function("bare", 0x200, 0x240));
    unit.set_line_table(LineTable::new(vec![
        LineRow::new(0x100, 0, 10),
        LineRow::end_sequence(0x180),
        LineRow::new(0x200, 0, 20),
        LineRow::end_sequence(0x240),
    ]));
    module(vec![unit.build()])
}

#[test]
fn test_location_is_lazily_symbolized_and_cached()
{
    let info = frame_fixture();
    let index = SymbolIndex::build(&info);
    let evaluator = MapEvaluator::new();
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);
    let (sender, _receiver) = task_queue();

    let frame = FrameView::new(
        &symbols,
        SymbolContext::RELATIVE,
        Address::from(0x110),
        Address::from(0x7fff_0000),
        RegisterSnapshot::new(),
        sender,
    );

    let location = frame.location();
    assert!(location.is_symbolized());
    assert!(matches!(location.symbol(), Some(LocationSymbol::Function(_))));
    assert_eq!(location.file_line().map(|fl| fl.line), Some(10));

    // Idempotent: the same cached location comes back.
    assert_eq!(frame.location(), location);
}

/// A synchronous evaluator completion must not reenter the caller: the
/// callback only runs once the owner drains the deferred-task queue.
#[test]
fn test_synchronous_completion_is_deferred()
{
    let info = frame_fixture();
    let index = SymbolIndex::build(&info);
    let evaluator = MapEvaluator::new().with(&[0x91], EvalResult::Value(0x7fff_1000));
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);
    let (sender, receiver) = task_queue();

    let frame = FrameView::new(
        &symbols,
        SymbolContext::RELATIVE,
        Address::from(0x110),
        Address::from(0x7fff_0000),
        RegisterSnapshot::new(),
        sender,
    );

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    frame.frame_base(Box::new(move |value| sink.borrow_mut().push(value)));
    assert!(seen.borrow().is_empty(), "must not fire inline");

    drain_tasks(&receiver);
    assert_eq!(*seen.borrow(), vec![Some(0x7fff_1000)]);

    // A later request hits the cache, still through the deferred queue.
    let sink = Rc::clone(&seen);
    frame.frame_base(Box::new(move |value| sink.borrow_mut().push(value)));
    assert_eq!(seen.borrow().len(), 1);
    drain_tasks(&receiver);
    assert_eq!(*seen.borrow(), vec![Some(0x7fff_1000), Some(0x7fff_1000)]);
}

/// Callbacks queued while evaluation is in flight flush in registration
/// order from the evaluator's completion callback.
#[test]
fn test_pending_completion_flushes_mailbox_in_order()
{
    let info = frame_fixture();
    let index = SymbolIndex::build(&info);
    let evaluator = PendingEvaluator::new();
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);
    let (sender, _receiver) = task_queue();

    let frame = FrameView::new(
        &symbols,
        SymbolContext::RELATIVE,
        Address::from(0x110),
        Address::from(0x7fff_0000),
        RegisterSnapshot::new(),
        sender,
    );

    let seen = Rc::new(RefCell::new(Vec::new()));
    for tag in [1u32, 2] {
        let sink = Rc::clone(&seen);
        frame.frame_base(Box::new(move |value| sink.borrow_mut().push((tag, value))));
    }
    assert_eq!(evaluator.pending_count(), 1, "one evaluation serves the mailbox");
    assert!(seen.borrow().is_empty());

    evaluator.complete_all(EvalResult::Address(0x7fff_2000));
    assert_eq!(
        *seen.borrow(),
        vec![(1, Some(0x7fff_2000)), (2, Some(0x7fff_2000))]
    );
}

#[test]
fn test_no_frame_base_expression_reports_zero()
{
    let info = frame_fixture();
    let index = SymbolIndex::build(&info);
    let evaluator = MapEvaluator::new();
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);
    let (sender, receiver) = task_queue();

    // `bare` has no frame-base expression.
    let frame = FrameView::new(
        &symbols,
        SymbolContext::RELATIVE,
        Address::from(0x210),
        Address::from(0x7fff_0000),
        RegisterSnapshot::new(),
        sender,
    );

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    frame.frame_base(Box::new(move |value| sink.borrow_mut().push(value)));
    drain_tasks(&receiver);
    assert_eq!(*seen.borrow(), vec![Some(0)]);
}

#[test]
fn test_unsymbolized_address_reports_zero()
{
    let info = frame_fixture();
    let index = SymbolIndex::build(&info);
    let evaluator = MapEvaluator::new();
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);
    let (sender, receiver) = task_queue();

    let frame = FrameView::new(
        &symbols,
        SymbolContext::RELATIVE,
        Address::from(0xdead_0000),
        Address::from(0x7fff_0000),
        RegisterSnapshot::new(),
        sender,
    );

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    frame.frame_base(Box::new(move |value| sink.borrow_mut().push(value)));
    drain_tasks(&receiver);
    assert_eq!(*seen.borrow(), vec![Some(0)]);
}

#[test]
fn test_failed_evaluation_reports_unavailable()
{
    let info = frame_fixture();
    let index = SymbolIndex::build(&info);
    // The expression is unknown to the evaluator: unavailable.
    let evaluator = MapEvaluator::new();
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);
    let (sender, receiver) = task_queue();

    let frame = FrameView::new(
        &symbols,
        SymbolContext::RELATIVE,
        Address::from(0x110),
        Address::from(0x7fff_0000),
        RegisterSnapshot::new(),
        sender,
    );

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    frame.frame_base(Box::new(move |value| sink.borrow_mut().push(value)));
    drain_tasks(&receiver);
    assert_eq!(*seen.borrow(), vec![None]);
}

/// Dropping the frame detaches the in-flight evaluation: the evaluator's
/// eventual completion is discarded, no callback fires.
#[test]
fn test_drop_detaches_inflight_evaluation()
{
    let info = frame_fixture();
    let index = SymbolIndex::build(&info);
    let evaluator = PendingEvaluator::new();
    let symbols = ModuleSymbols::new(&info, &index, &evaluator);
    let (sender, receiver) = task_queue();

    let seen = Rc::new(RefCell::new(Vec::new()));
    {
        let frame = FrameView::new(
            &symbols,
            SymbolContext::RELATIVE,
            Address::from(0x110),
            Address::from(0x7fff_0000),
            RegisterSnapshot::new(),
            sender,
        );
        let sink = Rc::clone(&seen);
        frame.frame_base(Box::new(move |value| sink.borrow_mut().push(value)));
        assert_eq!(evaluator.pending_count(), 1);
    }

    // The evaluator outlives the frame and completes into the void.
    evaluator.complete_all(EvalResult::Address(0x7fff_3000));
    drain_tasks(&receiver);
    assert!(seen.borrow().is_empty());
}

#[test]
fn test_register_snapshot_reads()
{
    let mut registers = RegisterSnapshot::new();
    registers.set("rbp", 0x7fff_4000);
    assert_eq!(registers.get("rbp"), Some(0x7fff_4000));
    assert_eq!(registers.get("rsp"), None);
}
