//! Shared fixtures: hand-built modules and stub evaluators.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use loupe_symbols::eval::{
    EvalCallback, EvalDataProvider, EvalDisposition, EvalResult, ExpressionEvaluator,
};
use loupe_symbols::module::{
    CompileUnit, DebugEntry, ElfSymbols, EntryId, EntryKind, ModuleInfo, TypeClass,
};
use loupe_symbols::types::{AddressRange, FileLine};

/// Builds one compile unit, linking entries into a tree by index.
pub struct UnitBuilder
{
    unit: CompileUnit,
}

impl UnitBuilder
{
    pub fn new(name: &str, comp_dir: &str) -> Self
    {
        let mut unit = CompileUnit {
            name: name.to_string(),
            comp_dir: comp_dir.to_string(),
            files: vec![name.to_string()],
            ..CompileUnit::default()
        };
        unit.entries.push(DebugEntry {
            kind: EntryKind::Root,
            ..DebugEntry::default()
        });
        Self { unit }
    }

    /// Append an entry under `parent`, returning its index.
    pub fn add(&mut self, parent: u32, mut entry: DebugEntry) -> u32
    {
        let index = self.unit.entries.len() as u32;
        entry.parent = Some(parent);
        self.unit.entries[parent as usize].children.push(index);
        self.unit.entries.push(entry);
        index
    }

    pub fn set_files(&mut self, files: &[&str])
    {
        self.unit.files = files.iter().map(|f| f.to_string()).collect();
    }

    pub fn set_line_table(&mut self, table: loupe_symbols::module::LineTable)
    {
        self.unit.line_table = table;
    }

    pub fn build(self) -> CompileUnit
    {
        self.unit
    }
}

pub fn module(units: Vec<CompileUnit>) -> ModuleInfo
{
    let info = ModuleInfo::new(units, ElfSymbols::empty());
    info.validate().expect("fixture module must be well-formed");
    info
}

pub fn module_with_symbols(units: Vec<CompileUnit>, symbols: ElfSymbols) -> ModuleInfo
{
    let info = ModuleInfo::new(units, symbols);
    info.validate().expect("fixture module must be well-formed");
    info
}

pub fn namespace(name: &str) -> DebugEntry
{
    DebugEntry {
        kind: EntryKind::Namespace,
        name: name.to_string(),
        ..DebugEntry::default()
    }
}

pub fn class(name: &str) -> DebugEntry
{
    DebugEntry {
        kind: EntryKind::Type(TypeClass::Class),
        name: name.to_string(),
        ..DebugEntry::default()
    }
}

pub fn struct_type(name: &str) -> DebugEntry
{
    DebugEntry {
        kind: EntryKind::Type(TypeClass::Struct),
        name: name.to_string(),
        ..DebugEntry::default()
    }
}

pub fn union_type(name: &str) -> DebugEntry
{
    DebugEntry {
        kind: EntryKind::Type(TypeClass::Union),
        name: name.to_string(),
        ..DebugEntry::default()
    }
}

pub fn declaration(mut entry: DebugEntry) -> DebugEntry
{
    entry.is_declaration = true;
    entry
}

pub fn function(name: &str, begin: u64, end: u64) -> DebugEntry
{
    DebugEntry {
        kind: EntryKind::Function,
        name: name.to_string(),
        ranges: vec![AddressRange::new(begin, end)],
        ..DebugEntry::default()
    }
}

pub fn abstract_function(name: &str) -> DebugEntry
{
    DebugEntry {
        kind: EntryKind::Function,
        name: name.to_string(),
        ..DebugEntry::default()
    }
}

pub fn inline_instance(origin: EntryId, begin: u64, end: u64, call_site: FileLine) -> DebugEntry
{
    DebugEntry {
        kind: EntryKind::InlinedFunction,
        abstract_origin: Some(origin),
        ranges: vec![AddressRange::new(begin, end)],
        call_site: Some(call_site),
        ..DebugEntry::default()
    }
}

pub fn block(begin: u64, end: u64) -> DebugEntry
{
    DebugEntry {
        kind: EntryKind::Block,
        ranges: vec![AddressRange::new(begin, end)],
        ..DebugEntry::default()
    }
}

pub fn variable(name: &str) -> DebugEntry
{
    DebugEntry {
        kind: EntryKind::Variable,
        name: name.to_string(),
        ..DebugEntry::default()
    }
}

pub fn parameter(name: &str) -> DebugEntry
{
    DebugEntry {
        kind: EntryKind::Parameter,
        name: name.to_string(),
        ..DebugEntry::default()
    }
}

pub fn member(name: &str, offset: u64) -> DebugEntry
{
    DebugEntry {
        kind: EntryKind::Member,
        name: name.to_string(),
        member_offset: Some(offset),
        ..DebugEntry::default()
    }
}

pub fn inherit(base: EntryId, offset: u64) -> DebugEntry
{
    DebugEntry {
        kind: EntryKind::Inheritance,
        type_ref: Some(base),
        member_offset: Some(offset),
        ..DebugEntry::default()
    }
}

/// Evaluator answering from a fixed expression → result table, always
/// synchronously. Unknown expressions are unavailable.
pub struct MapEvaluator
{
    results: HashMap<Vec<u8>, EvalResult>,
}

impl MapEvaluator
{
    pub fn new() -> Self
    {
        Self {
            results: HashMap::new(),
        }
    }

    pub fn with(mut self, expression: &[u8], result: EvalResult) -> Self
    {
        self.results.insert(expression.to_vec(), result);
        self
    }
}

impl ExpressionEvaluator for MapEvaluator
{
    fn evaluate(
        &self,
        expression: &[u8],
        _provider: &dyn EvalDataProvider,
        _on_complete: EvalCallback,
    ) -> EvalDisposition
    {
        EvalDisposition::Complete(
            self.results
                .get(expression)
                .copied()
                .unwrap_or(EvalResult::Unavailable),
        )
    }
}

/// Evaluator that never completes on its own; tests finish it by hand.
pub struct PendingEvaluator
{
    pending: RefCell<Vec<EvalCallback>>,
}

impl PendingEvaluator
{
    pub fn new() -> Self
    {
        Self {
            pending: RefCell::new(Vec::new()),
        }
    }

    pub fn pending_count(&self) -> usize
    {
        self.pending.borrow().len()
    }

    /// Complete every outstanding evaluation with `result`.
    pub fn complete_all(&self, result: EvalResult)
    {
        let callbacks: Vec<EvalCallback> = self.pending.borrow_mut().drain(..).collect();
        for callback in callbacks {
            callback(result);
        }
    }
}

impl ExpressionEvaluator for PendingEvaluator
{
    fn evaluate(
        &self,
        _expression: &[u8],
        _provider: &dyn EvalDataProvider,
        on_complete: EvalCallback,
    ) -> EvalDisposition
    {
        self.pending.borrow_mut().push(on_complete);
        EvalDisposition::Pending
    }
}
