//! # Module debug info
//!
//! The in-memory contract with the (out-of-scope) debug-format reader.
//!
//! The reader parses raw debug sections and hands this core a [`ModuleInfo`]:
//! one [`CompileUnit`] per translation unit, each a flat vector of
//! [`DebugEntry`] nodes linked into a tree by index, plus a line table and the
//! module's raw ELF/PLT symbol maps. Everything is module-relative and
//! immutable once loaded; this core never touches the inspected process.

pub mod elf;
pub mod entry;
pub mod line_table;

pub use elf::{ElfSymbolRecord, ElfSymbols};
pub use entry::{DebugEntry, EntryId, EntryKind, RefKind, SymbolRef, TypeClass};
pub use line_table::{LineRow, LineTable};

use crate::error::{Result, SymbolError};

/// The debug-information group for one source file's compiled output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompileUnit
{
    /// Primary source path for the unit.
    pub name: String,
    /// Compilation directory recorded by the producer.
    pub comp_dir: String,
    /// File table referenced by line rows and declaration positions.
    pub files: Vec<String>,
    /// Entry tree as a flat vector; entry 0 is the unit root.
    pub entries: Vec<DebugEntry>,
    /// The unit's line program.
    pub line_table: LineTable,
}

impl CompileUnit
{
    pub fn entry(&self, index: u32) -> Option<&DebugEntry>
    {
        self.entries.get(index as usize)
    }

    /// Children of the given entry, in declaration order.
    pub fn children_of<'a>(&'a self, index: u32) -> impl Iterator<Item = (u32, &'a DebugEntry)>
    {
        self.entries
            .get(index as usize)
            .into_iter()
            .flat_map(move |entry| {
                entry
                    .children
                    .iter()
                    .filter_map(move |&child| self.entry(child).map(|e| (child, e)))
            })
    }
}

/// Everything this core knows about one loaded module.
///
/// Built once when the module's debug info is first needed, immutable
/// thereafter, and safe for unsynchronized concurrent reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleInfo
{
    pub units: Vec<CompileUnit>,
    pub symbols: ElfSymbols,
}

impl ModuleInfo
{
    pub fn new(units: Vec<CompileUnit>, symbols: ElfSymbols) -> Self
    {
        Self { units, symbols }
    }

    /// Structural validation, run once at module-load time.
    ///
    /// This is the only place malformed provider data surfaces as an error;
    /// every later lookup assumes these invariants and answers "no match"
    /// when something still looks off.
    pub fn validate(&self) -> Result<()>
    {
        for (unit_index, unit) in self.units.iter().enumerate() {
            let count = unit.entries.len() as u32;
            for (entry_index, entry) in unit.entries.iter().enumerate() {
                let at = |what: &str| {
                    format!("unit {unit_index} entry {entry_index} ({what})")
                };
                if let Some(parent) = entry.parent {
                    if parent >= count {
                        return Err(SymbolError::MalformedDebugInfo(at("parent out of bounds")));
                    }
                }
                for &child in &entry.children {
                    if child >= count {
                        return Err(SymbolError::MalformedDebugInfo(at("child out of bounds")));
                    }
                }
                for id in [entry.abstract_origin, entry.type_ref].into_iter().flatten() {
                    match id.unit {
                        Some(target_unit) => {
                            let Some(target) = self.units.get(target_unit as usize) else {
                                return Err(SymbolError::MalformedDebugInfo(at("link to missing unit")));
                            };
                            if id.entry as usize >= target.entries.len() {
                                return Err(SymbolError::MalformedDebugInfo(at("cross-unit link out of bounds")));
                            }
                        }
                        None => {
                            if id.entry >= count {
                                return Err(SymbolError::MalformedDebugInfo(at("link out of bounds")));
                            }
                        }
                    }
                }
            }
            for (row_index, row) in unit.line_table.rows().iter().enumerate() {
                if !row.end_sequence && row.file as usize >= unit.files.len() {
                    return Err(SymbolError::MalformedDebugInfo(format!(
                        "unit {unit_index} line row {row_index}: file index {} out of bounds",
                        row.file
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn unit(&self, index: u32) -> Option<&CompileUnit>
    {
        self.units.get(index as usize)
    }

    /// Entry named by a [`SymbolRef`]; `None` for null or dangling refs.
    pub fn entry(&self, symbol_ref: SymbolRef) -> Option<&DebugEntry>
    {
        if symbol_ref.is_null() {
            return None;
        }
        self.unit(symbol_ref.unit())?.entry(symbol_ref.entry_index())
    }

    /// Follow an [`EntryId`] link from `from_unit`, returning the target unit
    /// index and entry.
    pub fn resolve_link(&self, from_unit: u32, id: EntryId) -> Option<(u32, &DebugEntry)>
    {
        let unit_index = id.unit.unwrap_or(from_unit);
        let entry = self.unit(unit_index)?.entry(id.entry)?;
        Some((unit_index, entry))
    }

    /// Walk lexical parents from an entry toward the unit root.
    pub fn parent_chain<'a>(&'a self, unit_index: u32, entry_index: u32) -> ParentChain<'a>
    {
        ParentChain {
            unit: self.unit(unit_index),
            next: Some(entry_index),
        }
    }
}

/// Iterator over an entry's lexical parents, innermost first.
pub struct ParentChain<'a>
{
    unit: Option<&'a CompileUnit>,
    next: Option<u32>,
}

impl<'a> Iterator for ParentChain<'a>
{
    type Item = (u32, &'a DebugEntry);

    fn next(&mut self) -> Option<Self::Item>
    {
        let unit = self.unit?;
        let index = self.next?;
        let entry = unit.entry(index)?;
        self.next = entry.parent;
        Some((index, entry))
    }
}
