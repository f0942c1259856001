//! Address → symbolized location.

use smallvec::{smallvec, SmallVec};

use crate::module::{CompileUnit, DebugEntry, EntryKind, SymbolRef};
use crate::types::{Address, FileLine, Location, LocationSymbol, SymbolContext};

use super::input::{AmbiguousInlineMode, ResolveOptions};
use super::name::elf_display_name;
use super::ModuleSymbols;

/// Resolve an absolute address per the options: DWARF symbolization, then
/// the ELF nearest-symbol fallback, else a symbolized-no-match marker.
pub(crate) fn resolve_address(
    symbols: &ModuleSymbols<'_>,
    symbol_context: &SymbolContext,
    address: Address,
    options: &ResolveOptions,
) -> Vec<Location>
{
    if !options.symbolize {
        return vec![Location::address_only(address, *symbol_context)];
    }

    let relative = symbol_context.absolute_to_relative(address);
    if let Some(location) = symbolize_relative(symbols, symbol_context, relative, options) {
        return vec![location];
    }
    if let Some(location) = elf_fallback(symbols, symbol_context, relative, address) {
        return vec![location];
    }
    vec![Location::symbolized_no_match(address, *symbol_context)]
}

/// The chain of code scopes covering an address: the physical function
/// first, then inlined instances inward, innermost last.
pub(crate) fn code_chain_at(
    symbols: &ModuleSymbols<'_>,
    relative: u64,
) -> Option<(u32, SmallVec<[u32; 4]>)>
{
    let (unit_index, function_index) = physical_function_at(symbols, relative)?;
    let unit = symbols.info.unit(unit_index)?;
    let mut chain: SmallVec<[u32; 4]> = smallvec![function_index];
    descend_inlines(unit, function_index, relative, &mut chain);
    Some((unit_index, chain))
}

/// Full DWARF symbolization of a module-relative address.
pub(crate) fn symbolize_relative(
    symbols: &ModuleSymbols<'_>,
    symbol_context: &SymbolContext,
    relative: u64,
    options: &ResolveOptions,
) -> Option<Location>
{
    let (unit_index, chain) = code_chain_at(symbols, relative)?;
    let unit = symbols.info.unit(unit_index)?;

    // Ambiguous-inline handling: from the innermost covering scope, the
    // outer view walks outward while the address sits exactly at an inline's
    // first instruction, remembering the call site stepped across.
    let mut resolved_pos = chain.len() - 1;
    let mut call_site: Option<FileLine> = None;
    if options.ambiguous_inline == AmbiguousInlineMode::Outer {
        while resolved_pos > 0 {
            let entry = unit.entry(chain[resolved_pos])?;
            if entry.kind == EntryKind::InlinedFunction && entry.starts_at(relative) {
                call_site = entry.call_site.clone();
                resolved_pos -= 1;
            } else {
                break;
            }
        }
    }
    let resolved_index = chain[resolved_pos];
    let resolved_entry = unit.entry(resolved_index)?;
    let symbol = LocationSymbol::Function(make_ref(unit_index, resolved_index, resolved_entry));

    if call_site.is_some() && resolved_pos + 1 != chain.len() {
        // The outward step's call site is the source position; DWARF does
        // not record columns at call sites.
        let file_line = call_site.map(|mut fl| {
            fl.column = None;
            fl
        });
        return Some(Location::symbolized(
            symbol_context.relative_to_absolute(relative),
            *symbol_context,
            file_line.filter(|fl| !fl.is_generated()),
            symbol,
        ));
    }

    // Line-table path, optionally advancing past a non-inline prologue.
    let mut lookup_pc = relative;
    if options.skip_prologue && resolved_entry.kind == EntryKind::Function {
        if let Some(range) = resolved_entry.first_range() {
            let after_prologue = range.begin + prologue_size(unit, resolved_entry);
            if lookup_pc < after_prologue {
                lookup_pc = after_prologue;
            }
        }
    }

    let file_line = unit.line_table.row_for_address(lookup_pc).and_then(|row| {
        if row.line == 0 {
            // Compiler-generated code: the file is unresolved.
            return None;
        }
        let file = unit.files.get(row.file as usize)?.clone();
        let mut fl = FileLine::with_comp_dir(file, unit.comp_dir.clone(), row.line);
        if row.column > 0 {
            fl = fl.at_column(row.column);
        }
        Some(fl)
    });

    Some(Location::symbolized(
        symbol_context.relative_to_absolute(lookup_pc),
        *symbol_context,
        file_line,
        symbol,
    ))
}

/// Prologue size in bytes: distance from the function's first instruction to
/// the first line-table row whose line differs from the entry row's line,
/// clamped to the function's code range. No such row means no prologue.
pub(crate) fn prologue_size(unit: &CompileUnit, function: &DebugEntry) -> u64
{
    let Some(range) = function.first_range() else {
        return 0;
    };
    let mut entry_line: Option<u32> = None;
    for row in unit.line_table.rows() {
        if row.end_sequence || !range.contains(row.address) {
            continue;
        }
        match entry_line {
            None => entry_line = Some(row.line),
            Some(first) => {
                if row.line != first && row.line != 0 {
                    return row.address.min(range.end) - range.begin;
                }
            }
        }
    }
    0
}

/// The most specific (smallest) non-inline function covering the address.
fn physical_function_at(symbols: &ModuleSymbols<'_>, relative: u64) -> Option<(u32, u32)>
{
    let mut best: Option<(u32, u32, u64)> = None;
    for (unit_index, unit) in symbols.info.units.iter().enumerate() {
        for (entry_index, entry) in unit.entries.iter().enumerate() {
            if entry.kind != EntryKind::Function || !entry.covers(relative) {
                continue;
            }
            let size: u64 = entry.ranges.iter().map(|r| r.size()).sum();
            let candidate = (unit_index as u32, entry_index as u32, size);
            match best {
                Some((_, _, best_size)) if best_size <= size => {}
                _ => best = Some(candidate),
            }
        }
    }
    best.map(|(unit, entry, _)| (unit, entry))
}

/// Descend blocks and inlined instances, extending the chain with every
/// inline whose range covers the address. Blocks without their own ranges
/// inherit their parent's coverage.
fn descend_inlines(unit: &CompileUnit, entry_index: u32, relative: u64, chain: &mut SmallVec<[u32; 4]>)
{
    for (child_index, child) in unit.children_of(entry_index) {
        match child.kind {
            EntryKind::Block => {
                if child.covers(relative) {
                    descend_inlines(unit, child_index, relative, chain);
                    return;
                }
                if child.ranges.is_empty() {
                    // Range-less blocks inherit their parent's coverage; keep
                    // scanning siblings unless something inside matched.
                    let before = chain.len();
                    descend_inlines(unit, child_index, relative, chain);
                    if chain.len() != before {
                        return;
                    }
                }
            }
            EntryKind::InlinedFunction if child.covers(relative) => {
                chain.push(child_index);
                descend_inlines(unit, child_index, relative, chain);
                return;
            }
            _ => {}
        }
    }
}

fn elf_fallback(
    symbols: &ModuleSymbols<'_>,
    symbol_context: &SymbolContext,
    relative: u64,
    address: Address,
) -> Option<Location>
{
    let record = symbols.info.symbols.nearest_below(relative)?;
    Some(Location::symbolized(
        address,
        *symbol_context,
        None,
        LocationSymbol::Elf(elf_display_name(&record.name)),
    ))
}

fn make_ref(unit: u32, entry_index: u32, entry: &DebugEntry) -> SymbolRef
{
    if entry.is_declaration {
        SymbolRef::declaration(unit, entry_index)
    } else {
        SymbolRef::entry(unit, entry_index)
    }
}
