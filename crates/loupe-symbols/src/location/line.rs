//! (file, line) → addresses.

use std::collections::HashSet;

use crate::module::LineRow;
use crate::types::{FileLine, Location, LocationSymbol, SymbolContext};

use super::address::code_chain_at;
use super::input::ResolveOptions;
use super::ModuleSymbols;

struct Candidate
{
    unit: u32,
    row: LineRow,
    path: String,
}

/// Resolve a (file, line) pair to breakpoint addresses.
///
/// The file matches canonical paths on suffix boundaries. Within each unit
/// referencing a matched file, exact-line rows win; when the exact line does
/// not exist, the smallest line strictly greater than the request stands in
/// (never a lower line). Candidates are then grouped by the function or
/// inline instance they land in, keeping the first row per group, and only
/// the groups at the globally smallest resolved line survive.
pub(crate) fn resolve_line(
    symbols: &ModuleSymbols<'_>,
    symbol_context: &SymbolContext,
    target: &FileLine,
    options: &ResolveOptions,
) -> Vec<Location>
{
    let mut candidates: Vec<Candidate> = Vec::new();

    for path in symbols.index.find_file_matches(&target.file) {
        for &unit_index in symbols.index.units_for_file(path) {
            let Some(unit) = symbols.info.unit(unit_index) else {
                continue;
            };
            for (file_index, file) in unit.files.iter().enumerate() {
                if file != path {
                    continue;
                }
                let rows: Vec<&LineRow> =
                    unit.line_table.rows_for_file(file_index as u32).collect();

                let exact: Vec<&LineRow> = rows
                    .iter()
                    .copied()
                    .filter(|row| row.line == target.line)
                    .collect();
                let chosen: Vec<&LineRow> = if exact.is_empty() {
                    // Fall back to the closest following line, never a lower
                    // one; line 0 is generated code, not a real line.
                    let next_line = rows
                        .iter()
                        .filter(|row| row.line > target.line)
                        .map(|row| row.line)
                        .min();
                    match next_line {
                        Some(line) => rows
                            .iter()
                            .copied()
                            .filter(|row| row.line == line)
                            .collect(),
                        None => Vec::new(),
                    }
                } else {
                    exact
                };

                candidates.extend(chosen.into_iter().map(|row| Candidate {
                    unit: unit_index,
                    row: *row,
                    path: path.to_string(),
                }));
            }
        }
    }

    if candidates.is_empty() {
        return Vec::new();
    }

    // One row per resolved function identity, first occurrence wins.
    let mut seen: HashSet<Option<(u32, u32)>> = HashSet::new();
    let mut kept: Vec<&Candidate> = Vec::new();
    for candidate in &candidates {
        let identity = code_chain_at(symbols, candidate.row.address)
            .map(|(unit, chain)| (unit, chain.last().copied().unwrap_or(0)));
        if seen.insert(identity) {
            kept.push(candidate);
        }
    }

    // Only the groups at the globally smallest resolved line survive.
    let min_line = kept.iter().map(|c| c.row.line).min().unwrap_or(0);
    kept.retain(|c| c.row.line == min_line);

    kept.into_iter()
        .map(|candidate| to_location(symbols, symbol_context, candidate, options))
        .collect()
}

fn to_location(
    symbols: &ModuleSymbols<'_>,
    symbol_context: &SymbolContext,
    candidate: &Candidate,
    options: &ResolveOptions,
) -> Location
{
    let address = symbol_context.relative_to_absolute(candidate.row.address);
    if !options.symbolize {
        return Location::address_only(address, *symbol_context);
    }

    let comp_dir = symbols
        .info
        .unit(candidate.unit)
        .map(|u| u.comp_dir.clone())
        .unwrap_or_default();
    let mut file_line =
        FileLine::with_comp_dir(candidate.path.clone(), comp_dir, candidate.row.line);
    if candidate.row.column > 0 {
        file_line = file_line.at_column(candidate.row.column);
    }

    match code_chain_at(symbols, candidate.row.address) {
        Some((unit_index, chain)) => {
            let innermost = *chain.last().unwrap_or(&0);
            let symbol = symbols
                .info
                .unit(unit_index)
                .and_then(|u| u.entry(innermost))
                .map(|entry| {
                    if entry.is_declaration {
                        LocationSymbol::Function(crate::module::SymbolRef::declaration(unit_index, innermost))
                    } else {
                        LocationSymbol::Function(crate::module::SymbolRef::entry(unit_index, innermost))
                    }
                });
            match symbol {
                Some(symbol) => {
                    Location::symbolized(address, *symbol_context, Some(file_line), symbol)
                }
                None => Location::symbolized_no_match(address, *symbol_context),
            }
        }
        None => Location::symbolized_no_match(address, *symbol_context),
    }
}
