//! Name → locations.

use rustc_demangle::try_demangle;
use tracing::trace;

use crate::eval::{EvalDisposition, EvalResult, NullDataProvider};
use crate::identifier::{Identifier, SpecialName};
use crate::module::{EntryKind, SymbolRef};
use crate::types::{Location, LocationSymbol, SymbolContext};

use super::address::symbolize_relative;
use super::input::ResolveOptions;
use super::ModuleSymbols;

/// Resolve a name input to locations: special markers against the raw
/// symbol tables, everything else through the index.
pub(crate) fn resolve_name(
    symbols: &ModuleSymbols<'_>,
    symbol_context: &SymbolContext,
    identifier: &Identifier,
    options: &ResolveOptions,
) -> Vec<Location>
{
    let mut out = Vec::new();
    if identifier.has_register_component() {
        return out;
    }

    if let Some(marker) = identifier.as_module_symbol_marker() {
        match marker.special_name() {
            SpecialName::Plt => {
                if let Some(relative) = symbols.info.symbols.plt_address(marker.name()) {
                    out.push(Location::symbolized(
                        symbol_context.relative_to_absolute(relative),
                        *symbol_context,
                        None,
                        LocationSymbol::Elf(format!("{}@plt", marker.name())),
                    ));
                }
            }
            SpecialName::Elf => {
                if let Some(record) = symbols.info.symbols.get(marker.name()) {
                    out.push(Location::symbolized(
                        symbol_context.relative_to_absolute(record.relative_address),
                        *symbol_context,
                        None,
                        LocationSymbol::Elf(elf_display_name(&record.name)),
                    ));
                }
            }
            SpecialName::Main => {
                let flagged = symbols.index.main_functions();
                let refs: Vec<SymbolRef> = if flagged.is_empty() {
                    // Nothing was annotated; a function literally named
                    // "main" is the next best answer.
                    symbols.index.find_exact(&Identifier::parse("main"))
                } else {
                    flagged.to_vec()
                };
                for symbol_ref in refs {
                    if let Some(location) =
                        function_location(symbols, symbol_context, symbol_ref, options)
                    {
                        out.push(location);
                    }
                }
            }
            _ => {}
        }
        return out;
    }

    for symbol_ref in symbols.index.find_exact(identifier) {
        let Some(entry) = symbols.info.entry(symbol_ref) else {
            continue;
        };
        match entry.kind {
            EntryKind::Function => {
                if let Some(location) =
                    function_location(symbols, symbol_context, symbol_ref, options)
                {
                    out.push(location);
                }
            }
            EntryKind::Variable => {
                out.push(variable_location(symbols, symbol_context, symbol_ref));
            }
            _ => {
                // Types and namespaces have no code address.
            }
        }
    }
    out
}

/// A function's breakpoint location: the start of its first code range,
/// optionally fully symbolized (which also applies prologue skipping).
pub(crate) fn function_location(
    symbols: &ModuleSymbols<'_>,
    symbol_context: &SymbolContext,
    symbol_ref: SymbolRef,
    options: &ResolveOptions,
) -> Option<Location>
{
    let entry = symbols.info.entry(symbol_ref)?;
    let range = entry.first_range()?;
    if !options.symbolize {
        return Some(Location::address_only(
            symbol_context.relative_to_absolute(range.begin),
            *symbol_context,
        ));
    }
    match symbolize_relative(symbols, symbol_context, range.begin, options) {
        Some(location) => Some(location),
        None => Some(Location::symbolized(
            symbol_context.relative_to_absolute(range.begin),
            *symbol_context,
            None,
            LocationSymbol::Function(symbol_ref),
        )),
    }
}

/// A global/static variable's address.
///
/// The location expression is evaluated against a provider with no runtime
/// state at all: a global's address must not depend on live CPU state. Only
/// a synchronously-successful evaluation yielding a direct address counts;
/// everything else (thread-local, register-relative, asynchronous) degrades
/// to an unlocated result that still carries the variable for display.
fn variable_location(
    symbols: &ModuleSymbols<'_>,
    symbol_context: &SymbolContext,
    symbol_ref: SymbolRef,
) -> Location
{
    let unlocated = || Location::unlocated(*symbol_context, LocationSymbol::Variable(symbol_ref));

    let Some(entry) = symbols.info.entry(symbol_ref) else {
        return unlocated();
    };
    let Some(expression) = entry.location.as_ref().and_then(|l| l.static_expression()) else {
        return unlocated();
    };

    let disposition = symbols.evaluator.evaluate(
        expression,
        &NullDataProvider,
        Box::new(|_| {
            // An evaluation that went asynchronous is already rejected; the
            // eventual result is discarded.
        }),
    );
    match disposition {
        EvalDisposition::Complete(EvalResult::Address(relative)) => Location::symbolized(
            symbol_context.relative_to_absolute(relative),
            *symbol_context,
            entry.decl.clone(),
            LocationSymbol::Variable(symbol_ref),
        ),
        EvalDisposition::Complete(_) | EvalDisposition::Pending => {
            trace!(name = %entry.name, "variable location not statically evaluable");
            unlocated()
        }
    }
}

/// Demangled display form of a raw ELF symbol name.
pub(crate) fn elf_display_name(raw: &str) -> String
{
    match try_demangle(raw) {
        Ok(demangled) => demangled.to_string(),
        Err(_) => raw.to_string(),
    }
}
