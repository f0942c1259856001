//! # Name resolution
//!
//! Scoped search for a possibly-qualified name, the way a language expects
//! it: local variables and parameters first, then members of the current
//! object (through base classes and anonymous aggregates), then the indexed
//! global scopes walking outward from the current namespace, then every
//! other loaded module. Each stage stops as soon as the caller's match set
//! is sufficient.
//!
//! "Not found" is a normal outcome: every path through here returns an empty
//! result set rather than an error. Names this engine cannot answer at all
//! (CPU registers) and names answered by the raw module symbol table
//! (`$main`, `$plt(...)`, `$elf(...)`) short-circuit before the index is
//! touched.

mod context;
mod found;
mod index_walk;
mod local;
mod member;
mod options;

pub use context::{FindNameContext, ModuleContext};
pub use found::{FoundMember, FoundName, InheritanceHop, InheritancePath};
pub use member::find_member;
pub use options::{FindNameOptions, MatchKind, ScopeSearch};

use tracing::trace;

use crate::identifier::{Identifier, IdentifierComponent, Qualification, SpecialName};
use crate::module::{DebugEntry, EntryKind, ModuleInfo, SymbolRef};

/// Resolve a name against a lexical context.
///
/// Results are ordered closest-scope-first. The search never errors; an
/// unresolvable or unsupported name yields an empty vector.
pub fn find_name(
    context: &FindNameContext<'_>,
    identifier: &Identifier,
    options: &FindNameOptions,
) -> Vec<FoundName>
{
    let mut results = Vec::new();

    // Registers are not indexed; there is nothing this engine can say.
    if identifier.has_register_component() {
        return results;
    }

    // Module-symbol-only markers bypass the index entirely.
    if let Some(marker) = identifier.as_module_symbol_marker() {
        find_module_symbol(context, marker, options, &mut results);
        return results;
    }

    if options.find_variables {
        // 1. Locals and parameters, innermost block outward.
        if let (Some(module), Some(block)) = (context.module, context.block) {
            local::find_local(module, block, identifier, options, &mut results);
            if sufficient(options, &results) {
                return results;
            }
        }

        // 2. Members of the current object, bases in declaration order.
        if let (Some(module), Some(object_ptr)) = (context.module, context.object_ptr) {
            if let Some(holder) = pointed_to_type(module, object_ptr) {
                member::find_member(module, holder, identifier, options, Some(object_ptr), &mut results);
                if sufficient(options, &results) {
                    return results;
                }
            }
        }
    }

    // 3. The current module's index, walking scopes outward.
    if let Some(module) = context.module {
        let looking_from = enclosing_scope(module, context.block);
        index_walk::find_indexed_name(module, &looking_from, identifier, options, &mut results);
        if sufficient(options, &results) {
            return results;
        }
    }

    // 4. Every other loaded module; the originating module is not repeated.
    let current = context.module.map(|m| m.info as *const ModuleInfo);
    for other in context.other_modules {
        if Some(other.info as *const ModuleInfo) == current {
            continue;
        }
        index_walk::find_indexed_name(other, &Identifier::empty(), identifier, options, &mut results);
        if sufficient(options, &results) {
            return results;
        }
    }

    results
}

/// Whether a search stage may stop: the result cap is reached, or an exact
/// search already has its first (closest-scope) match set.
fn sufficient(options: &FindNameOptions, results: &[FoundName]) -> bool
{
    if results.len() >= options.max_results {
        return true;
    }
    options.match_kind == MatchKind::Exact && !results.is_empty()
}

/// Resolve `$main` / `$plt(x)` / `$elf(x)` against the module symbol tables.
fn find_module_symbol(
    context: &FindNameContext<'_>,
    marker: &IdentifierComponent,
    options: &FindNameOptions,
    results: &mut Vec<FoundName>,
)
{
    let Some(module) = context.module else {
        return;
    };

    match marker.special_name() {
        SpecialName::Main => {
            let flagged = module.index.main_functions();
            if !flagged.is_empty() {
                for &symbol_ref in flagged {
                    results.push(FoundName::Function(symbol_ref));
                    if results.len() >= options.max_results {
                        break;
                    }
                }
                return;
            }
            // No compiler annotation anywhere; fall back to the literal name.
            trace!("no entry-point annotation, falling back to a literal `main`");
            let fallback = FindNameOptions {
                find_types: false,
                find_type_defs_only: false,
                find_templates: false,
                find_namespaces: false,
                find_variables: false,
                ..*options
            };
            index_walk::find_indexed_name(
                module,
                &Identifier::empty(),
                &Identifier::parse("main"),
                &fallback,
                results,
            );
        }
        SpecialName::Plt => {
            if let Some(relative_address) = module.info.symbols.plt_address(marker.name()) {
                results.push(FoundName::ElfSymbol {
                    name: format!("{}@plt", marker.name()),
                    relative_address,
                });
            }
        }
        SpecialName::Elf => {
            if let Some(record) = module.info.symbols.get(marker.name()) {
                results.push(FoundName::ElfSymbol {
                    name: record.name.clone(),
                    relative_address: record.relative_address,
                });
            }
        }
        _ => {}
    }
}

/// The class the current object-pointer points at, chasing a forward
/// declaration to its definition through the index. A type with no concrete
/// definition anywhere is treated as "no match".
fn pointed_to_type(module: &ModuleContext<'_>, object_ptr: SymbolRef) -> Option<SymbolRef>
{
    let pointer = module.info.entry(object_ptr)?;
    let id = pointer.type_ref?;
    let unit_index = id.unit.unwrap_or(object_ptr.unit());
    let target = module.info.unit(unit_index)?.entry(id.entry)?;
    if !matches!(target.kind, EntryKind::Type(_)) {
        return None;
    }
    if !target.is_declaration {
        return Some(SymbolRef::entry(unit_index, id.entry));
    }

    let name = qualified_identifier(module.info, unit_index, id.entry)?;
    module
        .index
        .find_exact(&name)
        .into_iter()
        .find(|candidate| {
            !candidate.is_declaration()
                && module
                    .info
                    .entry(*candidate)
                    .map(|e| matches!(e.kind, EntryKind::Type(_)))
                    .unwrap_or(false)
        })
}

/// Qualified scope of the function enclosing `block`, for the outward
/// namespace walk. Concrete instances take their scope from the abstract
/// origin's lexical position.
fn enclosing_scope(module: &ModuleContext<'_>, block: Option<SymbolRef>) -> Identifier
{
    let Some(block) = block else {
        return Identifier::empty();
    };
    let unit_index = block.unit();

    let mut function: Option<(u32, &DebugEntry)> = None;
    for (index, entry) in module.info.parent_chain(unit_index, block.entry_index()) {
        if entry.kind.is_function_scope() {
            function = Some((index, entry));
            break;
        }
    }
    let Some((_, function_entry)) = function else {
        return Identifier::empty();
    };

    let (scope_unit, scope_parent) = match function_entry.abstract_origin {
        Some(id) => {
            let origin_unit = id.unit.unwrap_or(unit_index);
            let Some(origin) = module.info.unit(origin_unit).and_then(|u| u.entry(id.entry)) else {
                return Identifier::empty();
            };
            (origin_unit, origin.parent)
        }
        None => (unit_index, function_entry.parent),
    };

    scope_identifier(module.info, scope_unit, scope_parent)
}

/// Identifier for the Namespace/Type chain above an entry, outermost first.
fn scope_identifier(info: &ModuleInfo, unit_index: u32, from: Option<u32>) -> Identifier
{
    let mut components = Vec::new();
    if let Some(start) = from {
        for (_, ancestor) in info.parent_chain(unit_index, start) {
            match ancestor.kind {
                EntryKind::Namespace | EntryKind::Type(_) => {
                    components.push(entry_component(ancestor));
                }
                EntryKind::Root => break,
                _ => {}
            }
        }
    }
    components.reverse();
    Identifier::new(Qualification::Relative, components)
}

/// Fully qualified identifier for an entry, used to chase declarations.
fn qualified_identifier(info: &ModuleInfo, unit_index: u32, entry_index: u32) -> Option<Identifier>
{
    let entry = info.unit(unit_index)?.entry(entry_index)?;
    let mut identifier = scope_identifier(info, unit_index, entry.parent);
    identifier.push(entry_component(entry));
    Some(identifier)
}

fn entry_component(entry: &DebugEntry) -> IdentifierComponent
{
    if entry.kind == EntryKind::Namespace && entry.name.is_empty() {
        return IdentifierComponent::special(SpecialName::AnonymousNamespace, "");
    }
    match &entry.template_args {
        Some(args) => IdentifierComponent::with_template_args(entry.name.clone(), args.clone()),
        None => IdentifierComponent::new(entry.name.clone()),
    }
}
