//! Local-variable and parameter search.

use crate::identifier::{Identifier, SpecialName};
use crate::module::{DebugEntry, EntryKind, SymbolRef};

use super::context::ModuleContext;
use super::found::FoundName;
use super::options::{FindNameOptions, MatchKind};

/// Walk the block-nesting chain outward from `block`, checking parameters
/// (function scopes only) then locals at each level. The closest scope wins;
/// disjoint sibling scopes never leak into each other because only the
/// parent chain of the starting block is visited.
pub(crate) fn find_local(
    module: &ModuleContext<'_>,
    block: SymbolRef,
    identifier: &Identifier,
    options: &FindNameOptions,
    results: &mut Vec<FoundName>,
)
{
    let Some(wanted) = local_name(identifier) else {
        return;
    };

    let unit_index = block.unit();
    for (scope_index, scope) in module.info.parent_chain(unit_index, block.entry_index()) {
        if !scope.kind.is_lexical_scope() {
            if scope.kind == EntryKind::Root {
                break;
            }
            continue;
        }

        let function_scope = scope.kind.is_function_scope();
        let mut matched_here = false;

        if function_scope {
            matched_here |= match_children(
                module, unit_index, scope_index, EntryKind::Parameter, wanted, options, results,
            );
        }
        if results.len() < options.max_results {
            matched_here |= match_children(
                module, unit_index, scope_index, EntryKind::Variable, wanted, options, results,
            );
        }

        // An exact hit in a closer scope shadows everything further out.
        if matched_here && options.match_kind == MatchKind::Exact {
            return;
        }
        if results.len() >= options.max_results {
            return;
        }
        // Locals stop at the innermost function; enclosing functions'
        // locals are not in scope for inlined code.
        if function_scope {
            break;
        }
    }
}

/// Single-component relative plain names are the only shapes that can name a
/// local.
fn local_name(identifier: &Identifier) -> Option<&str>
{
    if identifier.qualification() != crate::identifier::Qualification::Relative {
        return None;
    }
    match identifier.components() {
        [only] if only.special_name() == SpecialName::None && !only.has_template_args() => {
            Some(only.name())
        }
        _ => None,
    }
}

fn match_children(
    module: &ModuleContext<'_>,
    unit_index: u32,
    scope_index: u32,
    kind: EntryKind,
    wanted: &str,
    options: &FindNameOptions,
    results: &mut Vec<FoundName>,
) -> bool
{
    let Some(unit) = module.info.unit(unit_index) else {
        return false;
    };
    let mut matched = false;
    for (child_index, child) in unit.children_of(scope_index) {
        if child.kind != kind || !name_matches(child, wanted, options.match_kind) {
            continue;
        }
        results.push(FoundName::Variable(make_ref(unit_index, child_index, child)));
        matched = true;
        if results.len() >= options.max_results || options.match_kind == MatchKind::Exact {
            break;
        }
    }
    matched
}

fn name_matches(entry: &DebugEntry, wanted: &str, match_kind: MatchKind) -> bool
{
    match match_kind {
        MatchKind::Exact => entry.name == wanted,
        MatchKind::Prefix => entry.name.starts_with(wanted),
    }
}

fn make_ref(unit: u32, entry_index: u32, entry: &DebugEntry) -> SymbolRef
{
    if entry.is_declaration {
        SymbolRef::declaration(unit, entry_index)
    } else {
        SymbolRef::entry(unit, entry_index)
    }
}
