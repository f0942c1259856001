//! Indexed (global) name search.

use crate::identifier::{Identifier, IdentifierComponent, Qualification};
use crate::index::{IndexChildKind, IndexNode};
use crate::module::SymbolRef;

use super::context::ModuleContext;
use super::found::FoundName;
use super::options::{FindNameOptions, MatchKind, ScopeSearch};

/// Search the module's index for an identifier, ranging per the options:
/// outward from `looking_from` one namespace level at a time, just that
/// level, or every namespace recursively. Globally-qualified identifiers
/// skip levels and search only the global scope.
pub(crate) fn find_indexed_name(
    module: &ModuleContext<'_>,
    looking_from: &Identifier,
    identifier: &Identifier,
    options: &FindNameOptions,
    results: &mut Vec<FoundName>,
)
{
    if identifier.components().is_empty() {
        return;
    }

    if options.scope_search == ScopeSearch::AllNamespaces {
        let scope = Identifier::empty();
        visit_all_namespaces(module.index.root(), &scope, identifier, options, results);
        return;
    }

    let mut levels: Vec<Identifier> = Vec::new();
    if identifier.qualification() == Qualification::Global {
        levels.push(Identifier::empty());
    } else {
        let mut level = looking_from.clone();
        loop {
            levels.push(level.clone());
            if level.components().is_empty() {
                break;
            }
            level = level.scope();
        }
        if options.scope_search == ScopeSearch::ThisScope {
            levels.truncate(1);
        }
    }

    for level in levels {
        for node in module.index.find_nodes_exact(&level) {
            search_in_node(node, &level, identifier, options, results);
        }
        if sufficient(options, results) {
            return;
        }
    }
}

fn visit_all_namespaces(
    node: &IndexNode,
    scope: &Identifier,
    identifier: &Identifier,
    options: &FindNameOptions,
    results: &mut Vec<FoundName>,
)
{
    search_in_node(node, scope, identifier, options, results);
    if sufficient(options, results) {
        return;
    }
    for (name, child) in node.children(IndexChildKind::Namespace) {
        let child_scope = scope.child(IdentifierComponent::new(name.clone()));
        visit_all_namespaces(child, &child_scope, identifier, options, results);
        if sufficient(options, results) {
            return;
        }
    }
}

/// Match the identifier's final component inside one scope node, after
/// descending its intermediate scope components.
fn search_in_node(
    level_node: &IndexNode,
    level: &Identifier,
    identifier: &Identifier,
    options: &FindNameOptions,
    results: &mut Vec<FoundName>,
)
{
    let components = identifier.components();
    let Some((last, scope_components)) = components.split_last() else {
        return;
    };

    // Descend the identifier's own scope (namespaces and types can nest).
    let mut nodes = vec![level_node];
    let mut full_scope = level.clone();
    for component in scope_components {
        let key = component.canonical_name();
        let mut next = Vec::new();
        for node in nodes {
            for kind in [IndexChildKind::Namespace, IndexChildKind::Type] {
                if let Some(child) = node.child(kind, &key) {
                    next.push(child);
                }
            }
        }
        if next.is_empty() {
            return;
        }
        nodes = next;
        full_scope.push(component.clone());
    }

    let key = last.canonical_name();
    let mut found_any = false;
    for node in &nodes {
        match options.match_kind {
            MatchKind::Exact => {
                for kind in IndexChildKind::ALL {
                    if !kind_requested(options, kind) {
                        continue;
                    }
                    if let Some(child) = node.child(kind, &key) {
                        found_any |= push_matches(kind, &key, child, &full_scope, options, results);
                        if sufficient(options, results) {
                            return;
                        }
                    }
                }
            }
            MatchKind::Prefix => {
                for kind in IndexChildKind::ALL {
                    if !kind_requested(options, kind) {
                        continue;
                    }
                    for (name, child) in node.children_with_prefix(kind, &key) {
                        found_any |= push_matches(kind, name, child, &full_scope, options, results);
                        if sufficient(options, results) {
                            return;
                        }
                    }
                }
            }
        }
    }

    // Targeted template existence probe: only when an exact search for the
    // bare name came up empty and the caller cares about templates.
    if !found_any
        && options.match_kind == MatchKind::Exact
        && options.find_templates
        && !last.has_template_args()
    {
        let probe = format!("{key}<");
        for node in &nodes {
            for kind in [IndexChildKind::Type, IndexChildKind::Function] {
                if node.children_with_prefix(kind, &probe).next().is_some() {
                    let full = full_scope.child(IdentifierComponent::new(key.clone()));
                    results.push(FoundName::Template(full));
                    return;
                }
            }
        }
    }
}

fn kind_requested(options: &FindNameOptions, kind: IndexChildKind) -> bool
{
    match kind {
        IndexChildKind::Namespace => options.find_namespaces,
        IndexChildKind::Type => options.find_types || options.find_type_defs_only,
        IndexChildKind::Function => options.find_functions,
        IndexChildKind::Variable => options.find_variables,
    }
}

/// Convert one matched node into results. Returns whether anything matched.
fn push_matches(
    kind: IndexChildKind,
    name: &str,
    node: &IndexNode,
    scope: &Identifier,
    options: &FindNameOptions,
    results: &mut Vec<FoundName>,
) -> bool
{
    match kind {
        IndexChildKind::Namespace => {
            let full = scope.child(IdentifierComponent::new(name.to_string()));
            results.push(FoundName::Namespace(full));
            true
        }
        IndexChildKind::Type => {
            let mut matched = false;
            for &symbol_ref in node.refs() {
                if options.find_type_defs_only && symbol_ref.is_declaration() {
                    continue;
                }
                results.push(FoundName::Type(symbol_ref));
                matched = true;
                if results.len() >= options.max_results {
                    break;
                }
            }
            matched
        }
        IndexChildKind::Function => push_refs(node, results, options, FoundName::Function),
        IndexChildKind::Variable => push_refs(node, results, options, FoundName::Variable),
    }
}

fn push_refs(
    node: &IndexNode,
    results: &mut Vec<FoundName>,
    options: &FindNameOptions,
    wrap: fn(SymbolRef) -> FoundName,
) -> bool
{
    let mut matched = false;
    for &symbol_ref in node.refs() {
        results.push(wrap(symbol_ref));
        matched = true;
        if results.len() >= options.max_results {
            break;
        }
    }
    matched
}

fn sufficient(options: &FindNameOptions, results: &[FoundName]) -> bool
{
    results.len() >= options.max_results
}
