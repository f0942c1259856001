//! Object-member search through inheritance and anonymous aggregates.

use std::collections::HashSet;

use crate::identifier::{Identifier, SpecialName};
use crate::module::{DebugEntry, EntryKind, ModuleInfo, SymbolRef, TypeClass};

use super::context::ModuleContext;
use super::found::{FoundMember, FoundName, InheritanceHop, InheritancePath};
use super::options::{FindNameOptions, MatchKind};

/// Search a class/struct/union for a member by name.
///
/// Order per holder: direct members first, then anonymous aggregate members
/// flattened in place (C++ allows no further qualification for them), then
/// base classes depth-first in declaration order. Each hit records the hop
/// path from the static type to the defining class so the caller can compute
/// the member's byte offset later.
pub fn find_member(
    module: &ModuleContext<'_>,
    holder: SymbolRef,
    identifier: &Identifier,
    options: &FindNameOptions,
    object_ptr: Option<SymbolRef>,
    results: &mut Vec<FoundName>,
)
{
    let Some(wanted) = member_name(identifier) else {
        return;
    };
    let mut search = MemberSearch {
        info: module.info,
        wanted,
        options,
        object_ptr,
        visited: HashSet::new(),
    };
    let mut path = InheritancePath::new();
    search.visit(holder, &mut path, results);
}

/// Members are named by single-component relative plain names.
fn member_name(identifier: &Identifier) -> Option<&str>
{
    if identifier.qualification() != crate::identifier::Qualification::Relative {
        return None;
    }
    match identifier.components() {
        [only] if only.special_name() == SpecialName::None => Some(only.name()),
        _ => None,
    }
}

struct MemberSearch<'a>
{
    info: &'a ModuleInfo,
    wanted: &'a str,
    options: &'a FindNameOptions,
    object_ptr: Option<SymbolRef>,
    /// Guards against inheritance cycles in corrupt debug info; a cycle is
    /// treated as "no match", never an error.
    visited: HashSet<(u32, u32)>,
}

impl<'a> MemberSearch<'a>
{
    fn visit(&mut self, holder: SymbolRef, path: &mut InheritancePath, results: &mut Vec<FoundName>)
    {
        if holder.is_null() || !self.visited.insert((holder.unit(), holder.entry_index())) {
            return;
        }
        let unit_index = holder.unit();
        let Some(unit) = self.info.unit(unit_index) else {
            return;
        };
        let Some(holder_entry) = unit.entry(holder.entry_index()) else {
            return;
        };
        if !matches!(holder_entry.kind, EntryKind::Type(_)) {
            return;
        }

        // Direct members.
        for (child_index, child) in unit.children_of(holder.entry_index()) {
            if child.kind != EntryKind::Member || !self.name_matches(child) {
                continue;
            }
            results.push(FoundName::Member(FoundMember {
                object_ptr: self.object_ptr,
                path: path.clone(),
                member: make_ref(unit_index, child_index, child),
            }));
            if self.done(results) {
                return;
            }
        }

        // Anonymous aggregate members, searched as if flattened into the
        // holder. The hop keeps the aggregate's offset in the path.
        for (child_index, child) in unit.children_of(holder.entry_index()) {
            if child.kind != EntryKind::Member || !child.name.is_empty() {
                continue;
            }
            let Some(target) = self.aggregate_target(unit_index, child) else {
                continue;
            };
            path.push(InheritanceHop {
                base: make_ref(unit_index, child_index, child),
                offset: child.member_offset.unwrap_or(0),
            });
            self.visit(target, path, results);
            path.pop();
            if self.done(results) {
                return;
            }
        }

        // Base classes, in declaration order.
        for (_, child) in unit.children_of(holder.entry_index()) {
            if child.kind != EntryKind::Inheritance {
                continue;
            }
            let Some(type_ref) = child.type_ref else {
                continue;
            };
            let Some((base_unit, base_index, base)) = self.resolve_type(unit_index, type_ref) else {
                continue;
            };
            path.push(InheritanceHop {
                base: make_ref(base_unit, base_index, base),
                offset: child.member_offset.unwrap_or(0),
            });
            self.visit(make_ref(base_unit, base_index, base), path, results);
            path.pop();
            if self.done(results) {
                return;
            }
        }
    }

    fn name_matches(&self, entry: &DebugEntry) -> bool
    {
        match self.options.match_kind {
            MatchKind::Exact => entry.name == self.wanted,
            MatchKind::Prefix => entry.name.starts_with(self.wanted),
        }
    }

    fn done(&self, results: &[FoundName]) -> bool
    {
        results.len() >= self.options.max_results
    }

    /// The aggregate type an anonymous member flattens into, if its type is
    /// one this search can descend.
    fn aggregate_target(
        &self,
        unit_index: u32,
        member: &DebugEntry,
    ) -> Option<SymbolRef>
    {
        let type_ref = member.type_ref?;
        let (target_unit, target_index, target) = self.resolve_type(unit_index, type_ref)?;
        match target.kind {
            EntryKind::Type(TypeClass::Union)
            | EntryKind::Type(TypeClass::Struct)
            | EntryKind::Type(TypeClass::Class) => Some(make_ref(target_unit, target_index, target)),
            _ => None,
        }
    }

    fn resolve_type(
        &self,
        from_unit: u32,
        id: crate::module::EntryId,
    ) -> Option<(u32, u32, &'a DebugEntry)>
    {
        let unit_index = id.unit.unwrap_or(from_unit);
        let entry = self.info.unit(unit_index)?.entry(id.entry)?;
        Some((unit_index, id.entry, entry))
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
