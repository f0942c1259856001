//! # Symbol index
//!
//! A compressed tree over one module's debug entries, built once at module
//! load and immutable thereafter.
//!
//! Each level of the tree is one scope component (`my_ns` → `Container<int>`
//! → `size`), with four independent child maps per node so same-named
//! entities of different kinds never collide. The index stores only
//! [`SymbolRef`]s — cheap (unit, entry) references back into the module's
//! debug-entry vectors — never copies of the entries themselves.
//!
//! Two build modes exist because of cross-unit abstract origins (an inlined
//! instance whose defining function lives in a different compile unit): the
//! fast single pass resolves every origin locally and aborts the moment it
//! sees a cross-unit link; the slow mode scans everything first and resolves
//! deferred instances in a second pass. Both produce bit-identical trees,
//! which is a guarded regression property.

mod node;

pub use node::{IndexChildKind, IndexNode, IndexNodeKind};

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};

use crate::identifier::Identifier;
use crate::module::{CompileUnit, DebugEntry, EntryKind, ModuleInfo, SymbolRef};

/// The per-module symbol index.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolIndex
{
    root: IndexNode,
    /// Canonical file path → compile units referencing it.
    files: BTreeMap<String, Vec<u32>>,
    /// Bare file name → canonical paths carrying that name.
    file_names: HashMap<String, Vec<String>>,
    /// Functions the compiler flagged as the program entry point.
    main_functions: Vec<SymbolRef>,
}

impl Default for SymbolIndex
{
    fn default() -> Self
    {
        Self {
            root: IndexNode::new(IndexNodeKind::Root),
            files: BTreeMap::new(),
            file_names: HashMap::new(),
            main_functions: Vec::new(),
        }
    }
}

impl SymbolIndex
{
    /// Build the index, auto-selecting the build mode: the fast single pass
    /// unless a cross-unit abstract origin forces the two-pass mode.
    pub fn build(module: &ModuleInfo) -> Self
    {
        if let Some(index) = Builder::new(module, false).run() {
            return index;
        }
        trace!("cross-unit abstract origin detected, rebuilding with two-pass mode");
        Self::build_two_pass(module)
    }

    /// Build with the two-pass mode unconditionally. Produces a tree
    /// bit-identical to the fast mode's whenever both complete.
    pub fn build_two_pass(module: &ModuleInfo) -> Self
    {
        Builder::new(module, true).run().unwrap_or_default()
    }

    /// The root node (the global scope).
    pub fn root(&self) -> &IndexNode
    {
        &self.root
    }

    /// Entry references the compiler flagged as the program entry point.
    pub fn main_functions(&self) -> &[SymbolRef]
    {
        &self.main_functions
    }

    /// All refs stored at the nodes an identifier names exactly.
    pub fn find_exact(&self, identifier: &Identifier) -> Vec<SymbolRef>
    {
        self.find_nodes_exact(identifier)
            .into_iter()
            .flat_map(|node| node.refs().iter().copied())
            .collect()
    }

    /// The index nodes an identifier names exactly.
    ///
    /// Intermediate components descend through namespaces and types (the two
    /// kinds that can contain children); the final component is looked up in
    /// all four child maps. The empty identifier and the bare global
    /// qualifier both name the root.
    pub fn find_nodes_exact(&self, identifier: &Identifier) -> Vec<&IndexNode>
    {
        let components = identifier.components();
        let mut current: Vec<&IndexNode> = vec![&self.root];
        for (position, component) in components.iter().enumerate() {
            let key = component.canonical_name();
            let last = position + 1 == components.len();
            let mut next = Vec::new();
            for node in current {
                if last {
                    for kind in IndexChildKind::ALL {
                        if let Some(child) = node.child(kind, &key) {
                            next.push(child);
                        }
                    }
                } else {
                    for kind in [IndexChildKind::Namespace, IndexChildKind::Type] {
                        if let Some(child) = node.child(kind, &key) {
                            next.push(child);
                        }
                    }
                }
            }
            if next.is_empty() {
                return Vec::new();
            }
            current = next;
        }
        current
    }

    /// Canonical paths whose tail matches `name` on a path-component
    /// boundary: either the whole path, or a suffix immediately preceded by a
    /// separator. `a/b.cc` matches `src/a/b.cc` but never `xa/b.cc`.
    pub fn find_file_matches(&self, name: &str) -> Vec<&str>
    {
        if name.is_empty() {
            return Vec::new();
        }
        self.files
            .keys()
            .filter(|path| path_suffix_matches(path, name))
            .map(String::as_str)
            .collect()
    }

    /// Canonical paths whose bare file name starts with `prefix`. Directory
    /// components are not matched by prefix.
    pub fn find_file_prefixes(&self, prefix: &str) -> Vec<&str>
    {
        let mut out: Vec<&str> = self
            .file_names
            .iter()
            .filter(|(bare, _)| bare.starts_with(prefix))
            .flat_map(|(_, paths)| paths.iter().map(String::as_str))
            .collect();
        out.sort_unstable();
        out
    }

    /// Compile units referencing a canonical file path.
    pub fn units_for_file(&self, path: &str) -> &[u32]
    {
        self.files.get(path).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Suffix match on path-component boundaries only.
fn path_suffix_matches(path: &str, name: &str) -> bool
{
    if path == name {
        return true;
    }
    if !path.ends_with(name) {
        return false;
    }
    path.as_bytes()[path.len() - name.len() - 1] == b'/'
}

/// One scope step on the way to an insertion point.
struct PathSeg
{
    kind: IndexChildKind,
    key: String,
}

struct Builder<'a>
{
    module: &'a ModuleInfo,
    two_pass: bool,
    root: IndexNode,
    main_functions: Vec<SymbolRef>,
    /// Cross-unit instances waiting for the second pass: (unit, entry).
    deferred: Vec<(u32, u32)>,
}

impl<'a> Builder<'a>
{
    fn new(module: &'a ModuleInfo, two_pass: bool) -> Self
    {
        Self {
            module,
            two_pass,
            root: IndexNode::new(IndexNodeKind::Root),
            main_functions: Vec::new(),
            deferred: Vec::new(),
        }
    }

    /// Walk every unit; `None` means the fast mode hit a cross-unit link.
    fn run(mut self) -> Option<SymbolIndex>
    {
        let module = self.module;
        for (unit_index, unit) in module.units.iter().enumerate() {
            let mut path = Vec::new();
            if !self.walk_entry(unit, unit_index as u32, 0, &mut path, false) {
                return None;
            }
        }
        self.resolve_deferred();
        Some(self.finish())
    }

    fn finish(self) -> SymbolIndex
    {
        let mut files: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        for (unit_index, unit) in self.module.units.iter().enumerate() {
            for file in &unit.files {
                let units = files.entry(file.clone()).or_default();
                if !units.contains(&(unit_index as u32)) {
                    units.push(unit_index as u32);
                }
            }
        }

        let mut file_names: HashMap<String, Vec<String>> = HashMap::new();
        for path in files.keys() {
            let bare = path.rsplit('/').next().unwrap_or(path.as_str());
            file_names.entry(bare.to_string()).or_default().push(path.clone());
        }

        debug!(
            units = self.module.units.len(),
            files = files.len(),
            main_functions = self.main_functions.len(),
            two_pass = self.two_pass,
            "built symbol index"
        );

        SymbolIndex {
            root: self.root,
            files,
            file_names,
            main_functions: self.main_functions,
        }
    }

    /// Returns false only on a fast-mode cross-unit abort.
    fn walk_entry(
        &mut self,
        unit: &CompileUnit,
        unit_index: u32,
        entry_index: u32,
        path: &mut Vec<PathSeg>,
        inside_function: bool,
    ) -> bool
    {
        let Some(entry) = unit.entry(entry_index) else {
            return true;
        };

        match entry.kind {
            EntryKind::Root => self.walk_children(unit, unit_index, entry, path, false),
            EntryKind::Namespace => {
                if inside_function {
                    return true;
                }
                let key = namespace_key(entry);
                self.insert_path(path, IndexChildKind::Namespace, &key);
                path.push(PathSeg {
                    kind: IndexChildKind::Namespace,
                    key,
                });
                let ok = self.walk_children(unit, unit_index, entry, path, false);
                path.pop();
                ok
            }
            EntryKind::Type(_) => {
                if inside_function {
                    // Function-local types are not addressable by qualified
                    // name; their layout is reached through variable types.
                    return true;
                }
                let Some(key) = entry_key(entry) else {
                    return true;
                };
                let node = self.insert_path(path, IndexChildKind::Type, &key);
                node.add_ref(make_ref(unit_index, entry_index, entry));
                path.push(PathSeg {
                    kind: IndexChildKind::Type,
                    key,
                });
                let ok = self.walk_children(unit, unit_index, entry, path, false);
                path.pop();
                ok
            }
            EntryKind::Function | EntryKind::InlinedFunction => {
                let indexable = !inside_function || entry.kind == EntryKind::InlinedFunction;
                if indexable {
                    match entry.abstract_origin {
                        Some(id) if id.is_cross_unit() => {
                            if !self.two_pass {
                                return false;
                            }
                            self.deferred.push((unit_index, entry_index));
                        }
                        Some(id) => {
                            self.index_via_origin(unit_index, entry_index, entry, unit_index, id.entry);
                        }
                        None => {
                            if let Some(key) = entry_key(entry) {
                                let node = self.insert_path(path, IndexChildKind::Function, &key);
                                node.add_ref(make_ref(unit_index, entry_index, entry));
                            }
                        }
                    }
                    if entry.is_main {
                        self.main_functions.push(make_ref(unit_index, entry_index, entry));
                    }
                }
                // Function bodies still carry inlined instances.
                self.walk_children(unit, unit_index, entry, path, true)
            }
            EntryKind::Block => self.walk_children(unit, unit_index, entry, path, true),
            EntryKind::Variable => {
                if inside_function {
                    // Locals are found by the block walk, never globally.
                    return true;
                }
                if let Some(key) = entry_key(entry) {
                    let node = self.insert_path(path, IndexChildKind::Variable, &key);
                    node.add_ref(make_ref(unit_index, entry_index, entry));
                }
                true
            }
            EntryKind::Parameter
            | EntryKind::Member
            | EntryKind::Inheritance
            | EntryKind::Other => true,
        }
    }

    fn walk_children(
        &mut self,
        unit: &CompileUnit,
        unit_index: u32,
        entry: &DebugEntry,
        path: &mut Vec<PathSeg>,
        inside_function: bool,
    ) -> bool
    {
        for &child in &entry.children {
            if !self.walk_entry(unit, unit_index, child, path, inside_function) {
                return false;
            }
        }
        true
    }

    /// Index a concrete instance under its abstract origin's qualified name.
    fn index_via_origin(
        &mut self,
        instance_unit: u32,
        instance_index: u32,
        instance: &DebugEntry,
        origin_unit: u32,
        origin_index: u32,
    )
    {
        let Some(origin) = self
            .module
            .unit(origin_unit)
            .and_then(|u| u.entry(origin_index))
        else {
            trace!(origin_unit, origin_index, "dangling abstract origin, skipping");
            return;
        };
        if origin.kind != EntryKind::Function {
            trace!(origin_unit, origin_index, "abstract origin is not a function, skipping");
            return;
        }
        let Some(key) = entry_key(origin) else {
            return;
        };

        let mut segs = Vec::new();
        if let Some(parent) = origin.parent {
            for (_, ancestor) in self.module.parent_chain(origin_unit, parent) {
                match ancestor.kind {
                    EntryKind::Namespace => segs.push(PathSeg {
                        kind: IndexChildKind::Namespace,
                        key: namespace_key(ancestor),
                    }),
                    EntryKind::Type(_) => {
                        let Some(key) = entry_key(ancestor) else {
                            return;
                        };
                        segs.push(PathSeg {
                            kind: IndexChildKind::Type,
                            key,
                        });
                    }
                    EntryKind::Root => break,
                    _ => {}
                }
            }
        }
        segs.reverse();

        let node = self.insert_path(&segs, IndexChildKind::Function, &key);
        node.add_ref(make_ref(instance_unit, instance_index, instance));
    }

    fn resolve_deferred(&mut self)
    {
        for (unit_index, entry_index) in std::mem::take(&mut self.deferred) {
            let Some(instance) = self
                .module
                .unit(unit_index)
                .and_then(|u| u.entry(entry_index))
            else {
                continue;
            };
            let Some(id) = instance.abstract_origin else {
                continue;
            };
            let origin_unit = id.unit.unwrap_or(unit_index);
            self.index_via_origin(unit_index, entry_index, instance, origin_unit, id.entry);
        }
    }

    /// Navigate (creating as needed) to a scope path, then find or create the
    /// terminal child of the given kind.
    fn insert_path(&mut self, path: &[PathSeg], kind: IndexChildKind, key: &str) -> &mut IndexNode
    {
        let mut node = &mut self.root;
        for seg in path {
            node = node.add_child(seg.kind, &seg.key);
        }
        node.add_child(kind, key)
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

/// Canonical index key for a named entry; `None` for anonymous entries.
fn entry_key(entry: &DebugEntry) -> Option<String>
{
    if entry.name.is_empty() {
        return None;
    }
    Some(match &entry.template_args {
        Some(args) => format!("{}<{}>", entry.name, args.join(", ")),
        None => entry.name.clone(),
    })
}

fn namespace_key(entry: &DebugEntry) -> String
{
    if entry.name.is_empty() {
        "$anon".to_string()
    } else {
        entry.name.clone()
    }
}
