//! Index tree nodes.

use std::collections::BTreeMap;

use crate::module::SymbolRef;

/// What a node in the index tree represents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum IndexNodeKind
{
    /// A default-constructed node with no classification yet.
    #[default]
    None,
    /// The tree root (the global scope).
    Root,
    Namespace,
    Type,
    Function,
    Variable,
}

/// The four child-map kinds a node can be asked about.
///
/// The kind set is fixed by the debug-info format; a closed enum makes
/// looking up any other kind unrepresentable rather than a runtime error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexChildKind
{
    Namespace,
    Type,
    Function,
    Variable,
}

impl IndexChildKind
{
    /// All four kinds, in the fixed traversal order used by lookups.
    pub const ALL: [IndexChildKind; 4] = [
        IndexChildKind::Type,
        IndexChildKind::Function,
        IndexChildKind::Variable,
        IndexChildKind::Namespace,
    ];

    /// The node kind a child of this map kind gets.
    pub fn node_kind(self) -> IndexNodeKind
    {
        match self {
            IndexChildKind::Namespace => IndexNodeKind::Namespace,
            IndexChildKind::Type => IndexNodeKind::Type,
            IndexChildKind::Function => IndexNodeKind::Function,
            IndexChildKind::Variable => IndexNodeKind::Variable,
        }
    }
}

/// One node of the symbol index tree.
///
/// Four independent child maps keyed by canonical component name, so `Foo`
/// the namespace, `Foo` the type, and `Foo` the function coexist without
/// shadowing each other. `BTreeMap` keeps children ordered, which makes
/// prefix queries range scans and tree comparisons deterministic.
///
/// Ref storage per kind: namespaces store none; types store at most one,
/// upgraded from declaration to definition when both are seen; functions and
/// variables retain every instance across translation units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexNode
{
    kind: IndexNodeKind,
    namespaces: BTreeMap<String, IndexNode>,
    types: BTreeMap<String, IndexNode>,
    functions: BTreeMap<String, IndexNode>,
    variables: BTreeMap<String, IndexNode>,
    refs: Vec<SymbolRef>,
}

impl IndexNode
{
    pub fn new(kind: IndexNodeKind) -> Self
    {
        Self {
            kind,
            ..Self::default()
        }
    }

    pub fn kind(&self) -> IndexNodeKind
    {
        self.kind
    }

    /// Stored entry references. Empty for namespaces and bare scopes.
    pub fn refs(&self) -> &[SymbolRef]
    {
        &self.refs
    }

    /// Whether the node has no children and no refs (a bare path remnant).
    pub fn is_empty(&self) -> bool
    {
        self.refs.is_empty()
            && self.namespaces.is_empty()
            && self.types.is_empty()
            && self.functions.is_empty()
            && self.variables.is_empty()
    }

    /// Child map for one of the four lookup kinds.
    pub fn children(&self, kind: IndexChildKind) -> &BTreeMap<String, IndexNode>
    {
        match kind {
            IndexChildKind::Namespace => &self.namespaces,
            IndexChildKind::Type => &self.types,
            IndexChildKind::Function => &self.functions,
            IndexChildKind::Variable => &self.variables,
        }
    }

    fn children_mut(&mut self, kind: IndexChildKind) -> &mut BTreeMap<String, IndexNode>
    {
        match kind {
            IndexChildKind::Namespace => &mut self.namespaces,
            IndexChildKind::Type => &mut self.types,
            IndexChildKind::Function => &mut self.functions,
            IndexChildKind::Variable => &mut self.variables,
        }
    }

    /// Exact child lookup.
    pub fn child(&self, kind: IndexChildKind, name: &str) -> Option<&IndexNode>
    {
        self.children(kind).get(name)
    }

    /// Children of one kind whose name starts with `prefix`, in name order.
    pub fn children_with_prefix<'a>(
        &'a self,
        kind: IndexChildKind,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a IndexNode)>
    {
        self.children(kind)
            .range(prefix.to_string()..)
            .take_while(move |(name, _)| name.starts_with(prefix))
    }

    /// Find or create a child, classifying a fresh node by the map kind.
    pub(crate) fn add_child(&mut self, kind: IndexChildKind, name: &str) -> &mut IndexNode
    {
        self.children_mut(kind)
            .entry(name.to_string())
            .or_insert_with(|| IndexNode::new(kind.node_kind()))
    }

    /// Store a reference according to this node's kind rules.
    pub(crate) fn add_ref(&mut self, symbol_ref: SymbolRef)
    {
        match self.kind {
            IndexNodeKind::Namespace | IndexNodeKind::Root => {
                // Namespaces are pure scopes; nothing to store.
            }
            IndexNodeKind::Type => {
                match self.refs.first() {
                    None => self.refs.push(symbol_ref),
                    Some(existing) => {
                        // Definitions always win; the first definition sticks.
                        if existing.is_declaration() && !symbol_ref.is_declaration() {
                            self.refs[0] = symbol_ref;
                        }
                    }
                }
            }
            IndexNodeKind::Function | IndexNodeKind::Variable => {
                // Every translation unit's instance stays discoverable.
                self.refs.push(symbol_ref);
            }
            IndexNodeKind::None => {
                debug_assert!(false, "ref stored on unclassified index node");
            }
        }
    }
}
