//! Debug-entry (DIE-like) records.

use crate::types::{AddressRange, FileLine, VariableLocation};

/// Which concrete entry a [`SymbolRef`] names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RefKind
{
    /// Refers to nothing.
    #[default]
    Null,
    /// A normal entry (for types: a definition).
    Entry,
    /// A forward declaration. Weaker than a definition; must never shadow one.
    Declaration,
}

/// Opaque, cheap-to-copy reference into a module's debug-entry set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SymbolRef
{
    kind: RefKind,
    unit: u32,
    entry: u32,
}

impl SymbolRef
{
    /// The null reference.
    pub const fn null() -> Self
    {
        Self {
            kind: RefKind::Null,
            unit: 0,
            entry: 0,
        }
    }

    /// Reference to a normal entry.
    pub const fn entry(unit: u32, entry: u32) -> Self
    {
        Self {
            kind: RefKind::Entry,
            unit,
            entry,
        }
    }

    /// Reference to a forward-declaration entry.
    pub const fn declaration(unit: u32, entry: u32) -> Self
    {
        Self {
            kind: RefKind::Declaration,
            unit,
            entry,
        }
    }

    pub const fn kind(self) -> RefKind
    {
        self.kind
    }

    pub const fn is_null(self) -> bool
    {
        matches!(self.kind, RefKind::Null)
    }

    pub const fn is_declaration(self) -> bool
    {
        matches!(self.kind, RefKind::Declaration)
    }

    /// Index of the owning compile unit. Meaningless for null refs.
    pub const fn unit(self) -> u32
    {
        self.unit
    }

    /// Index of the entry within its compile unit. Meaningless for null refs.
    pub const fn entry_index(self) -> u32
    {
        self.entry
    }
}

/// Link from one entry to another, possibly across compile units.
///
/// `unit: None` stays within the referencing entry's own unit; `Some` names
/// another unit — the case that forces the index into its two-pass build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId
{
    /// Target unit, or `None` for the referencing entry's own unit.
    pub unit: Option<u32>,
    /// Entry index within the target unit.
    pub entry: u32,
}

impl EntryId
{
    /// Link within the same compile unit.
    pub const fn local(entry: u32) -> Self
    {
        Self { unit: None, entry }
    }

    /// Link into another compile unit.
    pub const fn cross_unit(unit: u32, entry: u32) -> Self
    {
        Self {
            unit: Some(unit),
            entry,
        }
    }

    /// Whether this link leaves its own compile unit.
    pub const fn is_cross_unit(self) -> bool
    {
        self.unit.is_some()
    }
}

/// Aggregate classification for type entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeClass
{
    Class,
    Struct,
    Union,
    Enum,
    /// Base/primitive type (int, float, ...).
    Base,
}

/// Kind of a [`DebugEntry`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EntryKind
{
    /// The per-unit root entry; always entry 0.
    Root,
    Namespace,
    Type(TypeClass),
    Function,
    /// A concrete inlined instance of a function.
    InlinedFunction,
    /// A lexical block inside a function body.
    Block,
    Variable,
    /// A formal parameter of a function or inlined instance.
    Parameter,
    /// A data member of a class/struct/union.
    Member,
    /// A base-class link of a class/struct, in declaration order.
    Inheritance,
    /// Anything this core does not interpret.
    #[default]
    Other,
}

impl EntryKind
{
    /// Entry kinds that open a function scope for local-variable search.
    pub fn is_function_scope(self) -> bool
    {
        matches!(self, EntryKind::Function | EntryKind::InlinedFunction)
    }

    /// Entry kinds the local-variable walk descends through.
    pub fn is_lexical_scope(self) -> bool
    {
        matches!(
            self,
            EntryKind::Function | EntryKind::InlinedFunction | EntryKind::Block
        )
    }
}

/// One node of a compile unit's debug-entry tree.
///
/// A single struct with per-kind optional attributes, mirroring how a DIE
/// carries an open set of attributes. Producers fill only what the kind
/// needs; consumers read only what the kind promises.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugEntry
{
    pub kind: EntryKind,
    /// Plain (unqualified) name. Empty for anonymous entries.
    pub name: String,
    /// Template-argument strings; `Some(vec![])` is an explicit empty list.
    pub template_args: Option<Vec<String>>,
    /// Lexical parent entry within the same unit. `None` only for the root.
    pub parent: Option<u32>,
    /// Child entries in declaration order.
    pub children: Vec<u32>,
    /// Forward declaration rather than a definition.
    pub is_declaration: bool,
    /// Compiler-emitted "this is the program entry point" annotation.
    pub is_main: bool,
    /// Module-relative code ranges (functions, inlined instances, blocks).
    pub ranges: Vec<AddressRange>,
    /// Call site of an inlined instance, as recorded by the producer.
    /// Columns are not available at call sites.
    pub call_site: Option<FileLine>,
    /// Declaration position (variables, functions, types).
    pub decl: Option<FileLine>,
    /// Abstract-origin link for concrete function/inline instances.
    pub abstract_origin: Option<EntryId>,
    /// Type of a variable, parameter, member, or inheritance link.
    pub type_ref: Option<EntryId>,
    /// Byte offset of a member or base class within its holder.
    pub member_offset: Option<u64>,
    /// Location expression(s) for variables and parameters.
    pub location: Option<VariableLocation>,
    /// Frame-base expression(s) for functions.
    pub frame_base: Option<VariableLocation>,
}

impl DebugEntry
{
    /// Whether any code range covers the module-relative address.
    pub fn covers(&self, relative: u64) -> bool
    {
        self.ranges.iter().any(|r| r.contains(relative))
    }

    /// First code range, the canonical "function start" for breakpoints.
    pub fn first_range(&self) -> Option<AddressRange>
    {
        self.ranges.first().copied()
    }

    /// Whether the module-relative address sits exactly at the start of one
    /// of this entry's code ranges.
    pub fn starts_at(&self, relative: u64) -> bool
    {
        self.ranges.iter().any(|r| !r.is_empty() && r.begin == relative)
    }
}
