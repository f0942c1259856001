//! Name-resolution results.

use smallvec::SmallVec;

use crate::identifier::Identifier;
use crate::module::SymbolRef;

/// One step from a static type toward the class that defines a member:
/// either a base class or an anonymous aggregate member being flattened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InheritanceHop
{
    /// The base class (or anonymous member) stepped through.
    pub base: SymbolRef,
    /// Byte offset of that step within its holder.
    pub offset: u64,
}

/// Ordered hops from the object's static type to the member's defining
/// class. Empty for direct members. Summing offsets (plus the member's own
/// offset) yields the member's byte offset within the object.
pub type InheritancePath = SmallVec<[InheritanceHop; 2]>;

/// A member found on the current object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundMember
{
    /// The object-pointer variable (`this`) the member hangs off, if the
    /// search started from one.
    pub object_ptr: Option<SymbolRef>,
    /// Inheritance path from the static type to the defining class.
    pub path: InheritancePath,
    /// The member entry itself.
    pub member: SymbolRef,
}

/// The result of name resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FoundName
{
    /// A namespace, by full name. Namespaces have no single definition.
    Namespace(Identifier),
    /// "Some template with this base name exists", by full name.
    Template(Identifier),
    /// A local, parameter, or indexed (global/static) variable.
    Variable(SymbolRef),
    /// A member of the current object.
    Member(FoundMember),
    Function(SymbolRef),
    Type(SymbolRef),
    /// A name resolved directly against the module's raw symbol tables.
    ElfSymbol
    {
        /// Raw symbol name (`name@plt` for PLT thunks).
        name: String,
        /// Module-relative address of the symbol.
        relative_address: u64,
    },
}
