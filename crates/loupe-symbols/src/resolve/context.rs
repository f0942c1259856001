//! Lexical context handed to name resolution.

use crate::index::SymbolIndex;
use crate::module::{ModuleInfo, SymbolRef};
use crate::types::SymbolContext;

/// One loaded module's debug info, index, and load address, bundled for
/// queries. The info and index are built once and shared read-only.
#[derive(Debug, Clone, Copy)]
pub struct ModuleContext<'a>
{
    pub info: &'a ModuleInfo,
    pub index: &'a SymbolIndex,
    pub symbol_context: SymbolContext,
}

impl<'a> ModuleContext<'a>
{
    pub fn new(info: &'a ModuleInfo, index: &'a SymbolIndex, symbol_context: SymbolContext) -> Self
    {
        Self {
            info,
            index,
            symbol_context,
        }
    }
}

/// Where a name search starts from.
///
/// All fields are optional except the module list; a context with nothing
/// but a module searches the global scope only.
#[derive(Debug, Clone, Copy, Default)]
pub struct FindNameContext<'a>
{
    /// The module the code location lives in.
    pub module: Option<&'a ModuleContext<'a>>,
    /// Innermost code block (or function) enclosing the current location.
    pub block: Option<SymbolRef>,
    /// The `this` object-pointer parameter in scope, if any. Its type link
    /// names the pointed-to class.
    pub object_ptr: Option<SymbolRef>,
    /// Every other loaded module, searched after the current one comes up
    /// short. The current module is never re-searched.
    pub other_modules: &'a [ModuleContext<'a>],
}

impl<'a> FindNameContext<'a>
{
    /// Context for global searches in one module.
    pub fn module_only(module: &'a ModuleContext<'a>) -> Self
    {
        Self {
            module: Some(module),
            ..Self::default()
        }
    }
}
