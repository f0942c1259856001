//! # Location resolution
//!
//! Address, (file, line), and name inputs all funnel through
//! [`ModuleSymbols::resolve_input_location`] and come back as
//! [`Location`](crate::types::Location) values. The component is purely
//! request/response over the immutable module index; the only state is the
//! transient per-request context passed in.

mod address;
mod input;
mod line;
mod name;

pub use input::{AmbiguousInlineMode, InputLocation, ResolveOptions};

use crate::eval::ExpressionEvaluator;
use crate::index::SymbolIndex;
use crate::module::{ModuleInfo, SymbolRef};
use crate::types::{Location, SymbolContext};

/// Location queries over one module's symbols.
///
/// Borrows the module's immutable debug info and index plus the external
/// expression evaluator (needed only for static variable addresses).
pub struct ModuleSymbols<'a>
{
    pub(crate) info: &'a ModuleInfo,
    pub(crate) index: &'a SymbolIndex,
    pub(crate) evaluator: &'a dyn ExpressionEvaluator,
}

impl<'a> ModuleSymbols<'a>
{
    pub fn new(
        info: &'a ModuleInfo,
        index: &'a SymbolIndex,
        evaluator: &'a dyn ExpressionEvaluator,
    ) -> Self
    {
        Self {
            info,
            index,
            evaluator,
        }
    }

    pub fn info(&self) -> &'a ModuleInfo
    {
        self.info
    }

    pub fn index(&self) -> &'a SymbolIndex
    {
        self.index
    }

    /// Translate an input location into zero or more resolved locations.
    ///
    /// Failure semantics follow the rest of the core: nothing here errors,
    /// an unresolvable input just produces fewer (or no) results.
    pub fn resolve_input_location(
        &self,
        symbol_context: &SymbolContext,
        input: &InputLocation,
        options: &ResolveOptions,
    ) -> Vec<Location>
    {
        match input {
            InputLocation::Address(address) => {
                address::resolve_address(self, symbol_context, *address, options)
            }
            InputLocation::Line(file_line) => {
                line::resolve_line(self, symbol_context, file_line, options)
            }
            InputLocation::Name(identifier) => {
                name::resolve_name(self, symbol_context, identifier, options)
            }
        }
    }

    /// The physical (non-inline) function covering a module-relative
    /// address, for callers that need the frame-owning function itself.
    pub fn function_at(&self, relative: u64) -> Option<SymbolRef>
    {
        let (unit_index, chain) = address::code_chain_at(self, relative)?;
        let function_index = *chain.first()?;
        let entry = self.info.unit(unit_index)?.entry(function_index)?;
        Some(if entry.is_declaration {
            SymbolRef::declaration(unit_index, function_index)
        } else {
            SymbolRef::entry(unit_index, function_index)
        })
    }
}
