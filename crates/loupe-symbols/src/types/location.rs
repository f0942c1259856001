//! Resolved code locations.

use crate::module::SymbolRef;

use super::{Address, FileLine, SymbolContext};

/// What a symbolized [`Location`] resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationSymbol
{
    /// A function or inlined-function instance from the debug info.
    Function(SymbolRef),
    /// A variable from the debug info.
    Variable(SymbolRef),
    /// A symbol known only to the ELF symbol table, by display name.
    Elf(String),
}

/// An address, possibly annotated with what lives there.
///
/// A location is in one of three states: an unsymbolized address (nobody
/// asked yet), a symbolized address where resolution found nothing, or a
/// fully symbolized address carrying file/line and a symbol handle.
/// Symbolization is idempotent; callers that receive an unsymbolized
/// location may resolve it later and cache the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location
{
    address: Address,
    symbol_context: SymbolContext,
    file_line: Option<FileLine>,
    symbol: Option<LocationSymbol>,
    symbolized: bool,
}

impl Location
{
    /// An address with no symbolization attempted.
    pub fn address_only(address: Address, symbol_context: SymbolContext) -> Self
    {
        Self {
            address,
            symbol_context,
            file_line: None,
            symbol: None,
            symbolized: false,
        }
    }

    /// An address where symbolization ran and found nothing.
    pub fn symbolized_no_match(address: Address, symbol_context: SymbolContext) -> Self
    {
        Self {
            address,
            symbol_context,
            file_line: None,
            symbol: None,
            symbolized: true,
        }
    }

    /// A fully symbolized location. `file_line` is omitted when the resolved
    /// line is the generated-code sentinel.
    pub fn symbolized(
        address: Address,
        symbol_context: SymbolContext,
        file_line: Option<FileLine>,
        symbol: LocationSymbol,
    ) -> Self
    {
        Self {
            address,
            symbol_context,
            file_line,
            symbol: Some(symbol),
            symbolized: true,
        }
    }

    /// A named symbol with no resolvable address (a thread-local or
    /// optimized-away variable, for example). Carries the symbol for display.
    pub fn unlocated(symbol_context: SymbolContext, symbol: LocationSymbol) -> Self
    {
        Self {
            address: Address::ZERO,
            symbol_context,
            file_line: None,
            symbol: Some(symbol),
            symbolized: true,
        }
    }

    /// Process-absolute address. Zero for unlocated results.
    pub fn address(&self) -> Address
    {
        self.address
    }

    /// Module-relative form of the address.
    pub fn relative_address(&self) -> u64
    {
        self.symbol_context.absolute_to_relative(self.address)
    }

    pub fn symbol_context(&self) -> SymbolContext
    {
        self.symbol_context
    }

    /// Source position, when resolution produced a real one.
    pub fn file_line(&self) -> Option<&FileLine>
    {
        self.file_line.as_ref()
    }

    /// Column of the resolved position, if known.
    pub fn column(&self) -> Option<u32>
    {
        self.file_line.as_ref().and_then(|fl| fl.column)
    }

    /// The resolved symbol handle, if any.
    pub fn symbol(&self) -> Option<&LocationSymbol>
    {
        self.symbol.as_ref()
    }

    /// Whether symbolization has run (it may still have found nothing).
    pub fn is_symbolized(&self) -> bool
    {
        self.symbolized
    }

    /// Whether symbolization ran and produced a symbol.
    pub fn has_symbol(&self) -> bool
    {
        self.symbol.is_some()
    }
}
