//! Module-relative ↔ process-absolute address translation.

use super::{Address, AddressRange};

/// Where a module is loaded in the inspected process.
///
/// Debug info stores module-relative addresses; a running process sees
/// absolute ones. The translation is `relative + load = absolute`. A load
/// address of zero means "relative": no real load, used for static analysis
/// and tests where both spaces coincide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SymbolContext
{
    load_address: u64,
}

impl SymbolContext
{
    /// Context with no load address; relative and absolute coincide.
    pub const RELATIVE: Self = SymbolContext { load_address: 0 };

    /// Context for a module loaded at `load_address`.
    pub const fn new(load_address: u64) -> Self
    {
        Self { load_address }
    }

    /// The module load address.
    pub const fn load_address(self) -> u64
    {
        self.load_address
    }

    /// Whether this is the no-load ("relative") context.
    pub const fn is_relative(self) -> bool
    {
        self.load_address == 0
    }

    /// Translate a module-relative address to a process-absolute one.
    pub fn relative_to_absolute(self, relative: u64) -> Address
    {
        Address::new(relative.wrapping_add(self.load_address))
    }

    /// Translate a process-absolute address back to module-relative space.
    pub fn absolute_to_relative(self, absolute: Address) -> u64
    {
        absolute.value().wrapping_sub(self.load_address)
    }

    /// Translate a module-relative range to absolute space.
    pub fn relative_range_to_absolute(self, range: AddressRange) -> AddressRange
    {
        AddressRange::new(
            range.begin.wrapping_add(self.load_address),
            range.end.wrapping_add(self.load_address),
        )
    }

    /// Translate an absolute range back to module-relative space.
    pub fn absolute_range_to_relative(self, range: AddressRange) -> AddressRange
    {
        AddressRange::new(
            range.begin.wrapping_sub(self.load_address),
            range.end.wrapping_sub(self.load_address),
        )
    }
}
