//! Memory address and address-range types.

use std::fmt;
use std::ops::{Add, Sub};

/// Strongly typed process-absolute memory address
///
/// This wrapper around `u64` keeps absolute (post-load) addresses from being
/// mixed up with module-relative offsets, sizes, or other numeric values.
/// Module-relative addresses — what the debug info stores — travel as plain
/// `u64` and only become an `Address` through a
/// [`SymbolContext`](super::SymbolContext) translation.
///
/// ## Example
///
/// ```rust
/// use loupe_symbols::types::Address;
///
/// let addr = Address::from(0x1000);
/// let next_addr = addr + 0x100; // Add offset
/// assert_eq!(next_addr.value(), 0x1100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u64);

impl Address
{
    /// The null address (0x0)
    ///
    /// Used as a sentinel by "unlocated" results that carry a symbol but no
    /// resolvable address.
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u64` value in const contexts.
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Get the raw `u64` value of this address.
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Add an offset, checking for overflow.
    pub fn checked_add(self, offset: u64) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }

    /// Subtract an offset, checking for underflow.
    pub fn checked_sub(self, offset: u64) -> Option<Self>
    {
        self.0.checked_sub(offset).map(Address)
    }

    /// Add an offset, saturating at the maximum value.
    pub fn saturating_add(self, offset: u64) -> Self
    {
        Address(self.0.saturating_add(offset))
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:016x}", self.0)
    }
}

impl Add<u64> for Address
{
    type Output = Address;

    fn add(self, rhs: u64) -> Self::Output
    {
        Address(self.0.wrapping_add(rhs))
    }
}

impl Sub<u64> for Address
{
    type Output = Address;

    fn sub(self, rhs: u64) -> Self::Output
    {
        Address(self.0.wrapping_sub(rhs))
    }
}

/// Half-open `[begin, end)` address range.
///
/// Ranges in a module's debug info are module-relative; after translation
/// through a [`SymbolContext`](super::SymbolContext) the same type carries
/// absolute values. An empty range (`begin == end`) contains nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressRange
{
    /// First address in the range.
    pub begin: u64,
    /// One past the last address in the range.
    pub end: u64,
}

impl AddressRange
{
    /// Create a range. `end < begin` is normalized to an empty range.
    pub fn new(begin: u64, end: u64) -> Self
    {
        Self {
            begin,
            end: end.max(begin),
        }
    }

    /// Whether the range covers no addresses.
    pub fn is_empty(&self) -> bool
    {
        self.begin == self.end
    }

    /// Number of addresses covered.
    pub fn size(&self) -> u64
    {
        self.end - self.begin
    }

    /// Whether `address` falls inside the half-open range.
    pub fn contains(&self, address: u64) -> bool
    {
        address >= self.begin && address < self.end
    }
}

impl fmt::Display for AddressRange
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "[0x{:x}, 0x{:x})", self.begin, self.end)
    }
}
