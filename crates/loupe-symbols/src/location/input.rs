//! Inputs and options for location resolution.

use crate::identifier::Identifier;
use crate::types::{Address, FileLine};

/// What the user handed us to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputLocation
{
    /// A process-absolute address.
    Address(Address),
    /// A (file, line) pair; the file matches canonical paths by suffix.
    Line(FileLine),
    /// A possibly-qualified, possibly-special name.
    Name(Identifier),
}

/// Which frame an address sitting exactly at an inline call boundary means.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AmbiguousInlineMode
{
    /// The innermost inlined instance (the most specific view).
    #[default]
    Inner,
    /// The outermost non-inlined function, located at the call site.
    Outer,
}

/// Resolution options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions
{
    /// Attach file/line and a symbol handle to resolved addresses. When
    /// false, address inputs come back address-only.
    pub symbolize: bool,
    /// Ambiguous-inline handling for addresses at inline range starts.
    pub ambiguous_inline: AmbiguousInlineMode,
    /// Advance function-start addresses past the prologue before the final
    /// line-table lookup (what a breakpoint on a function name wants).
    pub skip_prologue: bool,
}

impl Default for ResolveOptions
{
    fn default() -> Self
    {
        Self {
            symbolize: true,
            ambiguous_inline: AmbiguousInlineMode::default(),
            skip_prologue: false,
        }
    }
}
