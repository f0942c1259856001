//! # loupe-symbols
//!
//! The symbol-resolution core of the Loupe debugger.
//!
//! This crate turns a binary's already-parsed debug information into answers
//! to the questions a debugger asks constantly:
//! - What function, inline chain, file, and line does this address mean?
//! - Which program entities does this (possibly qualified, possibly
//!   templated) name refer to, given where execution currently stands?
//! - Which address(es) does this function name or file/line map to, for
//!   placing a breakpoint?
//!
//! ## Structure
//!
//! - [`identifier`]: qualified-name value type with template arguments and
//!   special markers (`$main`, `$plt(...)`, anonymous namespaces, ...)
//! - [`module`]: the in-memory debug-entry model handed over by the raw
//!   debug-format reader (an external collaborator)
//! - [`index`]: the per-module symbol index, built once, immutable, shared
//! - [`resolve`]: scoped name resolution (locals → members → index → other
//!   modules)
//! - [`location`]: address/line/name ⇄ location translation
//! - [`frame`]: a physical stack frame with lazy symbolization and
//!   asynchronous frame-base computation
//!
//! ## Failure model
//!
//! Queries do not error: "not found", "unsupported name shape", and
//! structurally suspicious debug info all come back as empty result sets so
//! one bad compile unit never poisons unrelated lookups. The only real
//! errors are malformed provider data at module-load time and evaluator
//! failures, which degrade to "value unavailable".

pub mod error;
pub mod eval;
pub mod frame;
pub mod identifier;
pub mod index;
pub mod location;
pub mod module;
pub mod resolve;
pub mod types;

// Re-export commonly used types
pub use error::{Result, SymbolError};
pub use identifier::{Identifier, IdentifierComponent, Qualification, SpecialName};
pub use index::SymbolIndex;
pub use location::{InputLocation, ModuleSymbols, ResolveOptions};
pub use module::{ModuleInfo, SymbolRef};
pub use resolve::{find_name, FindNameContext, FindNameOptions, FoundName};
pub use types::{Address, FileLine, Location, SymbolContext};
