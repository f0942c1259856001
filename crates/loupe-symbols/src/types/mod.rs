//! # Types
//!
//! Value types shared by the index, the resolvers, and frames.
//!
//! Everything here is a short-lived, cheap value created per query and owned
//! by the caller; none of it borrows from a module's debug info.

pub mod address;
pub mod file_line;
pub mod location;
pub mod symbol_context;
pub mod variable_location;

// Re-export all public types
pub use address::{Address, AddressRange};
pub use file_line::FileLine;
pub use location::{Location, LocationSymbol};
pub use symbol_context::SymbolContext;
pub use variable_location::{VariableLocation, VariableLocationEntry};
