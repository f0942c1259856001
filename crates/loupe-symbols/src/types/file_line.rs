//! Source file and line references.

use std::fmt;

/// A position in a source file.
///
/// Line numbers are 1-based. Line 0 is reserved for compiler-generated code
/// with no user-line mapping; it is never a real source position and must
/// never be merged with adjacent real lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FileLine
{
    /// Path as recorded by the compiler. Empty when unresolved.
    pub file: String,
    /// Compilation directory for resolving relative paths.
    pub comp_dir: String,
    /// 1-based line number; 0 means compiler-generated code.
    pub line: u32,
    /// 1-based column, if the producer recorded one.
    pub column: Option<u32>,
}

impl FileLine
{
    /// Build a file/line pair with no compilation directory or column.
    pub fn new(file: impl Into<String>, line: u32) -> Self
    {
        Self {
            file: file.into(),
            comp_dir: String::new(),
            line,
            column: None,
        }
    }

    /// Build a fully specified position.
    pub fn with_comp_dir(file: impl Into<String>, comp_dir: impl Into<String>, line: u32) -> Self
    {
        Self {
            file: file.into(),
            comp_dir: comp_dir.into(),
            line,
            column: None,
        }
    }

    /// A copy with the column set.
    pub fn at_column(mut self, column: u32) -> Self
    {
        self.column = Some(column);
        self
    }

    /// Whether this names a real user source position.
    pub fn is_valid(&self) -> bool
    {
        !self.file.is_empty() && self.line > 0
    }

    /// Whether the line is the compiler-generated sentinel.
    pub fn is_generated(&self) -> bool
    {
        self.line == 0
    }
}

impl fmt::Display for FileLine
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        if self.file.is_empty() {
            write!(f, "?:{}", self.line)
        } else {
            write!(f, "{}:{}", self.file, self.line)
        }
    }
}
