//! Per-unit line tables.

/// One row of a compile unit's line program.
///
/// Rows map a module-relative address to a position in one of the unit's
/// source files (`file` indexes the unit's file table). A row with
/// `end_sequence` set marks the first address past a contiguous code
/// sequence and carries no source position of its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineRow
{
    /// Module-relative address of the first instruction for this row.
    pub address: u64,
    /// Index into the owning unit's file table.
    pub file: u32,
    /// 1-based source line; 0 for compiler-generated code.
    pub line: u32,
    /// 1-based column; 0 when the producer recorded none.
    pub column: u32,
    /// End-of-sequence marker: `address` is one past the sequence.
    pub end_sequence: bool,
}

impl LineRow
{
    /// An ordinary row.
    pub fn new(address: u64, file: u32, line: u32) -> Self
    {
        Self {
            address,
            file,
            line,
            column: 0,
            end_sequence: false,
        }
    }

    /// An end-of-sequence marker at `address`.
    pub fn end_sequence(address: u64) -> Self
    {
        Self {
            address,
            file: 0,
            line: 0,
            column: 0,
            end_sequence: true,
        }
    }
}

/// Address-ordered line rows for one compile unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineTable
{
    rows: Vec<LineRow>,
}

impl LineTable
{
    pub fn new(rows: Vec<LineRow>) -> Self
    {
        debug_assert!(
            rows.windows(2).all(|w| w[0].address <= w[1].address),
            "line rows must be address-ordered"
        );
        Self { rows }
    }

    pub fn rows(&self) -> &[LineRow]
    {
        &self.rows
    }

    pub fn is_empty(&self) -> bool
    {
        self.rows.is_empty()
    }

    /// The row describing the given module-relative address: the last row at
    /// or before it that is not past an end-of-sequence boundary.
    pub fn row_for_address(&self, relative: u64) -> Option<&LineRow>
    {
        let after = self.rows.partition_point(|row| row.address <= relative);
        if after == 0 {
            return None;
        }
        let row = &self.rows[after - 1];
        if row.end_sequence {
            // The address falls into the gap after a sequence.
            return None;
        }
        Some(row)
    }

    /// Rows for the given file index, excluding end-of-sequence markers.
    pub fn rows_for_file<'a>(&'a self, file: u32) -> impl Iterator<Item = &'a LineRow>
    {
        self.rows
            .iter()
            .filter(move |row| !row.end_sequence && row.file == file)
    }
}
