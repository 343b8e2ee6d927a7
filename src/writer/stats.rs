use std::fmt;

/// Statistics from a completed write operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Comment lines written
    pub comment_lines: usize,
    /// Metadata lines written
    pub metadata_lines: usize,
    /// Tables written (header lines)
    pub tables_written: usize,
    /// Data rows written over all tables
    pub rows_written: usize,
}

impl fmt::Display for WriterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote {} metadata lines and {} rows in {} tables",
            self.metadata_lines, self.rows_written, self.tables_written
        )
    }
}
