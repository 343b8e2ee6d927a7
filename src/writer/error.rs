/// Errors raised while writing mzTab-M
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the CSV layer
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Output is not valid UTF-8 (only raised by in-memory rendering)
    #[error("UTF-8 error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    /// Flushing the inner writer failed when finishing
    #[error("Failed to finish writer: {0}")]
    FinishError(String),
}

impl<W> From<csv::IntoInnerError<W>> for WriterError {
    fn from(error: csv::IntoInnerError<W>) -> Self {
        Self::FinishError(error.error().to_string())
    }
}
