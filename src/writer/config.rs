/// Compression of the written file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionType {
    /// Plain text
    #[default]
    Uncompressed,
    /// gzip at the given level (0-9)
    Gzip(u32),
}

impl CompressionType {
    /// Choose gzip for paths ending in `.gz`.
    pub fn for_path(path: &std::path::Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("gz") => Self::Gzip(6),
            _ => Self::Uncompressed,
        }
    }
}

/// Configuration for the mzTab-M writer
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Compression used by [`super::write_file`]
    pub compression: CompressionType,

    /// Write comment lines before the metadata section
    pub write_comments: bool,

    /// Separate sections with an empty line
    pub blank_line_between_sections: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            compression: CompressionType::Uncompressed,
            write_comments: true,
            blank_line_between_sections: true,
        }
    }
}
