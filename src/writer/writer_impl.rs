use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::{QuoteStyle, WriterBuilder};
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, info};

use super::config::{CompressionType, WriterConfig};
use super::error::WriterError;
use super::metadata;
use super::stats::WriterStats;
use crate::model::{MzTab, Table};
use crate::model::value::NULL;
use crate::parser::Section;

/// Tab-separated mzTab-M writer over any [`Write`] implementation.
///
/// Lines are written in section order: comments, metadata, then the
/// summary, feature and evidence tables. Columns come in canonical order
/// (stable, indexed by ascending id, optional in first-seen order); absent
/// cells are written as `null`.
pub struct MzTabWriter<W: Write> {
    writer: csv::Writer<W>,
    config: WriterConfig,
    stats: WriterStats,
    sections_written: usize,
}

impl<W: Write> MzTabWriter<W> {
    /// Create a writer over `inner`.
    pub fn new(inner: W, config: WriterConfig) -> Self {
        let writer = WriterBuilder::new()
            .delimiter(b'\t')
            .quote_style(QuoteStyle::Never)
            .flexible(true)
            .has_headers(false)
            .from_writer(inner);
        Self {
            writer,
            config,
            stats: WriterStats::default(),
            sections_written: 0,
        }
    }

    fn begin_section(&mut self) -> Result<(), WriterError> {
        if self.sections_written > 0 && self.config.blank_line_between_sections {
            self.writer.flush()?;
            self.writer.get_mut().write_all(b"\n")?;
        }
        self.sections_written += 1;
        Ok(())
    }

    /// Write a complete file.
    pub fn write_mztab(&mut self, mztab: &MzTab) -> Result<(), WriterError> {
        if self.config.write_comments && !mztab.comments.is_empty() {
            self.begin_section()?;
            for comment in &mztab.comments {
                if comment.text.starts_with('#') {
                    self.writer.write_record([comment.text.as_str()])?;
                } else {
                    self.writer
                        .write_record([Section::Comment.prefix(), comment.text.as_str()])?;
                }
                self.stats.comment_lines += 1;
            }
        }

        self.begin_section()?;
        for (key, value) in metadata::render(&mztab.metadata).into_vec() {
            self.writer
                .write_record([Section::Metadata.prefix(), key.as_str(), value.as_str()])?;
            self.stats.metadata_lines += 1;
        }
        debug!("wrote {} metadata lines", self.stats.metadata_lines);

        for table in mztab.tables() {
            self.write_table(table)?;
        }
        Ok(())
    }

    /// Write one table: its header line followed by every row.
    pub fn write_table(&mut self, table: &Table) -> Result<(), WriterError> {
        self.begin_section()?;
        let names: Vec<&str> = table.columns.columns().map(|c| c.name.as_str()).collect();

        let mut header = Vec::with_capacity(names.len() + 1);
        header.push(table.kind.header_prefix());
        header.extend(names.iter().copied());
        self.writer.write_record(&header)?;

        for row in &table.rows {
            let mut record: Vec<String> = Vec::with_capacity(names.len() + 1);
            record.push(table.kind.data_prefix().to_string());
            record.extend(names.iter().map(|name| match row.get(name) {
                Some(value) => value.to_string(),
                None => NULL.to_string(),
            }));
            self.writer.write_record(&record)?;
        }

        self.stats.tables_written += 1;
        self.stats.rows_written += table.rows.len();
        debug!("wrote {} with {} rows", table.kind, table.rows.len());
        Ok(())
    }

    /// Statistics so far.
    pub fn stats(&self) -> WriterStats {
        self.stats.clone()
    }

    /// Flush and return the statistics.
    pub fn finish(mut self) -> Result<WriterStats, WriterError> {
        self.writer.flush()?;
        info!("{}", self.stats);
        Ok(self.stats)
    }

    /// Flush and return the inner writer.
    pub fn finish_into_inner(self) -> Result<W, WriterError> {
        Ok(self.writer.into_inner()?)
    }
}

/// Render a file to a string.
pub fn to_string(mztab: &MzTab, config: &WriterConfig) -> Result<String, WriterError> {
    let mut writer = MzTabWriter::new(Vec::new(), config.clone());
    writer.write_mztab(mztab)?;
    Ok(String::from_utf8(writer.finish_into_inner()?)?)
}

/// Write a file, gzip-compressing it when the configuration asks for it.
pub fn write_file<P: AsRef<Path>>(
    mztab: &MzTab,
    path: P,
    config: &WriterConfig,
) -> Result<WriterStats, WriterError> {
    let path = path.as_ref();
    info!("Writing {}", path.display());
    let file = BufWriter::new(File::create(path)?);

    match config.compression {
        CompressionType::Uncompressed => {
            let mut writer = MzTabWriter::new(file, config.clone());
            writer.write_mztab(mztab)?;
            let stats = writer.stats();
            writer.finish_into_inner()?.flush()?;
            Ok(stats)
        }
        CompressionType::Gzip(level) => {
            let encoder = GzEncoder::new(file, Compression::new(level.min(9)));
            let mut writer = MzTabWriter::new(encoder, config.clone());
            writer.write_mztab(mztab)?;
            let stats = writer.stats();
            writer.finish_into_inner()?.finish()?.flush()?;
            Ok(stats)
        }
    }
}
