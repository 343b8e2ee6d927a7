use anyhow::{Context, Result};
use log::info;
use std::io::Write;
use std::path::PathBuf;

use mztab::parser::{parse_file, ParseOptions};
use mztab::writer::{to_string, write_file, CompressionType, WriterConfig};

/// Parse an mzTab-M file and write it back in canonical layout
pub fn run(input: PathBuf, output: Option<PathBuf>, no_comments: bool, compact: bool) -> Result<()> {
    let outcome = parse_file(&input, &ParseOptions::default())
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let Some(mztab) = outcome.file else {
        eprintln!("{}", outcome.diagnostics);
        if let Some(fatal) = outcome.fatal {
            eprintln!("{}", fatal);
        }
        std::process::exit(1);
    };

    if !outcome.diagnostics.is_empty() {
        info!(
            "{} diagnostics while reading {}",
            outcome.diagnostics.len(),
            input.display()
        );
    }

    let mut config = WriterConfig {
        write_comments: !no_comments,
        blank_line_between_sections: !compact,
        ..Default::default()
    };

    match output {
        Some(path) => {
            config.compression = CompressionType::for_path(&path);
            let stats = write_file(&mztab, &path, &config)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}: {}", path.display(), stats);
        }
        None => {
            let text = to_string(&mztab, &config)?;
            std::io::stdout()
                .lock()
                .write_all(text.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }

    Ok(())
}
