use anyhow::{Context, Result};
use std::path::PathBuf;

use mztab::model::{ElementType, MzTab};
use mztab::parser::{parse_file, ParseOptions};

/// Display information about an mzTab-M file
pub fn run(file: PathBuf) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {}", file.display());
    }

    let outcome = parse_file(&file, &ParseOptions::default())
        .with_context(|| format!("Failed to read {}", file.display()))?;

    println!("mzTab-M File Information");
    println!("========================");
    println!("File: {}", file.display());
    println!();

    match &outcome.file {
        Some(mztab) => print_summary(mztab),
        None => println!("File could not be parsed."),
    }

    println!();
    println!("Diagnostics: {}", outcome.diagnostics.len());
    if let Some(fatal) = &outcome.fatal {
        println!("  Aborted: {}", fatal);
    }

    Ok(())
}

fn print_summary(mztab: &MzTab) {
    let metadata = &mztab.metadata;
    let or_missing = |v: &Option<String>| v.clone().unwrap_or_else(|| "(missing)".to_string());

    println!("Metadata:");
    println!("  Version: {}", or_missing(&metadata.mztab_version));
    println!("  ID: {}", or_missing(&metadata.mztab_id));
    if let Some(title) = &metadata.title {
        println!("  Title: {}", title);
    }
    if let Some(method) = &metadata.quantification_method {
        println!("  Quantification method: {}", method);
    }
    println!();

    println!("Elements:");
    for element_type in ElementType::ALL {
        let count = metadata.ids(element_type).len();
        if count > 0 {
            println!("  {:<24} {}", element_type.key(), count);
        }
    }
    if !metadata.column_units.is_empty() {
        println!("  {:<24} {}", "colunit", metadata.column_units.len());
    }
    println!();

    println!("Tables:");
    let mut any = false;
    for table in mztab.tables() {
        any = true;
        println!(
            "  {} ({}): {} rows, {} columns",
            table.kind.name(),
            table.kind.data_prefix(),
            table.rows.len(),
            table.columns.len()
        );
    }
    if !any {
        println!("  (none)");
    }
    if !mztab.comments.is_empty() {
        println!("Comments: {}", mztab.comments.len());
    }
}
