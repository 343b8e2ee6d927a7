//! # mzTab-M command line tool
//!
//! Validates, inspects and re-formats mzTab-M files.
//!
//! ## Usage
//!
//! ```bash
//! # Report every diagnostic at warn level or above
//! mztab validate study.mztab --level warn
//!
//! # Also check metadata against CV mapping rules
//! mztab validate study.mztab --mapping mzTab-M-mapping.xml --ontology psi-ms.obo
//!
//! # Rewrite in canonical layout, compressed
//! mztab format study.mztab study.mztab.gz
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
