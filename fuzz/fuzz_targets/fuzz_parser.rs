#![no_main]

use libfuzzer_sys::fuzz_target;
use mztab::parser::{parse, ParseOptions};
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Malformed input must end in diagnostics, never a panic
    let options = ParseOptions::default();
    if let Ok(outcome) = parse(Cursor::new(data), &options) {
        if outcome.file.is_some() {
            assert!(outcome.fatal.is_none());
            assert!(!outcome.diagnostics.has_errors());
        }
    }
});
