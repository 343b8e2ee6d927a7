#![no_main]

use libfuzzer_sys::fuzz_target;
use mztab::parser::{parse_str, ParseOptions};
use mztab::writer::{to_string, WriterConfig};

fuzz_target!(|text: &str| {
    let options = ParseOptions::default();
    let Some(first) = parse_str(text, &options).file else {
        return;
    };
    let Ok(written) = to_string(&first, &WriterConfig::default()) else {
        return;
    };
    let second = parse_str(&written, &options).file;
    assert_eq!(second.as_ref(), Some(&first));
});
