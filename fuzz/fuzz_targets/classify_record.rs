//! Fuzz the wire-record deserializer and classifier: arbitrary bytes must
//! either fail serde cleanly or classify without panicking, and a
//! successfully classified record must classify identically twice.

#![no_main]

use libfuzzer_sys::fuzz_target;
use quill_core::record::{RawRecord, classify};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(record) = serde_json::from_str::<RawRecord>(text) else {
        return;
    };
    let first = classify(&record);
    let second = classify(&record);
    assert_eq!(first, second, "classification must be deterministic");
});
