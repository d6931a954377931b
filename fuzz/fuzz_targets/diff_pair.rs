//! Fuzz the diff engine: any pair of strings must produce an edit script
//! that reassembles both sides exactly, with coalesced spans.

#![no_main]

use libfuzzer_sys::fuzz_target;
use quill_core::diff::diff;

fuzz_target!(|pair: (&str, &str)| {
    let (old, new) = pair;
    // The LCS core is quadratic; keep fuzz inputs in the size range real
    // document edits produce after prefix/suffix trimming.
    if old.len() > 512 || new.len() > 512 {
        return;
    }
    let d = diff(old, new);
    assert_eq!(d.old_text(), old);
    assert_eq!(d.new_text(), new);
    for pair in d.spans().windows(2) {
        assert_ne!(pair[0].op, pair[1].op, "spans must be coalesced");
    }
});
