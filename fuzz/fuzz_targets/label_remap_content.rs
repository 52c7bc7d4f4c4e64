//! Fuzz target for label file remapping.
//!
//! Feeds arbitrary UTF-8 file content through the remapper twice, checking
//! for panics or hangs.

#![no_main]

use labelprep::remap::fuzz_remap_content;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };

    fuzz_remap_content(content);
});
