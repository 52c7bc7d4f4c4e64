//! Fuzz target for single YOLO label line parsing.
//!
//! Lines that parse are re-rendered and parsed again; the class id must
//! survive the trip.

#![no_main]

use labelprep::label::LabelLine;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }

    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(parsed) = line.parse::<LabelLine>() {
        if let Ok(again) = parsed.to_string().parse::<LabelLine>() {
            assert_eq!(parsed.class_id, again.class_id);
        }
    }
});
