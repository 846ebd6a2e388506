#![no_main]

use libfuzzer_sys::fuzz_target;
use pixframe::{decode_bytes_from_png, decode_frame};

fuzz_target!(|data: &[u8]| {
    // Neither entry point should ever panic on arbitrary input
    let _ = decode_frame(data);
    let _ = decode_bytes_from_png(data);
});
