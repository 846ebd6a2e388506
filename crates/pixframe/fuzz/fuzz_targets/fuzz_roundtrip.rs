#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pixframe::{decode_bytes_from_png, encode_bytes_to_png, EncodeOptions};

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    compression: bool,
    alpha: bool,
    payload: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let opts = EncodeOptions {
        compression: input.compression,
        alpha: input.alpha,
    };

    let png = match encode_bytes_to_png(&input.payload, &opts) {
        Ok(png) => png,
        Err(_) => {
            assert!(input.payload.is_empty(), "only empty payloads may fail");
            return;
        }
    };

    let decoded = decode_bytes_from_png(&png).expect("self-produced image must decode");
    assert_eq!(decoded, input.payload);
});
