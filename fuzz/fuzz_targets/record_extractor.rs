#![no_main]

use libfuzzer_sys::fuzz_target;
use policyproof::decode::{decode_bytes, TextEncoding};
use policyproof::loader::parse_lines;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes always decode (Latin-1 fallback); every line must
    // either yield a record or be skipped, never panic.
    if let Some(decoded) = decode_bytes(data, &TextEncoding::CANDIDATES) {
        let _ = parse_lines(&decoded.text);
    }
});
