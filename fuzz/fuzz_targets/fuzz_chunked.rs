#![no_main]

use hopchain::chunked::decode_chunked;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = decode_chunked(data);
});
