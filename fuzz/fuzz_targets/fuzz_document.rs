#![no_main]

use arbitrary::Arbitrary;
use hopchain::HeaderBlock;
use hopchain::chunked::decode_body;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Input {
    lines: Vec<String>,
    now: i64,
}

fuzz_target!(|input: Input| {
    let (headers, body) = HeaderBlock::from_lines(input.lines.iter());
    let _ = decode_body(&headers, body.as_bytes());

    let cookies = headers.get_set_cookies_at(input.now);
    let mut jar = HeaderBlock::new();
    jar.apply_set_cookies(&cookies, input.now);
    let _ = jar.to_text(false);
    let _ = headers.create_cookie_headers_at(input.now);
});
