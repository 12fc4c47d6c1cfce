#![no_main]

use hopchain::uri::{Uri, percent_encode, remove_dot_segments, resolve, resolve_location};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(uri) = Uri::parse(s) {
            let _ = uri.scheme();
            let _ = uri.authority();
            let _ = uri.host_header();
            let _ = uri.port_or_default();
            let _ = uri.origin_form();
            let _ = uri.absolute_form();

            // 基底 URI として使用
            if uri.is_absolute() {
                if let Ok(relative) = Uri::parse("../a/./b?q") {
                    let _ = resolve(&uri, &relative);
                }
            }
        }

        let _ = resolve_location("http://example.com/a/b", s);
        let _ = remove_dot_segments(s);
        let _ = percent_encode(s);
    }
});
