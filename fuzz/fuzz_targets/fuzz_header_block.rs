#![no_main]

use hopchain::HeaderBlock;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let headers = HeaderBlock::parse(s);
        for hop in headers.chain() {
            let _ = hop.status_code();
            let _ = hop.request_line();
            let _ = hop.ok();
            let _ = hop.is_redirect();
            for (name, value) in hop.fields() {
                let _ = hop.first(name);
                let _ = value.len();
            }
        }

        let text = headers.to_text(true);
        let _ = HeaderBlock::parse(&text);

        let mut edited = headers.clone();
        edited.override_header("location", "/fuzz");
        edited.erase("set-cookie");
        let _ = edited.to_text(true);
    }
});
