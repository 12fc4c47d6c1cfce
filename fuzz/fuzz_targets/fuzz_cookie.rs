#![no_main]

use hopchain::cookie::{Cookie, SetCookie};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(cookies) = Cookie::parse(s) {
            for cookie in &cookies {
                let displayed = cookie.to_string();
                let _ = Cookie::parse(&displayed);
            }
        }

        if let Ok(set_cookie) = SetCookie::parse_at(s, 0) {
            let _ = set_cookie.name();
            let _ = set_cookie.value();
            let _ = set_cookie.domain();
            let _ = set_cookie.path();
            let _ = set_cookie.secure();
            let _ = set_cookie.http_only();
            let _ = set_cookie.is_expired(0);
            let displayed = set_cookie.to_string();
            let _ = SetCookie::parse_at(&displayed, 0);
        }
    }
});
