#![no_main]

use hopchain::auth::BasicAuth;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(auth) = BasicAuth::parse(s) {
            let encoded = auth.to_header_value();
            let decoded = BasicAuth::parse(&encoded).unwrap();
            assert_eq!(decoded, auth);
        }
        let _ = BasicAuth::from_userinfo(s);
    }
});
