#![no_main]

use hopchain::date::HttpDate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(date) = HttpDate::parse(s) {
            let _ = date.day_name();
            let timestamp = date.to_unix_timestamp();
            let _ = HttpDate::from_unix_timestamp(timestamp).to_string();
        }
    }
});
