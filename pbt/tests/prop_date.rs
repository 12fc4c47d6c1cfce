//! HTTP-date のプロパティテスト (date.rs)

use hopchain::date::HttpDate;
use proptest::prelude::*;

use pbt::unix_timestamp;

proptest! {
    #[test]
    fn prop_timestamp_roundtrip(ts in unix_timestamp()) {
        let date = HttpDate::from_unix_timestamp(ts);
        prop_assert_eq!(date.to_unix_timestamp(), ts);
    }
}

// IMF-fixdate で出力したものは同じ日時にパースできる
proptest! {
    #[test]
    fn prop_imf_fixdate_roundtrip(ts in unix_timestamp()) {
        let text = HttpDate::from_unix_timestamp(ts).to_string();
        prop_assert!(text.ends_with(" GMT"));
        prop_assert_eq!(text.len(), 29);
        let parsed = HttpDate::parse(&text).unwrap();
        prop_assert_eq!(parsed.to_unix_timestamp(), ts);
    }
}

proptest! {
    #[test]
    fn prop_parse_never_panics(input in "\\PC{0,40}") {
        let _ = HttpDate::parse(&input);
    }
}
