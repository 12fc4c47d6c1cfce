//! ステータスコードと reason-phrase
//!
//! ## 概要
//!
//! HTTP/1.1 の標準ステータスコード (100-505) に対応する reason-phrase の
//! 固定テーブルと、ステータスコードの分類を提供します。
//!
//! テーブルは読み取り専用の静的データで、実行時に変更することはできません。
//!
//! ## 使い方
//!
//! ```rust
//! use hopchain::status::{is_ok, is_redirect, reason_phrase, status_line};
//!
//! assert_eq!(reason_phrase(404), Some("Not Found"));
//! assert_eq!(status_line(302), "HTTP/1.1 302 Found");
//! assert!(is_ok(304));
//! assert!(!is_ok(305));
//! assert!(is_redirect(307));
//! ```

/// ステータスコードと reason-phrase の対応表
const STATUS_CODES: &[(u16, &str)] = &[
    (100, "Continue"),
    (101, "Switching Protocols"),
    (200, "OK"),
    (201, "Created"),
    (202, "Accepted"),
    (203, "Non-Authoritative Information"),
    (204, "No Content"),
    (205, "Reset Content"),
    (206, "Partial Content"),
    (300, "Multiple Choices"),
    (301, "Moved Permanently"),
    (302, "Found"),
    (303, "See Other"),
    (304, "Not Modified"),
    (305, "Use Proxy"),
    // 306 は未使用
    (307, "Temporary Redirect"),
    (400, "Bad Request"),
    (401, "Unauthorized"),
    (402, "Payment Required"),
    (403, "Forbidden"),
    (404, "Not Found"),
    (405, "Method Not Allowed"),
    (406, "Not Acceptable"),
    (407, "Proxy Authentication Required"),
    (408, "Request Timeout"),
    (409, "Conflict"),
    (410, "Gone"),
    (411, "Length Required"),
    (412, "Precondition Failed"),
    (413, "Request Entity Too Large"),
    (414, "Request-URI Too Long"),
    (415, "Unsupported Media Type"),
    (416, "Requested Range Not Satisfiable"),
    (417, "Expectation Failed"),
    (500, "Internal Server Error"),
    (501, "Not Implemented"),
    (502, "Bad Gateway"),
    (503, "Service Unavailable"),
    (504, "Gateway Timeout"),
    (505, "HTTP Version Not Supported"),
];

/// ステータスコードに対応する reason-phrase を取得
pub fn reason_phrase(code: u16) -> Option<&'static str> {
    STATUS_CODES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, phrase)| *phrase)
}

/// ステータスラインを生成
///
/// バージョンは常に `HTTP/1.1` になる。テーブルにないコードは reason-phrase なしで出力する。
pub fn status_line(code: u16) -> String {
    match reason_phrase(code) {
        Some(phrase) => format!("HTTP/1.1 {} {}", code, phrase),
        None => format!("HTTP/1.1 {}", code),
    }
}

/// 正常なレスポンスかどうか
///
/// 2xx と 3xx を正常とみなす。ただし 305 Use Proxy は除く。
pub fn is_ok(code: u16) -> bool {
    (200..400).contains(&code) && code != 305
}

/// リダイレクトレスポンスかどうか (305 Use Proxy を除く 3xx)
pub fn is_redirect(code: u16) -> bool {
    (300..400).contains(&code) && code != 305
}

/// 既知のステータスコードをすべて返す
pub fn known_codes() -> impl Iterator<Item = u16> {
    STATUS_CODES.iter().map(|(code, _)| *code)
}
