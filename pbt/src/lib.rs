//! PBT テスト共通ユーティリティ

use proptest::prelude::*;

// ========================================
// ヘッダー生成
// ========================================

/// ヘッダー名 (小文字、cookie はマージ規則が異なるので除く)
pub fn header_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,15}".prop_filter("exclude cookie", |s| s != "cookie")
}

/// ヘッダー値 (空白を含まない)
pub fn header_value() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9;=/._,-]{1,24}".prop_map(|s| s)
}

/// ヘッダーフィールドのリスト
pub fn header_fields() -> impl Strategy<Value = Vec<(String, String)>> {
    proptest::collection::vec((header_name(), header_value()), 0..6)
}

/// ステータスコード (100-599)
pub fn status_code() -> impl Strategy<Value = u16> {
    100u16..=599
}

/// 1 ホップ分のレスポンス (ステータスコードとヘッダー)
pub fn hop() -> impl Strategy<Value = (u16, Vec<(String, String)>)> {
    (status_code(), header_fields())
}

/// 1-5 ホップのレスポンス列 (古い順)
pub fn hops() -> impl Strategy<Value = Vec<(u16, Vec<(String, String)>)>> {
    proptest::collection::vec(hop(), 1..=5)
}

// ========================================
// Cookie 生成
// ========================================

/// Cookie 名 (token)
pub fn cookie_name() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_-]{0,15}".prop_map(|s| s)
}

/// Cookie 値 (cookie-octet)
pub fn cookie_value() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{0,32}".prop_map(|s| s)
}

// ========================================
// 時刻生成
// ========================================

/// 1970-01-01 から 2099-12-31 までの Unix タイムスタンプ
pub fn unix_timestamp() -> impl Strategy<Value = i64> {
    0i64..4_102_444_800
}
