//! 積み重ね可能な HTTP ヘッダーブロック
//!
//! ## 概要
//!
//! [`HeaderBlock`] はステータスライン (またはリクエストライン) とヘッダーの集合を保持し、
//! リダイレクトで経由した過去のブロックを `previous` として連結します。
//!
//! - ヘッダー名は小文字で保持し、大文字小文字を区別せずに一意
//! - 同じ名前のヘッダーを追加するとリストになる (`cookie` は Cookie 名単位でマージ)
//! - 連結されたブロックは古いものから順に、空行区切りでシリアライズされる
//!
//! ## 使い方
//!
//! ```rust
//! use hopchain::HeaderBlock;
//!
//! let raw = "HTTP/1.1 302 Found\r\n\
//!            Location: /next\r\n\
//!            \r\n\
//!            HTTP/1.1 200 OK\r\n\
//!            Content-Type: text/plain\r\n\
//!            \r\n\
//!            hello";
//!
//! let (headers, body) = HeaderBlock::parse_document(raw);
//! assert_eq!(body, "hello");
//! assert_eq!(headers.status_code(), Some(200));
//! assert!(headers.ok());
//!
//! let previous = headers.previous().unwrap();
//! assert_eq!(previous.status_code(), Some(302));
//! assert_eq!(previous.first("location"), Some("/next"));
//! assert_eq!(headers.depth(), 2);
//! ```

use core::fmt;

use crate::cookie::{Cookie, SetCookie};
use crate::date::unix_now;
use crate::request::{RequestLine, is_http_version};
use crate::status;

/// ブロック先頭行 (slot 0)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartLine {
    /// レスポンスのステータスコード
    Status(u16),
    /// リクエストライン
    Request(RequestLine),
}

impl StartLine {
    /// ステータスラインまたはリクエストラインをパース
    ///
    /// ステータスラインは `HTTP/x[.y] <3 桁のコード> [reason-phrase]`、
    /// リクエストラインは `<METHOD> <target> HTTP/x.y` の形式。
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let mut parts = line.splitn(3, ' ');
        let first = parts.next()?;
        if is_http_version(first) {
            let code = parts.next()?;
            if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            return code.parse().ok().map(StartLine::Status);
        }
        RequestLine::parse(line).map(StartLine::Request)
    }
}

impl fmt::Display for StartLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // reason-phrase は固定テーブルから生成する
            StartLine::Status(code) => f.write_str(&status::status_line(*code)),
            StartLine::Request(line) => write!(f, "{}", line),
        }
    }
}

/// ヘッダー値 (単一または複数)
///
/// [`HeaderBlock`] が保持する値は常に 1 つ以上あるが、`Multiple` を直接作れば
/// 空にもなり得る。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Single(String),
    Multiple(Vec<String>),
}

impl HeaderValue {
    /// すべての値を出現順に返す
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let values: &[String] = match self {
            HeaderValue::Single(value) => core::slice::from_ref(value),
            HeaderValue::Multiple(values) => values,
        };
        values.iter().map(String::as_str)
    }

    /// 最初の値
    pub fn first(&self) -> &str {
        self.iter().next().unwrap_or("")
    }

    /// 値の数
    pub fn len(&self) -> usize {
        match self {
            HeaderValue::Single(_) => 1,
            HeaderValue::Multiple(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, value: String) {
        match self {
            HeaderValue::Single(existing) => {
                let first = core::mem::take(existing);
                *self = HeaderValue::Multiple(vec![first, value]);
            }
            HeaderValue::Multiple(values) => values.push(value),
        }
    }
}

/// 既存のヘッダーに同名の値を追加するときの方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeStrategy {
    /// リストに追加
    Append,
    /// Cookie 名単位の和集合 (後から来た値が優先)
    CookieUnion,
}

fn merge_strategy(name: &str) -> MergeStrategy {
    match name {
        "cookie" => MergeStrategy::CookieUnion,
        _ => MergeStrategy::Append,
    }
}

/// HTTP ヘッダーブロック
///
/// `previous` は 1 つ前のホップのブロックを所有する。連結は有限で循環しない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderBlock {
    start_line: Option<StartLine>,
    fields: Vec<(String, HeaderValue)>,
    previous: Option<Box<HeaderBlock>>,
}

impl HeaderBlock {
    /// 空のヘッダーブロックを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// ヘッダーテキストをパース (ボディは捨てる)
    pub fn parse(text: &str) -> Self {
        Self::parse_document(text).0
    }

    /// ヘッダーテキストをパースし、ブロックとボディを返す
    ///
    /// 行区切りは `\r\n`、`\r`、`\n` のいずれも受け付ける。
    /// 空行の後、次の空でない行がステータスラインかリクエストラインなら新しいブロックとして続け、
    /// そうでなければ空行以降の文字列をそのままボディとして返す。
    pub fn parse_document(text: &str) -> (Self, String) {
        let mut lines = Vec::new();
        let mut ends = Vec::new();
        let mut rest = text;
        let mut offset = 0;
        while !rest.is_empty() {
            let (line, terminator) = match rest.find(['\r', '\n']) {
                Some(pos) if rest[pos..].starts_with("\r\n") => (&rest[..pos], 2),
                Some(pos) => (&rest[..pos], 1),
                None => (rest, 0),
            };
            let consumed = line.len() + terminator;
            offset += consumed;
            lines.push(line);
            ends.push(offset);
            rest = &rest[consumed..];
        }

        let mut block = HeaderBlock::new();
        match block.consume_lines(&lines) {
            Some(blank) => {
                let body = text[ends[blank]..].to_string();
                (block, body)
            }
            None => (block, String::new()),
        }
    }

    /// 行の配列をパースし、ブロックとボディを返す
    ///
    /// ボディは境界の空行より後の行を `\n` で連結したもの。
    pub fn from_lines<I, S>(lines: I) -> (Self, String)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let owned: Vec<S> = lines.into_iter().collect();
        let lines: Vec<&str> = owned.iter().map(AsRef::as_ref).collect();

        let mut block = HeaderBlock::new();
        match block.consume_lines(&lines) {
            Some(blank) => {
                let body = lines[blank + 1..].join("\n");
                (block, body)
            }
            None => (block, String::new()),
        }
    }

    /// 行を順に取り込み、ボディ境界となった空行の位置を返す
    fn consume_lines(&mut self, lines: &[&str]) -> Option<usize> {
        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];
            if line.trim().is_empty() {
                let next = lines[i + 1..]
                    .iter()
                    .position(|l| !l.trim().is_empty())
                    .map(|p| i + 1 + p);
                match next {
                    Some(next) if StartLine::parse(lines[next]).is_some() => {
                        i = next;
                        continue;
                    }
                    _ => return Some(i),
                }
            }
            self.consume_line(line);
            i += 1;
        }
        None
    }

    fn consume_line(&mut self, line: &str) {
        let line = line.trim();
        if let Some(start) = StartLine::parse(line) {
            self.push_start_line(start);
            return;
        }
        match line.split_once(':') {
            Some((name, value)) => {
                let name = name.trim();
                if name.is_empty() {
                    return;
                }
                self.add_field(name, value.trim());
            }
            // コロンのない行は行全体を名前として空の値で保持する
            None => self.add_field(line, ""),
        }
    }

    /// ヘッダーを追加
    ///
    /// `key` が空文字列か `"0"` の場合は slot 0 (ステータスコード、ステータスライン、
    /// リクエストライン) として扱い、[`push_start_line`](Self::push_start_line) と同じく
    /// 既存の内容を `previous` に移してから新しいブロックを始める。
    /// slot 0 として解釈できない値は無視する。
    ///
    /// 既に同じ名前がある場合はリストに追加する。`cookie` は Cookie 名単位でマージする。
    pub fn add(&mut self, key: &str, value: &str) {
        if key.is_empty() || key == "0" {
            let value = value.trim();
            let start = match value.parse::<u16>() {
                Ok(code) => Some(StartLine::Status(code)),
                Err(_) => StartLine::parse(value),
            };
            if let Some(start) = start {
                self.push_start_line(start);
            }
            return;
        }
        self.add_field(key, value);
    }

    /// ヘッダーを追加 (ビルダー)
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.add(key, value);
        self
    }

    /// slot 0 に先頭行を設定
    ///
    /// 現在のブロックが空でなければ、ブロック全体を `previous` に移して新しいブロックを始める。
    pub fn push_start_line(&mut self, start: StartLine) {
        if !self.is_empty() {
            let current = core::mem::take(self);
            self.previous = Some(Box::new(current));
        }
        self.start_line = Some(start);
    }

    fn add_field(&mut self, key: &str, value: &str) {
        let key = key.to_ascii_lowercase();
        let Some(existing) = self.field_mut(&key) else {
            self.fields
                .push((key, HeaderValue::Single(value.to_string())));
            return;
        };

        match merge_strategy(&key) {
            MergeStrategy::Append => existing.push(value.to_string()),
            MergeStrategy::CookieUnion => {
                let mut pairs = cookie_pairs(existing.iter());
                for (name, v) in cookie_pairs(core::iter::once(value)) {
                    upsert(&mut pairs, name, v);
                }
                *existing = HeaderValue::Single(join_cookie_pairs(&pairs));
            }
        }
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut HeaderValue> {
        self.fields
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value)
    }

    fn set_field(&mut self, key: &str, value: &str) {
        let value = HeaderValue::Single(value.to_string());
        match self.field_mut(key) {
            Some(existing) => *existing = value,
            None => self.fields.push((key.to_ascii_lowercase(), value)),
        }
    }

    fn remove_field(&mut self, key: &str) {
        self.fields.retain(|(name, _)| !name.eq_ignore_ascii_case(key));
    }

    /// このブロックと `previous` のすべてのブロックで `key` を `value` に置き換える
    ///
    /// `key` が空文字列か `"0"` の場合は各ブロックの slot 0 を置き換える。
    pub fn override_header(&mut self, key: &str, value: &str) {
        let slot0 = key.is_empty() || key == "0";
        let start = if slot0 {
            match value.trim().parse::<u16>() {
                Ok(code) => Some(StartLine::Status(code)),
                Err(_) => StartLine::parse(value),
            }
        } else {
            None
        };

        let mut block = Some(self);
        while let Some(current) = block {
            if slot0 {
                if let Some(start) = &start {
                    current.start_line = Some(start.clone());
                }
            } else {
                current.set_field(key, value);
            }
            block = current.previous.as_deref_mut();
        }
    }

    /// このブロックと `previous` のすべてのブロックから `key` を削除
    pub fn erase(&mut self, key: &str) {
        let slot0 = key.is_empty() || key == "0";
        let mut block = Some(self);
        while let Some(current) = block {
            if slot0 {
                current.start_line = None;
            } else {
                current.remove_field(key);
            }
            block = current.previous.as_deref_mut();
        }
    }

    /// テキストにシリアライズ
    ///
    /// 先頭行、ヘッダー (1 値 1 行) の順に `\r\n` 区切りで出力する。
    /// `include_previous` が true の場合は、古いブロックから順に空行で区切って出力する。
    pub fn to_text(&self, include_previous: bool) -> String {
        let mut out = String::new();
        if include_previous {
            if let Some(previous) = &self.previous {
                out.push_str(&previous.to_text(true));
                out.push_str("\r\n");
            }
        }
        if let Some(start) = &self.start_line {
            out.push_str(&start.to_string());
            out.push_str("\r\n");
        }
        for (name, value) in &self.fields {
            let name = capitalize(name);
            for v in value.iter() {
                out.push_str(&name);
                out.push(':');
                if !v.is_empty() {
                    out.push(' ');
                    out.push_str(v);
                }
                out.push_str("\r\n");
            }
        }
        out
    }

    /// ヘッダー値を取得
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.fields
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// ヘッダーの最初の値を取得
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).map(HeaderValue::first)
    }

    /// ヘッダーのすべての値を取得
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.get(name).map(|v| v.iter().collect()).unwrap_or_default()
    }

    /// ヘッダーが存在するか
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// このブロックのヘッダーを追加順に返す (名前は小文字)
    pub fn fields(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// 先頭行もヘッダーもないか (`previous` は見ない)
    pub fn is_empty(&self) -> bool {
        self.start_line.is_none() && self.fields.is_empty()
    }

    /// slot 0 の先頭行
    pub fn start_line(&self) -> Option<&StartLine> {
        self.start_line.as_ref()
    }

    /// 1 つ前のブロック
    pub fn previous(&self) -> Option<&HeaderBlock> {
        self.previous.as_deref()
    }

    /// このブロックから古い方へ順にたどる
    pub fn chain(&self) -> Chain<'_> {
        Chain { next: Some(self) }
    }

    /// 古いブロックから順に返す
    pub fn hops(&self) -> Vec<&HeaderBlock> {
        let mut hops: Vec<&HeaderBlock> = self.chain().collect();
        hops.reverse();
        hops
    }

    /// 連結されたブロックの数 (このブロックを含む)
    pub fn depth(&self) -> usize {
        self.chain().count()
    }

    /// 連結の最も古い位置に `history` をつなぐ
    pub fn append_history(&mut self, history: HeaderBlock) {
        match &mut self.previous {
            Some(previous) => previous.append_history(history),
            None => self.previous = Some(Box::new(history)),
        }
    }

    /// ステータスコードを取得
    pub fn status_code(&self) -> Option<u16> {
        match self.start_line {
            Some(StartLine::Status(code)) => Some(code),
            _ => None,
        }
    }

    /// ステータスコードを設定 (連結はしない)
    pub fn set_status_code(&mut self, code: u16) {
        self.start_line = Some(StartLine::Status(code));
    }

    /// リクエストラインを取得
    pub fn request_line(&self) -> Option<&RequestLine> {
        match &self.start_line {
            Some(StartLine::Request(line)) => Some(line),
            _ => None,
        }
    }

    /// リクエストラインを設定 (連結はしない)
    pub fn set_request_line(&mut self, method: &str, target: &str) {
        self.start_line = Some(StartLine::Request(RequestLine::new(method, target)));
    }

    /// 正常なレスポンスか (2xx/3xx、305 を除く)
    pub fn ok(&self) -> bool {
        self.status_code().is_some_and(status::is_ok)
    }

    /// リダイレクトレスポンスか (3xx、305 を除く)
    pub fn is_redirect(&self) -> bool {
        self.status_code().is_some_and(status::is_redirect)
    }

    /// Set-Cookie ヘッダーを現在時刻基準でパース
    pub fn get_set_cookies(&self) -> Vec<SetCookie> {
        self.get_set_cookies_at(unix_now())
    }

    /// Set-Cookie ヘッダーをパース
    ///
    /// Max-Age は `now + max-age` の絶対時刻になる。パースできない値は読み飛ばす。
    pub fn get_set_cookies_at(&self, now: i64) -> Vec<SetCookie> {
        self.get_all("set-cookie")
            .into_iter()
            .filter_map(|value| SetCookie::parse_at(value, now).ok())
            .collect()
    }

    /// Cookie ヘッダーをパース
    pub fn get_cookies(&self) -> Vec<Cookie> {
        self.get_all("cookie")
            .into_iter()
            .filter_map(|value| Cookie::parse(value).ok())
            .flatten()
            .collect()
    }

    /// 期限切れでない Set-Cookie から Cookie ヘッダーだけのブロックを作る
    pub fn create_cookie_headers(&self) -> HeaderBlock {
        self.create_cookie_headers_at(unix_now())
    }

    /// 期限切れでない Set-Cookie から Cookie ヘッダーだけのブロックを作る
    ///
    /// 同じ名前の Cookie は後のものが優先される。
    pub fn create_cookie_headers_at(&self, now: i64) -> HeaderBlock {
        let mut pairs = Vec::new();
        for cookie in self.get_set_cookies_at(now) {
            if !cookie.is_expired(now) {
                upsert(&mut pairs, cookie.name().to_string(), cookie.value().to_string());
            }
        }

        let mut block = HeaderBlock::new();
        if !pairs.is_empty() {
            block.add("cookie", &join_cookie_pairs(&pairs));
        }
        block
    }

    /// Set-Cookie をこのブロックの Cookie ヘッダーに反映する
    ///
    /// 期限切れでない Cookie は追加または更新し、期限切れの Cookie は削除する。
    pub fn apply_set_cookies(&mut self, cookies: &[SetCookie], now: i64) {
        let mut pairs = cookie_pairs(self.get_all("cookie").into_iter());
        for cookie in cookies {
            if cookie.is_expired(now) {
                pairs.retain(|(name, _)| name != cookie.name());
            } else {
                upsert(&mut pairs, cookie.name().to_string(), cookie.value().to_string());
            }
        }

        if pairs.is_empty() {
            self.remove_field("cookie");
        } else {
            self.set_field("cookie", &join_cookie_pairs(&pairs));
        }
    }
}

impl fmt::Display for HeaderBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text(true))
    }
}

/// [`HeaderBlock::chain`] のイテレーター
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    next: Option<&'a HeaderBlock>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a HeaderBlock;

    fn next(&mut self) -> Option<Self::Item> {
        let block = self.next?;
        self.next = block.previous.as_deref();
        Some(block)
    }
}

/// `content-type` -> `Content-Type`
fn capitalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if upper {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
        upper = c == '-';
    }
    out
}

/// Cookie ヘッダー値を寛容に name=value の組へ分解する
///
/// `=` を含まない断片は読み飛ばす。
fn cookie_pairs<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for value in values {
        for pair in value.split(';') {
            if let Some((name, v)) = pair.split_once('=') {
                let name = name.trim();
                if !name.is_empty() {
                    upsert(&mut pairs, name.to_string(), v.trim().to_string());
                }
            }
        }
    }
    pairs
}

fn upsert(pairs: &mut Vec<(String, String)>, name: String, value: String) {
    match pairs.iter_mut().find(|(n, _)| *n == name) {
        Some((_, existing)) => *existing = value,
        None => pairs.push((name, value)),
    }
}

fn join_cookie_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_HOPS: &str = "HTTP/1.1 302 Found\r\n\
                            Location: /next\r\n\
                            Set-Cookie: a=1\r\n\
                            \r\n\
                            HTTP/1.1 200 OK\r\n\
                            Content-Type: text/html\r\n\
                            \r\n\
                            <p>done</p>";

    #[test]
    fn test_parse_single_block() {
        let (block, body) =
            HeaderBlock::parse_document("HTTP/1.1 404 Not Found\r\nContent-Length: 3\r\n\r\nabc");
        assert_eq!(block.status_code(), Some(404));
        assert_eq!(block.first("content-length"), Some("3"));
        assert_eq!(block.first("Content-Length"), Some("3"));
        assert_eq!(body, "abc");
        assert!(block.previous().is_none());
        assert!(!block.ok());
    }

    #[test]
    fn test_parse_chained_blocks() {
        let (block, body) = HeaderBlock::parse_document(TWO_HOPS);
        assert_eq!(body, "<p>done</p>");
        assert_eq!(block.status_code(), Some(200));
        assert_eq!(block.depth(), 2);

        let previous = block.previous().unwrap();
        assert_eq!(previous.status_code(), Some(302));
        assert!(previous.is_redirect());
        assert_eq!(previous.first("location"), Some("/next"));
        assert!(!block.contains("location"));
    }

    #[test]
    fn test_parse_mixed_line_endings() {
        let (block, body) =
            HeaderBlock::parse_document("HTTP/1.0 200 OK\nA: 1\rB: 2\r\n\nline1\r\nline2\n");
        assert_eq!(block.first("a"), Some("1"));
        assert_eq!(block.first("b"), Some("2"));
        assert_eq!(body, "line1\r\nline2\n");
    }

    #[test]
    fn test_parse_body_keeps_leading_blank_lines() {
        let (block, body) = HeaderBlock::parse_document("HTTP/1.1 200 OK\r\n\r\n\r\nbody");
        assert_eq!(block.status_code(), Some(200));
        assert_eq!(body, "\r\nbody");
    }

    #[test]
    fn test_parse_body_that_looks_like_header() {
        let (block, body) = HeaderBlock::parse_document("HTTP/1.1 200 OK\r\n\r\nName: value");
        assert!(!block.contains("name"));
        assert_eq!(body, "Name: value");
    }

    #[test]
    fn test_parse_without_body() {
        let (block, body) = HeaderBlock::parse_document("HTTP/1.1 204 No Content\r\nA: b\r\n");
        assert_eq!(block.status_code(), Some(204));
        assert_eq!(body, "");
    }

    #[test]
    fn test_from_lines() {
        let lines = [
            "HTTP/1.1 301 Moved Permanently",
            "Location: http://example.com/",
            "",
            "HTTP/1.1 200 OK",
            "X-Test: yes",
            "",
            "first",
            "second",
        ];
        let (block, body) = HeaderBlock::from_lines(lines);
        assert_eq!(block.status_code(), Some(200));
        assert_eq!(block.previous().unwrap().status_code(), Some(301));
        assert_eq!(body, "first\nsecond");
    }

    #[test]
    fn test_parse_request_line() {
        let block = HeaderBlock::parse("GET http://host/ HTTP/1.1\r\nHost: host\r\n\r\n");
        let line = block.request_line().unwrap();
        assert_eq!(line.method, "GET");
        assert_eq!(line.target, "http://host/");
        assert_eq!(block.status_code(), None);
        assert!(!block.contains("get http"));
    }

    #[test]
    fn test_parse_malformed_lines() {
        let block = HeaderBlock::parse("HTTP/1.1 200 OK\r\nGarbage Line\r\nX-Empty:\r\n: skipped\r\n");
        assert_eq!(block.first("garbage line"), Some(""));
        assert_eq!(block.first("x-empty"), Some(""));
        assert_eq!(block.fields().count(), 2);
    }

    #[test]
    fn test_add_listifies_repeated_names() {
        let mut block = HeaderBlock::new();
        block.add("Set-Cookie", "a=1");
        block.add("set-cookie", "b=2");
        block.add("SET-COOKIE", "c=3");
        assert_eq!(block.get_all("set-cookie"), vec!["a=1", "b=2", "c=3"]);
        assert_eq!(block.get("set-cookie").unwrap().len(), 3);
        assert_eq!(block.first("set-cookie"), Some("a=1"));
    }

    #[test]
    fn test_header_value_len() {
        let single = HeaderValue::Single("a".to_string());
        assert_eq!(single.len(), 1);
        assert!(!single.is_empty());

        let empty = HeaderValue::Multiple(Vec::new());
        assert_eq!(empty.len(), 0);
        assert!(empty.is_empty());
        assert_eq!(empty.first(), "");

        let block = HeaderBlock::new().with("accept", "a").with("accept", "b");
        let value = block.get("accept").unwrap();
        assert_eq!(value.len(), 2);
        assert!(!value.is_empty());
    }

    #[test]
    fn test_add_cookie_union() {
        let mut block = HeaderBlock::new();
        block.add("Cookie", "a=1; b=2");
        block.add("cookie", "b=3; c=4");
        assert_eq!(block.get_all("cookie"), vec!["a=1; b=3; c=4"]);
    }

    #[test]
    fn test_add_slot0_chains_blocks() {
        let mut block = HeaderBlock::new();
        block.add("0", "302");
        block.add("location", "/a");
        block.add("", "HTTP/1.1 200 OK");
        assert_eq!(block.status_code(), Some(200));
        assert_eq!(block.previous().unwrap().status_code(), Some(302));

        // 空のブロックでは連結しない
        let mut block = HeaderBlock::new();
        block.add("0", "200");
        assert_eq!(block.depth(), 1);

        // 解釈できない slot 0 は無視
        block.add("0", "not a start line");
        assert_eq!(block.status_code(), Some(200));
        assert_eq!(block.depth(), 1);
    }

    #[test]
    fn test_set_status_code_in_place() {
        let mut block = HeaderBlock::new().with("0", "200").with("a", "b");
        block.set_status_code(500);
        assert_eq!(block.status_code(), Some(500));
        assert_eq!(block.depth(), 1);
        block.set_request_line("POST", "/form");
        assert_eq!(block.request_line().unwrap().method, "POST");
        assert_eq!(block.depth(), 1);
    }

    #[test]
    fn test_override_propagates_through_chain() {
        let (mut block, _) = HeaderBlock::parse_document(TWO_HOPS);
        block.override_header("X-Retry", "1");
        block.override_header("location", "/forced");
        for hop in block.chain() {
            assert_eq!(hop.first("x-retry"), Some("1"));
            assert_eq!(hop.get_all("location"), vec!["/forced"]);
        }
    }

    #[test]
    fn test_erase_then_add() {
        let (mut block, _) = HeaderBlock::parse_document(TWO_HOPS);
        block.override_header("x-tag", "old");
        block.erase("X-Tag");
        assert!(block.chain().all(|hop| !hop.contains("x-tag")));

        block.add("x-tag", "new");
        assert_eq!(block.first("x-tag"), Some("new"));
        assert!(!block.previous().unwrap().contains("x-tag"));
    }

    #[test]
    fn test_to_text() {
        let block = HeaderBlock::new()
            .with("0", "200")
            .with("content-type", "text/plain")
            .with("x-multi", "1")
            .with("x-multi", "2")
            .with("x-empty", "");
        assert_eq!(
            block.to_text(false),
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nX-Multi: 1\r\nX-Multi: 2\r\nX-Empty:\r\n"
        );
    }

    #[test]
    fn test_to_text_with_previous() {
        let (block, _) = HeaderBlock::parse_document(TWO_HOPS);
        assert_eq!(
            block.to_text(true),
            "HTTP/1.1 302 Found\r\nLocation: /next\r\nSet-Cookie: a=1\r\n\r\n\
             HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n"
        );
        assert_eq!(block.to_string(), block.to_text(true));
        assert_eq!(
            block.to_text(false),
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n"
        );
    }

    #[test]
    fn test_roundtrip() {
        let (block, _) = HeaderBlock::parse_document(TWO_HOPS);
        assert_eq!(HeaderBlock::parse(&block.to_string()), block);
    }

    #[test]
    fn test_hops_oldest_first() {
        let block = HeaderBlock::parse(
            "HTTP/1.1 301 Moved Permanently\r\n\r\n\
             HTTP/1.1 302 Found\r\n\r\n\
             HTTP/1.1 200 OK\r\n",
        );
        let codes: Vec<_> = block.hops().iter().map(|h| h.status_code()).collect();
        assert_eq!(codes, vec![Some(301), Some(302), Some(200)]);
        let codes: Vec<_> = block.chain().map(|h| h.status_code()).collect();
        assert_eq!(codes, vec![Some(200), Some(302), Some(301)]);
    }

    #[test]
    fn test_append_history() {
        let mut current = HeaderBlock::parse("HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 200 OK\r\n");
        let history = HeaderBlock::parse("HTTP/1.1 303 See Other\r\nLocation: /x\r\n");
        current.append_history(history);
        let codes: Vec<_> = current.hops().iter().map(|h| h.status_code()).collect();
        assert_eq!(codes, vec![Some(303), Some(100), Some(200)]);
    }

    #[test]
    fn test_status_predicates() {
        assert!(HeaderBlock::new().with("0", "304").ok());
        assert!(!HeaderBlock::new().with("0", "305").ok());
        assert!(!HeaderBlock::new().with("0", "305").is_redirect());
        assert!(HeaderBlock::new().with("0", "307").is_redirect());
        assert!(!HeaderBlock::new().ok());
    }

    #[test]
    fn test_set_cookies_with_max_age() {
        let block = HeaderBlock::parse(
            "HTTP/1.1 200 OK\r\nSet-Cookie: a=1; Max-Age=0\r\nSet-Cookie: b=2; Max-Age=60\r\n",
        );
        let cookies = block.get_set_cookies_at(1000);
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].expires(), Some(1000));
        assert!(cookies[0].is_expired(1000));

        let request = block.create_cookie_headers_at(1000);
        assert_eq!(request.get_all("cookie"), vec!["b=2"]);
        assert!(request.start_line().is_none());
    }

    #[test]
    fn test_set_cookies_now() {
        let block = HeaderBlock::parse("HTTP/1.1 200 OK\r\nSet-Cookie: a=1; Max-Age=0\r\n");
        let cookies = block.get_set_cookies();
        assert!(cookies[0].expires().unwrap() <= unix_now());
        assert!(block.create_cookie_headers().is_empty());
    }

    #[test]
    fn test_create_cookie_headers_later_wins() {
        let block = HeaderBlock::new()
            .with("set-cookie", "a=1")
            .with("set-cookie", "a=2; Path=/")
            .with("set-cookie", "b=3");
        let request = block.create_cookie_headers_at(0);
        assert_eq!(request.first("cookie"), Some("a=2; b=3"));
    }

    #[test]
    fn test_get_cookies() {
        let block = HeaderBlock::new().with("cookie", "a=1; b=2");
        let cookies = block.get_cookies();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[1].name(), "b");
        assert_eq!(cookies[1].value(), "2");
    }

    #[test]
    fn test_apply_set_cookies() {
        let mut jar = HeaderBlock::new();
        let set = [
            SetCookie::parse_at("a=1", 0).unwrap(),
            SetCookie::parse_at("b=2", 0).unwrap(),
        ];
        jar.apply_set_cookies(&set, 0);
        assert_eq!(jar.first("cookie"), Some("a=1; b=2"));

        let set = [
            SetCookie::parse_at("a=9", 0).unwrap(),
            SetCookie::parse_at("b=gone; Max-Age=0", 10).unwrap(),
        ];
        jar.apply_set_cookies(&set, 10);
        assert_eq!(jar.first("cookie"), Some("a=9"));

        let set = [SetCookie::parse_at("a=x; Expires=Thu, 01 Jan 1970 00:00:01 GMT", 10).unwrap()];
        jar.apply_set_cookies(&set, 10);
        assert!(!jar.contains("cookie"));
    }

    #[test]
    fn test_start_line_parse() {
        assert_eq!(
            StartLine::parse("HTTP/1.1 418 I'm a teapot"),
            Some(StartLine::Status(418))
        );
        assert_eq!(StartLine::parse("HTTP/2 200"), Some(StartLine::Status(200)));
        assert_eq!(StartLine::parse("HTTP/1.1 20 OK"), None);
        assert_eq!(StartLine::parse("Location: /"), None);
        assert!(matches!(
            StartLine::parse("DELETE /item/1 HTTP/1.1"),
            Some(StartLine::Request(_))
        ));
        assert_eq!(StartLine::Status(418).to_string(), "HTTP/1.1 418");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("content-type"), "Content-Type");
        assert_eq!(capitalize("x-forwarded-for"), "X-Forwarded-For");
        assert_eq!(capitalize("www-authenticate"), "Www-Authenticate");
    }
}
