//! リダイレクト追跡クライアント
//!
//! ## 概要
//!
//! [`HttpTransport`] を使って `Location` をホップ数の上限まで追跡する。
//! 経由したレスポンスのヘッダーブロックは `previous` でつながった 1 つの連結として保持し、
//! `Set-Cookie` で受け取った Cookie は以降のリクエストに付ける。期限切れの Cookie は送信時に除く。
//!
//! ## 使い方
//!
//! ```no_run
//! use hopchain_client::RedirectingClient;
//!
//! let mut client = RedirectingClient::new("http://example.com/")?;
//! let document = client.get_document()?;
//! for hop in document.headers().hops() {
//!     println!("{:?}", hop.status_code());
//! }
//! println!("{}", document.body());
//! # Ok::<(), hopchain_client::Error>(())
//! ```

use hopchain::chunked::decode_body;
use hopchain::cookie::CookieJar;
use hopchain::date::unix_now;
use hopchain::uri::resolve_location;
use hopchain::{HeaderBlock, Method, RequestBody};

use crate::error::{Error, Result};
use crate::socket::SocketTransport;
use crate::transport::{HttpTransport, TransportConfig};

/// デフォルトのホップ数上限
pub const DEFAULT_MAX_HOPS: usize = 10;

/// 取得したドキュメント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    headers: HeaderBlock,
    body: String,
    raw: String,
    uri: String,
}

impl Document {
    /// 最終レスポンスのヘッダー (経由したホップは `previous` にある)
    pub fn headers(&self) -> &HeaderBlock {
        &self.headers
    }

    /// 最終レスポンスのボディ (chunked はデコード済み)
    pub fn body(&self) -> &str {
        &self.body
    }

    /// 各ホップのヘッダーを先頭に連結した受信テキスト
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// 最終的な URI
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// 最終レスポンスのステータスコード
    pub fn status_code(&self) -> Option<u16> {
        self.headers.status_code()
    }

    /// 最終レスポンスが正常か (2xx/3xx、305 を除く)
    pub fn ok(&self) -> bool {
        self.headers.ok()
    }

    /// ボディを取り出す
    pub fn into_body(self) -> String {
        self.body
    }
}

/// リダイレクト追跡クライアント
pub struct RedirectingClient<T: HttpTransport = SocketTransport> {
    transport: T,
    uri: Option<String>,
    follow_redirects: bool,
    max_hops: usize,
    cookies: CookieJar,
    clock: fn() -> i64,
    last_headers: Option<HeaderBlock>,
}

impl RedirectingClient<SocketTransport> {
    /// デフォルト設定のソケットトランスポートで作成
    pub fn new(uri: &str) -> Result<Self> {
        Self::with_config(uri, TransportConfig::new())
    }

    /// 設定を指定して作成
    pub fn with_config(uri: &str, config: TransportConfig) -> Result<Self> {
        let mut client = Self::with_transport(SocketTransport::with_config(config));
        client.set_uri(uri)?;
        Ok(client)
    }
}

impl<T: HttpTransport> RedirectingClient<T> {
    /// トランスポートを指定して作成
    ///
    /// トランスポートに URI が設定されていればそれを使う。
    pub fn with_transport(transport: T) -> Self {
        let uri = transport.uri().map(str::to_string);
        Self {
            transport,
            uri,
            follow_redirects: true,
            max_hops: DEFAULT_MAX_HOPS,
            cookies: CookieJar::new(),
            clock: unix_now,
            last_headers: None,
        }
    }

    /// リダイレクトを追跡するかを設定
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// 1 回の要求で行う交換の最大回数を設定 (最小 1)
    pub fn max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops.max(1);
        self
    }

    pub fn set_follow_redirects(&mut self, follow: bool) {
        self.follow_redirects = follow;
    }

    pub fn set_max_hops(&mut self, max_hops: usize) {
        self.max_hops = max_hops.max(1);
    }

    /// 対象 URI を設定
    pub fn set_uri(&mut self, uri: &str) -> Result<()> {
        self.transport.set_uri(uri)?;
        self.uri = Some(uri.trim().to_string());
        Ok(())
    }

    /// 現在の対象 URI (リダイレクト後は移動先)
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    /// 受け取った Cookie のジャー
    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    pub fn cookies_mut(&mut self) -> &mut CookieJar {
        &mut self.cookies
    }

    /// Cookie のジャーを置き換える
    pub fn set_cookies(&mut self, cookies: CookieJar) {
        self.cookies = cookies;
    }

    /// Cookie の有効期限の判定に使う時刻 (Unix タイムスタンプ) の取得元を設定
    pub fn set_clock(&mut self, clock: fn() -> i64) {
        self.clock = clock;
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// 直近の要求で受け取ったヘッダーの連結
    ///
    /// トランスポートが失敗した場合は `None`。
    pub fn headers(&self) -> Option<&HeaderBlock> {
        self.last_headers.as_ref()
    }

    /// 直近の要求でレスポンスを受け取れたか
    pub fn connection_ok(&self) -> bool {
        self.last_headers.is_some()
    }

    /// 直近の最終レスポンスが正常か
    pub fn response_ok(&self) -> bool {
        self.last_headers.as_ref().is_some_and(HeaderBlock::ok)
    }

    /// 直近のトランスポートの失敗理由
    pub fn last_error(&self) -> Option<&str> {
        self.transport.last_error()
    }

    /// GET で追加ヘッダーなしにドキュメントを取得
    pub fn get_document(&mut self) -> Result<Document> {
        self.request_document(Method::Get, &RequestBody::Empty, None)
    }

    /// ヘッダーの連結だけを取得 (`None` の場合は HEAD)
    pub fn read_headers(&mut self, method: Option<Method>) -> Result<HeaderBlock> {
        let method = method.unwrap_or(Method::Head);
        let document = self.request_document(method, &RequestBody::Empty, None)?;
        Ok(document.headers)
    }

    /// リクエストを送信し、リダイレクトを追跡してドキュメントを取得
    ///
    /// トランスポートが失敗した場合はすぐに `Err` を返し、`headers()` は `None` になる。
    /// 上限までリダイレクトが続いた場合は `Error::TooManyRedirects` を返し、
    /// それまでの連結を `headers()` に残す。
    pub fn request_document(
        &mut self,
        method: Method,
        body: &RequestBody,
        headers: Option<&HeaderBlock>,
    ) -> Result<Document> {
        self.last_headers = None;
        let mut current = self
            .uri
            .clone()
            .ok_or_else(|| Error::InvalidUrl("no URI has been set".to_string()))?;

        let empty = RequestBody::Empty;
        let mut method = method;
        let mut body: &RequestBody = body;
        let mut referer: Option<String> = None;
        let mut history: Option<HeaderBlock> = None;
        let mut raw_prefix = String::new();

        for hop in 1..=self.max_hops {
            if self.transport.uri() != Some(current.as_str()) {
                if let Err(e) = self.transport.set_uri(&current) {
                    self.last_headers = history;
                    return Err(e);
                }
            }
            self.uri = Some(current.clone());

            let request = self.request_headers(headers, referer.as_deref());
            log::debug!("hop {}: {} {}", hop, method, current);
            let raw = self.transport.exchange(method, body, &request)?;

            let text = String::from_utf8_lossy(&raw);
            let (mut response, body_text) = HeaderBlock::parse_document(&text);
            let now = (self.clock)();
            self.cookies.store_all(response.get_set_cookies_at(now), now);

            let location = if self.follow_redirects && response.is_redirect() {
                let location = response.first("location").map(str::to_string);
                if location.is_none() {
                    log::warn!(
                        "redirect {:?} from {} has no Location",
                        response.status_code(),
                        current
                    );
                }
                location
            } else {
                None
            };

            let Some(location) = location else {
                if let Some(history) = history.take() {
                    response.append_history(history);
                }
                self.last_headers = Some(response.clone());

                let body_bytes = body_slice(&raw, &text, &body_text);
                let decoded = if method.expects_response_body() {
                    decode_body(&response, body_bytes)?
                } else {
                    Vec::new()
                };

                raw_prefix.push_str(&text);
                return Ok(Document {
                    headers: response,
                    body: String::from_utf8_lossy(&decoded).into_owned(),
                    raw: raw_prefix,
                    uri: current,
                });
            };

            if let Some(history) = history.take() {
                response.append_history(history);
            }
            if hop == self.max_hops {
                log::warn!(
                    "giving up on {} after {} exchanges",
                    current,
                    self.max_hops
                );
                self.last_headers = Some(response);
                return Err(Error::TooManyRedirects {
                    limit: self.max_hops,
                });
            }

            let next = match resolve_location(&current, &location) {
                Ok(next) => next,
                Err(e) => {
                    self.last_headers = Some(response);
                    return Err(e.into());
                }
            };
            log::debug!("{:?} redirect to {}", response.status_code(), next);

            // 303 は GET に、POST への 301/302 も GET に切り替える
            let status = response.status_code().unwrap_or(0);
            let switch_to_get = (status == 303 && method != Method::Head)
                || (matches!(status, 301 | 302) && method == Method::Post);
            if switch_to_get {
                method = Method::Get;
                body = &empty;
            }

            raw_prefix.push_str(&response.to_text(false));
            raw_prefix.push_str("\r\n");
            history = Some(response);
            referer = Some(current);
            current = next;
        }

        Err(Error::TooManyRedirects {
            limit: self.max_hops,
        })
    }

    /// 呼び出し側のヘッダーに Cookie と Referer を加える
    fn request_headers(
        &self,
        headers: Option<&HeaderBlock>,
        referer: Option<&str>,
    ) -> HeaderBlock {
        let mut request = HeaderBlock::new();
        if let Some(headers) = headers {
            for (name, value) in headers.fields() {
                for v in value.iter() {
                    request.add(name, v);
                }
            }
        }
        // 保存後に期限が来た Cookie は送らない
        if let Some(cookie) = self.cookies.header_value_at((self.clock)()) {
            request.add("cookie", &cookie);
        }
        if let Some(referer) = referer {
            request.override_header("referer", referer);
        }
        request
    }
}

/// パース済みボディに対応する生のバイト列を取り出す
///
/// 不正な UTF-8 で位置がずれた場合はパース済みのテキストを使う。
fn body_slice<'a>(raw: &'a [u8], text: &'a str, body: &'a str) -> &'a [u8] {
    let header_len = text.len() - body.len();
    if raw.get(..header_len) == Some(text[..header_len].as_bytes()) {
        &raw[header_len..]
    } else {
        body.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicI64, Ordering};

    use super::*;

    #[derive(Debug)]
    struct Sent {
        method: Method,
        uri: String,
        headers: HeaderBlock,
        body: RequestBody,
    }

    #[derive(Default)]
    struct ScriptedTransport {
        uri: Option<String>,
        responses: VecDeque<Result<Vec<u8>>>,
        sent: Vec<Sent>,
        last_error: Option<String>,
    }

    impl ScriptedTransport {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: responses
                    .iter()
                    .map(|r| Ok(r.as_bytes().to_vec()))
                    .collect(),
                ..Default::default()
            }
        }
    }

    impl HttpTransport for ScriptedTransport {
        fn set_uri(&mut self, uri: &str) -> Result<()> {
            self.uri = Some(uri.to_string());
            Ok(())
        }

        fn uri(&self) -> Option<&str> {
            self.uri.as_deref()
        }

        fn exchange(
            &mut self,
            method: Method,
            body: &RequestBody,
            headers: &HeaderBlock,
        ) -> Result<Vec<u8>> {
            self.sent.push(Sent {
                method,
                uri: self.uri.clone().unwrap_or_default(),
                headers: headers.clone(),
                body: body.clone(),
            });
            let response = self
                .responses
                .pop_front()
                .unwrap_or(Err(Error::ConnectionClosed));
            if let Err(e) = &response {
                self.last_error = Some(e.to_string());
            }
            response
        }

        fn last_error(&self) -> Option<&str> {
            self.last_error.as_deref()
        }

        fn reset(&mut self) {
            self.last_error = None;
        }
    }

    fn client(uri: &str, responses: &[&str]) -> RedirectingClient<ScriptedTransport> {
        let mut client = RedirectingClient::with_transport(ScriptedTransport::new(responses));
        client.set_uri(uri).unwrap();
        client
    }

    fn redirect(status: u16, location: &str) -> String {
        format!("HTTP/1.1 {} Found\r\nLocation: {}\r\n\r\n", status, location)
    }

    #[test]
    fn test_single_response() {
        let mut client = client(
            "http://a.test/",
            &["HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n<html></html>"],
        );
        let document = client.get_document().unwrap();
        assert!(document.ok());
        assert_eq!(document.status_code(), Some(200));
        assert_eq!(document.body(), "<html></html>");
        assert_eq!(document.uri(), "http://a.test/");
        assert_eq!(document.headers().depth(), 1);
        assert!(client.connection_ok());
        assert!(client.response_ok());
    }

    #[test]
    fn test_follow_redirect_chain() {
        let r1 = redirect(301, "/b");
        let r2 = redirect(302, "http://c.test/final");
        let mut client = client(
            "http://a.test/a",
            &[r1.as_str(), r2.as_str(), "HTTP/1.1 200 OK\r\n\r\ndone"],
        );
        let document = client.get_document().unwrap();

        assert_eq!(document.body(), "done");
        assert_eq!(document.uri(), "http://c.test/final");
        assert_eq!(client.uri(), Some("http://c.test/final"));

        let codes: Vec<_> = document
            .headers()
            .hops()
            .iter()
            .map(|h| h.status_code())
            .collect();
        assert_eq!(codes, vec![Some(301), Some(302), Some(200)]);

        let sent = &client.transport().sent;
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[1].uri, "http://a.test/b");
        assert_eq!(sent[1].headers.first("referer"), Some("http://a.test/a"));
        assert_eq!(sent[2].uri, "http://c.test/final");

        // 各ホップのヘッダーが最終レスポンスの前に連結される
        assert!(
            document
                .raw()
                .starts_with("HTTP/1.1 301 Moved Permanently\r\nLocation: /b\r\n\r\n")
        );
        assert!(document.raw().ends_with("HTTP/1.1 200 OK\r\n\r\ndone"));
        let (reparsed, body) = HeaderBlock::parse_document(document.raw());
        assert_eq!(reparsed.depth(), 3);
        assert_eq!(body, "done");
    }

    #[test]
    fn test_relative_location_with_dot_segments() {
        let r1 = redirect(302, "../sibling");
        let mut client = client("http://host/a/b/", &[r1.as_str(), "HTTP/1.1 200 OK\r\n\r\n"]);
        client.get_document().unwrap();
        assert_eq!(client.transport().sent[1].uri, "http://host/sibling");
    }

    #[test]
    fn test_redirect_not_followed() {
        let r1 = redirect(302, "/elsewhere");
        let mut client = client("http://a.test/", &[r1.as_str()]).follow_redirects(false);
        let document = client.get_document().unwrap();
        assert_eq!(document.status_code(), Some(302));
        assert!(document.ok());
        assert_eq!(client.transport().sent.len(), 1);
    }

    #[test]
    fn test_redirect_without_location_is_terminal() {
        let mut client = client("http://a.test/", &["HTTP/1.1 302 Found\r\n\r\nmoved"]);
        let document = client.get_document().unwrap();
        assert_eq!(document.status_code(), Some(302));
        assert_eq!(document.body(), "moved");
        assert_eq!(client.transport().sent.len(), 1);
    }

    #[test]
    fn test_too_many_redirects() {
        let r = redirect(302, "/loop");
        let responses: Vec<&str> = (0..20).map(|_| r.as_str()).collect();
        let mut client = client("http://a.test/loop", &responses);

        let result = client.get_document();
        assert!(matches!(
            result,
            Err(Error::TooManyRedirects { limit: 10 })
        ));
        assert_eq!(client.transport().sent.len(), 10);
        assert!(client.connection_ok());
        assert!(client.headers().is_some_and(HeaderBlock::is_redirect));
        assert_eq!(client.headers().map(HeaderBlock::depth), Some(10));
    }

    #[test]
    fn test_max_hops_bound() {
        let r = redirect(302, "/next");
        let mut client =
            client("http://a.test/", &[r.as_str(), r.as_str(), "HTTP/1.1 200 OK\r\n\r\n"])
                .max_hops(2);
        assert!(matches!(
            client.get_document(),
            Err(Error::TooManyRedirects { limit: 2 })
        ));
        assert_eq!(client.transport().sent.len(), 2);
    }

    #[test]
    fn test_transport_failure() {
        let mut client = client("http://a.test/", &[]);
        assert!(matches!(
            client.get_document(),
            Err(Error::ConnectionClosed)
        ));
        assert!(client.headers().is_none());
        assert!(!client.connection_ok());
        assert!(!client.response_ok());
        assert_eq!(client.last_error(), Some("connection closed"));
    }

    #[test]
    fn test_http_error_status_is_not_an_error() {
        let mut client = client(
            "http://a.test/",
            &["HTTP/1.1 500 Internal Server Error\r\n\r\noops"],
        );
        let document = client.get_document().unwrap();
        assert!(!document.ok());
        assert_eq!(document.body(), "oops");
        assert!(client.connection_ok());
        assert!(!client.response_ok());
    }

    #[test]
    fn test_cookies_carried_across_hops() {
        let r1 = "HTTP/1.1 302 Found\r\n\
                  Location: /home\r\n\
                  Set-Cookie: session=abc; Path=/\r\n\
                  Set-Cookie: old=1; Max-Age=0\r\n\
                  \r\n";
        let mut client = client("http://a.test/login", &[r1, "HTTP/1.1 200 OK\r\n\r\n"]);
        let initial = HeaderBlock::new().with("cookie", "old=0; lang=en");
        client.set_cookies(CookieJar::from_cookies(initial.get_cookies()));

        let headers = HeaderBlock::new().with("accept", "text/html");
        client
            .request_document(Method::Get, &RequestBody::Empty, Some(&headers))
            .unwrap();

        let sent = &client.transport().sent;
        assert_eq!(sent[0].headers.first("cookie"), Some("old=0; lang=en"));
        assert_eq!(sent[1].headers.first("cookie"), Some("lang=en; session=abc"));
        assert_eq!(sent[1].headers.first("accept"), Some("text/html"));
        assert_eq!(
            client.cookies().header_value_at(unix_now()).as_deref(),
            Some("lang=en; session=abc")
        );
    }

    static CLOCK: AtomicI64 = AtomicI64::new(1_000);

    fn test_clock() -> i64 {
        CLOCK.load(Ordering::SeqCst)
    }

    #[test]
    fn test_expired_cookie_not_sent() {
        let ok = "HTTP/1.1 200 OK\r\n\r\n";
        let mut client = client(
            "http://a.test/",
            &[
                "HTTP/1.1 200 OK\r\nSet-Cookie: short=1; Max-Age=1\r\nSet-Cookie: long=2; Max-Age=60\r\n\r\n",
                ok,
                ok,
            ],
        );
        client.set_clock(test_clock);

        client.get_document().unwrap();
        client.get_document().unwrap();
        assert_eq!(
            client.transport().sent[1].headers.first("cookie"),
            Some("short=1; long=2")
        );

        // Max-Age=1 の期限を過ぎた後は送らない
        CLOCK.store(1_002, Ordering::SeqCst);
        client.get_document().unwrap();
        assert_eq!(
            client.transport().sent[2].headers.first("cookie"),
            Some("long=2")
        );
        assert_eq!(client.cookies().len(), 2);
    }

    #[test]
    fn test_post_redirect_switches_to_get() {
        let r1 = redirect(303, "/result");
        let mut client = client(
            "http://a.test/form",
            &[r1.as_str(), "HTTP/1.1 200 OK\r\n\r\n"],
        );
        let body = RequestBody::form([("a", "1")]);
        client.request_document(Method::Post, &body, None).unwrap();

        let sent = &client.transport().sent;
        assert_eq!(sent[0].method, Method::Post);
        assert_eq!(sent[0].body, body);
        assert_eq!(sent[1].method, Method::Get);
        assert_eq!(sent[1].body, RequestBody::Empty);
    }

    #[test]
    fn test_put_307_keeps_method_and_body() {
        let r1 = redirect(307, "/v2");
        let mut client = client(
            "http://a.test/v1",
            &[r1.as_str(), "HTTP/1.1 204 No Content\r\n\r\n"],
        );
        let body = RequestBody::from("payload");
        client.request_document(Method::Put, &body, None).unwrap();

        let sent = &client.transport().sent;
        assert_eq!(sent[1].method, Method::Put);
        assert_eq!(sent[1].body, body);
    }

    #[test]
    fn test_chunked_body_decoded() {
        let mut client = client(
            "http://a.test/",
            &["HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nHello\r\n0\r\n\r\n"],
        );
        let document = client.get_document().unwrap();
        assert_eq!(document.body(), "Hello");
    }

    #[test]
    fn test_read_headers_uses_head() {
        let mut client = client(
            "http://a.test/",
            &["HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\n"],
        );
        let headers = client.read_headers(None).unwrap();
        assert_eq!(headers.first("content-length"), Some("10"));
        assert_eq!(client.transport().sent[0].method, Method::Head);
    }

    #[test]
    fn test_interim_response_is_kept_in_chain() {
        let mut client = client(
            "http://a.test/",
            &["HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 200 OK\r\n\r\nbody"],
        );
        let document = client.get_document().unwrap();
        assert_eq!(document.status_code(), Some(200));
        assert_eq!(
            document
                .headers()
                .previous()
                .and_then(HeaderBlock::status_code),
            Some(100)
        );
        assert_eq!(document.body(), "body");
    }

    #[test]
    fn test_body_slice_keeps_binary_bytes() {
        let raw = b"HTTP/1.1 200 OK\r\n\r\n\xff\xfe";
        let text = String::from_utf8_lossy(raw);
        let (_, body) = HeaderBlock::parse_document(&text);
        assert_eq!(body_slice(raw, &text, &body), b"\xff\xfe");
    }
}
