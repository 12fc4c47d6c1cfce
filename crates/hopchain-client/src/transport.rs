//! トランスポート
//!
//! 1 回の HTTP 交換 (リクエスト送信とレスポンス受信) を抽象化する。
//! リダイレクトは追跡しない。

use std::sync::Arc;
use std::time::Duration;

use hopchain::uri::Uri;
use hopchain::{HeaderBlock, Method, RequestBody};
use rustls::ClientConfig;

use crate::error::{Error, Result};

/// プロキシのデフォルトポート
pub const DEFAULT_PROXY_PORT: u16 = 8080;

/// 1 回の HTTP 交換を行うトランスポート
///
/// `exchange` は受信したレスポンスをそのまま返す。
/// 失敗した場合は `Err` を返し、`last_error()` に理由を残す。
pub trait HttpTransport {
    /// 接続先 URI を設定
    ///
    /// 開いている接続は閉じる。
    fn set_uri(&mut self, uri: &str) -> Result<()>;

    /// 接続先 URI を取得
    fn uri(&self) -> Option<&str>;

    /// リクエストを送信して生のレスポンスを受け取る
    ///
    /// `headers` の slot 0 はトランスポートがリクエストラインで上書きする。
    fn exchange(
        &mut self,
        method: Method,
        body: &RequestBody,
        headers: &HeaderBlock,
    ) -> Result<Vec<u8>>;

    /// 直近の失敗理由
    fn last_error(&self) -> Option<&str>;

    /// 接続と失敗理由を破棄
    fn reset(&mut self);

    /// GET
    fn get(&mut self, headers: &HeaderBlock) -> Result<Vec<u8>> {
        self.exchange(Method::Get, &RequestBody::Empty, headers)
    }

    /// HEAD
    fn head(&mut self, headers: &HeaderBlock) -> Result<Vec<u8>> {
        self.exchange(Method::Head, &RequestBody::Empty, headers)
    }

    /// PUT
    fn put(&mut self, body: &RequestBody, headers: &HeaderBlock) -> Result<Vec<u8>> {
        self.exchange(Method::Put, body, headers)
    }

    /// DELETE (ボディは任意)
    fn delete(&mut self, headers: &HeaderBlock, body: Option<&RequestBody>) -> Result<Vec<u8>> {
        self.exchange(Method::Delete, body.unwrap_or(&RequestBody::Empty), headers)
    }

    /// POST (フォームまたは multipart)
    fn post(&mut self, form: &RequestBody, headers: &HeaderBlock) -> Result<Vec<u8>> {
        self.exchange(Method::Post, form, headers)
    }
}

/// フォワードプロキシの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    uri: String,
    username: Option<String>,
    password: String,
}

impl ProxyConfig {
    /// プロキシ URI (`http://host[:port]`) を指定して作成
    pub fn new(uri: &str) -> Self {
        Self {
            uri: uri.to_string(),
            username: None,
            password: String::new(),
        }
    }

    /// Basic 認証の資格情報を設定
    pub fn credentials(mut self, username: &str, password: &str) -> Self {
        self.username = Some(username.to_string());
        self.password = password.to_string();
        self
    }

    /// プロキシ URI
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// ユーザー名
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// パスワード
    pub fn password(&self) -> &str {
        &self.password
    }

    /// 接続先のホストとポート
    ///
    /// ポート省略時は 8080 を使う。
    pub fn endpoint(&self) -> Result<(String, u16)> {
        let uri = Uri::parse(&self.uri)?;
        let host = uri
            .host()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::InvalidUrl(format!("proxy URI has no host: {}", self.uri)))?;
        Ok((host.to_string(), uri.port().unwrap_or(DEFAULT_PROXY_PORT)))
    }
}

/// トランスポート設定
///
/// ```rust
/// use std::time::Duration;
/// use hopchain_client::{ProxyConfig, TransportConfig};
///
/// let config = TransportConfig::new()
///     .connect_timeout(Duration::from_secs(5))
///     .proxy(ProxyConfig::new("http://proxy.local:3128").credentials("user", "secret"));
/// assert_eq!(config.get_connect_timeout(), Duration::from_secs(5));
/// ```
#[derive(Clone)]
pub struct TransportConfig {
    connect_timeout: Duration,
    read_timeout: Duration,
    max_response_size: usize,
    user_agent: String,
    proxy: Option<ProxyConfig>,
    tls_config: Option<Arc<ClientConfig>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportConfig {
    /// デフォルト設定で作成
    pub fn new() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(60),
            max_response_size: 10 * 1024 * 1024,
            user_agent: concat!("hopchain/", env!("CARGO_PKG_VERSION")).to_string(),
            proxy: None,
            tls_config: None,
        }
    }

    /// 接続タイムアウトを設定
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// 読み取りタイムアウトを設定
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// 受信するレスポンスの最大サイズを設定
    pub fn max_response_size(mut self, size: usize) -> Self {
        self.max_response_size = size;
        self
    }

    /// User-Agent を設定
    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    /// フォワードプロキシを設定
    pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// TLS 設定を指定 (省略時は OS の証明書ストアを使う)
    pub fn tls_config(mut self, config: Arc<ClientConfig>) -> Self {
        self.tls_config = Some(config);
        self
    }

    pub fn get_connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn get_read_timeout(&self) -> Duration {
        self.read_timeout
    }

    pub fn get_max_response_size(&self) -> usize {
        self.max_response_size
    }

    pub fn get_user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn get_proxy(&self) -> Option<&ProxyConfig> {
        self.proxy.as_ref()
    }

    pub fn get_tls_config(&self) -> Option<&Arc<ClientConfig>> {
        self.tls_config.as_ref()
    }
}

/// 接続先
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// 解析済み URI
    pub uri: Uri,
    /// https かどうか
    pub secure: bool,
    /// ホスト名
    pub host: String,
    /// ポート番号 (省略時はスキームのデフォルト)
    pub port: u16,
}

impl Target {
    /// Host ヘッダーの値
    pub fn host_header(&self) -> String {
        self.uri.host_header().unwrap_or_else(|| self.host.clone())
    }

    /// 直接接続時の request-target
    pub fn origin_form(&self) -> String {
        self.uri.origin_form()
    }

    /// プロキシ経由時の request-target
    pub fn absolute_form(&self) -> String {
        self.uri.absolute_form()
    }

    /// CONNECT の request-target (`host:port`)
    pub fn authority_form(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// URL をパースして接続先を得る
///
/// スキームは http と https のみ受け付ける。
pub fn parse_url(url: &str) -> Result<Target> {
    let uri = Uri::parse(url).map_err(|e| Error::InvalidUrl(e.to_string()))?;

    let scheme = uri
        .scheme()
        .ok_or_else(|| Error::InvalidUrl("URL must have a scheme".to_string()))?
        .to_ascii_lowercase();

    if scheme != "http" && scheme != "https" {
        return Err(Error::InvalidUrl(
            "URL must start with http:// or https://".to_string(),
        ));
    }

    let host = uri
        .host()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| Error::InvalidUrl("URL must have a host".to_string()))?
        .to_string();

    let secure = scheme == "https";
    let port = uri.port().unwrap_or(if secure { 443 } else { 80 });

    Ok(Target {
        uri,
        secure,
        host,
        port,
    })
}
