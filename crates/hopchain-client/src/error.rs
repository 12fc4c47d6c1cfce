//! hopchain-client エラー型

use std::fmt;

use hopchain::uri::UriError;

/// hopchain-client エラー
#[derive(Debug)]
pub enum Error {
    /// I/O エラー
    Io(std::io::Error),
    /// TLS エラー
    Tls(String),
    /// 接続または読み取りのタイムアウト
    Timeout,
    /// 応答を受け取る前に接続が閉じられた
    ConnectionClosed,
    /// 不正な URL
    InvalidUrl(String),
    /// DNS 解決エラー
    DnsResolution(String),
    /// リクエストを送信できなかった
    SendFailed(String),
    /// プロキシが CONNECT を拒否した
    ProxyTunnel { status_code: u16 },
    /// レスポンスが上限サイズを超えた
    ResponseTooLarge { limit: usize },
    /// リダイレクトがホップ数の上限に達した
    TooManyRedirects { limit: usize },
    /// ボディのデコードエラー
    Body(hopchain::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Tls(e) => write!(f, "TLS error: {}", e),
            Error::Timeout => write!(f, "connection timeout"),
            Error::ConnectionClosed => write!(f, "connection closed"),
            Error::InvalidUrl(msg) => write!(f, "invalid URL: {}", msg),
            Error::DnsResolution(msg) => write!(f, "DNS resolution error: {}", msg),
            Error::SendFailed(msg) => write!(f, "could not send request data: {}", msg),
            Error::ProxyTunnel { status_code } => {
                write!(f, "proxy refused CONNECT with status {}", status_code)
            }
            Error::ResponseTooLarge { limit } => {
                write!(f, "response exceeds {} bytes", limit)
            }
            Error::TooManyRedirects { limit } => {
                write!(f, "too many redirects (limit {})", limit)
            }
            Error::Body(e) => write!(f, "body error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Body(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => Error::Timeout,
            _ => Error::Io(e),
        }
    }
}

impl From<hopchain::Error> for Error {
    fn from(e: hopchain::Error) -> Self {
        Error::Body(e)
    }
}

impl From<UriError> for Error {
    fn from(e: UriError) -> Self {
        Error::InvalidUrl(e.to_string())
    }
}

impl From<rustls::Error> for Error {
    fn from(e: rustls::Error) -> Self {
        Error::Tls(e.to_string())
    }
}

impl From<rustls_pki_types::InvalidDnsNameError> for Error {
    fn from(e: rustls_pki_types::InvalidDnsNameError) -> Self {
        Error::Tls(e.to_string())
    }
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
