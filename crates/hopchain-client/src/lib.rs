//! hopchain_client - Blocking redirecting HTTP/1.1 client for hopchain
//!
//! std の `TcpStream` と rustls を使用したブロッキング I/O の HTTP/1.1 クライアント。
//!
//! ## 特徴
//!
//! - **hopchain ベース**: Sans I/O のヘッダーモデルをベースにした設計
//! - **ブロッキング I/O**: 1 回の交換ごとにレスポンス全体を読み込む
//! - **TLS 対応**: rustls と OS の証明書ストアによる HTTPS 対応
//! - **リダイレクト追跡**: 経由したホップのヘッダーを 1 つの連結として保持
//! - **プロキシ対応**: Basic 認証付きフォワードプロキシ (https は CONNECT)
//!
//! ## 使い方
//!
//! ```no_run
//! use hopchain::{HeaderBlock, Method, RequestBody};
//! use hopchain_client::{RedirectingClient, TransportConfig};
//!
//! let mut client = RedirectingClient::with_config("http://example.com/login", TransportConfig::new())?;
//!
//! let form = RequestBody::form([("user", "alice"), ("password", "secret")]);
//! let headers = HeaderBlock::new().with("Accept", "text/html");
//! let document = client.request_document(Method::Post, &form, Some(&headers))?;
//!
//! println!("{} hops, ok = {}", document.headers().depth(), document.ok());
//!
//! // 受け取った Cookie は次の要求に付く
//! client.set_uri("http://example.com/account")?;
//! let account = client.get_document()?;
//! println!("{}", account.body());
//! # Ok::<(), hopchain_client::Error>(())
//! ```

pub mod error;
pub mod redirect;
pub mod socket;
pub mod transport;

pub use error::{Error, Result};
pub use redirect::{DEFAULT_MAX_HOPS, Document, RedirectingClient};
pub use socket::SocketTransport;
pub use transport::{HttpTransport, ProxyConfig, Target, TransportConfig, parse_url};

// hopchain の型を re-export
pub use hopchain::{HeaderBlock, Method, RequestBody};
