//! # hopchain
//!
//! 依存なしの HTTP/1.1 ヘッダーモデルライブラリ (Sans I/O)
//!
//! ## 特徴
//!
//! - **依存なし**: 標準ライブラリのみ使用
//! - **Sans I/O**: I/O を完全に分離した設計
//! - **ホップの連結**: リダイレクトで経由したヘッダーブロックを 1 つの連結として保持
//!
//! ## 使い方
//!
//! ### リクエストの組み立て
//!
//! ```rust
//! use hopchain::{HeaderBlock, encode_request};
//!
//! let mut headers = HeaderBlock::new()
//!     .with("Host", "example.com")
//!     .with("Cookie", "a=1")
//!     .with("Cookie", "b=2");
//! headers.set_request_line("GET", "/");
//!
//! let bytes = encode_request(&headers, b"").unwrap();
//! assert_eq!(
//!     bytes,
//!     b"GET / HTTP/1.1\r\nHost: example.com\r\nCookie: a=1; b=2\r\n\r\n"
//! );
//! ```
//!
//! ### レスポンスの解析
//!
//! ```rust
//! use hopchain::HeaderBlock;
//!
//! let raw = "HTTP/1.1 301 Moved Permanently\r\n\
//!            Location: https://example.com/\r\n\
//!            Set-Cookie: session=abc; Max-Age=3600\r\n\
//!            \r\n\
//!            HTTP/1.1 200 OK\r\n\
//!            \r\n\
//!            <html></html>";
//!
//! let (headers, body) = HeaderBlock::parse_document(raw);
//! assert!(headers.ok());
//! assert_eq!(body, "<html></html>");
//!
//! let redirect = headers.previous().unwrap();
//! let cookies = redirect.create_cookie_headers();
//! assert_eq!(cookies.first("cookie"), Some("session=abc"));
//! ```

pub mod auth;
pub mod body;
pub mod chunked;
pub mod cookie;
pub mod date;
mod encoder;
mod error;
pub mod header_block;
pub mod multipart;
mod request;
pub mod status;
pub mod uri;

pub use body::{EncodedBody, FileAttachment, RequestBody};
pub use encoder::{encode_chunks, encode_request};
pub use error::{EncodeError, Error};
pub use header_block::{HeaderBlock, HeaderValue, StartLine};
pub use request::{Method, RequestLine};
