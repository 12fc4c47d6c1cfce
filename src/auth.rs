//! Basic 認証 (RFC 7617)
//!
//! ## 概要
//!
//! フォワードプロキシへの `Proxy-Authorization` ヘッダーに使う Basic 認証の
//! エンコード/デコードを提供します。
//!
//! ## 使い方
//!
//! ```rust
//! use hopchain::auth::BasicAuth;
//!
//! let auth = BasicAuth::new("user", "password");
//! assert_eq!(auth.to_header_value(), "Basic dXNlcjpwYXNzd29yZA==");
//!
//! let auth = BasicAuth::parse("Basic dXNlcjpwYXNzd29yZA==").unwrap();
//! assert_eq!(auth.username(), "user");
//! assert_eq!(auth.password(), "password");
//! ```

use core::fmt;

/// Basic 認証エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// 空の入力
    Empty,
    /// Basic スキームでない
    NotBasicScheme,
    /// Base64 デコードエラー
    Base64DecodeError,
    /// UTF-8 デコードエラー
    Utf8Error,
    /// コロンが見つからない (user:password 形式でない)
    MissingColon,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Empty => write!(f, "empty authorization header"),
            AuthError::NotBasicScheme => write!(f, "not basic authentication scheme"),
            AuthError::Base64DecodeError => write!(f, "base64 decode error"),
            AuthError::Utf8Error => write!(f, "utf-8 decode error"),
            AuthError::MissingColon => write!(f, "missing colon in credentials"),
        }
    }
}

impl std::error::Error for AuthError {}

/// Basic 認証の資格情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    username: String,
    password: String,
}

impl BasicAuth {
    /// 新しい Basic 認証を作成
    pub fn new(username: &str, password: &str) -> Self {
        BasicAuth {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// URI の userinfo (`user:password`) から作成
    ///
    /// パスワードがない場合は空文字列とする。
    pub fn from_userinfo(userinfo: &str) -> Self {
        match userinfo.split_once(':') {
            Some((username, password)) => BasicAuth::new(username, password),
            None => BasicAuth::new(userinfo, ""),
        }
    }

    /// (Proxy-)Authorization ヘッダー値をパース
    pub fn parse(input: &str) -> Result<Self, AuthError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AuthError::Empty);
        }

        // RFC 9110 Section 11.1: 認証スキームは case-insensitive
        let (scheme, credentials) = input.split_once(' ').ok_or(AuthError::NotBasicScheme)?;
        if !scheme.eq_ignore_ascii_case("Basic") {
            return Err(AuthError::NotBasicScheme);
        }

        let decoded = base64_decode(credentials.trim())?;
        let decoded = String::from_utf8(decoded).map_err(|_| AuthError::Utf8Error)?;
        let (username, password) = decoded.split_once(':').ok_or(AuthError::MissingColon)?;

        Ok(BasicAuth::new(username, password))
    }

    /// ユーザー名を取得
    pub fn username(&self) -> &str {
        &self.username
    }

    /// パスワードを取得
    pub fn password(&self) -> &str {
        &self.password
    }

    /// ヘッダー値 (`Basic <base64>`) を生成
    pub fn to_header_value(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.password);
        format!("Basic {}", base64_encode(credentials.as_bytes()))
    }
}

impl fmt::Display for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_header_value())
    }
}

const BASE64_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Base64 エンコード (パディングあり)
fn base64_encode(input: &[u8]) -> String {
    let mut result = String::with_capacity(input.len().div_ceil(3) * 4);
    for chunk in input.chunks(3) {
        let n = chunk
            .iter()
            .enumerate()
            .fold(0u32, |n, (i, &b)| n | (b as u32) << (16 - 8 * i));
        for i in 0..4 {
            if i <= chunk.len() {
                let index = (n >> (18 - 6 * i)) & 0x3F;
                result.push(BASE64_ALPHABET[index as usize] as char);
            } else {
                result.push('=');
            }
        }
    }
    result
}

/// Base64 デコード
fn base64_decode(input: &str) -> Result<Vec<u8>, AuthError> {
    let mut result = Vec::with_capacity(input.len() / 4 * 3);
    let mut buf: u32 = 0;
    let mut bits = 0;

    for b in input.trim_end_matches('=').bytes() {
        let value = BASE64_ALPHABET
            .iter()
            .position(|&c| c == b)
            .ok_or(AuthError::Base64DecodeError)? as u32;
        buf = (buf << 6) | value;
        bits += 6;
        if bits >= 8 {
            bits -= 8;
            result.push((buf >> bits) as u8);
            buf &= (1 << bits) - 1;
        }
    }

    Ok(result)
}
