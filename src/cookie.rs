//! Cookie と Set-Cookie (RFC 6265 / RFC 2965)
//!
//! ## 概要
//!
//! リクエストの `Cookie` ヘッダー (name=value の並び) と、レスポンスの
//! `Set-Cookie` ヘッダー (1 つの Cookie と属性) を扱います。
//!
//! Set-Cookie の Max-Age はパース時点の時刻を基準に絶対時刻 (Unix タイムスタンプ) へ
//! 正規化し、Expires と同じ `expires` に格納します。
//! [`CookieJar`] は受け取った Set-Cookie を期限つきのまま保持し、送信時点で有効なものだけを
//! `Cookie` ヘッダーにします。
//!
//! ## 使い方
//!
//! ```rust
//! use hopchain::cookie::{Cookie, SetCookie};
//!
//! let cookies = Cookie::parse("session=abc123; user=john").unwrap();
//! assert_eq!(cookies[0].name(), "session");
//! assert_eq!(cookies[1].value(), "john");
//!
//! // 基準時刻 1000 で Max-Age=60 なら 1060 に期限切れになる
//! let set_cookie = SetCookie::parse_at("session=abc123; Path=/; Max-Age=60; Secure", 1000).unwrap();
//! assert_eq!(set_cookie.path(), Some("/"));
//! assert_eq!(set_cookie.expires(), Some(1060));
//! assert!(set_cookie.secure());
//! assert!(!set_cookie.is_expired(1059));
//! assert!(set_cookie.is_expired(1060));
//! ```

use core::fmt;

use crate::date::{HttpDate, unix_now};

/// Cookie パースエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieError {
    /// 空の Cookie
    Empty,
    /// `=` がない
    InvalidFormat,
    /// 名前が token でない
    InvalidName,
    /// 値に使えない文字がある
    InvalidValue,
}

impl fmt::Display for CookieError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            CookieError::Empty => "empty cookie",
            CookieError::InvalidFormat => "invalid cookie format",
            CookieError::InvalidName => "invalid cookie name",
            CookieError::InvalidValue => "invalid cookie value",
        };
        f.write_str(message)
    }
}

impl std::error::Error for CookieError {}

/// Cookie ヘッダーの 1 ペア
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    name: String,
    value: String,
}

impl Cookie {
    /// Cookie ヘッダー値をパース
    ///
    /// 空のペア (`a=1;;b=2` の間など) は読み飛ばす。値の引用符は外す。
    pub fn parse(input: &str) -> Result<Vec<Cookie>, CookieError> {
        let cookies = input
            .split(';')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                split_pair(pair).map(|(name, value)| Cookie {
                    name: name.to_string(),
                    value: value.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if cookies.is_empty() {
            return Err(CookieError::Empty);
        }
        Ok(cookies)
    }

    /// 名前と値を検証して作成
    pub fn new(name: &str, value: &str) -> Result<Self, CookieError> {
        validate(name, value)?;
        Ok(Cookie {
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Set-Cookie の属性
///
/// 値が必要な属性で値がないもの、Expires/Max-Age の解釈できない値は
/// 属性ごと無視する (RFC 6265 Section 5.2)。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attribute<'a> {
    Expires(i64),
    MaxAge(i64),
    Domain(&'a str),
    Path(&'a str),
    Port(&'a str),
    Version(&'a str),
    Comment(&'a str),
    CommentUrl(&'a str),
    Secure,
    HttpOnly,
    Discard,
}

impl<'a> Attribute<'a> {
    fn parse(part: &'a str) -> Option<Self> {
        let (key, value) = match part.split_once('=') {
            Some((key, value)) => (key.trim(), Some(value.trim())),
            None => (part.trim(), None),
        };

        let attribute = match (key.to_ascii_lowercase().as_str(), value) {
            ("expires", Some(v)) => Attribute::Expires(HttpDate::parse(v).ok()?.to_unix_timestamp()),
            ("max-age", Some(v)) => Attribute::MaxAge(v.parse().ok()?),
            ("domain", Some(v)) => Attribute::Domain(v),
            ("path", Some(v)) => Attribute::Path(v),
            // RFC 2965 では値のない Port も許される
            ("port", v) => Attribute::Port(unquote(v.unwrap_or(""))),
            ("version", Some(v)) => Attribute::Version(unquote(v)),
            ("comment", Some(v)) => Attribute::Comment(unquote(v)),
            ("commenturl", Some(v)) => Attribute::CommentUrl(unquote(v)),
            ("secure", _) => Attribute::Secure,
            ("httponly", _) => Attribute::HttpOnly,
            ("discard", _) => Attribute::Discard,
            _ => return None,
        };
        Some(attribute)
    }
}

/// Set-Cookie ヘッダー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    name: String,
    value: String,
    /// 有効期限 (Unix タイムスタンプ)
    expires: Option<i64>,
    domain: Option<String>,
    path: Option<String>,
    port: Option<String>,
    version: Option<String>,
    comment: Option<String>,
    comment_url: Option<String>,
    secure: bool,
    http_only: bool,
    discard: bool,
}

impl SetCookie {
    /// 現在時刻を基準にパース
    ///
    /// ```rust
    /// use hopchain::cookie::SetCookie;
    ///
    /// let cookie = SetCookie::parse("session=abc123; Path=/; HttpOnly; Secure").unwrap();
    /// assert_eq!(cookie.name(), "session");
    /// assert!(cookie.http_only());
    /// ```
    pub fn parse(input: &str) -> Result<Self, CookieError> {
        Self::parse_at(input, unix_now())
    }

    /// `now` を Max-Age の基準時刻としてパース
    ///
    /// Max-Age は出現位置にかかわらず Expires より優先する (RFC 6265 Section 5.3)。
    pub fn parse_at(input: &str, now: i64) -> Result<Self, CookieError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(CookieError::Empty);
        }

        let (pair, attributes) = match input.split_once(';') {
            Some((pair, attributes)) => (pair, attributes),
            None => (input, ""),
        };
        let (name, value) = split_pair(pair.trim())?;
        let mut cookie = SetCookie::unchecked(name, value);

        let mut max_age = None;
        for attribute in attributes.split(';').filter_map(Attribute::parse) {
            match attribute {
                Attribute::MaxAge(delta) => max_age = Some(now.saturating_add(delta)),
                other => cookie.apply(other),
            }
        }
        if max_age.is_some() {
            cookie.expires = max_age;
        }

        Ok(cookie)
    }

    /// 名前と値を検証して作成
    pub fn new(name: &str, value: &str) -> Result<Self, CookieError> {
        validate(name, value)?;
        Ok(SetCookie::unchecked(name, value))
    }

    fn unchecked(name: &str, value: &str) -> Self {
        SetCookie {
            name: name.to_string(),
            value: value.to_string(),
            expires: None,
            domain: None,
            path: None,
            port: None,
            version: None,
            comment: None,
            comment_url: None,
            secure: false,
            http_only: false,
            discard: false,
        }
    }

    fn apply(&mut self, attribute: Attribute<'_>) {
        match attribute {
            Attribute::Expires(at) | Attribute::MaxAge(at) => self.expires = Some(at),
            Attribute::Domain(v) => self.domain = Some(v.to_string()),
            Attribute::Path(v) => self.path = Some(v.to_string()),
            Attribute::Port(v) => self.port = Some(v.to_string()),
            Attribute::Version(v) => self.version = Some(v.to_string()),
            Attribute::Comment(v) => self.comment = Some(v.to_string()),
            Attribute::CommentUrl(v) => self.comment_url = Some(v.to_string()),
            Attribute::Secure => self.secure = true,
            Attribute::HttpOnly => self.http_only = true,
            Attribute::Discard => self.discard = true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// 有効期限 (Unix タイムスタンプ、Max-Age は絶対時刻に変換済み)
    pub fn expires(&self) -> Option<i64> {
        self.expires
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Port 属性 (RFC 2965、引用符は外す)
    pub fn port(&self) -> Option<&str> {
        self.port.as_deref()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub fn comment_url(&self) -> Option<&str> {
        self.comment_url.as_deref()
    }

    pub fn secure(&self) -> bool {
        self.secure
    }

    pub fn http_only(&self) -> bool {
        self.http_only
    }

    pub fn discard(&self) -> bool {
        self.discard
    }

    /// `now` の時点で期限切れか
    ///
    /// 期限のないセッション Cookie は期限切れにならない。
    pub fn is_expired(&self, now: i64) -> bool {
        matches!(self.expires, Some(expires) if expires <= now)
    }

    pub fn with_expires(mut self, expires: i64) -> Self {
        self.expires = Some(expires);
        self
    }

    pub fn with_domain(mut self, domain: &str) -> Self {
        self.domain = Some(domain.to_string());
        self
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.path = Some(path.to_string());
        self
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }
}

impl fmt::Display for SetCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)?;

        let valued = [
            ("Expires", self.expires.map(|at| HttpDate::from_unix_timestamp(at).to_string())),
            ("Domain", self.domain.clone()),
            ("Path", self.path.clone()),
            ("Port", self.port.as_ref().map(|v| format!("\"{}\"", v))),
            ("Version", self.version.clone()),
            ("Comment", self.comment.clone()),
            ("CommentURL", self.comment_url.as_ref().map(|v| format!("\"{}\"", v))),
        ];
        for (key, value) in valued {
            if let Some(value) = value {
                write!(f, "; {}={}", key, value)?;
            }
        }

        let flags = [
            ("Discard", self.discard),
            ("Secure", self.secure),
            ("HttpOnly", self.http_only),
        ];
        for (key, _) in flags.iter().filter(|(_, on)| *on) {
            write!(f, "; {}", key)?;
        }
        Ok(())
    }
}

/// 受け取った Cookie を有効期限つきで保持するジャー
///
/// Cookie は名前ごとに 1 件で、最初に保存された位置を保つ。
/// 期限切れの判定は取り出すときの時刻で行うため、保存後に期限が来た Cookie は送られない。
///
/// ```rust
/// use hopchain::cookie::{CookieJar, SetCookie};
///
/// let mut jar = CookieJar::new();
/// jar.store(SetCookie::parse_at("session=abc; Max-Age=1", 1000).unwrap(), 1000);
/// assert_eq!(jar.header_value_at(1000).as_deref(), Some("session=abc"));
/// assert_eq!(jar.header_value_at(1001), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: Vec<SetCookie>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// 有効期限のない Cookie からジャーを作る
    pub fn from_cookies(cookies: impl IntoIterator<Item = Cookie>) -> Self {
        let mut jar = Self::new();
        for cookie in cookies {
            jar.upsert(SetCookie::unchecked(cookie.name(), cookie.value()));
        }
        jar
    }

    /// Set-Cookie を保存する
    ///
    /// `now` の時点で期限切れなら同じ名前の Cookie を削除する。
    pub fn store(&mut self, cookie: SetCookie, now: i64) {
        if cookie.is_expired(now) {
            self.cookies.retain(|c| c.name != cookie.name);
        } else {
            self.upsert(cookie);
        }
    }

    pub fn store_all(&mut self, cookies: impl IntoIterator<Item = SetCookie>, now: i64) {
        for cookie in cookies {
            self.store(cookie, now);
        }
    }

    fn upsert(&mut self, cookie: SetCookie) {
        match self.cookies.iter_mut().find(|c| c.name == cookie.name) {
            Some(existing) => *existing = cookie,
            None => self.cookies.push(cookie),
        }
    }

    /// 名前で Cookie を削除
    pub fn remove(&mut self, name: &str) -> Option<SetCookie> {
        let index = self.cookies.iter().position(|c| c.name == name)?;
        Some(self.cookies.remove(index))
    }

    /// 期限切れの Cookie を捨てる
    pub fn remove_expired(&mut self, now: i64) {
        self.cookies.retain(|c| !c.is_expired(now));
    }

    /// 保存済みの Cookie (期限切れも含む)
    pub fn iter(&self) -> core::slice::Iter<'_, SetCookie> {
        self.cookies.iter()
    }

    /// `now` の時点で有効な Cookie
    pub fn live(&self, now: i64) -> impl Iterator<Item = &SetCookie> {
        self.cookies.iter().filter(move |c| !c.is_expired(now))
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// `now` の時点で有効な Cookie を `Cookie` ヘッダーの値にする
    ///
    /// 送る Cookie がなければ `None`。
    pub fn header_value_at(&self, now: i64) -> Option<String> {
        let pairs: Vec<String> = self
            .live(now)
            .map(|c| format!("{}={}", c.name, c.value))
            .collect();
        if pairs.is_empty() {
            None
        } else {
            Some(pairs.join("; "))
        }
    }
}

/// `name=value` を分割し、名前を検証して値の引用符を外す
fn split_pair(pair: &str) -> Result<(&str, &str), CookieError> {
    let (name, value) = pair.split_once('=').ok_or(CookieError::InvalidFormat)?;
    let name = name.trim();
    if !is_token(name) {
        return Err(CookieError::InvalidName);
    }
    Ok((name, unquote(value.trim())))
}

fn validate(name: &str, value: &str) -> Result<(), CookieError> {
    if !is_token(name) {
        return Err(CookieError::InvalidName);
    }
    if !value.bytes().all(is_cookie_octet) {
        return Err(CookieError::InvalidValue);
    }
    Ok(())
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// cookie-name = token (RFC 6265 Section 4.1.1)
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}

/// cookie-octet (RFC 6265 Section 4.1.1)
fn is_cookie_octet(b: u8) -> bool {
    matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
}
