use core::fmt;

/// HTTP メソッド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
}

impl Method {
    /// メソッド名を取得
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// メソッド名からパース (大文字小文字を区別しない)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Some(Method::Get),
            "HEAD" => Some(Method::Head),
            "POST" => Some(Method::Post),
            "PUT" => Some(Method::Put),
            "DELETE" => Some(Method::Delete),
            _ => None,
        }
    }

    /// レスポンスにボディが含まれ得るか
    ///
    /// HEAD レスポンスはボディを持たない (RFC 9110 Section 9.3.2)
    pub fn expects_response_body(&self) -> bool {
        !matches!(self, Method::Head)
    }

    /// ボディなしでも Content-Length: 0 を送るべきメソッドか
    pub fn requires_content_length(&self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// リクエストライン (`METHOD SP request-target SP HTTP-version`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// HTTP メソッド
    ///
    /// パースしたリクエストラインは Method にない拡張メソッドを含み得るため文字列で保持する
    pub method: String,
    /// リクエストターゲット (origin-form / absolute-form)
    pub target: String,
    /// HTTP バージョン (デフォルト: HTTP/1.1)
    pub version: String,
}

impl RequestLine {
    /// 新しいリクエストラインを作成 (HTTP/1.1)
    pub fn new(method: &str, target: &str) -> Self {
        Self {
            method: method.to_string(),
            target: target.to_string(),
            version: "HTTP/1.1".to_string(),
        }
    }

    /// リクエストライン文字列をパース
    ///
    /// `<METHOD> <target> HTTP/x.y` 形式のみ受け付ける。
    /// METHOD は英大文字のトークン、target は空白を含まない文字列。
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.trim().split(' ');
        let method = parts.next()?;
        let target = parts.next()?;
        let version = parts.next()?;
        if parts.next().is_some() {
            return None;
        }

        if method.is_empty() || !method.bytes().all(|b| b.is_ascii_uppercase()) {
            return None;
        }
        if target.is_empty() {
            return None;
        }
        if !is_http_version(version) {
            return None;
        }

        Some(Self {
            method: method.to_string(),
            target: target.to_string(),
            version: version.to_string(),
        })
    }

    /// 既知のメソッドであれば Method として取得
    pub fn known_method(&self) -> Option<Method> {
        Method::parse(&self.method)
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.method, self.target, self.version)
    }
}

/// `HTTP/x.y` 形式のバージョンかどうか (大文字小文字を区別しない)
pub(crate) fn is_http_version(s: &str) -> bool {
    let Some(prefix) = s.get(..5) else {
        return false;
    };
    if !prefix.eq_ignore_ascii_case("HTTP/") {
        return false;
    }
    let rest = &s[5..];
    match rest.split_once('.') {
        Some((major, minor)) => is_digits(major) && is_digits(minor),
        None => is_digits(rest),
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
