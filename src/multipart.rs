//! multipart/form-data 生成 (RFC 7578)
//!
//! ## 概要
//!
//! ファイル添付を含むフォーム送信用の multipart/form-data ボディを生成します。
//!
//! ## 使い方
//!
//! ```rust
//! use hopchain::multipart::MultipartBuilder;
//!
//! let body = MultipartBuilder::with_boundary("XyZ")
//!     .text_field("title", "hello")
//!     .file_field("upload", "a.txt", "text/plain", b"abc")
//!     .build();
//!
//! let text = String::from_utf8(body).unwrap();
//! assert!(text.starts_with("--XyZ\r\nContent-Disposition: form-data; name=\"title\"\r\n"));
//! assert!(text.ends_with("--XyZ--\r\n"));
//! ```

/// multipart パート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    name: String,
    filename: Option<String>,
    content_type: Option<String>,
    body: Vec<u8>,
}

impl Part {
    /// テキストパートを作成
    pub fn text(name: &str, value: &str) -> Self {
        Part {
            name: name.to_string(),
            filename: None,
            content_type: None,
            body: value.as_bytes().to_vec(),
        }
    }

    /// ファイルパートを作成
    pub fn file(name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        Part {
            name: name.to_string(),
            filename: Some(filename.to_string()),
            content_type: Some(content_type.to_string()),
            body: data.to_vec(),
        }
    }

    /// パートの名前を取得
    pub fn name(&self) -> &str {
        &self.name
    }

    /// ファイル名を取得
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// ボディを取得
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"Content-Disposition: form-data; name=\"");
        out.extend_from_slice(escape_quoted(&self.name).as_bytes());
        out.push(b'"');
        if let Some(filename) = &self.filename {
            out.extend_from_slice(b"; filename=\"");
            out.extend_from_slice(escape_quoted(filename).as_bytes());
            out.push(b'"');
        }
        out.extend_from_slice(b"\r\n");

        if let Some(content_type) = &self.content_type {
            out.extend_from_slice(b"Content-Type: ");
            out.extend_from_slice(content_type.as_bytes());
            out.extend_from_slice(b"\r\n");
        }

        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out.extend_from_slice(b"\r\n");
    }
}

/// multipart ボディビルダー
#[derive(Debug, Clone)]
pub struct MultipartBuilder {
    boundary: String,
    parts: Vec<Part>,
}

impl MultipartBuilder {
    /// 乱数値を受け取って境界を生成する
    ///
    /// 乱数生成は呼び出し側の責任となる。
    ///
    /// ```
    /// use hopchain::multipart::MultipartBuilder;
    ///
    /// let builder = MultipartBuilder::new(0x1234_5678_9abc_def0);
    /// assert_eq!(builder.boundary(), "----hopchain123456789abcdef0");
    /// ```
    pub fn new(random_value: u64) -> Self {
        Self::with_boundary(&format!("----hopchain{:016x}", random_value))
    }

    /// 境界を指定して作成
    pub fn with_boundary(boundary: &str) -> Self {
        MultipartBuilder {
            boundary: boundary.to_string(),
            parts: Vec::new(),
        }
    }

    /// 境界文字列を取得
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Content-Type ヘッダー値を取得
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// テキストフィールドを追加
    pub fn text_field(self, name: &str, value: &str) -> Self {
        self.part(Part::text(name, value))
    }

    /// ファイルフィールドを追加
    pub fn file_field(self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.part(Part::file(name, filename, content_type, data))
    }

    /// パートを追加
    pub fn part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// パートを取得
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// ボディをビルド
    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for part in &self.parts {
            out.extend_from_slice(b"--");
            out.extend_from_slice(self.boundary.as_bytes());
            out.extend_from_slice(b"\r\n");
            part.write_to(&mut out);
        }
        out.extend_from_slice(b"--");
        out.extend_from_slice(self.boundary.as_bytes());
        out.extend_from_slice(b"--\r\n");
        out
    }
}

/// quoted-string 内の `"` と `\` をエスケープ
fn escape_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
