use std::fmt;

/// HTTP メッセージ処理エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// 不正なデータ
    InvalidData(String),
    /// ボディが途中で終わっている
    IncompleteBody,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidData(msg) => write!(f, "invalid data: {}", msg),
            Error::IncompleteBody => write!(f, "incomplete body"),
        }
    }
}

impl std::error::Error for Error {}

/// HTTP エンコードエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// リクエストラインがない
    MissingRequestLine,
    /// Transfer-Encoding と Content-Length が同時に設定されている
    /// RFC 9112 Section 6.2: 送信者は Transfer-Encoding を含むメッセージに
    /// Content-Length を含めてはならない (MUST NOT)
    ConflictingTransferEncodingAndContentLength,
    /// ヘッダー名または値に CR / LF などの制御文字が含まれている (ヘッダー名を保持)
    InvalidHeader(String),
    /// リクエストラインに CR / LF などの制御文字が含まれている
    InvalidRequestLine,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::MissingRequestLine => write!(f, "missing request line"),
            EncodeError::ConflictingTransferEncodingAndContentLength => {
                write!(
                    f,
                    "conflicting Transfer-Encoding and Content-Length headers (RFC 9112 Section 6.2)"
                )
            }
            EncodeError::InvalidHeader(name) => {
                write!(f, "invalid character in header: {}", name)
            }
            EncodeError::InvalidRequestLine => write!(f, "invalid character in request line"),
        }
    }
}

impl std::error::Error for EncodeError {}
