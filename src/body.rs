//! リクエストボディ
//!
//! ## 概要
//!
//! 送信するリクエストボディ (なし、生バイト列、フォーム、multipart) を表し、
//! Content-Type とバイト列へのエンコードを提供します。
//!
//! フォームにファイルが添付されている場合は multipart/form-data、
//! そうでなければ application/x-www-form-urlencoded でエンコードします。
//!
//! ## 使い方
//!
//! ```rust
//! use hopchain::body::RequestBody;
//!
//! let body = RequestBody::form([("q", "rust lang"), ("page", "2")]);
//! let encoded = body.encode(0);
//! assert_eq!(encoded.content_type.as_deref(), Some("application/x-www-form-urlencoded"));
//! assert_eq!(encoded.data, b"q=rust%20lang&page=2");
//! ```

use crate::multipart::MultipartBuilder;
use crate::uri::percent_encode;

/// 添付ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    /// フォームのフィールド名
    pub field: String,
    /// ファイル名
    pub filename: String,
    /// Content-Type
    pub content_type: String,
    /// 内容
    pub data: Vec<u8>,
}

impl FileAttachment {
    /// 新しい添付ファイルを作成
    pub fn new(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        FileAttachment {
            field: field.to_string(),
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            data: data.to_vec(),
        }
    }
}

/// リクエストボディ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    /// ボディなし
    #[default]
    Empty,
    /// 生のバイト列 (Content-Type は呼び出し側で指定する)
    Raw(Vec<u8>),
    /// application/x-www-form-urlencoded
    Form(Vec<(String, String)>),
    /// multipart/form-data
    Multipart {
        fields: Vec<(String, String)>,
        files: Vec<FileAttachment>,
    },
}

/// エンコード済みボディ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    /// Content-Type ヘッダー値 (なければ付けない)
    pub content_type: Option<String>,
    /// ボディのバイト列
    pub data: Vec<u8>,
}

impl RequestBody {
    /// フォームボディを作成
    pub fn form<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        RequestBody::Form(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// ファイルを添付する
    ///
    /// フォームは multipart に切り替わる。
    pub fn attach(self, file: FileAttachment) -> Self {
        match self {
            RequestBody::Multipart { fields, mut files } => {
                files.push(file);
                RequestBody::Multipart { fields, files }
            }
            RequestBody::Form(fields) => RequestBody::Multipart {
                fields,
                files: vec![file],
            },
            RequestBody::Empty | RequestBody::Raw(_) => RequestBody::Multipart {
                fields: Vec::new(),
                files: vec![file],
            },
        }
    }

    /// ボディなしか
    pub fn is_empty(&self) -> bool {
        match self {
            RequestBody::Empty => true,
            RequestBody::Raw(data) => data.is_empty(),
            RequestBody::Form(fields) => fields.is_empty(),
            RequestBody::Multipart { .. } => false,
        }
    }

    /// バイト列にエンコード
    ///
    /// `boundary_seed` は multipart の境界生成に使う乱数値。
    pub fn encode(&self, boundary_seed: u64) -> EncodedBody {
        match self {
            RequestBody::Empty => EncodedBody {
                content_type: None,
                data: Vec::new(),
            },
            RequestBody::Raw(data) => EncodedBody {
                content_type: None,
                data: data.clone(),
            },
            RequestBody::Form(fields) => EncodedBody {
                content_type: Some("application/x-www-form-urlencoded".to_string()),
                data: form_urlencode(fields).into_bytes(),
            },
            RequestBody::Multipart { fields, files } => {
                let mut builder = MultipartBuilder::new(boundary_seed);
                for (name, value) in fields {
                    builder = builder.text_field(name, value);
                }
                for file in files {
                    builder =
                        builder.file_field(&file.field, &file.filename, &file.content_type, &file.data);
                }
                EncodedBody {
                    content_type: Some(builder.content_type()),
                    data: builder.build(),
                }
            }
        }
    }
}

impl From<&str> for RequestBody {
    fn from(s: &str) -> Self {
        RequestBody::Raw(s.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(data: Vec<u8>) -> Self {
        RequestBody::Raw(data)
    }
}

/// application/x-www-form-urlencoded 形式にエンコード
pub fn form_urlencode(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
