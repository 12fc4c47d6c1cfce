use crate::error::EncodeError;
use crate::header_block::HeaderBlock;

/// リクエストをエンコード
///
/// `headers` の slot 0 にあるリクエストラインとヘッダーをそのまま書き出し、
/// Content-Length がなければボディの長さから付与する。
/// POST と PUT はボディが空でも `Content-Length: 0` を付ける。
///
/// 改行を含むヘッダーはメッセージの区切りを変えてしまうため、CR / LF / NUL を含む
/// リクエストライン、ヘッダー名、ヘッダー値はエラーにする。
pub fn encode_request(headers: &HeaderBlock, body: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let request_line = headers
        .request_line()
        .ok_or(EncodeError::MissingRequestLine)?;

    if has_forbidden_char(&request_line.to_string()) {
        return Err(EncodeError::InvalidRequestLine);
    }
    for (name, value) in headers.fields() {
        if name.is_empty() || has_forbidden_char(name) || value.iter().any(has_forbidden_char) {
            return Err(EncodeError::InvalidHeader(name.to_string()));
        }
    }

    let has_content_length = headers.contains("content-length");
    let has_transfer_encoding = headers.contains("transfer-encoding");
    if has_content_length && has_transfer_encoding {
        return Err(EncodeError::ConflictingTransferEncodingAndContentLength);
    }

    // Request line + Headers
    let mut buf = headers.to_text(false).into_bytes();

    let requires_length = request_line
        .known_method()
        .is_some_and(|m| m.requires_content_length());
    if !has_content_length && !has_transfer_encoding && (!body.is_empty() || requires_length) {
        buf.extend_from_slice(b"Content-Length: ");
        buf.extend_from_slice(body.len().to_string().as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // End of headers
    buf.extend_from_slice(b"\r\n");

    // Body
    buf.extend_from_slice(body);

    Ok(buf)
}

fn has_forbidden_char(s: &str) -> bool {
    s.bytes().any(|b| matches!(b, b'\r' | b'\n' | b'\0'))
}

/// 複数のデータを chunked 形式でエンコード
///
/// すべてのチャンクを結合し、終端チャンクも追加します。空のデータは飛ばす。
pub fn encode_chunks(chunks: &[&[u8]]) -> Vec<u8> {
    let mut buf = Vec::new();

    for chunk in chunks.iter().filter(|c| !c.is_empty()) {
        buf.extend_from_slice(format!("{:x}\r\n", chunk.len()).as_bytes());
        buf.extend_from_slice(chunk);
        buf.extend_from_slice(b"\r\n");
    }

    // 終端チャンク
    buf.extend_from_slice(b"0\r\n\r\n");

    buf
}
