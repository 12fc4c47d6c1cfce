//! レスポンスボディのデコード
//!
//! ## 概要
//!
//! 受信済みのレスポンスボディ全体に対して Transfer-Encoding: chunked を解除し、
//! Content-Length を超える余分なデータを切り詰めます。
//!
//! ## 使い方
//!
//! ```rust
//! use hopchain::HeaderBlock;
//! use hopchain::chunked::{decode_body, decode_chunked};
//!
//! assert_eq!(decode_chunked(b"5\r\nHello\r\n0\r\n\r\n").unwrap(), b"Hello");
//!
//! let headers = HeaderBlock::parse("HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n");
//! assert_eq!(decode_body(&headers, b"3;ext=1\r\nabc\r\n0\r\n\r\n").unwrap(), b"abc");
//! ```

use crate::error::Error;
use crate::header_block::HeaderBlock;

/// chunked ボディをデコード
///
/// チャンク拡張とトレーラーは読み捨てる。行末は CRLF のほか LF のみも受け付ける。
pub fn decode_chunked(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    let mut pos = 0;

    loop {
        let (line, next) = read_line(data, pos).ok_or(Error::IncompleteBody)?;
        let line = std::str::from_utf8(line)
            .map_err(|e| Error::InvalidData(format!("invalid UTF-8: {e}")))?;

        // チャンクサイズをパース (拡張は無視)
        let size_str = line.split(';').next().unwrap_or(line).trim();
        let chunk_size = usize::from_str_radix(size_str, 16)
            .map_err(|_| Error::InvalidData(format!("invalid chunk size: {}", size_str)))?;
        pos = next;

        if chunk_size == 0 {
            return Ok(out);
        }

        let end = pos
            .checked_add(chunk_size)
            .ok_or_else(|| Error::InvalidData("chunk size overflow".to_string()))?;
        let chunk = data.get(pos..end).ok_or(Error::IncompleteBody)?;
        out.extend_from_slice(chunk);
        pos = end;

        match data.get(pos..) {
            Some([b'\r', b'\n', ..]) => pos += 2,
            Some([b'\n', ..]) => pos += 1,
            Some([]) | Some([b'\r']) | None => return Err(Error::IncompleteBody),
            Some(_) => {
                return Err(Error::InvalidData(
                    "invalid chunked encoding: expected CRLF after chunk data".to_string(),
                ));
            }
        }
    }
}

/// `pos` から始まる 1 行と次の行の開始位置を返す
fn read_line(data: &[u8], pos: usize) -> Option<(&[u8], usize)> {
    let rest = data.get(pos..)?;
    let lf = rest.iter().position(|&b| b == b'\n')?;
    let line = rest[..lf].strip_suffix(b"\r").unwrap_or(&rest[..lf]);
    Some((line, pos + lf + 1))
}

/// Transfer-Encoding の最後のコーディングが chunked か
///
/// RFC 9112 Section 6.1: chunked は最後のエンコーディングでなければならない
pub fn is_chunked(headers: &HeaderBlock) -> bool {
    headers
        .get_all("transfer-encoding")
        .iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .last()
        .is_some_and(|token| token.eq_ignore_ascii_case("chunked"))
}

/// ヘッダーに従ってボディをデコード
///
/// chunked ならデコードし、Content-Length があればそれを超える部分を切り詰める。
/// Content-Length より短いボディはそのまま返す。
pub fn decode_body(headers: &HeaderBlock, body: &[u8]) -> Result<Vec<u8>, Error> {
    if is_chunked(headers) {
        return decode_chunked(body);
    }

    let content_length = headers
        .first("content-length")
        .and_then(|v| v.trim().parse::<usize>().ok());
    match content_length {
        Some(len) if len < body.len() => Ok(body[..len].to_vec()),
        _ => Ok(body.to_vec()),
    }
}
