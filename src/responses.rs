//! Static response templates (C9).
//!
//! The proxy never parses or transforms upstream responses, but it does
//! synthesize two of its own: a 404 for refused/unresolvable targets and a
//! 403 for hosts denied by the rule engine. Both are fixed byte strings
//! written in full before the connection is closed.

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

pub const NOT_FOUND: &[u8] = b"HTTP/1.1 404 Not Found\r\n\
Content-Type: text/html\r\n\
Content-Length: 12\r\n\
Connection: close\r\n\
\r\n\
<h1>404</h1>";

pub const FORBIDDEN: &[u8] = b"HTTP/1.1 403 Forbidden\r\n\
Content-Type: text/html\r\n\
Content-Length: 12\r\n\
Connection: close\r\n\
\r\n\
<h1>403</h1>";

/// Writes `buf` to `stream` in full, looping over partial writes the way
/// the relay engine does for ordinary forwarded traffic. Returns the
/// underlying I/O error on failure; the caller closes the slot either way.
pub async fn write_all(stream: &mut TcpStream, buf: &[u8]) -> std::io::Result<()> {
    stream.write_all(buf).await
}

pub async fn write_not_found(stream: &mut TcpStream) -> std::io::Result<()> {
    write_all(stream, NOT_FOUND).await
}

pub async fn write_forbidden(stream: &mut TcpStream) -> std::io::Result<()> {
    write_all(stream, FORBIDDEN).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_declare_accurate_content_length() {
        for template in [NOT_FOUND, FORBIDDEN] {
            let text = String::from_utf8_lossy(template);
            let (header, body) = text.split_once("\r\n\r\n").unwrap();
            let declared: usize = header
                .lines()
                .find_map(|l| l.strip_prefix("Content-Length: "))
                .unwrap()
                .parse()
                .unwrap();
            assert_eq!(declared, body.len());
        }
    }

    #[test]
    fn templates_end_connection() {
        assert!(String::from_utf8_lossy(NOT_FOUND).contains("Connection: close"));
        assert!(String::from_utf8_lossy(FORBIDDEN).contains("Connection: close"));
    }
}
