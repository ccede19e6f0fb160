//! HTTP/1.1 request framing.
//!
//! This is deliberately not a full HTTP parser. It answers exactly three
//! byte-level questions over an accumulating client buffer:
//!
//! * does the buffer start with something that looks like an HTTP method,
//! * has a complete request (headers terminated by `\r\n\r\n`, with a
//!   well-formed request line) arrived yet, and
//! * what host did the client ask for.
//!
//! The scan is intentionally case-sensitive on `"Host: "`, matching the
//! original byte-level scanner this module is ported from.

/// Maximum length, in bytes, of the request line (method + target + version).
pub const MAX_REQUEST_LINE: usize = 256;

/// Size of the per-connection read buffer.
pub const BUFFER_SIZE: usize = 4096;

const HTTP_METHODS: [&str; 9] = [
    "GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS", "PATCH", "TRACE", "CONNECT",
];

/// Number of bytes needed to conclusively judge [`is_http_method`]: the
/// longest known method token (`CONNECT`/`OPTIONS`) plus its trailing space.
/// Below this many bytes, a `false` result may just mean the method token
/// hasn't fully arrived yet, not that it never will match.
pub const MAX_METHOD_PROBE_LEN: usize = 8;

/// Returns true if `buf` begins with one of the known HTTP methods followed
/// by a space.
pub fn is_http_method(buf: &[u8]) -> bool {
    HTTP_METHODS.iter().any(|method| {
        buf.len() > method.len()
            && buf.starts_with(method.as_bytes())
            && buf[method.len()] == b' '
    })
}

/// Returns true once `buf[..len]` holds a syntactically complete HTTP
/// request: headers terminated by a blank line, a request line no longer
/// than [`MAX_REQUEST_LINE`] of the form `METHOD SP TARGET SP HTTP/1.1`, and
/// a `Host:` header.
pub fn is_http_request_complete(buf: &[u8], len: usize) -> bool {
    let data = &buf[..len];

    let headers_end = match find(data, b"\r\n\r\n") {
        Some(pos) => pos,
        None => return false,
    };

    let line_end = match find(data, b"\r\n") {
        Some(pos) => pos,
        None => return false,
    };
    if line_end > MAX_REQUEST_LINE {
        return false;
    }
    let request_line = &data[..line_end];

    let first_space = match request_line.iter().position(|&b| b == b' ') {
        Some(pos) => pos,
        None => return false,
    };
    let rest = &request_line[first_space + 1..];
    let second_space = match rest.iter().position(|&b| b == b' ') {
        Some(pos) => pos,
        None => return false,
    };
    let version = &rest[second_space + 1..];
    if version != b"HTTP/1.1" {
        return false;
    }

    if find(&data[..headers_end], b"Host: ").is_none() {
        return false;
    }

    true
}

/// Extracts the value of the first `Host:` header from `buf[..len]`, or
/// `None` if no such header is present.
pub fn get_http_host(buf: &[u8], len: usize) -> Option<String> {
    let data = &buf[..len];
    let marker = b"Host: ";
    let start = find(data, marker)? + marker.len();
    let rest = &data[start..];
    let end = rest
        .iter()
        .position(|&b| b == b'\r' || b == b'\n')
        .unwrap_or(rest.len());
    String::from_utf8(rest[..end].to_vec()).ok()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_known_methods() {
        assert!(is_http_method(b"GET / HTTP/1.1\r\n"));
        assert!(is_http_method(b"POST /submit HTTP/1.1\r\n"));
        assert!(!is_http_method(b"GETX / HTTP/1.1\r\n"));
        assert!(!is_http_method(b"garbage"));
    }

    #[test]
    fn complete_request_needs_host_and_blank_line() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
        assert!(is_http_request_complete(req, req.len()));

        let no_blank_line = b"GET / HTTP/1.1\r\nHost: example.com\r\n";
        assert!(!is_http_request_complete(no_blank_line, no_blank_line.len()));

        let no_host = b"GET / HTTP/1.1\r\nX-Foo: bar\r\n\r\n";
        assert!(!is_http_request_complete(no_host, no_host.len()));
    }

    #[test]
    fn request_line_over_budget_is_incomplete() {
        let mut req = b"GET /".to_vec();
        req.extend(std::iter::repeat(b'a').take(300));
        req.extend_from_slice(b" HTTP/1.1\r\nHost: example.com\r\n\r\n");
        assert!(!is_http_request_complete(&req, req.len()));
    }

    #[test]
    fn extracts_host_header_case_sensitively() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com:8080\r\n\r\n";
        assert_eq!(get_http_host(req, req.len()).as_deref(), Some("example.com:8080"));

        let lower = b"GET / HTTP/1.1\r\nhost: example.com\r\n\r\n";
        assert_eq!(get_http_host(lower, lower.len()), None);
    }
}
