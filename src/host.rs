//! Host classification (C4).
//!
//! Given the `Host:` header value extracted by [`crate::http`], decides how
//! the proxy should treat the request: rewrite `localhost` targets to the
//! loopback address, refuse HTTPS outright, connect directly to an `ip:port`
//! literal, or fall through to hostname resolution on the default port.

use crate::error::HostKind;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Matches a dotted-quad `ip:port` literal with each octet in 0-255 and
    /// the port in 1-65535.
    static ref IP_PORT_REGEX: Regex = Regex::new(concat!(
        r"^(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.",
        r"(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.",
        r"(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.",
        r"(25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])",
        r":(6553[0-5]|655[0-2][0-9]|65[0-4][0-9]{2}|6[0-4][0-9]{3}|[1-5][0-9]{4}|[1-9][0-9]{0,3})$",
    ))
    .unwrap();

    /// Matches `host:443` — any hostname targeting the HTTPS port.
    static ref HTTPS_REGEX: Regex = Regex::new(r"^[A-Za-z0-9.-]+:443$").unwrap();
}

/// Rewrites a `localhost[:port]` host to `127.0.0.1:port`, mirroring the
/// original's narrow rewrite rule: it only fires when the host carries an
/// explicit port. A bare `localhost` with no port is left untouched and
/// falls through to ordinary hostname resolution.
pub fn rewrite_localhost(host: &str) -> String {
    if let Some(port) = host.strip_prefix("localhost:") {
        format!("127.0.0.1:{port}")
    } else {
        host.to_string()
    }
}

/// Rewrites a `GET http://localhost[:port]/path HTTP/1.1` request line to
/// `GET /path HTTP/1.1`, leaving everything else in the buffer untouched.
/// Returns `None` if the request line does not target `http://localhost`.
pub fn rewrite_localhost_request_line(line: &str) -> Option<String> {
    let marker = "http://localhost";
    let start = line.find(marker)?;
    let after_marker = &line[start + marker.len()..];

    // The request-target ends at the next space (the start of " HTTP/1.1");
    // everything from there on is kept byte-for-byte.
    let space = after_marker.find(' ').unwrap_or(after_marker.len());
    let (target, tail) = after_marker.split_at(space);

    // Skip an optional ":port" before the path begins. The port is purely
    // numeric, so whatever follows its digits is either "/path..." or
    // nothing (bare authority, no path).
    let without_port = match target.strip_prefix(':') {
        Some(rest) => {
            let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
            &rest[digits..]
        }
        None => target,
    };

    let path = if without_port.is_empty() { "/" } else { without_port };

    Some(format!("{}{}{}", &line[..start], path, tail))
}

/// Classifies a request's target host per C4's decision order: HTTPS
/// refusal, then `ip:port` literal, then plain hostname.
///
/// The caller is expected to have already applied [`rewrite_localhost`] to
/// `host` before calling this function.
pub fn classify(host: &str) -> HostKind {
    if HTTPS_REGEX.is_match(host) {
        return HostKind::Https;
    }

    if IP_PORT_REGEX.is_match(host) {
        let mut parts = host.rsplitn(2, ':');
        let port = parts.next().unwrap();
        let ip = parts.next().unwrap();
        return HostKind::IpLiteral {
            ip: ip.to_string(),
            port: port.parse().expect("regex guarantees a valid port"),
        };
    }

    HostKind::Hostname(host.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localhost_with_port_rewrites_to_loopback() {
        assert_eq!(rewrite_localhost("localhost:8080"), "127.0.0.1:8080");
        assert_eq!(rewrite_localhost("localhost"), "localhost");
        assert_eq!(rewrite_localhost("example.com"), "example.com");
    }

    #[test]
    fn request_line_rewrite_strips_scheme_and_host() {
        assert_eq!(
            rewrite_localhost_request_line("GET http://localhost:8080/foo HTTP/1.1"),
            Some("GET /foo HTTP/1.1".to_string())
        );
        assert_eq!(
            rewrite_localhost_request_line("GET http://localhost HTTP/1.1"),
            Some("GET / HTTP/1.1".to_string())
        );
        assert_eq!(
            rewrite_localhost_request_line("GET http://example.com/foo HTTP/1.1"),
            None
        );
    }

    #[test]
    fn request_line_rewrite_keeps_version_with_port_but_no_path() {
        assert_eq!(
            rewrite_localhost_request_line("GET http://localhost:8080 HTTP/1.1"),
            Some("GET / HTTP/1.1".to_string())
        );
    }

    #[test]
    fn https_targets_are_refused() {
        assert_eq!(classify("example.com:443"), HostKind::Https);
        assert_eq!(classify("127.0.0.1:443"), HostKind::Https);
    }

    #[test]
    fn ip_port_literals_are_classified_directly() {
        assert_eq!(
            classify("192.168.1.1:8080"),
            HostKind::IpLiteral { ip: "192.168.1.1".to_string(), port: 8080 }
        );
        assert_eq!(classify("256.1.1.1:80"), HostKind::Hostname("256.1.1.1:80".to_string()));
        assert_eq!(classify("1.1.1.1:0"), HostKind::Hostname("1.1.1.1:0".to_string()));
        assert_eq!(classify("1.1.1.1:65535").clone(), HostKind::IpLiteral { ip: "1.1.1.1".to_string(), port: 65535 });
    }

    #[test]
    fn plain_hostnames_fall_through() {
        assert_eq!(classify("example.com"), HostKind::Hostname("example.com".to_string()));
    }
}
