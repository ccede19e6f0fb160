//! The relay engine (C8): accepts connections, frames requests, classifies
//! and filters hosts, connects upstream, and shuttles bytes until either
//! side closes.
//!
//! One Tokio task per connection plays the role the original's single
//! `poll()` loop played for every file descriptor pair: `tokio::select!`
//! over the two halves of a connection is this program's "wait for
//! whichever side is ready next".

use crate::config::Config;
use crate::connection::{ConnectionTable, Phase};
use crate::connector::{self, ConnectTarget};
use crate::error::{FrameError, HostKind};
use crate::host;
use crate::http::{self, BUFFER_SIZE};
use crate::resolver::ResolverCache;
use crate::responses;
use crate::rules::RuleSet;
use crate::signal;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;

pub struct Engine {
    config: Config,
    rules: RuleSet,
    resolver: ResolverCache,
    table: Arc<ConnectionTable>,
}

impl Engine {
    pub fn new(config: Config, rules: RuleSet) -> Engine {
        let table = Arc::new(ConnectionTable::new(config.max_client));
        Engine { config, rules, resolver: ResolverCache::new(), table }
    }

    /// Runs the accept loop until `running` is flipped to `false`. `shutdown`
    /// is cloned into every spawned connection task so in-flight relays also
    /// notice shutdown instead of draining only on their own I/O.
    pub async fn run(
        self: Arc<Self>,
        running: Arc<AtomicBool>,
        shutdown: watch::Receiver<bool>,
    ) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        log::info!("listening on {}", self.config.bind_addr());

        while signal::is_running(&running) {
            let (stream, peer) = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        log::warn!("accept failed: {e}");
                        continue;
                    }
                },
                _ = tokio::time::sleep(std::time::Duration::from_millis(200)) => continue,
            };

            if !self.table.has_capacity() {
                log::warn!("refusing connection from {peer}: at max_client capacity");
                drop(stream);
                continue;
            }

            let slot_id = self.table.open(peer);
            let engine = Arc::clone(&self);
            let shutdown = shutdown.clone();
            tokio::spawn(async move {
                if let Err(e) = engine.handle_connection(stream, slot_id, shutdown).await {
                    log::debug!("connection {peer} ended: {e}");
                }
                engine.table.close(slot_id);
            });
        }

        log::info!("shutting down, {} connections still active", self.table.active_count());
        Ok(())
    }

    async fn handle_connection(
        &self,
        mut client: TcpStream,
        slot_id: u64,
        mut shutdown: watch::Receiver<bool>,
    ) -> std::io::Result<()> {
        let mut buf = vec![0u8; BUFFER_SIZE];
        let mut len = 0usize;

        loop {
            let n = tokio::select! {
                result = client.read(&mut buf[len..]) => result?,
                _ = shutdown.changed() => {
                    log::info!("slot {slot_id}: shutdown while framing request");
                    return Ok(());
                }
            };
            if n == 0 {
                return Ok(());
            }
            len += n;

            // Below the probe threshold a `false` here just means the method
            // token hasn't fully arrived yet, not that it never will; only
            // reject once there's enough data to judge conclusively.
            if len >= http::MAX_METHOD_PROBE_LEN && !http::is_http_method(&buf[..len]) {
                log::warn!("slot {slot_id}: {}", FrameError::UnknownProtocol);
                return Ok(());
            }

            if http::is_http_request_complete(&buf, len) {
                break;
            }

            if len == buf.len() {
                log::warn!("slot {slot_id}: {}", FrameError::BufferFull);
                return Ok(());
            }
        }

        self.table.set_phase(slot_id, Phase::Relaying);

        let host = match http::get_http_host(&buf, len) {
            Some(h) => h,
            None => {
                log::warn!("slot {slot_id}: no Host header");
                return Ok(());
            }
        };

        let rewritten_host = host::rewrite_localhost(&host);
        if rewritten_host != host {
            rewrite_request_line_host(&mut buf, &mut len, &rewritten_host);
        }

        if self.rules.is_denied(&rewritten_host) {
            log::info!("slot {slot_id}: denying {rewritten_host} by rule");
            let _ = responses::write_forbidden(&mut client).await;
            return Ok(());
        }

        let target = match host::classify(&rewritten_host) {
            HostKind::Https => {
                log::info!("slot {slot_id}: refusing HTTPS target {rewritten_host}");
                let _ = responses::write_not_found(&mut client).await;
                return Ok(());
            }
            HostKind::IpLiteral { ip, port } => match Ipv4Addr::from_str(&ip) {
                Ok(ip) => ConnectTarget::IpLiteral(ip, port),
                Err(_) => {
                    log::warn!("slot {slot_id}: invalid ip literal {ip}");
                    return Ok(());
                }
            },
            HostKind::Hostname(name) => match self.resolver.resolve(&name).await {
                Ok(addr) => ConnectTarget::Resolved(addr),
                Err(e) => {
                    log::warn!("slot {slot_id}: resolution failed for {name}: {e}");
                    return Ok(());
                }
            },
        };

        let mut upstream = match connector::connect(target).await {
            Ok(stream) => stream,
            Err(e) => {
                log::warn!("slot {slot_id}: connect failed: {e}");
                let _ = responses::write_not_found(&mut client).await;
                return Ok(());
            }
        };

        upstream.write_all(&buf[..len]).await?;

        duplex(&mut client, &mut upstream, &mut shutdown).await
    }
}

/// Rewrites the `Host:` header value and, if present, a `http://localhost`
/// request-line target in place within `buf[..*len]`, shrinking or growing
/// the buffer as needed.
fn rewrite_request_line_host(buf: &mut Vec<u8>, len: &mut usize, new_host: &str) {
    let text = match std::str::from_utf8(&buf[..*len]) {
        Ok(t) => t.to_string(),
        Err(_) => return,
    };

    let mut lines: Vec<String> = text.split("\r\n").map(str::to_string).collect();
    if lines.is_empty() {
        return;
    }

    if let Some(rewritten) = host::rewrite_localhost_request_line(&lines[0]) {
        lines[0] = rewritten;
    }

    for line in lines.iter_mut().skip(1) {
        if let Some(rest) = line.strip_prefix("Host: ") {
            let _ = rest;
            *line = format!("Host: {new_host}");
        }
    }

    let rebuilt = lines.join("\r\n");
    let bytes = rebuilt.into_bytes();
    *len = bytes.len().min(buf.len());
    buf[..*len].copy_from_slice(&bytes[..*len]);
}

/// Shuttles bytes between `client` and `upstream` until either side closes,
/// errors, or `shutdown` fires. Every read is written in full before the
/// next read, matching the all-or-nothing write discipline used for the
/// response templates.
async fn duplex(
    client: &mut TcpStream,
    upstream: &mut TcpStream,
    shutdown: &mut watch::Receiver<bool>,
) -> std::io::Result<()> {
    let mut client_buf = vec![0u8; BUFFER_SIZE];
    let mut upstream_buf = vec![0u8; BUFFER_SIZE];

    loop {
        tokio::select! {
            result = client.read(&mut client_buf) => {
                let n = result?;
                if n == 0 {
                    return Ok(());
                }
                upstream.write_all(&client_buf[..n]).await?;
            }
            result = upstream.read(&mut upstream_buf) => {
                let n = result?;
                if n == 0 {
                    return Ok(());
                }
                client.write_all(&upstream_buf[..n]).await?;
            }
            _ = shutdown.changed() => {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrites_host_header_in_place() {
        let request = b"GET / HTTP/1.1\r\nHost: localhost:8080\r\nX-Foo: bar\r\n\r\n";
        let mut buf = vec![0u8; BUFFER_SIZE];
        let mut len = request.len();
        buf[..len].copy_from_slice(request);

        rewrite_request_line_host(&mut buf, &mut len, "127.0.0.1:8080");

        let rewritten = String::from_utf8(buf[..len].to_vec()).unwrap();
        assert!(rewritten.contains("Host: 127.0.0.1:8080"));
        assert!(rewritten.starts_with("GET / HTTP/1.1\r\n"));
    }

    #[test]
    fn rewrites_localhost_request_target_too() {
        let request = b"GET http://localhost:8080/status HTTP/1.1\r\nHost: localhost:8080\r\n\r\n";
        let mut buf = vec![0u8; BUFFER_SIZE];
        let mut len = request.len();
        buf[..len].copy_from_slice(request);

        rewrite_request_line_host(&mut buf, &mut len, "127.0.0.1:8080");

        let rewritten = String::from_utf8(buf[..len].to_vec()).unwrap();
        assert!(rewritten.starts_with("GET /status HTTP/1.1\r\n"));
        assert!(rewritten.contains("Host: 127.0.0.1:8080"));
    }
}
