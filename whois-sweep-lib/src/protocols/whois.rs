//! Raw WHOIS protocol client (RFC 3912).
//!
//! A WHOIS exchange is one TCP connection to port 43: the client writes a
//! single CRLF-terminated query line and reads until the server closes the
//! connection. Many servers keep the socket open after the last byte, so a
//! period of silence is also treated as the end of the response.

use crate::error::DomainCheckError;
use crate::protocols::resolver::Resolver;
use crate::types::{CheckConfig, WHOIS_PORT};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// IANA's WHOIS server, authoritative for the root zone.
pub const IANA_WHOIS_SERVER: &str = "whois.iana.org";

const READ_CHUNK: usize = 4096;

/// Why a response read finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Completion {
    Closed,
    Idle,
    Truncated,
}

/// WHOIS client that speaks the protocol directly over TCP.
///
/// Each call to [`WhoisClient::query`] opens a fresh connection; nothing is
/// reused between exchanges.
#[derive(Debug, Clone)]
pub struct WhoisClient {
    resolver: Resolver,
    port: u16,
    connect_timeout: Duration,
    idle_timeout: Duration,
    max_response_bytes: usize,
}

impl WhoisClient {
    /// Create a new WHOIS client with default settings.
    pub fn new() -> Self {
        Self::with_config(&CheckConfig::default())
    }

    /// Create a client from the timeouts and limits in `config`.
    pub fn with_config(config: &CheckConfig) -> Self {
        Self {
            resolver: Resolver::with_timeout(config.resolve_timeout),
            port: config.whois_port,
            connect_timeout: config.connect_timeout,
            idle_timeout: config.idle_timeout,
            max_response_bytes: config.max_response_bytes.max(1),
        }
    }

    /// Replace the resolver (e.g. to use a custom lookup backend).
    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Query `server` for `domain` and return the raw response text.
    ///
    /// # Errors
    ///
    /// * `InvalidServer` if `server` is empty
    /// * `Connection` if the server cannot be resolved, refuses the
    ///   connection, or does not accept it within the connect timeout
    /// * `Transport` if the socket fails once connected, or if the server
    ///   sends nothing before the idle timeout
    ///
    /// Once at least one byte has arrived, neither a server-side close nor an
    /// idle timeout is an error: both end the response normally.
    pub async fn query(&self, server: &str, domain: &str) -> Result<String, DomainCheckError> {
        let server = server.trim();
        if server.is_empty() {
            return Err(DomainCheckError::invalid_server(server));
        }

        let ip = self
            .resolver
            .resolve(server)
            .await
            .map_err(|e| DomainCheckError::connection(server, e.to_string()))?;
        let addr = SocketAddr::new(ip, self.port);

        let mut stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| {
                DomainCheckError::connection(
                    server,
                    format!("connect to {} timed out after {:?}", addr, self.connect_timeout),
                )
            })?
            .map_err(|e| {
                DomainCheckError::connection(server, format!("connect to {} failed: {}", addr, e))
            })?;

        stream
            .write_all(format!("{}\r\n", domain).as_bytes())
            .await
            .map_err(|e| DomainCheckError::transport(server, format!("write failed: {}", e)))?;

        let (bytes, completion) = self.read_response(&mut stream, server).await?;

        debug!(
            server = %server,
            domain = %domain,
            bytes = bytes.len(),
            completion = ?completion,
            "WHOIS exchange finished"
        );

        // Registries are not consistent about encoding; never fail on it.
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Accumulate bytes until EOF, idle silence, or the size cap.
    async fn read_response<R>(
        &self,
        reader: &mut R,
        server: &str,
    ) -> Result<(Vec<u8>, Completion), DomainCheckError>
    where
        R: AsyncRead + Unpin,
    {
        let mut response = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            match tokio::time::timeout(self.idle_timeout, reader.read(&mut chunk)).await {
                Err(_) if response.is_empty() => {
                    return Err(DomainCheckError::transport(
                        server,
                        format!("no response within idle timeout of {:?}", self.idle_timeout),
                    ));
                }
                Err(_) => return Ok((response, Completion::Idle)),
                Ok(Ok(0)) => return Ok((response, Completion::Closed)),
                Ok(Ok(n)) => {
                    let room = self.max_response_bytes - response.len();
                    response.extend_from_slice(&chunk[..n.min(room)]);
                    if response.len() >= self.max_response_bytes {
                        return Ok((response, Completion::Truncated));
                    }
                }
                Ok(Err(e)) => {
                    return Err(DomainCheckError::transport(
                        server,
                        format!("read failed: {}", e),
                    ));
                }
            }
        }
    }
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Discover the authoritative WHOIS server for a TLD via IANA.
///
/// Sends the bare TLD to `whois.iana.org` and parses the `refer:` /
/// `whois:` fields. Returns `Ok(None)` when IANA knows no server for it.
/// This is a single query; referrals are never followed further.
pub async fn discover_whois_server(
    client: &WhoisClient,
    tld: &str,
) -> Result<Option<String>, DomainCheckError> {
    let tld = tld.trim().trim_start_matches('.').to_lowercase();
    let response = client.query(IANA_WHOIS_SERVER, &tld).await?;
    Ok(parse_iana_refer_response(&response))
}

/// Parse an IANA WHOIS response for the authoritative WHOIS server.
///
/// ```text
/// refer:        whois.verisign-grs.com
/// whois:        whois.verisign-grs.com
/// ```
///
/// A non-empty `refer:` wins; otherwise the last non-empty `whois:`.
pub(crate) fn parse_iana_refer_response(response: &str) -> Option<String> {
    let mut whois_field = None;

    for line in response.lines().map(str::trim) {
        if let Some(value) = line.strip_prefix("refer:").map(str::trim) {
            if !value.is_empty() {
                return Some(value.to_string());
            }
        } else if let Some(value) = line.strip_prefix("whois:").map(str::trim) {
            if !value.is_empty() {
                whois_field = Some(value.to_string());
            }
        }
    }

    whois_field
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn client_with_cap(max_response_bytes: usize) -> WhoisClient {
        WhoisClient::with_config(
            &CheckConfig::default().with_max_response_bytes(max_response_bytes),
        )
    }

    #[tokio::test]
    async fn test_query_rejects_empty_server() {
        let client = WhoisClient::new();
        let err = client.query("   ", "example.com").await.unwrap_err();
        assert!(matches!(err, DomainCheckError::InvalidServer { .. }));
    }

    #[tokio::test]
    async fn test_read_until_close() {
        let client = WhoisClient::new();
        let mut reader = tokio_test::io::Builder::new()
            .read(b"No match for ")
            .read(b"\"EXAMPLE.COM\".\r\n")
            .build();

        let (bytes, completion) = client
            .read_response(&mut reader, "whois.example")
            .await
            .unwrap();

        assert_eq!(completion, Completion::Closed);
        assert_eq!(bytes, b"No match for \"EXAMPLE.COM\".\r\n");
    }

    #[tokio::test]
    async fn test_read_stops_at_size_cap() {
        let client = client_with_cap(8);
        let mut reader = tokio_test::io::Builder::new()
            .read(b"Domain Name: EXAMPLE.COM\r\n")
            .build();

        let (bytes, completion) = client
            .read_response(&mut reader, "whois.example")
            .await
            .unwrap();

        assert_eq!(completion, Completion::Truncated);
        assert_eq!(bytes, b"Domain N");
    }

    #[tokio::test]
    async fn test_read_error_is_transport_error() {
        let client = WhoisClient::new();
        let mut reader = tokio_test::io::Builder::new()
            .read(b"partial")
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer"))
            .build();

        let err = client
            .read_response(&mut reader, "whois.example")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainCheckError::Transport { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_after_data_completes_response() {
        let client = WhoisClient::new();
        let (mut reader, _handle) = tokio_test::io::Builder::new()
            .read(b"No match for \"HELD.COM\".\r\n")
            .build_with_handle();

        let (bytes, completion) = client
            .read_response(&mut reader, "whois.example")
            .await
            .unwrap();

        assert_eq!(completion, Completion::Idle);
        assert_eq!(bytes, b"No match for \"HELD.COM\".\r\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_silence_before_first_byte_is_transport_error() {
        let client = WhoisClient::new();
        let (mut reader, _handle) = tokio_test::io::Builder::new().build_with_handle();

        let err = client
            .read_response(&mut reader, "whois.example")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainCheckError::Transport { .. }));
        assert!(err.to_string().contains("no response within idle timeout"));
    }

    #[test]
    fn test_parse_iana_refer_response() {
        let response = "% IANA WHOIS server\n% for more information on IANA, visit http://www.iana.org\n\nrefer:        whois.verisign-grs.com\n\ndomain:       COM\n";
        assert_eq!(
            parse_iana_refer_response(response),
            Some("whois.verisign-grs.com".to_string())
        );

        let no_refer = "% IANA WHOIS server\ndomain: TEST\nstatus: ACTIVE\n";
        assert_eq!(parse_iana_refer_response(no_refer), None);

        let empty_refer = "refer:        \ndomain: COM\n";
        assert_eq!(parse_iana_refer_response(empty_refer), None);

        let whois_field = "domain:       IO\n\nwhois:        whois.nic.io\n\nstatus:       ACTIVE\n";
        assert_eq!(
            parse_iana_refer_response(whois_field),
            Some("whois.nic.io".to_string())
        );

        let both = "whois:        whois.old-server.example\nrefer:        whois.current.example\n";
        assert_eq!(
            parse_iana_refer_response(both),
            Some("whois.current.example".to_string())
        );
    }

    #[test]
    fn test_client_uses_config() {
        let config = CheckConfig::default().with_whois_port(4343);
        let client = WhoisClient::with_config(&config);
        assert_eq!(client.port(), 4343);
        assert_eq!(WhoisClient::new().port(), WHOIS_PORT);
    }
}
