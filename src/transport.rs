// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Transport capability
//!
//! One trait method: given URL, method, headers, and body bytes, yield
//! the completed [`Exchange`]. The default implementation rides on
//! reqwest with redirect handling disabled, since the pipeline owns
//! redirects and cookies itself. Test code substitutes its own
//! [`Transport`] to script responses without a socket.

use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use reqwest::header::HeaderMap;
use reqwest::redirect::Policy;
use reqwest::{Method, StatusCode, Version};
use url::Url;

use crate::error::Result;

/// One completed request/response cycle. Immutable once built; a
/// redirect produces a new exchange rather than mutating this one.
#[derive(Debug, Clone)]
pub struct Exchange {
    /// The URL the request actually went to
    pub url: Url,
    /// Response status code
    pub status: StatusCode,
    /// Response headers (multi-valued, case-insensitive keys)
    pub headers: HeaderMap,
    /// Decoded response body bytes
    pub body: Bytes,
    /// Framed response: status line, headers, and body
    pub raw: Bytes,
}

impl Exchange {
    /// First value of a header, if present and valid UTF-8
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// All values for a header
    pub fn header_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }
}

/// Network exchange capability consumed by the client
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one request and buffer the complete response.
    ///
    /// Must surface protocol and connection failures as an error, never
    /// follow redirects, and never touch any cookie state.
    async fn send(
        &self,
        url: Url,
        method: Method,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Exchange>;
}

/// Default transport backed by reqwest
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with redirects disabled
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().redirect(Policy::none()).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        url: Url,
        method: Method,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Exchange> {
        let response = self
            .client
            .request(method, url.clone())
            .headers(headers)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        let raw = frame(version, status, &headers, &body);

        Ok(Exchange {
            url,
            status,
            headers,
            body,
            raw,
        })
    }
}

/// Reassemble the wire-level response framing. reqwest consumes the
/// socket itself, so the frame is rebuilt from the parsed parts.
fn frame(version: Version, status: StatusCode, headers: &HeaderMap, body: &Bytes) -> Bytes {
    let mut raw = BytesMut::with_capacity(body.len() + 256);

    raw.put_slice(format!("{:?} {}", version, status.as_u16()).as_bytes());
    if let Some(reason) = status.canonical_reason() {
        raw.put_u8(b' ');
        raw.put_slice(reason.as_bytes());
    }
    raw.put_slice(b"\r\n");

    for (name, value) in headers.iter() {
        raw.put_slice(name.as_str().as_bytes());
        raw.put_slice(b": ");
        raw.put_slice(value.as_bytes());
        raw.put_slice(b"\r\n");
    }

    raw.put_slice(b"\r\n");
    raw.put_slice(body);
    raw.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_frame_layout() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        let body = Bytes::from_static(br#"{"hello":"world!"}"#);

        let raw = frame(Version::HTTP_11, StatusCode::OK, &headers, &body);
        let text = String::from_utf8(raw.to_vec()).unwrap();

        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("content-type: application/json\r\n"));
        assert!(text.ends_with("\r\n\r\n{\"hello\":\"world!\"}"));
    }

    #[tokio::test]
    async fn test_send_against_mock_server() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new().unwrap();
        let url = Url::parse(&format!("{}/ping", server.uri())).unwrap();
        let exchange = transport
            .send(url, Method::GET, HeaderMap::new(), Bytes::new())
            .await
            .unwrap();

        assert_eq!(exchange.status, StatusCode::OK);
        assert_eq!(&exchange.body[..], b"pong");
        let raw = String::from_utf8_lossy(&exchange.raw);
        assert!(raw.contains("pong"));
    }

    #[tokio::test]
    async fn test_transport_does_not_follow_redirects() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/from"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", "/to"))
            .mount(&server)
            .await;

        let transport = HttpTransport::new().unwrap();
        let url = Url::parse(&format!("{}/from", server.uri())).unwrap();
        let exchange = transport
            .send(url, Method::GET, HeaderMap::new(), Bytes::new())
            .await
            .unwrap();

        assert_eq!(exchange.status, StatusCode::MOVED_PERMANENTLY);
        assert_eq!(exchange.header("location"), Some("/to"));
    }

    #[tokio::test]
    async fn test_connection_failure_surfaces() {
        let transport = HttpTransport::new().unwrap();
        // Reserved port with nothing listening
        let url = Url::parse("http://127.0.0.1:9/unreachable").unwrap();
        let result = transport
            .send(url, Method::GET, HeaderMap::new(), Bytes::new())
            .await;

        assert!(result.is_err());
    }
}
