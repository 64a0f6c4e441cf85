// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Response decoding
//!
//! The final exchange of a call is decoded once: the convenience
//! `body` field eagerly holds parsed JSON when the content-type or an
//! explicit hint says so, raw text otherwise. JSON parsing is lenient
//! by default: a malformed body surfaces as a value, not an error,
//! unless the caller asked for strict decoding.

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::cookie::CookieJar;
use crate::error::{Error, Result};
use crate::options::ResponseType;
use crate::transport::Exchange;

/// Decoded convenience body of a response
#[derive(Debug, Clone)]
pub enum BodyValue {
    /// Body parsed as JSON
    Json(Value),
    /// Body decoded as UTF-8 text
    Text(String),
    /// JSON was expected but did not parse; carries the parse error
    Malformed(String),
}

impl BodyValue {
    /// The parsed JSON value, if this body holds one
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            BodyValue::Json(value) => Some(value),
            _ => None,
        }
    }

    /// The decoded text, if this body holds plain text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            BodyValue::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Result of parsing the response body as JSON. The malformed branch
/// is a value, so probing callers can inspect it without an error path.
#[derive(Debug, Clone)]
pub enum JsonOutcome {
    /// The body parsed cleanly
    Parsed(Value),
    /// The body was not valid JSON; carries the parse error description
    Malformed(String),
}

impl JsonOutcome {
    /// The parsed value, if any
    pub fn value(&self) -> Option<&Value> {
        match self {
            JsonOutcome::Parsed(value) => Some(value),
            JsonOutcome::Malformed(_) => None,
        }
    }

    /// Whether the parse failed
    pub fn is_malformed(&self) -> bool {
        matches!(self, JsonOutcome::Malformed(_))
    }

    /// Convert the malformed branch into a raised error
    pub fn into_result(self) -> Result<Value> {
        match self {
            JsonOutcome::Parsed(value) => Ok(value),
            JsonOutcome::Malformed(msg) => Err(Error::MalformedJson(msg)),
        }
    }
}

/// Final decoded response of one logical call
#[derive(Debug, Clone)]
pub struct Response {
    /// Response status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Convenience body: JSON when indicated, text otherwise
    pub body: BodyValue,
    /// Raw body bytes only
    pub raw_body: Bytes,
    /// Full framed response bytes
    pub raw_response: Bytes,
    /// The URL of the terminal exchange
    pub url: Url,
    /// The jar used for this call, for inspection
    pub cookie_jar: CookieJar,
    reject_bad_json: bool,
}

impl Response {
    /// Decode the terminal exchange of a call.
    ///
    /// Fails only when JSON decoding was indicated, the body is
    /// malformed, and strict decoding was requested.
    pub(crate) fn decode(
        exchange: Exchange,
        cookie_jar: CookieJar,
        hint: Option<ResponseType>,
        reject_bad_json: bool,
    ) -> Result<Self> {
        let wants_json = hint == Some(ResponseType::Json)
            || exchange
                .header("content-type")
                .map_or(false, |ct| ct.to_lowercase().starts_with("application/json"));

        let body = if wants_json {
            match serde_json::from_slice::<Value>(&exchange.body) {
                Ok(value) => BodyValue::Json(value),
                Err(err) if reject_bad_json => return Err(Error::MalformedJson(err.to_string())),
                Err(err) => BodyValue::Malformed(err.to_string()),
            }
        } else {
            BodyValue::Text(String::from_utf8_lossy(&exchange.body).into_owned())
        };

        Ok(Self {
            status: exchange.status,
            headers: exchange.headers,
            body,
            raw_body: exchange.body,
            raw_response: exchange.raw,
            url: exchange.url,
            cookie_jar,
            reject_bad_json,
        })
    }

    /// Check if status is success (2xx)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Check if status is redirect (3xx)
    pub fn is_redirect(&self) -> bool {
        self.status.is_redirection()
    }

    /// Get status code as u16
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get all values for a header
    pub fn header_all(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .collect()
    }

    /// Get content type
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Raw body as text, lossy conversion
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.raw_body).into_owned()
    }

    /// Parse the raw body as JSON.
    ///
    /// Lenient by default: a malformed body comes back as
    /// [`JsonOutcome::Malformed`]. With `reject_bad_json` set on the
    /// call, the malformed branch is raised as
    /// [`Error::MalformedJson`] instead.
    pub fn parse_json(&self) -> Result<JsonOutcome> {
        let outcome = match serde_json::from_slice::<Value>(&self.raw_body) {
            Ok(value) => JsonOutcome::Parsed(value),
            Err(err) => JsonOutcome::Malformed(err.to_string()),
        };

        if self.reject_bad_json {
            if let JsonOutcome::Malformed(msg) = outcome {
                return Err(Error::MalformedJson(msg));
            }
        }

        Ok(outcome)
    }

    /// Strictly deserialize the raw body into a typed value
    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.raw_body).map_err(|e| Error::MalformedJson(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    fn exchange(content_type: Option<&str>, body: &str) -> Exchange {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert("content-type", HeaderValue::try_from(ct).unwrap());
        }
        Exchange {
            url: Url::parse("https://test.example.sample/path").unwrap(),
            status: StatusCode::OK,
            headers,
            body: Bytes::from(body.to_string()),
            raw: Bytes::from(format!("HTTP/1.1 200 OK\r\n\r\n{}", body)),
        }
    }

    #[test]
    fn test_json_content_type_decodes_eagerly() {
        let resp = Response::decode(
            exchange(Some("application/json"), r#"{"hello":"world!"}"#),
            CookieJar::new(),
            None,
            false,
        )
        .unwrap();

        assert_eq!(resp.body.as_json(), Some(&json!({"hello": "world!"})));
    }

    #[test]
    fn test_content_type_match_is_case_insensitive() {
        let resp = Response::decode(
            exchange(Some("Application/JSON; charset=utf-8"), "[1, 2]"),
            CookieJar::new(),
            None,
            false,
        )
        .unwrap();

        assert_eq!(resp.body.as_json(), Some(&json!([1, 2])));
    }

    #[test]
    fn test_hint_overrides_content_type() {
        let resp = Response::decode(
            exchange(Some("text/plain"), r#"{"hello":"world!"}"#),
            CookieJar::new(),
            Some(ResponseType::Json),
            false,
        )
        .unwrap();

        assert_eq!(resp.body.as_json(), Some(&json!({"hello": "world!"})));
    }

    #[test]
    fn test_non_json_body_is_text() {
        let resp = Response::decode(
            exchange(Some("text/plain"), "just text"),
            CookieJar::new(),
            None,
            false,
        )
        .unwrap();

        assert_eq!(resp.body.as_text(), Some("just text"));
        assert_eq!(resp.text(), "just text");
    }

    #[test]
    fn test_lenient_malformed_json_is_a_value() {
        let resp = Response::decode(
            exchange(Some("application/json"), "not json"),
            CookieJar::new(),
            None,
            false,
        )
        .unwrap();

        assert!(matches!(resp.body, BodyValue::Malformed(_)));
        let outcome = resp.parse_json().unwrap();
        assert!(outcome.is_malformed());
        assert!(outcome.into_result().is_err());
    }

    #[test]
    fn test_strict_malformed_json_aborts_decode() {
        let err = Response::decode(
            exchange(Some("application/json"), "not json"),
            CookieJar::new(),
            None,
            true,
        )
        .unwrap_err();

        assert!(err.is_malformed_json());
    }

    #[test]
    fn test_strict_parse_json_raises() {
        let resp = Response::decode(
            exchange(Some("text/plain"), "not json"),
            CookieJar::new(),
            None,
            true,
        )
        .unwrap();

        assert!(resp.parse_json().unwrap_err().is_malformed_json());
    }

    #[test]
    fn test_typed_decode() {
        #[derive(serde::Deserialize)]
        struct Sample {
            hello: String,
        }

        let resp = Response::decode(
            exchange(Some("application/json"), r#"{"hello":"world!"}"#),
            CookieJar::new(),
            None,
            false,
        )
        .unwrap();

        let sample: Sample = resp.json_as().unwrap();
        assert_eq!(sample.hello, "world!");
    }
}
