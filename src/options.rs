// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request options and the client-default/per-call merge
//!
//! A call site can pass a bare URL or a full [`RequestOptions`]; either
//! way the client merges it over its own defaults before executing.
//! Precedence is explicit and field-by-field: an override field that is
//! set wins, an unset one falls back to the default, and an unset flag
//! falls back to the built-in policy (redirects on, lenient JSON).

use std::collections::HashMap;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::cookie::CookieJar;
use crate::error::{Error, Result};

/// Outgoing request body
#[derive(Debug, Clone)]
pub enum Body {
    /// Raw bytes, passed through unchanged
    Raw(Bytes),
    /// Text, passed through unchanged
    Text(String),
    /// Structured value, JSON-encoded on the wire
    Json(Value),
}

impl Body {
    /// Whether this body carries JSON intent by shape alone
    pub fn is_structured(&self) -> bool {
        matches!(self, Body::Json(_))
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Body::Text(s.to_string())
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Text(s)
    }
}

impl From<Bytes> for Body {
    fn from(b: Bytes) -> Self {
        Body::Raw(b)
    }
}

impl From<Vec<u8>> for Body {
    fn from(b: Vec<u8>) -> Self {
        Body::Raw(Bytes::from(b))
    }
}

impl From<Value> for Body {
    fn from(v: Value) -> Self {
        Body::Json(v)
    }
}

/// Explicit decode hint for the response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseType {
    /// Parse the response body as JSON regardless of content-type
    Json,
}

/// Options for a single request, merged over client defaults
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Target URL; parsed when execution begins
    pub url: Option<String>,
    /// HTTP method (GET when unset)
    pub method: Option<Method>,
    /// Caller-supplied headers; always win over computed ones
    pub headers: HeaderMap,
    /// Outgoing body
    pub body: Option<Body>,
    /// Structured value forcing JSON encoding of the request body
    pub json: Option<Value>,
    /// Form mapping, URL-encoded when no JSON intent is present
    pub form: Option<Vec<(String, String)>>,
    /// Query parameters appended to the URL; `None` values are skipped
    pub params: Option<Vec<(String, Option<String>)>>,
    /// Jar for this call (client's own when unset)
    pub cookie_jar: Option<CookieJar>,
    /// Follow redirect responses (true when unset)
    pub follow_redirect: Option<bool>,
    /// Fail the call on malformed JSON instead of returning it as a value
    pub reject_bad_json: Option<bool>,
    /// Explicit response decode hint
    pub response_type: Option<ResponseType>,
}

impl RequestOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target URL
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the HTTP method
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Set a header; silently dropped if the name or value is invalid
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Set multiple headers
    pub fn headers(mut self, headers: HashMap<String, String>) -> Self {
        for (name, value) in headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::try_from(name.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                self.headers.insert(name, value);
            }
        }
        self
    }

    /// Set the request body
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set a structured value to be JSON-encoded as the body
    pub fn json<T: Serialize>(mut self, data: &T) -> Result<Self> {
        self.json = Some(serde_json::to_value(data)?);
        Ok(self)
    }

    /// Set the form mapping
    pub fn form<K, V, I>(mut self, form: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.form = Some(form.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Append a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params
            .get_or_insert_with(Vec::new)
            .push((key.into(), Some(value.into())));
        self
    }

    /// Set the cookie jar for this call
    pub fn cookie_jar(mut self, jar: CookieJar) -> Self {
        self.cookie_jar = Some(jar);
        self
    }

    /// Enable or disable redirect following
    pub fn follow_redirect(mut self, follow: bool) -> Self {
        self.follow_redirect = Some(follow);
        self
    }

    /// Enable or disable strict JSON decoding
    pub fn reject_bad_json(mut self, reject: bool) -> Self {
        self.reject_bad_json = Some(reject);
        self
    }

    /// Set the response decode hint
    pub fn response_type(mut self, hint: ResponseType) -> Self {
        self.response_type = Some(hint);
        self
    }

    /// Merge an override over these defaults, field by field.
    ///
    /// Set override fields win; unset ones inherit the default. An
    /// override header map replaces the default map wholesale when it
    /// carries any entry, mirroring a shallow option merge.
    pub fn merge(&self, over: RequestOptions) -> RequestOptions {
        RequestOptions {
            url: over.url.or_else(|| self.url.clone()),
            method: over.method.or_else(|| self.method.clone()),
            headers: if over.headers.is_empty() {
                self.headers.clone()
            } else {
                over.headers
            },
            body: over.body.or_else(|| self.body.clone()),
            json: over.json.or_else(|| self.json.clone()),
            form: over.form.or_else(|| self.form.clone()),
            params: over.params.or_else(|| self.params.clone()),
            cookie_jar: over.cookie_jar.or_else(|| self.cookie_jar.clone()),
            follow_redirect: over.follow_redirect.or(self.follow_redirect),
            reject_bad_json: over.reject_bad_json.or(self.reject_bad_json),
            response_type: over.response_type.or(self.response_type),
        }
    }

    /// Parse the target URL, failing when absent or unparseable
    pub fn resolved_url(&self) -> Result<Url> {
        let raw = self.url.as_deref().ok_or(Error::MissingUrl)?;
        Ok(Url::parse(raw)?)
    }

    /// Effective method (GET when unset)
    pub fn resolved_method(&self) -> Method {
        self.method.clone().unwrap_or(Method::GET)
    }

    /// Effective redirect policy (on when unset)
    pub fn follows_redirects(&self) -> bool {
        self.follow_redirect.unwrap_or(true)
    }

    /// Effective JSON strictness (lenient when unset)
    pub fn rejects_bad_json(&self) -> bool {
        self.reject_bad_json.unwrap_or(false)
    }
}

impl From<&str> for RequestOptions {
    fn from(url: &str) -> Self {
        RequestOptions::new().url(url)
    }
}

impl From<String> for RequestOptions {
    fn from(url: String) -> Self {
        RequestOptions::new().url(url)
    }
}

impl From<Url> for RequestOptions {
    fn from(url: Url) -> Self {
        RequestOptions::new().url(url.as_str())
    }
}

impl From<&Url> for RequestOptions {
    fn from(url: &Url) -> Self {
        RequestOptions::new().url(url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_url_promotion() {
        let opts: RequestOptions = "https://example.com/path".into();
        assert_eq!(opts.url.as_deref(), Some("https://example.com/path"));
        assert_eq!(opts.resolved_method(), Method::GET);
    }

    #[test]
    fn test_merge_override_wins() {
        let defaults = RequestOptions::new()
            .url("https://default.example")
            .method(Method::POST)
            .reject_bad_json(true);
        let over = RequestOptions::new().url("https://override.example");
        let merged = defaults.merge(over);

        assert_eq!(merged.url.as_deref(), Some("https://override.example"));
        assert_eq!(merged.resolved_method(), Method::POST);
        assert!(merged.rejects_bad_json());
    }

    #[test]
    fn test_merge_headers_replace_wholesale() {
        let defaults = RequestOptions::new().header("x-default", "1");
        let merged = defaults.merge(RequestOptions::new().header("x-override", "2"));

        assert!(merged.headers.get("x-default").is_none());
        assert!(merged.headers.get("x-override").is_some());

        let defaults = RequestOptions::new().header("x-default", "1");
        let merged = defaults.merge(RequestOptions::new());
        assert!(merged.headers.get("x-default").is_some());
    }

    #[test]
    fn test_policy_defaults() {
        let opts = RequestOptions::new();
        assert!(opts.follows_redirects());
        assert!(!opts.rejects_bad_json());

        let opts = opts.follow_redirect(false);
        assert!(!opts.follows_redirects());
    }

    #[test]
    fn test_resolved_url_errors() {
        assert!(matches!(
            RequestOptions::new().resolved_url(),
            Err(Error::MissingUrl)
        ));
        assert!(matches!(
            RequestOptions::new().url("not a url").resolved_url(),
            Err(Error::Url(_))
        ));
    }

    #[test]
    fn test_invalid_header_dropped() {
        let opts = RequestOptions::new().header("bad header\n", "v");
        assert!(opts.headers.is_empty());
    }
}
