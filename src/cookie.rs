// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Cookie jar: parsing, storage, and the store adapter
//!
//! The pipeline consumes cookies through the [`CookieJar`] adapter,
//! which wraps any [`CookieStore`] implementation behind one async
//! capability. [`MemoryCookieStore`] is the built-in store; external
//! stores (disk-backed, shared) plug in through the same trait.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};

/// A single HTTP cookie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name
    pub name: String,
    /// Cookie value
    pub value: String,
    /// Domain the cookie belongs to
    pub domain: String,
    /// Path the cookie is valid for
    pub path: String,
    /// Expiration time (None = session cookie)
    pub expires: Option<DateTime<Utc>>,
    /// Secure flag (HTTPS only)
    pub secure: bool,
    /// HttpOnly flag
    pub http_only: bool,
    /// SameSite attribute
    pub same_site: SameSite,
}

/// SameSite cookie attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SameSite {
    /// Cookie sent with all requests
    #[default]
    None,
    /// Cookie sent with same-site and top-level navigations
    Lax,
    /// Cookie only sent with same-site requests
    Strict,
}

impl Cookie {
    /// Create a new cookie
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            path: "/".to_string(),
            expires: None,
            secure: false,
            http_only: false,
            same_site: SameSite::default(),
        }
    }

    /// Set the domain
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Set the path
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set expiration time
    pub fn expires(mut self, expires: DateTime<Utc>) -> Self {
        self.expires = Some(expires);
        self
    }

    /// Check if the cookie is expired
    pub fn is_expired(&self) -> bool {
        self.expires.map_or(false, |exp| exp < Utc::now())
    }

    /// Check if the cookie should be sent for the given URL
    pub fn matches(&self, url: &Url) -> bool {
        let host = url.host_str().unwrap_or("");
        if !self.domain_matches(host) {
            return false;
        }

        if !url.path().starts_with(&self.path) {
            return false;
        }

        if self.secure && url.scheme() != "https" {
            return false;
        }

        !self.is_expired()
    }

    /// Check if the given host domain-matches this cookie
    pub fn domain_matches(&self, host: &str) -> bool {
        if self.domain.is_empty() {
            return true;
        }

        let domain = self.domain.trim_start_matches('.');
        host == domain || host.ends_with(&format!(".{}", domain))
    }

    /// Parse a Set-Cookie header value.
    ///
    /// Also reports whether an explicit Domain attribute was present;
    /// the store applies domain-match rules only to caller-declared
    /// domains, never to the request-host default.
    fn parse_with_origin(header: &str, url: &Url) -> Option<(Self, bool)> {
        let mut parts = header.split(';');
        let first = parts.next()?.trim();

        let (name, value) = first.split_once('=')?;
        if name.trim().is_empty() {
            return None;
        }
        let mut cookie = Cookie::new(name.trim(), value.trim());
        let mut explicit_domain = false;

        // Default domain to request host
        cookie.domain = url.host_str().unwrap_or("").to_string();

        for part in parts {
            let part = part.trim();
            if let Some((attr, val)) = part.split_once('=') {
                let attr = attr.trim().to_lowercase();
                let val = val.trim();
                match attr.as_str() {
                    "domain" => {
                        cookie.domain = val.trim_start_matches('.').to_string();
                        explicit_domain = true;
                    }
                    "path" => cookie.path = val.to_string(),
                    "expires" => {
                        if let Ok(dt) = DateTime::parse_from_rfc2822(val) {
                            cookie.expires = Some(dt.with_timezone(&Utc));
                        }
                    }
                    "max-age" => {
                        if let Ok(secs) = val.parse::<i64>() {
                            cookie.expires = Some(Utc::now() + chrono::Duration::seconds(secs));
                        }
                    }
                    "samesite" => {
                        cookie.same_site = match val.to_lowercase().as_str() {
                            "strict" => SameSite::Strict,
                            "lax" => SameSite::Lax,
                            _ => SameSite::None,
                        };
                    }
                    _ => {}
                }
            } else {
                match part.to_lowercase().as_str() {
                    "secure" => cookie.secure = true,
                    "httponly" => cookie.http_only = true,
                    _ => {}
                }
            }
        }

        Some((cookie, explicit_domain))
    }

    /// Parse a Set-Cookie header value
    pub fn parse(header: &str, url: &Url) -> Option<Self> {
        Self::parse_with_origin(header, url).map(|(cookie, _)| cookie)
    }

    /// Convert to cookie header format
    pub fn to_header_value(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

/// Async cookie storage capability consumed by the pipeline.
///
/// Implementations must apply standard domain/path matching rules and
/// serialize their own concurrent access.
#[async_trait]
pub trait CookieStore: Send + Sync {
    /// Cookie header value for a URL; empty when nothing matches
    async fn get_cookie_string(&self, url: &Url) -> String;

    /// Apply a Set-Cookie header value for a URL.
    ///
    /// Fails with [`Error::CookieRejected`] on a malformed value or a
    /// Domain attribute that does not match the request host.
    async fn set_cookie(&self, header: &str, url: &Url) -> Result<Cookie>;

    /// Look up one cookie by exact domain, path, and name
    async fn find_cookie(&self, domain: &str, path: &str, key: &str) -> Option<Cookie>;
}

/// Thread-safe in-memory cookie store, keyed by domain
#[derive(Debug, Default)]
pub struct MemoryCookieStore {
    cookies: DashMap<String, Vec<Cookie>>,
}

impl MemoryCookieStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a cookie, replacing any existing one with the same name and path
    pub fn add(&self, cookie: Cookie) {
        let mut entry = self.cookies.entry(cookie.domain.clone()).or_default();
        entry.retain(|c| c.name != cookie.name || c.path != cookie.path);
        entry.push(cookie);
    }

    /// Get all cookies matching a URL
    pub fn get_cookies(&self, url: &Url) -> Vec<Cookie> {
        let mut result = Vec::new();
        for entry in self.cookies.iter() {
            for cookie in entry.value().iter() {
                if cookie.matches(url) {
                    result.push(cookie.clone());
                }
            }
        }

        self.remove_expired();
        result
    }

    /// Clear all cookies
    pub fn clear(&self) {
        self.cookies.clear();
    }

    /// Total cookie count
    pub fn len(&self) -> usize {
        self.cookies.iter().map(|e| e.value().len()).sum()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove_expired(&self) {
        for mut entry in self.cookies.iter_mut() {
            entry.value_mut().retain(|c| !c.is_expired());
        }
    }

    /// Export all cookies as JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        let all_cookies: Vec<Cookie> =
            self.cookies.iter().flat_map(|e| e.value().clone()).collect();
        serde_json::to_string(&all_cookies)
    }

    /// Import cookies from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let cookies: Vec<Cookie> = serde_json::from_str(json)?;
        let store = MemoryCookieStore::new();
        for cookie in cookies {
            store.add(cookie);
        }
        Ok(store)
    }
}

#[async_trait]
impl CookieStore for MemoryCookieStore {
    async fn get_cookie_string(&self, url: &Url) -> String {
        self.get_cookies(url)
            .iter()
            .map(Cookie::to_header_value)
            .collect::<Vec<_>>()
            .join("; ")
    }

    async fn set_cookie(&self, header: &str, url: &Url) -> Result<Cookie> {
        let (cookie, explicit_domain) = Cookie::parse_with_origin(header, url)
            .ok_or_else(|| Error::cookie(format!("malformed Set-Cookie value: {}", header)))?;

        let host = url.host_str().unwrap_or("");
        if explicit_domain && !cookie.domain_matches(host) {
            return Err(Error::cookie(format!(
                "domain '{}' does not match request host '{}'",
                cookie.domain, host
            )));
        }

        self.add(cookie.clone());
        Ok(cookie)
    }

    async fn find_cookie(&self, domain: &str, path: &str, key: &str) -> Option<Cookie> {
        self.cookies.get(domain).and_then(|cookies| {
            cookies
                .iter()
                .find(|c| c.path == path && c.name == key)
                .cloned()
        })
    }
}

/// Adapter exposing any cookie store as one uniform async capability.
///
/// Wraps the store, never copies it: mutations through the adapter are
/// visible to anyone holding the original `Arc`. Adapting an adapter
/// is a cheap clone of the same shared store, so the jar a response
/// reports back is the same instance the caller supplied.
#[derive(Clone)]
pub struct CookieJar {
    store: Arc<dyn CookieStore>,
}

impl CookieJar {
    /// Create a jar over a fresh in-memory store
    pub fn new() -> Self {
        Self::from_store(Arc::new(MemoryCookieStore::new()))
    }

    /// Wrap an external store
    pub fn from_store(store: Arc<dyn CookieStore>) -> Self {
        Self { store }
    }

    /// Access the underlying store
    pub fn store(&self) -> &Arc<dyn CookieStore> {
        &self.store
    }

    /// Check whether two jars share one store
    pub fn same_store(&self, other: &CookieJar) -> bool {
        Arc::ptr_eq(&self.store, &other.store)
    }

    /// Cookie header value for a URL; empty when nothing matches
    pub async fn get_cookie_string(&self, url: &Url) -> String {
        self.store.get_cookie_string(url).await
    }

    /// Apply a Set-Cookie header value for a URL
    pub async fn set_cookie(&self, header: &str, url: &Url) -> Result<Cookie> {
        self.store.set_cookie(header, url).await
    }

    /// Look up one cookie by exact domain, path, and name
    pub async fn find_cookie(&self, domain: &str, path: &str, key: &str) -> Option<Cookie> {
        self.store.find_cookie(domain, path, key).await
    }
}

impl Default for CookieJar {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieJar").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_cookie_parsing() {
        let url = url("https://example.com/path");
        let header = "session=abc123; Domain=example.com; Path=/; Secure; HttpOnly";
        let cookie = Cookie::parse(header, &url).unwrap();

        assert_eq!(cookie.name, "session");
        assert_eq!(cookie.value, "abc123");
        assert_eq!(cookie.domain, "example.com");
        assert_eq!(cookie.path, "/");
        assert!(cookie.secure);
        assert!(cookie.http_only);
    }

    #[test]
    fn test_domain_defaults_to_request_host() {
        let url = url("https://test.example.sample/path");
        let cookie = Cookie::parse("cookie1=testing", &url).unwrap();
        assert_eq!(cookie.domain, "test.example.sample");
    }

    #[tokio::test]
    async fn test_store_set_and_read_back() {
        let store = MemoryCookieStore::new();
        let url = url("https://example.com/path");

        store.set_cookie("a=1", &url).await.unwrap();
        store.set_cookie("b=2; Path=/", &url).await.unwrap();

        let header = store.get_cookie_string(&url).await;
        assert!(header.contains("a=1"));
        assert!(header.contains("b=2"));

        let found = store.find_cookie("example.com", "/", "a").await.unwrap();
        assert_eq!(found.value, "1");
    }

    #[tokio::test]
    async fn test_foreign_domain_rejected() {
        let store = MemoryCookieStore::new();
        let url = url("https://test.example.sample/path");

        let err = store
            .set_cookie("cookie1=testing; path=/; domain=.hello.world", &url)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CookieRejected(_)));
        assert!(store
            .find_cookie("hello.world", "/", "cookie1")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_malformed_cookie_rejected() {
        let store = MemoryCookieStore::new();
        let url = url("https://example.com/");

        assert!(store.set_cookie("no-equals-sign", &url).await.is_err());
        assert!(store.set_cookie("=bare-value", &url).await.is_err());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_secure_cookie_not_sent_over_http() {
        let store = MemoryCookieStore::new();
        store
            .set_cookie("s=1; Secure", &url("https://example.com/"))
            .await
            .unwrap();

        assert_eq!(
            store.get_cookie_string(&url("http://example.com/")).await,
            ""
        );
        assert_eq!(
            store.get_cookie_string(&url("https://example.com/")).await,
            "s=1"
        );
    }

    #[tokio::test]
    async fn test_expired_cookie_dropped() {
        let store = MemoryCookieStore::new();
        let url = url("https://example.com/");
        store.set_cookie("gone=1; Max-Age=-1", &url).await.unwrap();

        assert_eq!(store.get_cookie_string(&url).await, "");
    }

    #[tokio::test]
    async fn test_subdomain_receives_parent_cookie() {
        let store = MemoryCookieStore::new();
        store
            .set_cookie(
                "shared=1; Domain=example.sample",
                &url("https://test.example.sample/"),
            )
            .await
            .unwrap();

        let header = store
            .get_cookie_string(&url("https://other.example.sample/"))
            .await;
        assert_eq!(header, "shared=1");
    }

    #[tokio::test]
    async fn test_adapter_shares_store() {
        let store = Arc::new(MemoryCookieStore::new());
        let jar = CookieJar::from_store(store.clone());
        let url = url("https://example.com/");

        jar.set_cookie("via=adapter", &url).await.unwrap();
        assert_eq!(store.len(), 1);

        let again = jar.clone();
        assert!(jar.same_store(&again));
    }

    #[test]
    fn test_store_json_roundtrip() {
        let store = MemoryCookieStore::new();
        store.add(Cookie::new("a", "1").domain("example.com"));
        store.add(Cookie::new("b", "2").domain("example.com").path("/p"));

        let json = store.to_json().unwrap();
        let restored = MemoryCookieStore::from_json(&json).unwrap();
        assert_eq!(restored.len(), 2);
    }
}
