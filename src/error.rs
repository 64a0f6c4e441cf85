// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the request pipeline
//!
//! Every fatal condition a call can end with gets its own variant so
//! callers can branch on it. Cookie rejections are deliberately absent
//! from the pipeline surface: they are swallowed at the Set-Cookie
//! processing sites and only exist as a value the jar returns.

use thiserror::Error;

/// Result type alias for mustekala operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the request pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// No URL present in the resolved options
    #[error("Request options do not contain a URL")]
    MissingUrl,

    /// Transport-level failure (connection, protocol, stream)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Outgoing body could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Redirect hop ceiling exceeded
    #[error("The number of redirects has exceeded the max of {max}")]
    TooManyRedirects { max: u32 },

    /// Response body is not valid JSON and strict decoding was requested
    #[error("Malformed JSON in response body: {0}")]
    MalformedJson(String),

    /// Cookie store refused a Set-Cookie value. Never escapes the
    /// pipeline; surfaced only from direct `CookieStore::set_cookie` calls.
    #[error("Cookie rejected: {0}")]
    CookieRejected(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a cookie rejection error
    pub fn cookie<S: Into<String>>(msg: S) -> Self {
        Error::CookieRejected(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a transport-level error
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Check if this is the redirect ceiling error
    pub fn is_too_many_redirects(&self) -> bool {
        matches!(self, Error::TooManyRedirects { .. })
    }

    /// Check if this is a JSON decode error
    pub fn is_malformed_json(&self) -> bool {
        matches!(self, Error::MalformedJson(_))
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_ceiling_error() {
        let err = Error::TooManyRedirects { max: 3 };
        assert!(err.is_too_many_redirects());
        assert!(err.to_string().contains("max of 3"));
    }

    #[test]
    fn test_url_error_conversion() {
        let parse_err = url::Url::parse("not a url").unwrap_err();
        let err: Error = parse_err.into();
        assert!(matches!(err, Error::Url(_)));
    }

    #[test]
    fn test_cookie_rejection_is_named() {
        let err = Error::cookie("domain mismatch");
        assert!(matches!(err, Error::CookieRejected(_)));
    }
}
