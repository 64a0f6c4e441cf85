// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! # Mustekala - Async HTTP Convenience Client
//!
//! A fetch-like HTTP client layering convenience semantics over raw
//! request/response I/O: automatic body serialization, cookie
//! persistence, and bounded redirect following.
//!
//! ## Features
//!
//! - One pipeline: option merge, body encoding, cookie header, send,
//!   redirect loop, response decode
//! - JSON and form bodies chosen by declared intent or body shape
//! - Cookie jar with domain/path matching; rejected cookies never
//!   abort a call
//! - Redirects followed up to a hard ceiling of 3 hops, cookies
//!   durable between hops
//! - Lenient JSON decoding by default; strict mode by flag
//! - Pluggable transport and cookie store behind async traits
//!
//! ## Example
//!
//! ```rust,no_run
//! use mustekala::{Client, RequestOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // One-off call through an implicit default client
//!     let resp = mustekala::get("https://example.com/api/items").await?;
//!     println!("{}: {:?}", resp.status_code(), resp.body);
//!
//!     // Long-lived client with defaults and a persistent jar
//!     let client = Client::with_options(
//!         RequestOptions::new().header("x-api-key", "secret"),
//!     )?;
//!     let resp = client
//!         .post(RequestOptions::new()
//!             .url("https://example.com/api/items")
//!             .json(&serde_json::json!({"name": "squid"}))?)
//!         .await?;
//!     println!("{:?}", resp.parse_json()?);
//!
//!     Ok(())
//! }
//! ```

pub mod body;
pub mod client;
pub mod cookie;
pub mod error;
pub mod headers;
pub mod options;
pub mod response;
pub mod transport;

// Re-exports for convenience

// Client and pipeline
pub use client::{Client, MAX_REDIRECTS};

// Options
pub use options::{Body, RequestOptions, ResponseType};

// Cookies
pub use cookie::{Cookie, CookieJar, CookieStore, MemoryCookieStore, SameSite};

// Transport
pub use transport::{Exchange, HttpTransport, Transport};

// Responses
pub use response::{BodyValue, JsonOutcome, Response};

// Errors
pub use error::{Error, Result};

/// Mustekala version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Execute a request through an implicit default client
pub async fn execute(options: impl Into<RequestOptions>) -> Result<Response> {
    Client::new()?.execute(options).await
}

/// Execute a GET request through an implicit default client
pub async fn get(options: impl Into<RequestOptions>) -> Result<Response> {
    Client::new()?.get(options).await
}

/// Execute a POST request through an implicit default client
pub async fn post(options: impl Into<RequestOptions>) -> Result<Response> {
    Client::new()?.post(options).await
}

/// Execute a PUT request through an implicit default client
pub async fn put(options: impl Into<RequestOptions>) -> Result<Response> {
    Client::new()?.put(options).await
}

/// Execute a PATCH request through an implicit default client
pub async fn patch(options: impl Into<RequestOptions>) -> Result<Response> {
    Client::new()?.patch(options).await
}

/// Execute a DELETE request through an implicit default client
pub async fn delete(options: impl Into<RequestOptions>) -> Result<Response> {
    Client::new()?.delete(options).await
}
