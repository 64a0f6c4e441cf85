// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Request execution pipeline
//!
//! One logical call runs as an explicit loop of exchanges: resolve
//! options, encode the body, read the jar, compose headers, send, then
//! either finish or follow a redirect with an incremented hop counter.
//! Cookie writes from a hop land in the jar before the next hop's
//! request is built, since that request's Cookie header reads them.

use std::sync::Arc;

use reqwest::Method;
use tracing::{debug, trace};
use url::Url;

use crate::body;
use crate::cookie::CookieJar;
use crate::error::{Error, Result};
use crate::headers;
use crate::options::RequestOptions;
use crate::response::Response;
use crate::transport::{Exchange, HttpTransport, Transport};

/// Hard ceiling on redirects followed per logical call
pub const MAX_REDIRECTS: u32 = 3;

/// Status codes eligible for redirect following
const REDIRECT_STATUSES: [u16; 7] = [300, 301, 302, 303, 304, 307, 308];

/// Long-lived client holding default options and a cookie jar.
///
/// Per-call options are merged over the defaults, never mutating them.
/// The jar is the only state shared between concurrent calls.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    options: RequestOptions,
    cookie_jar: CookieJar,
}

impl Client {
    /// Create a client with built-in defaults and a fresh jar
    pub fn new() -> Result<Self> {
        Self::with_options(RequestOptions::new())
    }

    /// Create a client with default options.
    ///
    /// Adopts `options.cookie_jar` as the client jar when present,
    /// otherwise starts a fresh one.
    pub fn with_options(options: RequestOptions) -> Result<Self> {
        let cookie_jar = options.cookie_jar.clone().unwrap_or_default();
        Ok(Self {
            transport: Arc::new(HttpTransport::new()?),
            options,
            cookie_jar,
        })
    }

    /// Create a client over a custom transport
    pub fn with_transport(transport: Arc<dyn Transport>, options: RequestOptions) -> Self {
        let cookie_jar = options.cookie_jar.clone().unwrap_or_default();
        Self {
            transport,
            options,
            cookie_jar,
        }
    }

    /// The client's cookie jar
    pub fn cookie_jar(&self) -> &CookieJar {
        &self.cookie_jar
    }

    /// The client's default options
    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// Execute a request with the method from the options (GET when unset)
    pub async fn execute(&self, options: impl Into<RequestOptions>) -> Result<Response> {
        let options = self.options.merge(options.into());
        self.run(options).await
    }

    /// Execute a GET request
    pub async fn get(&self, options: impl Into<RequestOptions>) -> Result<Response> {
        self.quick(Method::GET, options).await
    }

    /// Execute a POST request
    pub async fn post(&self, options: impl Into<RequestOptions>) -> Result<Response> {
        self.quick(Method::POST, options).await
    }

    /// Execute a PUT request
    pub async fn put(&self, options: impl Into<RequestOptions>) -> Result<Response> {
        self.quick(Method::PUT, options).await
    }

    /// Execute a PATCH request
    pub async fn patch(&self, options: impl Into<RequestOptions>) -> Result<Response> {
        self.quick(Method::PATCH, options).await
    }

    /// Execute a DELETE request
    pub async fn delete(&self, options: impl Into<RequestOptions>) -> Result<Response> {
        self.quick(Method::DELETE, options).await
    }

    /// Execute multiple requests concurrently
    pub async fn execute_all(&self, requests: Vec<RequestOptions>) -> Vec<Result<Response>> {
        let futures: Vec<_> = requests.into_iter().map(|r| self.execute(r)).collect();
        futures::future::join_all(futures).await
    }

    async fn quick(&self, method: Method, options: impl Into<RequestOptions>) -> Result<Response> {
        let mut options = self.options.merge(options.into());
        options.method = Some(method);
        self.run(options).await
    }

    /// The bounded redirect loop sharing one logical call.
    ///
    /// Each iteration is one complete exchange; following a redirect
    /// replaces the URL and increments the hop counter, all other
    /// options carry over unchanged.
    async fn run(&self, mut options: RequestOptions) -> Result<Response> {
        let jar = options
            .cookie_jar
            .clone()
            .unwrap_or_else(|| self.cookie_jar.clone());
        let mut hops: u32 = 0;

        loop {
            let url = options.resolved_url()?;
            let target = apply_params(url, options.params.as_deref());
            let method = options.resolved_method();

            let (body_bytes, encoding) = body::encode(&options)?;
            let cookie_string = jar.get_cookie_string(&target).await;
            let outgoing =
                headers::compose(&options.headers, body_bytes.len(), &cookie_string, encoding);

            debug!(url = %target, %method, hop = hops, "issuing exchange");
            let exchange = self
                .transport
                .send(target, method, outgoing, body_bytes)
                .await?;
            trace!(status = exchange.status.as_u16(), "exchange complete");

            match next_hop(&exchange, options.follows_redirects(), hops)? {
                Hop::Follow(location) => {
                    // Cookie state must be durable before the next hop reads it
                    apply_set_cookies(&jar, &exchange).await;
                    debug!(%location, hop = hops + 1, "following redirect");
                    options.url = Some(location);
                    hops += 1;
                }
                Hop::Finish => {
                    apply_set_cookies(&jar, &exchange).await;
                    return Response::decode(
                        exchange,
                        jar,
                        options.response_type,
                        options.rejects_bad_json(),
                    );
                }
            }
        }
    }
}

/// Outcome of inspecting a completed exchange for redirect eligibility
#[derive(Debug)]
enum Hop {
    /// Continue the call at the Location target
    Follow(String),
    /// The exchange is terminal; decode it
    Finish,
}

/// Decide whether an exchange ends the call or continues it.
///
/// Eligible means redirect following is on, the status is one of the
/// redirect set, and a Location header is present. An eligible
/// response at the hop ceiling fails the call instead of sending
/// another request.
fn next_hop(exchange: &Exchange, follow: bool, hops: u32) -> Result<Hop> {
    if !follow || !REDIRECT_STATUSES.contains(&exchange.status.as_u16()) {
        return Ok(Hop::Finish);
    }

    match exchange.header("location") {
        Some(location) => {
            if hops >= MAX_REDIRECTS {
                return Err(Error::TooManyRedirects { max: MAX_REDIRECTS });
            }
            Ok(Hop::Follow(location.to_string()))
        }
        None => Ok(Hop::Finish),
    }
}

/// Apply every Set-Cookie header of an exchange to the jar.
///
/// A rejected cookie simply does not enter the jar; it never aborts
/// the call.
async fn apply_set_cookies(jar: &CookieJar, exchange: &Exchange) {
    for value in exchange.header_all("set-cookie") {
        if let Err(err) = jar.set_cookie(value, &exchange.url).await {
            debug!(%err, "ignoring rejected cookie");
        }
    }
}

/// Append query parameters to the target URL, skipping absent values
fn apply_params(mut url: Url, params: Option<&[(String, Option<String>)]>) -> Url {
    let present: Vec<_> = params
        .into_iter()
        .flatten()
        .filter_map(|(key, value)| value.as_ref().map(|v| (key, v)))
        .collect();

    // An untouched query_pairs_mut would leave a dangling '?'
    if !present.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in present {
            pairs.append_pair(key, value);
        }
    }
    url
}
