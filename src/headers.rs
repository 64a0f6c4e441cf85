// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Final header composition
//!
//! Computed headers (content-type, content-length, cookie) are only
//! injected when the caller has not already supplied them; a caller
//! header always wins. Header name matching is case-insensitive.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, COOKIE};

use crate::body::Encoding;

/// Compose the outgoing header set from caller headers, the encoded
/// body, and the resolved cookie string.
pub fn compose(
    base: &HeaderMap,
    body_len: usize,
    cookie_string: &str,
    encoding: Encoding,
) -> HeaderMap {
    let mut headers = base.clone();

    if !headers.contains_key(CONTENT_TYPE) {
        match encoding {
            Encoding::Json => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
            Encoding::Form => {
                headers.insert(
                    CONTENT_TYPE,
                    HeaderValue::from_static("application/x-www-form-urlencoded"),
                );
            }
            Encoding::Raw => {}
        }
    }

    if !headers.contains_key(CONTENT_LENGTH) {
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body_len));
    }

    if !cookie_string.is_empty() && !headers.contains_key(COOKIE) {
        if let Ok(value) = HeaderValue::try_from(cookie_string) {
            headers.insert(COOKIE, value);
        }
    }

    headers
}
