// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Outgoing body encoding
//!
//! One decision point picks exactly one encoding per call: JSON intent
//! (explicit override or structured body shape) beats the form mapping,
//! and anything else passes through untouched.

use bytes::Bytes;
use serde_json::Value;
use url::form_urlencoded;

use crate::error::Result;
use crate::options::{Body, RequestOptions};

/// Which encoding the codec chose, for header composition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Body was JSON-serialized
    Json,
    /// Body was form URL-encoded
    Form,
    /// Body passed through raw (or empty)
    Raw,
}

/// Whether the body must be JSON-encoded.
///
/// True when an explicit JSON override is supplied, or when the body
/// itself is a structured value.
pub fn jsonify(body: Option<&Body>, json: Option<&Value>) -> bool {
    json.is_some() || body.map_or(false, Body::is_structured)
}

/// Encode the outgoing body per the declared intent.
///
/// The JSON path serializes the explicit override when present, else
/// the body itself. The form path is only reachable without JSON
/// intent. An absent body encodes as empty bytes.
pub fn encode(options: &RequestOptions) -> Result<(Bytes, Encoding)> {
    let body = options.body.as_ref();
    let json = options.json.as_ref();

    if jsonify(body, json) {
        let value = match (json, body) {
            (Some(value), _) => value.clone(),
            (None, Some(Body::Json(value))) => value.clone(),
            (None, _) => Value::Null,
        };
        let encoded = serde_json::to_vec(&value)?;
        return Ok((Bytes::from(encoded), Encoding::Json));
    }

    if let Some(form) = options.form.as_ref() {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in form {
            serializer.append_pair(key, value);
        }
        return Ok((Bytes::from(serializer.finish()), Encoding::Form));
    }

    let bytes = match body {
        Some(Body::Raw(raw)) => raw.clone(),
        Some(Body::Text(text)) => Bytes::from(text.clone()),
        // Structured bodies are unreachable here, handled by the JSON path
        Some(Body::Json(_)) | None => Bytes::new(),
    };

    Ok((bytes, Encoding::Raw))
}
