//! Request utilities for HTTP endpoints.

use http_body_util::BodyExt;
use hyper::{body::Bytes, Request, Response};
use percent_encoding::percent_decode_str;
use tokio::time;

use crate::router::RouterError;
use entity_store::ListOptions;

/// Type alias for matchit parameters with explicit lifetimes
pub type MatchitParams<'a, 'b> = matchit::Params<'a, 'b>;

/// Helper function to read request body with timeout
pub async fn read_request_body_with_timeout(
    req: Request<hyper::body::Incoming>,
    timeout_ms: u64,
) -> Result<Bytes, RouterError> {
    let timeout_duration = time::Duration::from_millis(timeout_ms);
    let body = time::timeout(timeout_duration, req.collect())
        .await
        .map_err(|_| RouterError::Timeout)?
        .map_err(|e| RouterError::InternalError(format!("Failed to read request body: {}", e)))?;
    Ok(body.to_bytes())
}

/// Parses the request body as a JSON value. An empty body is rejected.
pub fn parse_json_body(body: &Bytes) -> Result<serde_json::Value, RouterError> {
    if body.is_empty() {
        return Err(RouterError::BadRequest(
            "Request body must not be empty".to_string(),
        ));
    }
    serde_json::from_slice(body)
        .map_err(|e| RouterError::BadRequest(format!("Failed to parse request body: {}", e)))
}

/// Helper to build HTTP response with proper error handling
pub fn build_response(status: u16, json: Vec<u8>) -> Result<Response<Bytes>, RouterError> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Bytes::from(json))
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}

/// Helper to build a list response carrying the total match count.
pub fn build_list_response(
    status: u16,
    json: Vec<u8>,
    total: u64,
) -> Result<Response<Bytes>, RouterError> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("X-Total-Count", total.to_string())
        .body(Bytes::from(json))
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}

/// Helper to build empty HTTP response (for 204 No Content)
pub fn build_empty_response(status: u16) -> Result<Response<Bytes>, RouterError> {
    Response::builder()
        .status(status)
        .body(Bytes::new())
        .map_err(|e| RouterError::InternalError(format!("Failed to build response: {}", e)))
}

/// Parses a URL query string into list options.
///
/// `page`, `size`, `sort`, and `eagerload` are reserved keys; everything
/// else is passed through as a criteria filter pair. `eagerload` is
/// accepted for wire compatibility and ignored.
pub fn parse_list_options(query_str: Option<&str>) -> Result<ListOptions, RouterError> {
    let mut options = ListOptions::default();

    if let Some(query_str) = query_str {
        for pair in query_str.split('&') {
            // Everything after the first '=' belongs to the value.
            let Some((key, raw_value)) = pair.split_once('=') else {
                continue;
            };
            let decoded_value = percent_decode_str(raw_value).decode_utf8_lossy();

            match key {
                "page" => {
                    options.page = Some(decoded_value.parse().map_err(|e| {
                        RouterError::BadRequest(format!(
                            "Invalid page value '{}': {}",
                            decoded_value, e
                        ))
                    })?);
                }
                "size" => {
                    options.size = Some(decoded_value.parse().map_err(|e| {
                        RouterError::BadRequest(format!(
                            "Invalid size value '{}': {}",
                            decoded_value, e
                        ))
                    })?);
                }
                "sort" => {
                    options.sort.push(decoded_value.to_string());
                }
                "eagerload" => {}
                _ => {
                    options
                        .filters
                        .push((key.to_string(), decoded_value.to_string()));
                }
            }
        }
    }

    Ok(options)
}

/// Parses a query string keeping only criteria filter pairs.
pub fn parse_filter_pairs(query_str: Option<&str>) -> Result<Vec<(String, String)>, RouterError> {
    Ok(parse_list_options(query_str)?.filters)
}
