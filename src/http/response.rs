//! HTTP response building module
//!
//! Turns a dispatcher `Reply` into a hyper response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE, SERVER};
use hyper::{Response, StatusCode};

use super::envelope::Reply;

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
const FALLBACK_500_BODY: &str = r#"{"error":{"message":"Internal Server Error"}}"#;

/// Build a JSON response from a reply
///
/// HEAD requests get the same status and headers with an empty body.
pub fn build_json_response(reply: &Reply, is_head: bool, server_name: &str) -> Response<Full<Bytes>> {
    let json = match serde_json::to_vec(&reply.body) {
        Ok(j) => j,
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            return build_500_response(server_name);
        }
    };

    let content_length = json.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(json)
    };

    Response::builder()
        .status(reply.status)
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .header(CONTENT_LENGTH, content_length)
        .header(SERVER, server_name)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(reply.status, &e);
            build_500_response(server_name)
        })
}

/// Build a fixed 500 response, used when a reply cannot be encoded
pub fn build_500_response(server_name: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
        .header(SERVER, server_name)
        .body(Full::new(Bytes::from_static(FALLBACK_500_BODY.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error(StatusCode::INTERNAL_SERVER_ERROR, &e);
            let mut resp = Response::new(Full::new(Bytes::from_static(FALLBACK_500_BODY.as_bytes())));
            *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            resp
        })
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
