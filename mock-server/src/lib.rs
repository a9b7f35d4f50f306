use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// Smallest valid PNG: 1x1 transparent pixel.
pub const PIXEL: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4,
    0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae,
    0x42, 0x60, 0x82,
];

/// Bytes that are not valid UTF-8, served with a 500.
pub const GARBLED: &[u8] = &[0xff, 0xfe, 0xfd, 0x00, 0xc3];

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub message: String,
}

/// What `/echo` saw of the incoming request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/message", get(message))
        .route("/empty", get(empty))
        .route("/missing", get(missing))
        .route("/broken", get(broken))
        .route("/pixel", get(pixel))
        .route("/garbled", get(garbled))
        .route("/status/{code}", get(status))
        .route("/echo", any(echo))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn message() -> Json<Message> {
    Json(Message {
        message: "yes".to_string(),
    })
}

async fn empty() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn missing() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "no such thing")
}

async fn broken() -> &'static str {
    "not json"
}

async fn pixel() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/png")], PIXEL)
}

async fn garbled() -> (StatusCode, &'static [u8]) {
    (StatusCode::INTERNAL_SERVER_ERROR, GARBLED)
}

async fn status(Path(code): Path<u16>) -> Response {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, format!("status {code}")).into_response(),
        Err(_) => (StatusCode::BAD_REQUEST, format!("bad status {code}")).into_response(),
    }
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    Json(Echo {
        method: method.as_str().to_string(),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_serializes_to_json() {
        let json = serde_json::to_value(Message {
            message: "yes".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"message": "yes"}));
    }

    #[test]
    fn echo_roundtrips_through_json() {
        let echo = Echo {
            method: "PUT".to_string(),
            headers: [("x-token".to_string(), "abc".to_string())].into_iter().collect(),
            body: "payload".to_string(),
        };
        let json = serde_json::to_string(&echo).unwrap();
        let back: Echo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, echo);
    }

    #[test]
    fn garbled_is_not_utf8() {
        assert!(std::str::from_utf8(GARBLED).is_err());
    }

    #[test]
    fn pixel_has_png_signature() {
        assert_eq!(&PIXEL[..8], b"\x89PNG\r\n\x1a\n");
    }
}
