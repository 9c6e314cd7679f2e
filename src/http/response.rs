//! HTTP response building module
//!
//! Every response this server emits is plain text; builders never panic and
//! fall back to a bare response if the builder rejects a header.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use std::fmt::Display;

const TEXT_PLAIN: &str = "text/plain";

/// Build a plain-text response
///
/// For HEAD requests the body is dropped but `Content-Length` still reports
/// the size the body would have had.
pub fn build_text_response(
    status: StatusCode,
    content: impl Into<Bytes>,
    server_name: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content = content.into();
    let content_length = content.len();
    let body = if is_head { Bytes::new() } else { content };

    Response::builder()
        .status(status)
        .header("Content-Type", TEXT_PLAIN)
        .header("Content-Length", content_length)
        .header("Server", server_name)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(status, &e);
            let mut fallback = Response::new(Full::new(Bytes::new()));
            *fallback.status_mut() = status;
            fallback
        })
}

/// Build 400 Bad Request response
pub fn build_400_response(
    error: &impl Display,
    server_name: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    build_error_response(StatusCode::BAD_REQUEST, error, server_name, is_head)
}

/// Build 500 Internal Server Error response
pub fn build_500_response(
    error: &impl Display,
    server_name: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    build_error_response(StatusCode::INTERNAL_SERVER_ERROR, error, server_name, is_head)
}

fn build_error_response(
    status: StatusCode,
    error: &impl Display,
    server_name: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    build_text_response(status, format!("{status}\n{error}\n"), server_name, is_head)
}

/// Log response build error
fn log_build_error(status: StatusCode, error: &hyper::http::Error) {
    crate::logger::log_error(&format!(
        "Failed to build {} response: {error}",
        status.as_u16()
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_text(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_text_response_headers() {
        let resp = build_text_response(StatusCode::OK, "hello\n".to_string(), "test/1", false);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-type"], "text/plain");
        assert_eq!(resp.headers()["content-length"], "6");
        assert_eq!(resp.headers()["server"], "test/1");
        assert_eq!(body_text(resp).await, "hello\n");
    }

    #[tokio::test]
    async fn test_head_keeps_length_drops_body() {
        let resp = build_text_response(StatusCode::OK, "hello\n".to_string(), "test/1", true);
        assert_eq!(resp.headers()["content-length"], "6");
        assert_eq!(body_text(resp).await, "");
    }

    #[tokio::test]
    async fn test_error_responses() {
        let resp = build_500_response(&"git exploded", "test/1", false);
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.headers()["content-type"], "text/plain");
        assert_eq!(
            body_text(resp).await,
            "500 Internal Server Error\ngit exploded\n"
        );

        let resp = build_400_response(&"bad escape", "test/1", false);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(resp).await, "400 Bad Request\nbad escape\n");
    }
}
