//! Request handler
//!
//! Every request, whatever its method or path, gets the same treatment: decode
//! the query, run the configured command and echo both back as plain text.

mod query;
mod report;

use http_body_util::Full;
use hyper::body::{Body as _, Bytes, Incoming};
use hyper::header::{HeaderName, REFERER, USER_AGENT};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, StatusCode, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::AppState;
use crate::error::HandlerError;
use crate::http::{build_400_response, build_500_response, build_text_response};
use crate::logger::{self, AccessLogEntry};

use query::parse_query;
use report::Report;

pub async fn handle_request(
    req: Request<Incoming>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    // the request body carries nothing we report on
    let (parts, _body) = req.into_parts();
    Ok(respond(&parts, peer_addr, &state).await)
}

/// Produce the response for an already-received request head
pub async fn respond(parts: &Parts, peer_addr: SocketAddr, state: &AppState) -> Response<Full<Bytes>> {
    let started = Instant::now();
    let logging = &state.config.logging;
    let server_name = state.config.http.server_name.as_str();
    let is_head = parts.method == Method::HEAD;

    logger::log_request(&parts.method, &parts.uri, parts.version);
    logger::log_headers_count(parts.headers.len(), logging.show_headers);

    let response = match build_report(parts, state).await {
        Ok(body) => build_text_response(StatusCode::OK, body, server_name, is_head),
        Err(HandlerError::Request(e)) => {
            logger::log_warning(&format!("Rejected {}: {e}", parts.uri));
            build_400_response(&e, server_name, is_head)
        }
        Err(HandlerError::Subprocess(e)) => {
            logger::log_error(&format!("`{}` failed: {e}", state.runner.describe()));
            build_500_response(&e, server_name, is_head)
        }
    };

    if logging.access_log {
        let entry = access_entry(parts, peer_addr, &response, started.elapsed());
        logger::log_access(&entry, &logging.access_log_format);
    }

    response
}

async fn build_report(parts: &Parts, state: &AppState) -> Result<Vec<u8>, HandlerError> {
    // reject bad queries before paying for a subprocess
    let params = parse_query(parts.uri.query().unwrap_or(""))?;
    let output = state.runner.run().await?;
    let url = parts.uri.to_string();

    Ok(Report {
        url: &url,
        params: &params,
        headers: &parts.headers,
        output: &output,
    }
    .render())
}

fn access_entry(
    parts: &Parts,
    peer_addr: SocketAddr,
    response: &Response<Full<Bytes>>,
    elapsed: Duration,
) -> AccessLogEntry {
    let header = |name: HeaderName| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = version_label(parts.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .body()
        .size_hint()
        .exact()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0);
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry.request_time_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
    entry
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
