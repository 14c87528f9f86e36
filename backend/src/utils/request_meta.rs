//! Request metadata captured for audit events and rate limiting.

use axum::extract::{ConnectInfo, OriginalUri, Request};
use axum::http::{HeaderMap, header::USER_AGENT};
use std::net::SocketAddr;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";
const UNKNOWN: &str = "unknown";

/// Who sent a request and what it asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMeta {
    pub client_ip: String,
    pub method: String,
    pub url: String,
    pub user_agent: String,
    pub request_id: String,
}

impl RequestMeta {
    pub fn from_request(request: &Request, trust_forwarded_for: bool) -> Self {
        let headers = request.headers();
        Self {
            client_ip: client_ip(request, trust_forwarded_for),
            method: request.method().to_string(),
            url: original_url(request),
            user_agent: header_value(headers, USER_AGENT.as_str()),
            request_id: header_value(headers, REQUEST_ID_HEADER),
        }
    }
}

/// Full request path, including any prefix stripped by nested routers.
fn original_url(request: &Request) -> String {
    request
        .extensions()
        .get::<OriginalUri>()
        .map(|OriginalUri(uri)| uri.to_string())
        .unwrap_or_else(|| request.uri().to_string())
}

/// Client address: the first `X-Forwarded-For` hop when trusted, otherwise
/// the peer address of the connection.
pub fn client_ip(request: &Request, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = request
            .headers()
            .get(FORWARDED_FOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn header_value(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(UNKNOWN)
        .to_string()
}
