mod basic;
mod client;
pub mod auth;

pub use basic::BasicClient;
pub use client::HttpClient;

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, Request, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::RemoteError;

/// Builds a request carrying `body` as JSON.
pub fn json_request<B: Serialize>(
    method: Method,
    url: Url,
    body: &B,
) -> Result<Request, RemoteError> {
    let bytes = serde_json::to_vec(body).map_err(|e| RemoteError::Protocol(e.to_string()))?;

    let mut req = Request::new(method, url);
    req.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    *req.body_mut() = Some(bytes.into());
    Ok(req)
}

/// Builds a POST carrying `pairs` as an `application/x-www-form-urlencoded` body.
pub fn form_request(url: Url, pairs: &[(&str, &str)]) -> Result<Request, RemoteError> {
    // Url's query serializer is the form-urlencoded encoder.
    let mut scratch =
        Url::parse("http://form.invalid/").map_err(|e| RemoteError::Protocol(e.to_string()))?;
    scratch.query_pairs_mut().extend_pairs(pairs);
    let body = scratch.query().unwrap_or_default().to_string();

    let mut req = Request::new(Method::POST, url);
    req.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("application/x-www-form-urlencoded"),
    );
    *req.body_mut() = Some(body.into());
    Ok(req)
}

/// Executes `req` and decodes a JSON response body.
///
/// Non-success statuses are mapped to a [`RemoteError`] kind; transport
/// failures become [`RemoteError::Network`].
pub async fn fetch_json<C: HttpClient, T: DeserializeOwned>(
    client: &C,
    req: Request,
) -> Result<T, RemoteError> {
    let method = req.method().clone();
    let path = req.url().path().to_string();

    let resp = client.execute(req).await?;
    let status = resp.status();
    debug!(%method, path = %path, status = status.as_u16(), "Remote response");

    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(RemoteError::from_status(status, &body));
    }

    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| RemoteError::Protocol(format!("{method} {path}: {e}")))
}
