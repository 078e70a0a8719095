use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ServiceAccountKey, TokenSource};
use crate::error::RemoteError;
use crate::fetch::{HttpClient, fetch_json, form_request};

pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/drive",
];

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchanges a signed service-account assertion for an access token.
pub struct ServiceAccountTokenSource<C> {
    http: C,
    key: ServiceAccountKey,
}

impl<C: HttpClient> ServiceAccountTokenSource<C> {
    pub fn new(http: C, key: ServiceAccountKey) -> Self {
        Self { http, key }
    }

    /// Signs the RS256 JWT assertion sent to the token endpoint.
    fn assertion(&self) -> Result<String, RemoteError> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: SCOPES.join(" "),
            aud: &self.key.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let signing_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| RemoteError::Auth(format!("invalid service account private key: {e}")))?;

        jsonwebtoken::encode(&header, &claims, &signing_key)
            .map_err(|e| RemoteError::Auth(format!("failed to sign assertion: {e}")))
    }
}

#[async_trait]
impl<C: HttpClient> TokenSource for ServiceAccountTokenSource<C> {
    async fn access_token(&self) -> Result<String, RemoteError> {
        let assertion = self.assertion()?;
        let url = Url::parse(&self.key.token_uri)
            .map_err(|e| RemoteError::Auth(format!("invalid token_uri: {e}")))?;
        debug!(client_email = %self.key.client_email, "Requesting access token");

        let req = form_request(
            url,
            &[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())],
        )?;

        // Any rejection by the token endpoint is an authentication failure.
        let token: TokenResponse = fetch_json(&self.http, req).await.map_err(|e| match e {
            RemoteError::Network(_) => e,
            other => RemoteError::Auth(format!("token exchange failed: {other}")),
        })?;

        Ok(token.access_token)
    }
}
