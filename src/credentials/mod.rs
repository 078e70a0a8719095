//! Service-account credentials and access tokens for the spreadsheet API.
//!
//! [`ServiceAccountKey`] is the JSON key file issued for a service account.
//! [`TokenSource`] is the async trait for obtaining a bearer token.
//! [`ServiceAccountTokenSource`] implements it with the OAuth2 JWT-bearer grant;
//! [`StaticToken`] hands out a pre-minted token.

mod key;
mod service_account;

pub use key::ServiceAccountKey;
pub use service_account::{SCOPES, ServiceAccountTokenSource};

use crate::error::RemoteError;

/// Produces an access token for the spreadsheet API.
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, RemoteError>;
}

/// A token obtained out of band (e.g. `gcloud auth print-access-token`).
pub struct StaticToken(pub String);

#[async_trait::async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, RemoteError> {
        Ok(self.0.clone())
    }
}
