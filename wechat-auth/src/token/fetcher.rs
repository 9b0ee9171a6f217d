//! Remote credential fetching from the platform API.

use async_trait::async_trait;
use log::*;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::expiry::{expires_at_from_relative, now_millis};
use super::{AccessTokenRecord, TicketRecord};
use crate::error::{remote_error, Error, ErrorKind, RemoteErrorKind};
use crate::http::ClientBuilder;

/// Default platform API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.weixin.qq.com";

const TOKEN_PATH: &str = "/cgi-bin/token";
const TICKET_PATH: &str = "/cgi-bin/ticket/getticket";
const GRANT_TYPE: &str = "client_credential";
const TICKET_TYPE: &str = "jsapi";

/// Trait for obtaining fresh credentials from the platform.
///
/// Implementations neither cache nor persist what they return.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a new access token for the application.
    async fn fetch_access_token(
        &self,
        app_id: &str,
        app_secret: &SecretString,
    ) -> Result<AccessTokenRecord, Error>;

    /// Fetch a new JS API ticket using a valid access token.
    async fn fetch_ticket(&self, access_token: &str) -> Result<TicketRecord, Error>;
}

/// Token endpoint response body.
#[derive(Debug, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
    /// Lifetime in seconds.
    expires_in: i64,
}

/// Ticket endpoint response body.
#[derive(Debug, Deserialize)]
struct TicketResponse {
    ticket: String,
    /// Lifetime in seconds.
    expires_in: i64,
}

/// Platform API client.
pub struct PlatformClient {
    client: reqwest::Client,
    base_url: String,
}

impl PlatformClient {
    /// Create a client against `base_url` using an already configured `reqwest::Client`.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create a client against the public platform API with default HTTP settings.
    pub fn with_defaults() -> Result<Self, Error> {
        Ok(Self::new(ClientBuilder::new().build()?, DEFAULT_API_BASE_URL))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a GET and decode the JSON body. Query values may hold secrets, so
    /// only the path is logged.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, Error> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", path);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                warn!("Request to {} failed: {e:?}", path);
                Error::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} returned {}", path, status);
            return Err(remote_error(
                RemoteErrorKind::Status(status.as_u16()),
                &format!("{} returned {}", path, status),
            ));
        }

        response.json::<T>().await.map_err(|e| {
            warn!("Unexpected response body from {}: {e}", path);
            Error {
                source: Some(Box::new(e)),
                error_kind: ErrorKind::Remote(RemoteErrorKind::InvalidResponse),
            }
        })
    }
}

#[async_trait]
impl Fetcher for PlatformClient {
    async fn fetch_access_token(
        &self,
        app_id: &str,
        app_secret: &SecretString,
    ) -> Result<AccessTokenRecord, Error> {
        let body: AccessTokenResponse = self
            .get_json(
                TOKEN_PATH,
                &[
                    ("grant_type", GRANT_TYPE),
                    ("appid", app_id),
                    ("secret", app_secret.expose_secret()),
                ],
            )
            .await?;

        Ok(AccessTokenRecord::new(
            body.access_token,
            expires_at_from_relative(body.expires_in, now_millis())?,
        ))
    }

    async fn fetch_ticket(&self, access_token: &str) -> Result<TicketRecord, Error> {
        let body: TicketResponse = self
            .get_json(
                TICKET_PATH,
                &[("access_token", access_token), ("type", TICKET_TYPE)],
            )
            .await?;

        Ok(TicketRecord::new(
            body.ticket,
            expires_at_from_relative(body.expires_in, now_millis())?,
        ))
    }
}
