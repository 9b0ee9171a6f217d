//! Application-facing server facade.

use secrecy::SecretString;

use crate::error::Error;
use crate::jssdk::JsApiConfig;
use crate::token::{
    is_valid, AccessTokenRecord, FileStorage, Fetcher, Manager, PlatformClient, Storage,
    TicketRecord,
};
use crate::webhook::Verifier;

/// Static application credentials, fixed at construction.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub app_id: String,
    pub app_secret: SecretString,
    /// Shared token agreed with the platform for handshake signatures.
    pub token: SecretString,
}

/// Webhook verification plus cached access token and ticket resolution for
/// one platform application.
pub struct WechatServer<S: Storage = FileStorage, F: Fetcher = PlatformClient> {
    app_id: String,
    token: SecretString,
    manager: Manager<S, F>,
}

impl WechatServer {
    /// Create a server that stores credentials in the working directory and
    /// talks to the public platform API.
    pub fn new(config: ServerConfig) -> Result<Self, Error> {
        Ok(Self::with_parts(
            config,
            FileStorage::current_dir()?,
            PlatformClient::with_defaults()?,
        ))
    }
}

impl<S: Storage, F: Fetcher> WechatServer<S, F> {
    /// Create a server over explicit storage and fetcher implementations.
    pub fn with_parts(config: ServerConfig, storage: S, fetcher: F) -> Self {
        let ServerConfig {
            app_id,
            app_secret,
            token,
        } = config;
        Self {
            manager: Manager::new(app_id.clone(), app_secret, storage, fetcher),
            app_id,
            token,
        }
    }

    /// Serialize concurrent cold credential resolutions per kind.
    pub fn with_single_flight(mut self) -> Self {
        self.manager = self.manager.with_single_flight();
        self
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn manager(&self) -> &Manager<S, F> {
        &self.manager
    }

    /// Build the handshake verification handler.
    pub fn verify(&self) -> Verifier {
        Verifier::new(self.token.clone())
    }

    /// Get a valid access token from memory, disk or the platform.
    pub async fn fetch_access_token(&self) -> Result<AccessTokenRecord, Error> {
        self.manager.fetch_access_token().await
    }

    /// Get a valid JS API ticket from memory, disk or the platform.
    pub async fn fetch_ticket(&self) -> Result<TicketRecord, Error> {
        self.manager.fetch_ticket().await
    }

    /// Fetch a new access token from the platform without persisting it.
    pub async fn get_access_token(&self) -> Result<AccessTokenRecord, Error> {
        self.manager.get_access_token().await
    }

    /// Fetch a new ticket from the platform without persisting it.
    pub async fn get_ticket(&self) -> Result<TicketRecord, Error> {
        self.manager.get_ticket().await
    }

    pub async fn save_access_token(&self, record: &AccessTokenRecord) -> Result<(), Error> {
        self.manager.storage().write(record).await
    }

    pub async fn read_access_token(&self) -> Result<AccessTokenRecord, Error> {
        self.manager.storage().read().await
    }

    pub fn is_valid_access_token(&self, record: &AccessTokenRecord) -> bool {
        is_valid(record)
    }

    pub async fn save_ticket(&self, record: &TicketRecord) -> Result<(), Error> {
        self.manager.storage().write(record).await
    }

    pub async fn read_ticket(&self) -> Result<TicketRecord, Error> {
        self.manager.storage().read().await
    }

    pub fn is_valid_ticket(&self, record: &TicketRecord) -> bool {
        is_valid(record)
    }

    /// Sign a JS-SDK configuration for the page at `url`.
    pub async fn js_api_config(&self, url: &str) -> Result<JsApiConfig, Error> {
        let ticket = self.fetch_ticket().await?;
        Ok(JsApiConfig::new(&self.app_id, &ticket.ticket, url))
    }
}
