//! Tiered credential resolution: memory, then disk, then the platform.

use std::future::Future;

use log::*;
use secrecy::SecretString;
use tokio::sync::{Mutex, RwLock};

use super::expiry::is_valid;
use super::{AccessTokenRecord, Credential, Fetcher, Storage, TicketRecord};
use crate::error::Error;

/// Per-kind locks used when single-flight resolution is enabled.
#[derive(Default)]
struct RefreshLocks {
    access_token: Mutex<()>,
    ticket: Mutex<()>,
}

/// Credential manager that resolves access tokens and tickets through the
/// in-memory cache, the store and finally the platform.
///
/// By default concurrent cold resolutions each fetch and persist on their own.
/// [`Manager::with_single_flight`] serializes the disk and remote tiers per
/// credential kind so a single fetch serves every waiter.
pub struct Manager<S: Storage, F: Fetcher> {
    app_id: String,
    app_secret: SecretString,
    storage: S,
    fetcher: F,
    access_token: RwLock<AccessTokenRecord>,
    ticket: RwLock<TicketRecord>,
    refresh_locks: Option<RefreshLocks>,
}

impl<S: Storage, F: Fetcher> Manager<S, F> {
    /// Create a new manager with empty in-memory caches.
    pub fn new(app_id: String, app_secret: SecretString, storage: S, fetcher: F) -> Self {
        Self {
            app_id,
            app_secret,
            storage,
            fetcher,
            access_token: RwLock::new(AccessTokenRecord::default()),
            ticket: RwLock::new(TicketRecord::default()),
            refresh_locks: None,
        }
    }

    /// Enable single-flight resolution.
    pub fn with_single_flight(mut self) -> Self {
        self.refresh_locks = Some(RefreshLocks::default());
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Get a valid access token.
    pub async fn fetch_access_token(&self) -> Result<AccessTokenRecord, Error> {
        let lock = self.refresh_locks.as_ref().map(|l| &l.access_token);
        self.resolve(&self.access_token, lock, || {
            self.fetcher
                .fetch_access_token(&self.app_id, &self.app_secret)
        })
        .await
    }

    /// Get a valid JS API ticket, resolving an access token first if a fetch is needed.
    pub async fn fetch_ticket(&self) -> Result<TicketRecord, Error> {
        let lock = self.refresh_locks.as_ref().map(|l| &l.ticket);
        self.resolve(&self.ticket, lock, || async {
            let access_token = self.fetch_access_token().await?;
            self.fetcher.fetch_ticket(&access_token.value).await
        })
        .await
    }

    /// Fetch an access token from the platform, bypassing both caches.
    ///
    /// The in-memory cache is updated; nothing is persisted.
    pub async fn get_access_token(&self) -> Result<AccessTokenRecord, Error> {
        let record = self
            .fetcher
            .fetch_access_token(&self.app_id, &self.app_secret)
            .await?;
        *self.access_token.write().await = record.clone();
        Ok(record)
    }

    /// Fetch a ticket from the platform, bypassing the ticket caches.
    ///
    /// The access token used is resolved through the usual tiers. The in-memory
    /// ticket cache is updated; nothing is persisted.
    pub async fn get_ticket(&self) -> Result<TicketRecord, Error> {
        let access_token = self.fetch_access_token().await?;
        let record = self.fetcher.fetch_ticket(&access_token.value).await?;
        *self.ticket.write().await = record.clone();
        Ok(record)
    }

    async fn resolve<C, Fut>(
        &self,
        cache: &RwLock<C>,
        refresh_lock: Option<&Mutex<()>>,
        fetch: impl FnOnce() -> Fut,
    ) -> Result<C, Error>
    where
        C: Credential,
        Fut: Future<Output = Result<C, Error>>,
    {
        if let Some(record) = Self::cached(cache).await {
            trace!("Using in-memory {}", C::KIND);
            return Ok(record);
        }

        let _guard = match refresh_lock {
            Some(lock) => {
                let guard = lock.lock().await;
                // Another caller may have fetched while we waited.
                if let Some(record) = Self::cached(cache).await {
                    debug!("{} was refreshed by another request", C::KIND);
                    return Ok(record);
                }
                Some(guard)
            }
            None => None,
        };

        // A disk hit is returned without being promoted to the in-memory cache.
        match self.storage.read::<C>().await {
            Ok(record) if is_valid(&record) => {
                debug!("Using stored {}", C::KIND);
                return Ok(record);
            }
            Ok(_) => debug!("Stored {} has expired", C::KIND),
            Err(e) if e.is_not_found() => debug!("No stored {}", C::KIND),
            Err(e) => warn!("Ignoring unusable stored {}: {}", C::KIND, e),
        }

        let fresh = fetch().await?;
        self.storage.write(&fresh).await?;
        *cache.write().await = fresh.clone();

        info!(
            "Fetched new {} expiring at {}",
            C::KIND,
            fresh.expires_at_millis()
        );
        Ok(fresh)
    }

    async fn cached<C: Credential>(cache: &RwLock<C>) -> Option<C> {
        let record = cache.read().await;
        if is_valid(&*record) {
            Some(record.clone())
        } else {
            None
        }
    }
}
