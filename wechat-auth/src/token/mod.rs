//! Platform credential management: records, expiry, storage, fetching and
//! tiered resolution.

pub mod expiry;
mod fetcher;
mod manager;
mod records;
mod storage;

pub use expiry::{is_valid, SAFETY_MARGIN_SECONDS};
pub use fetcher::{Fetcher, PlatformClient, DEFAULT_API_BASE_URL};
pub use manager::Manager;
pub use records::{AccessTokenRecord, Credential, CredentialKind, TicketRecord};
pub use storage::{FileStorage, Storage};
