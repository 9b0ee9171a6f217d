//! # wechat-auth
//!
//! Server-side integration with the WeChat Official Account platform:
//! - Handshake signature verification for inbound webhook requests
//! - Access token and JS API ticket resolution through an in-memory cache,
//!   JSON files on disk and finally the platform API
//! - JS-SDK page configuration signing
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wechat_auth::{ServerConfig, WechatServer};
//!
//! let server = WechatServer::new(config)?;
//! let outcome = server.verify().handle(&request, &mut response, Some(next));
//! let ticket = server.fetch_ticket().await?;
//! ```

pub mod error;
pub mod http;
pub mod jssdk;
pub mod server;
pub mod token;
pub mod webhook;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
pub use server::{ServerConfig, WechatServer};
