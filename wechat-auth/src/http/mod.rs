//! HTTP client building for the platform endpoints.

mod client;

pub use client::{ClientBuilder, HttpClientConfig};
