//! JS-SDK page configuration signing.
//!
//! Pages that use the platform's JS-SDK pass a signed configuration to
//! `wx.config`. The signature covers the JS API ticket, a nonce, a unix
//! timestamp and the page URL without its fragment.

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use sha1::{Digest, Sha1};

const NONCE_LENGTH: usize = 16;

/// Signed configuration handed to a page's `wx.config` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsApiConfig {
    pub app_id: String,
    pub timestamp: i64,
    pub nonce_str: String,
    pub signature: String,
    pub url: String,
}

impl JsApiConfig {
    /// Sign a configuration for `url` with a fresh nonce and the current time.
    pub fn new(app_id: &str, ticket: &str, url: &str) -> Self {
        Self::with_nonce(app_id, ticket, url, &nonce_str(), Utc::now().timestamp())
    }

    /// Sign a configuration with a caller-chosen nonce and timestamp.
    pub fn with_nonce(app_id: &str, ticket: &str, url: &str, nonce_str: &str, timestamp: i64) -> Self {
        let url = strip_fragment(url);
        Self {
            app_id: app_id.to_string(),
            timestamp,
            nonce_str: nonce_str.to_string(),
            signature: sign(ticket, nonce_str, timestamp, url),
            url: url.to_string(),
        }
    }
}

/// Compute the JS-SDK signature.
pub fn sign(ticket: &str, nonce_str: &str, timestamp: i64, url: &str) -> String {
    let plain = format!(
        "jsapi_ticket={}&noncestr={}&timestamp={}&url={}",
        ticket,
        nonce_str,
        timestamp,
        strip_fragment(url)
    );
    hex::encode(Sha1::digest(plain.as_bytes()))
}

/// Generate a random alphanumeric nonce.
pub fn nonce_str() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LENGTH)
        .map(char::from)
        .collect()
}

fn strip_fragment(url: &str) -> &str {
    url.split('#').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICKET: &str =
        "sM4AOVdWfPE4DxkXGEs8VMCPGGVi4C3VM0P37wVUCFvkVAy_90u5h9nbSlYy3-Sl-HhTdfl2fzFy1AOcHKP7qg";

    #[test]
    fn test_sign_matches_published_example() {
        let signature = sign(
            TICKET,
            "Wm3WZYTPz0wzccnW",
            1414587457,
            "http://mp.weixin.qq.com?params=value",
        );
        assert_eq!(signature, "0f9de62fce790f9a083d5c99e95740ceb90c27ed");
    }

    #[test]
    fn test_fragment_is_ignored() {
        let with_fragment = JsApiConfig::with_nonce(
            "wx123",
            TICKET,
            "http://mp.weixin.qq.com?params=value#section",
            "Wm3WZYTPz0wzccnW",
            1414587457,
        );
        assert_eq!(with_fragment.url, "http://mp.weixin.qq.com?params=value");
        assert_eq!(
            with_fragment.signature,
            "0f9de62fce790f9a083d5c99e95740ceb90c27ed"
        );
    }

    #[test]
    fn test_config_serializes_camel_case() {
        let config = JsApiConfig::with_nonce("wx123", TICKET, "https://example.com/", "n", 1);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["appId"], "wx123");
        assert_eq!(json["nonceStr"], "n");
        assert_eq!(json["timestamp"], 1);
        assert!(json["signature"].is_string());
    }

    #[test]
    fn test_nonce_str_shape() {
        let nonce = nonce_str();
        assert_eq!(nonce.len(), NONCE_LENGTH);
        assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(nonce, nonce_str());
    }

    #[test]
    fn test_new_uses_current_time() {
        let before = Utc::now().timestamp();
        let config = JsApiConfig::new("wx123", TICKET, "https://example.com/");
        assert!(config.timestamp >= before);
        assert_eq!(config.signature, sign(TICKET, &config.nonce_str, config.timestamp, &config.url));
    }
}
