//! Handshake verification handler.

use log::*;
use secrecy::{ExposeSecret, SecretString};

use super::signature::{reference_signature, signatures_match};
use super::{WebhookRequest, WebhookResponse};

/// Result of handling one inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// Signature matched; the challenge was echoed.
    Verified,
    /// Signature mismatch; the response was ended with `"error"`.
    Rejected,
    /// Not a GET request; the response was left untouched.
    Unhandled,
}

/// Request handler that answers the platform's server verification handshake.
#[derive(Clone)]
pub struct Verifier {
    token: SecretString,
}

impl Verifier {
    /// Create a verifier for the given shared token.
    pub fn new(token: SecretString) -> Self {
        Self { token }
    }

    /// Handle one request.
    ///
    /// On a GET with a matching signature the `echostr` challenge is sent as
    /// `text/plain` and `next` is invoked. On a mismatch the response is ended
    /// with `"error"` and `next` is not invoked. Other methods get no response
    /// and `next` is not invoked.
    pub fn handle<Q, R, N>(&self, request: &Q, response: &mut R, next: Option<N>) -> VerifyOutcome
    where
        Q: WebhookRequest + ?Sized,
        R: WebhookResponse + ?Sized,
        N: FnOnce(),
    {
        let signature = request.query("signature").unwrap_or_default();
        let echostr = request.query("echostr").unwrap_or_default();
        let timestamp = request.query("timestamp").unwrap_or_default();
        let nonce = request.query("nonce").unwrap_or_default();

        let reference = reference_signature(timestamp, nonce, self.token.expose_secret());

        if request.method() != "GET" {
            // Only the GET handshake is answered; other methods get no response.
            trace!("Ignoring {} request", request.method());
            return VerifyOutcome::Unhandled;
        }

        if signatures_match(&reference, signature) {
            debug!("Webhook signature verified");
            response.set("Content-Type", "text/plain");
            response.send(echostr);
            if let Some(next) = next {
                next();
            }
            VerifyOutcome::Verified
        } else {
            warn!("Webhook signature mismatch");
            response.end(Some("error"));
            VerifyOutcome::Rejected
        }
    }
}
