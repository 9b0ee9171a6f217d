//! Platform credential records.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The two credential kinds the platform issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    AccessToken,
    Ticket,
}

impl CredentialKind {
    /// Get the credential identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKind::AccessToken => "access_token",
            CredentialKind::Ticket => "ticket",
        }
    }

    /// Name of the file the credential is persisted under.
    pub fn file_name(&self) -> &'static str {
        match self {
            CredentialKind::AccessToken => "access_token.json",
            CredentialKind::Ticket => "ticket.json",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A credential with an absolute expiry, stored and cached as a whole.
///
/// The default value is the empty record (empty value, zero expiry), which is
/// never valid.
pub trait Credential:
    Serialize + DeserializeOwned + Clone + Default + Send + Sync + 'static
{
    const KIND: CredentialKind;

    /// The credential string itself.
    fn value(&self) -> &str;

    /// Absolute wall-clock expiry in milliseconds since the unix epoch.
    fn expires_at_millis(&self) -> i64;
}

/// Access token record.
///
/// On disk `expires_in` holds the absolute expiry in milliseconds, although
/// the platform uses the same field name for a relative lifetime in seconds.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenRecord {
    #[serde(rename = "access_token")]
    pub value: String,
    #[serde(rename = "expires_in")]
    pub expires_at_millis: i64,
}

impl AccessTokenRecord {
    pub fn new(value: impl Into<String>, expires_at_millis: i64) -> Self {
        Self {
            value: value.into(),
            expires_at_millis,
        }
    }
}

impl Credential for AccessTokenRecord {
    const KIND: CredentialKind = CredentialKind::AccessToken;

    fn value(&self) -> &str {
        &self.value
    }

    fn expires_at_millis(&self) -> i64 {
        self.expires_at_millis
    }
}

// Keeps the credential itself out of logs.
impl fmt::Debug for AccessTokenRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("AccessTokenRecord")
            .field("value", &"[REDACTED]")
            .field("expires_at_millis", &self.expires_at_millis)
            .finish()
    }
}

/// JS API ticket record.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRecord {
    pub ticket: String,
    #[serde(rename = "expires_in")]
    pub expires_at_millis: i64,
}

impl TicketRecord {
    pub fn new(ticket: impl Into<String>, expires_at_millis: i64) -> Self {
        Self {
            ticket: ticket.into(),
            expires_at_millis,
        }
    }
}

impl Credential for TicketRecord {
    const KIND: CredentialKind = CredentialKind::Ticket;

    fn value(&self) -> &str {
        &self.ticket
    }

    fn expires_at_millis(&self) -> i64 {
        self.expires_at_millis
    }
}

impl fmt::Debug for TicketRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TicketRecord")
            .field("ticket", &"[REDACTED]")
            .field("expires_at_millis", &self.expires_at_millis)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_record_uses_platform_field_names() {
        let record = AccessTokenRecord::new("T", 1_700_000_000_000);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "access_token": "T", "expires_in": 1_700_000_000_000_i64 })
        );
    }

    #[test]
    fn test_ticket_record_uses_platform_field_names() {
        let json = r#"{"ticket":"jsapi","expires_in":42}"#;
        let record: TicketRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record, TicketRecord::new("jsapi", 42));
    }

    #[test]
    fn test_debug_redacts_credential() {
        let record = AccessTokenRecord::new("super-secret", 1);
        let text = format!("{:?}", record);
        assert!(!text.contains("super-secret"));
        assert!(text.contains("REDACTED"));
    }

    #[test]
    fn test_kind_file_names() {
        assert_eq!(CredentialKind::AccessToken.file_name(), "access_token.json");
        assert_eq!(CredentialKind::Ticket.file_name(), "ticket.json");
        assert_eq!(AccessTokenRecord::KIND, CredentialKind::AccessToken);
        assert_eq!(TicketRecord::KIND, CredentialKind::Ticket);
    }
}
