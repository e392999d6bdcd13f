use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of one logical call, for log correlation across its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallId(pub Uuid);

impl CallId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CallId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationState {
    Unregistered,
    Registering,
    Registered,
    RegistrationFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallState {
    Idle,
    Dialing,
    /// An incoming call is alerting; carries the caller address.
    Ringing { from: String },
    Connected,
    Ending,
}

impl CallState {
    pub fn is_idle(&self) -> bool {
        matches!(self, CallState::Idle)
    }
}

/// SIP account credentials, supplied once per login attempt. The controller
/// does not retain them; a failed registration requires the caller to
/// resupply.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub domain: String,
    pub password: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        domain: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            domain: domain.into(),
            password: password.into(),
        }
    }

    /// First required field that is empty, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.username.trim().is_empty() {
            Some("username")
        } else if self.domain.trim().is_empty() {
            Some("domain")
        } else if self.password.trim().is_empty() {
            Some("password")
        } else {
            None
        }
    }
}

// Keeps the password out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("domain", &self.domain)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Address of the party to call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallTarget {
    pub callee: String,
}

impl CallTarget {
    pub fn new(callee: impl Into<String>) -> Self {
        Self {
            callee: callee.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.callee.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_reports_first_empty_field() {
        let creds = Credentials::new("", "sip.example.com", "pw");
        assert_eq!(creds.missing_field(), Some("username"));

        let creds = Credentials::new("alice", "", "pw");
        assert_eq!(creds.missing_field(), Some("domain"));

        let creds = Credentials::new("alice", "sip.example.com", "   ");
        assert_eq!(creds.missing_field(), Some("password"));

        let creds = Credentials::new("alice", "sip.example.com", "pw");
        assert_eq!(creds.missing_field(), None);
    }

    #[test]
    fn credentials_debug_redacts_password() {
        let creds = Credentials::new("alice", "sip.example.com", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn call_target_rejects_whitespace_only_addresses() {
        assert!(CallTarget::new("  ").is_empty());
        assert!(!CallTarget::new("1000").is_empty());
    }
}
