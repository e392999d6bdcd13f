use serde::{Deserialize, Serialize};

/// Asynchronous notifications emitted by the SIP provider.
///
/// These arrive on an independent channel after the corresponding request
/// was accepted; failure payloads may omit the message, in which case the
/// dispatcher substitutes a generic description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderEvent {
    RegistrationSuccess,
    RegistrationFailed { message: Option<String> },
    IncomingCall { from: String },
    CallEstablished,
    CallEnded,
    CallError { message: Option<String> },
}
