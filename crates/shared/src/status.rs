use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatusKind::Info => "info",
            StatusKind::Success => "success",
            StatusKind::Error => "error",
        };
        f.write_str(label)
    }
}

/// Human-readable session status, recomputed on every state transition.
/// Read-only projection for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub kind: StatusKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl SessionStatus {
    fn new(kind: StatusKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            at: Utc::now(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(StatusKind::Error, message)
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_the_matching_kind() {
        assert_eq!(SessionStatus::info("a").kind, StatusKind::Info);
        assert_eq!(SessionStatus::success("b").kind, StatusKind::Success);
        assert!(SessionStatus::error("c").is_error());
    }

    #[test]
    fn serializes_kind_as_snake_case() {
        let status = SessionStatus::success("registered successfully");
        let encoded = serde_json::to_string(&status).expect("encode");
        assert!(encoded.contains(r#""kind":"success""#));
        assert!(encoded.contains("registered successfully"));
    }
}
