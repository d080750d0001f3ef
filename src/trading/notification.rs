//! Transient user notifications (toasts).

use serde::Serialize;
use strum::Display;

/// Visual weight of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Success or informational.
    #[strum(serialize = "info")]
    Info,
    /// Failure.
    #[strum(serialize = "destructive")]
    Destructive,
}

/// A transient notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Short title.
    pub title: String,
    /// Body text.
    pub description: String,
    /// Severity.
    pub severity: Severity,
}

/// Message used when a failure carries no text.
pub const UNKNOWN_ERROR: &str = "Unknown error occurred";

impl Notification {
    /// Informational notification.
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Info,
        }
    }

    /// Failure notification; an empty description falls back to a generic one.
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        let description = description.into();
        Self {
            title: title.into(),
            description: if description.trim().is_empty() {
                UNKNOWN_ERROR.to_string()
            } else {
                description
            },
            severity: Severity::Destructive,
        }
    }

    /// Whether this notification reports a failure.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Destructive
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.title, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destructive_falls_back_on_empty_text() {
        let n = Notification::destructive("Purchase Failed", "");
        assert_eq!(n.description, UNKNOWN_ERROR);
        assert!(n.is_error());
    }

    #[test]
    fn display_includes_severity() {
        let n = Notification::info("Tokens Claimed!", "done");
        assert_eq!(n.to_string(), "[info] Tokens Claimed!: done");
    }
}
