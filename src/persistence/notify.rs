//! User-facing notifications for non-fatal failures and confirmations.

use std::fmt;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Something worked
    Info,
    /// Something failed; state was left unchanged
    Error,
}

/// Short message for the user, optionally with detail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,
    /// One-line summary
    pub title: String,
    /// Optional detail
    pub description: Option<String>,
}

impl Notification {
    /// Informational notification.
    #[must_use]
    pub fn info(title: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            title: title.into(),
            description: None,
        }
    }

    /// Error notification. Also logged, since nobody may be looking when it fires.
    #[must_use]
    pub fn error(title: impl Into<String>) -> Self {
        let title = title.into();
        tracing::warn!("{title}");
        Self {
            level: NotificationLevel::Error,
            title,
            description: None,
        }
    }

    /// Adds detail text.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether this reports a failure.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let icon = match self.level {
            NotificationLevel::Info => "✅",
            NotificationLevel::Error => "❌",
        };
        write!(f, "{icon} {}", self.title)?;
        if let Some(description) = &self.description {
            write!(f, ": {description}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let note = Notification::error("Failed to save people data").with_description("timeout");
        assert!(note.is_error());
        assert_eq!(note.to_string(), "❌ Failed to save people data: timeout");
        assert_eq!(Notification::info("Saved").to_string(), "✅ Saved");
    }
}
