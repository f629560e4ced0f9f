//! Error codes and user notifications.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use serde::Serialize;

/// Grepable error code and retryable flag.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// Visual weight of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationVariant {
    #[default]
    Default,
    Destructive,
}

/// A short message shown to the user (a toast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
    /// Error code behind a destructive notification, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl Notification {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self { title: title.into(), description: description.into(), variant: NotificationVariant::Default, code: None }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: NotificationVariant::Destructive,
            code: None,
        }
    }

    /// A destructive notification carrying `error`'s code.
    pub fn from_error<E: ErrorCode>(title: impl Into<String>, error: &E) -> Self {
        Self { code: Some(error.error_code()), ..Self::destructive(title, error.to_string()) }
    }

    #[must_use]
    pub fn is_destructive(&self) -> bool {
        self.variant == NotificationVariant::Destructive
    }
}
