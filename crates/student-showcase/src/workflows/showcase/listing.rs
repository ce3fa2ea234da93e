use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient message shown to the acting user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Client-side copy of a listing that stays available when a refresh fails.
#[derive(Debug, Clone)]
pub struct CachedListing<T> {
    items: Vec<T>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl<T> Default for CachedListing<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            refreshed_at: None,
        }
    }
}

impl<T> CachedListing<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    /// Replaces the items on success. On failure the previous items are kept
    /// and a notice describing the failure is returned.
    pub fn apply<E: Display>(&mut self, result: Result<Vec<T>, E>) -> Option<Notice> {
        match result {
            Ok(items) => {
                self.items = items;
                self.refreshed_at = Some(Utc::now());
                None
            }
            Err(err) => Some(Notice::error(format!(
                "Could not refresh, showing the last loaded list: {err}"
            ))),
        }
    }
}
