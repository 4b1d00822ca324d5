use crate::changeset::ValidationErrors;
use crate::error::OrmResult;
use crate::row::{FromRow, RowExt};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// A notification addressed to one user, or to everyone when `user_id` is `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: Option<i64>,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Visible to `user_id`: broadcast rows plus rows addressed to that user.
    pub fn visible_to(&self, user_id: Option<i64>) -> bool {
        self.user_id.is_none() || self.user_id == user_id
    }
}

impl FromRow for Notification {
    fn from_row(row: &Row) -> OrmResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            user_id: row.try_get_column("user_id")?,
            title: row.try_get_column("title")?,
            message: row.try_get_column("message")?,
            kind: row.try_get_column("type")?,
            is_read: row.try_get_column("is_read")?,
            created_at: row.try_get_column("created_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: Option<i64>,
    pub title: String,
    pub message: String,
    pub kind: String,
}

/// Request body for creating a notification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewNotificationInput {
    pub user_id: Option<i64>,
    pub title: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl NewNotificationInput {
    pub fn validate(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::new();
        errs.require_text("title", self.title.as_deref().unwrap_or(""));
        errs.require_text("message", self.message.as_deref().unwrap_or(""));
        errs.require_text("type", self.kind.as_deref().unwrap_or(""));
        errs
    }

    pub fn try_into_model(self) -> Result<NewNotification, ValidationErrors> {
        self.validate().into_result()?;
        Ok(NewNotification {
            user_id: self.user_id,
            title: self.title.unwrap_or_default(),
            message: self.message.unwrap_or_default(),
            kind: self.kind.unwrap_or_default(),
        })
    }
}

/// Query string for the notification list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationQuery {
    pub user_id: Option<i64>,
    /// Only the literal `true` enables the unread filter.
    pub unread_only: Option<String>,
}

impl NotificationQuery {
    pub fn unread_only(&self) -> bool {
        self.unread_only.as_deref() == Some("true")
    }
}
