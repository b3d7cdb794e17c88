use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Follow entity - `user_id` subscribes to posts written by `author_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Follow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Follow {
    /// Create a subscription. A user cannot follow themselves.
    pub fn new(user_id: Uuid, author_id: Uuid) -> Result<Self, DomainError> {
        if user_id == author_id {
            return Err(DomainError::SelfFollow);
        }

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            author_id,
            created_at: Utc::now(),
        })
    }
}
