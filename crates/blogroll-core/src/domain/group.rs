use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

pub const TITLE_MAX_LEN: usize = 200;
pub const SLUG_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 400;

/// Group entity - a community posts may optionally be tagged with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl Group {
    /// Create a new group, checking the slug and field lengths.
    pub fn new(title: String, slug: String, description: String) -> Result<Self, DomainError> {
        if !is_valid_slug(&slug) {
            return Err(DomainError::Validation(format!(
                "invalid group slug {slug:?}: use letters, numbers, underscores or hyphens"
            )));
        }
        if title.chars().count() > TITLE_MAX_LEN {
            return Err(DomainError::Validation(format!(
                "group title exceeds {TITLE_MAX_LEN} characters"
            )));
        }
        if description.chars().count() > DESCRIPTION_MAX_LEN {
            return Err(DomainError::Validation(format!(
                "group description exceeds {DESCRIPTION_MAX_LEN} characters"
            )));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            title,
            slug,
            description,
        })
    }
}

/// A slug is non-empty, at most 100 chars of `[-a-zA-Z0-9_]`.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= SLUG_MAX_LEN
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
