//! View models handed to the HTML templates.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A group reference as shown under a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupLink {
    pub title: String,
    pub slug: String,
}

/// A post as rendered in feeds and on the detail page.
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub id: String,
    pub text: String,
    pub author: String,
    pub group: Option<GroupLink>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub author: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// One option of the group select box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupChoice {
    pub id: String,
    pub title: String,
}

/// A post author or profile owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorView {
    pub username: String,
    pub post_count: u64,
}
