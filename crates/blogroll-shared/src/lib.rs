//! # Blogroll Shared
//!
//! Request payloads and view models shared by the server and its templates.

pub mod dto;
pub mod view;

pub use view::{AuthorView, CommentView, GroupChoice, GroupLink, PostCard};
