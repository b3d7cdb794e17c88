//! Domain entities - the core business objects.

mod comment;
mod follow;
mod group;
mod post;
mod user;

pub use comment::Comment;
pub use follow::Follow;
pub use group::{Group, is_valid_slug};
pub use post::Post;
pub use user::User;
