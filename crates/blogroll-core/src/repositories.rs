//! Repository bundle plus the lookup and deletion rules that span entities.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Group, Post, User};
use crate::error::DomainError;
use crate::ports::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};

/// Every repository the application talks to.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub follows: Arc<dyn FollowRepository>,
}

impl Repositories {
    pub async fn get_user_by_username(&self, username: &str) -> Result<User, DomainError> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity_type: "User",
                key: username.to_string(),
            })
    }

    pub async fn get_group_by_slug(&self, slug: &str) -> Result<Group, DomainError> {
        self.groups
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity_type: "Group",
                key: slug.to_string(),
            })
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                entity_type: "Post",
                key: id.to_string(),
            })
    }

    /// Delete a user with everything they own: their comments, comments left
    /// on their posts, their posts and their subscriptions in both directions.
    pub async fn delete_user(&self, user_id: Uuid) -> Result<(), DomainError> {
        let post_ids = self.posts.ids_by_author(user_id).await?;
        let comments = self.comments.delete_by_author(user_id).await?
            + self.comments.delete_by_posts(&post_ids).await?;
        let posts = self.posts.delete_by_author(user_id).await?;
        let follows = self.follows.delete_involving(user_id).await?;
        self.users.delete(user_id).await?;

        tracing::info!(%user_id, posts, comments, follows, "Deleted user");
        Ok(())
    }

    /// Delete a group. Its posts survive with the group cleared.
    pub async fn delete_group(&self, group_id: Uuid) -> Result<(), DomainError> {
        let detached = self.posts.clear_group(group_id).await?;
        self.groups.delete(group_id).await?;

        tracing::info!(%group_id, detached, "Deleted group");
        Ok(())
    }

    /// Delete a post together with its comments.
    pub async fn delete_post(&self, post_id: Uuid) -> Result<(), DomainError> {
        let comments = self.comments.delete_by_posts(&[post_id]).await?;
        self.posts.delete(post_id).await?;

        tracing::info!(%post_id, comments, "Deleted post");
        Ok(())
    }
}
