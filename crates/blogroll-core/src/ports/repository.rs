use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, Follow, Group, Post, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn create(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity, keyed by its ID.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    ///
    /// This removes the single row only; dependent rows are handled by
    /// the rules on [`crate::Repositories`].
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;
}

/// Group repository.
#[async_trait]
pub trait GroupRepository: BaseRepository<Group, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError>;

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Group>, RepoError>;

    /// All groups ordered by title, for form choices.
    async fn list_all(&self) -> Result<Vec<Group>, RepoError>;
}

/// Which posts a feed shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(Uuid),
    Author(Uuid),
    /// Posts by every author the given user follows.
    FollowedBy(Uuid),
}

/// Post repository. Every listing is ordered newest first.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError>;

    async fn list(&self, filter: PostFilter, offset: u64, limit: u64)
    -> Result<Vec<Post>, RepoError>;

    async fn ids_by_author(&self, author_id: Uuid) -> Result<Vec<Uuid>, RepoError>;

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError>;

    /// Detach every post from a group. Returns the number of posts touched.
    async fn clear_group(&self, group_id: Uuid) -> Result<u64, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments under a post, oldest first.
    async fn list_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    async fn delete_by_posts(&self, post_ids: &[Uuid]) -> Result<u64, RepoError>;

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError>;
}

/// Follow repository. A (user, author) pair is stored at most once.
#[async_trait]
pub trait FollowRepository: Send + Sync {
    async fn exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError>;

    /// Store the subscription unless the pair already exists.
    /// Returns `true` when a new row was written.
    async fn follow(&self, follow: Follow) -> Result<bool, RepoError>;

    /// Returns the number of rows removed (0 or 1).
    async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> Result<u64, RepoError>;

    /// Count of subscriptions held by `user_id`.
    async fn count_following(&self, user_id: Uuid) -> Result<u64, RepoError>;

    /// Remove every subscription where the user is either side.
    async fn delete_involving(&self, user_id: Uuid) -> Result<u64, RepoError>;
}
