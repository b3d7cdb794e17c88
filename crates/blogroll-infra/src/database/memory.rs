//! In-memory store - used when no database is configured, and in tests.
//! Note: Data is lost on process restart.

use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blogroll_core::Repositories;
use blogroll_core::domain::{Comment, Follow, Group, Post, User};
use blogroll_core::error::RepoError;
use blogroll_core::ports::{
    BaseRepository, CommentRepository, FollowRepository, GroupRepository, PostFilter,
    PostRepository, UserRepository,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    groups: HashMap<Uuid, Group>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
    follows: HashMap<Uuid, Follow>,
}

type SharedTables = Arc<RwLock<Tables>>;

/// A row type kept in one of the in-memory tables.
trait Stored: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
    fn table(tables: &Tables) -> &HashMap<Uuid, Self>;
    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self>;

    /// Reject rows that would break a unique column.
    fn check_unique(&self, _tables: &Tables) -> Result<(), RepoError> {
        Ok(())
    }
}

impl Stored for User {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.users
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.users
    }

    fn check_unique(&self, tables: &Tables) -> Result<(), RepoError> {
        let taken = tables
            .users
            .values()
            .any(|u| u.id != self.id && u.username == self.username);
        if taken {
            return Err(RepoError::Constraint(format!(
                "username {:?} already exists",
                self.username
            )));
        }
        Ok(())
    }
}

impl Stored for Group {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.groups
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.groups
    }

    fn check_unique(&self, tables: &Tables) -> Result<(), RepoError> {
        let taken = tables
            .groups
            .values()
            .any(|g| g.id != self.id && g.slug == self.slug);
        if taken {
            return Err(RepoError::Constraint(format!(
                "group slug {:?} already exists",
                self.slug
            )));
        }
        Ok(())
    }
}

impl Stored for Post {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.posts
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.posts
    }
}

impl Stored for Comment {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.comments
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.comments
    }
}

impl Stored for Follow {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &Tables) -> &HashMap<Uuid, Self> {
        &tables.follows
    }

    fn table_mut(tables: &mut Tables) -> &mut HashMap<Uuid, Self> {
        &mut tables.follows
    }

    fn check_unique(&self, tables: &Tables) -> Result<(), RepoError> {
        let taken = tables.follows.values().any(|f| {
            f.id != self.id && f.user_id == self.user_id && f.author_id == self.author_id
        });
        if taken {
            return Err(RepoError::Constraint("follow already exists".to_string()));
        }
        Ok(())
    }
}

/// Generic in-memory repository over one table of a [`MemoryDatabase`].
pub struct InMemoryRepository<T> {
    tables: SharedTables,
    _entity: PhantomData<T>,
}

impl<T> InMemoryRepository<T> {
    fn new(tables: SharedTables) -> Self {
        Self {
            tables,
            _entity: PhantomData,
        }
    }
}

/// Shared in-memory tables handing out repositories over the same data.
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    tables: SharedTables,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(InMemoryRepository::<User>::new(self.tables.clone())),
            groups: Arc::new(InMemoryRepository::<Group>::new(self.tables.clone())),
            posts: Arc::new(InMemoryRepository::<Post>::new(self.tables.clone())),
            comments: Arc::new(InMemoryRepository::<Comment>::new(self.tables.clone())),
            follows: Arc::new(InMemoryRepository::<Follow>::new(self.tables.clone())),
        }
    }
}

#[async_trait]
impl<T: Stored> BaseRepository<T, Uuid> for InMemoryRepository<T> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        let tables = self.tables.read().await;
        Ok(T::table(&tables).get(&id).cloned())
    }

    async fn create(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.tables.write().await;
        if T::table(&tables).contains_key(&entity.id()) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        entity.check_unique(&tables)?;

        T::table_mut(&mut tables).insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.tables.write().await;
        if !T::table(&tables).contains_key(&entity.id()) {
            return Err(RepoError::NotFound);
        }
        entity.check_unique(&tables)?;

        T::table_mut(&mut tables).insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        T::table_mut(&mut tables)
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository<User> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl GroupRepository for InMemoryRepository<Group> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.groups.values().find(|g| g.slug == slug).cloned())
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Group>, RepoError> {
        let tables = self.tables.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.groups.get(id).cloned())
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<Group>, RepoError> {
        let tables = self.tables.read().await;
        let mut groups: Vec<Group> = tables.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }
}

/// Posts matching `filter`, newest first.
fn filtered_posts(tables: &Tables, filter: PostFilter) -> Vec<&Post> {
    let followed: HashSet<Uuid> = match filter {
        PostFilter::FollowedBy(user_id) => tables
            .follows
            .values()
            .filter(|f| f.user_id == user_id)
            .map(|f| f.author_id)
            .collect(),
        _ => HashSet::new(),
    };

    let mut posts: Vec<&Post> = tables
        .posts
        .values()
        .filter(|p| match filter {
            PostFilter::All => true,
            PostFilter::Group(group_id) => p.group_id == Some(group_id),
            PostFilter::Author(author_id) => p.author_id == author_id,
            PostFilter::FollowedBy(_) => followed.contains(&p.author_id),
        })
        .collect();
    posts.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    posts
}

#[async_trait]
impl PostRepository for InMemoryRepository<Post> {
    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(filtered_posts(&tables, filter).len() as u64)
    }

    async fn list(
        &self,
        filter: PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(filtered_posts(&tables, filter)
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn ids_by_author(&self, author_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .values()
            .filter(|p| p.author_id == author_id)
            .map(|p| p.id)
            .collect())
    }

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.posts.len();
        tables.posts.retain(|_, p| p.author_id != author_id);
        Ok((before - tables.posts.len()) as u64)
    }

    async fn clear_group(&self, group_id: Uuid) -> Result<u64, RepoError> {
        let mut tables = self.tables.write().await;
        let mut touched = 0;
        for post in tables.posts.values_mut() {
            if post.group_id == Some(group_id) {
                post.group_id = None;
                touched += 1;
            }
        }
        Ok(touched)
    }
}

#[async_trait]
impl CommentRepository for InMemoryRepository<Comment> {
    async fn list_by_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let mut comments: Vec<Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn delete_by_posts(&self, post_ids: &[Uuid]) -> Result<u64, RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.comments.len();
        tables.comments.retain(|_, c| !post_ids.contains(&c.post_id));
        Ok((before - tables.comments.len()) as u64)
    }

    async fn delete_by_author(&self, author_id: Uuid) -> Result<u64, RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.comments.len();
        tables.comments.retain(|_, c| c.author_id != author_id);
        Ok((before - tables.comments.len()) as u64)
    }
}

#[async_trait]
impl FollowRepository for InMemoryRepository<Follow> {
    async fn exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .values()
            .any(|f| f.user_id == user_id && f.author_id == author_id))
    }

    async fn follow(&self, follow: Follow) -> Result<bool, RepoError> {
        // Check and insert under one write lock so the pair stays unique.
        let mut tables = self.tables.write().await;
        if follow.check_unique(&tables).is_err() {
            return Ok(false);
        }
        tables.follows.insert(follow.id, follow);
        Ok(true)
    }

    async fn unfollow(&self, user_id: Uuid, author_id: Uuid) -> Result<u64, RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.follows.len();
        tables
            .follows
            .retain(|_, f| !(f.user_id == user_id && f.author_id == author_id));
        Ok((before - tables.follows.len()) as u64)
    }

    async fn count_following(&self, user_id: Uuid) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .follows
            .values()
            .filter(|f| f.user_id == user_id)
            .count() as u64)
    }

    async fn delete_involving(&self, user_id: Uuid) -> Result<u64, RepoError> {
        let mut tables = self.tables.write().await;
        let before = tables.follows.len();
        tables
            .follows
            .retain(|_, f| f.user_id != user_id && f.author_id != user_id);
        Ok((before - tables.follows.len()) as u64)
    }
}
