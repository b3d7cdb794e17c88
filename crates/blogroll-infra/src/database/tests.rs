#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::database::entity::post;
    use crate::database::postgres_repo::{PostgresFollowRepository, PostgresPostRepository};
    use blogroll_core::domain::{Follow, Post};
    use blogroll_core::error::RepoError;
    use blogroll_core::ports::{BaseRepository, FollowRepository, PostFilter, PostRepository};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn post_model(id: uuid::Uuid, author_id: uuid::Uuid, text: &str) -> post::Model {
        post::Model {
            id,
            author_id,
            group_id: None,
            text: text.to_owned(),
            image: Some("posts/small.gif".to_owned()),
            created_at: chrono::Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_post_by_id() {
        let post_id = uuid::Uuid::new_v4();
        let author_id = uuid::Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_model(post_id, author_id, "Тестовый текст")]])
            .into_connection();

        let repo = PostgresPostRepository::new(Arc::new(db));

        let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

        let post = result.unwrap();
        assert_eq!(post.text, "Тестовый текст");
        assert_eq!(post.id, post_id);
        assert_eq!(post.author_id, author_id);
        assert_eq!(post.image.as_deref(), Some("posts/small.gif"));
    }

    #[tokio::test]
    async fn test_list_posts_maps_rows() {
        let author_id = uuid::Uuid::new_v4();
        let rows = vec![
            post_model(uuid::Uuid::new_v4(), author_id, "newer"),
            post_model(uuid::Uuid::new_v4(), author_id, "older"),
        ];

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![rows])
            .into_connection();

        let repo = PostgresPostRepository::new(Arc::new(db));
        let posts = repo
            .list(PostFilter::FollowedBy(uuid::Uuid::new_v4()), 0, 10)
            .await
            .unwrap();

        let texts: Vec<&str> = posts.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, ["newer", "older"]);
    }

    #[tokio::test]
    async fn test_delete_missing_post_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = PostgresPostRepository::new(Arc::new(db));
        let result = BaseRepository::<Post, uuid::Uuid>::delete(&repo, uuid::Uuid::new_v4()).await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn test_follow_reports_conflict_as_noop() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();

        let repo = PostgresFollowRepository::new(Arc::new(db));
        let (user, author) = (uuid::Uuid::new_v4(), uuid::Uuid::new_v4());

        assert!(repo.follow(Follow::new(user, author).unwrap()).await.unwrap());
        assert!(!repo.follow(Follow::new(user, author).unwrap()).await.unwrap());
    }

    #[tokio::test]
    async fn test_unfollow_returns_rows_removed() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let repo = PostgresFollowRepository::new(Arc::new(db));
        let removed = repo
            .unfollow(uuid::Uuid::new_v4(), uuid::Uuid::new_v4())
            .await
            .unwrap();

        assert_eq!(removed, 1);
    }
}
