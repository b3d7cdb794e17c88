use std::sync::Arc;
use std::time::Duration;

use actix_web::cookie::Cookie;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};

use blogroll_core::domain::{Group, Post, User};
use blogroll_core::ports::PostFilter;
use blogroll_infra::{
    Argon2PasswordService, InMemoryCache, InMemoryMediaStorage, JwtConfig, JwtTokenService,
    MemoryDatabase,
};

use super::configure_routes;
use crate::middleware::auth::SESSION_COOKIE;
use crate::page_cache::PageCache;
use crate::state::AppState;
use crate::templates;

const SMALL_GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x00\x00\x00\x21\xf9\x04\x01\x0a\x00\x01\x00\x2c\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02\x4c\x01\x00\x3b";
const BOUNDARY: &str = "blogroll-test-boundary";
const POST_MARKER: &str = "<article class=\"post\">";

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(configure_routes),
        )
        .await
    };
}

fn test_state() -> (AppState, Arc<InMemoryMediaStorage>) {
    let media = Arc::new(InMemoryMediaStorage::new("/media"));
    let state = AppState {
        repos: MemoryDatabase::new().repositories(),
        page_cache: PageCache::new(Arc::new(InMemoryCache::new()), Duration::from_secs(20)),
        templates: Arc::new(templates::load().unwrap()),
        media: media.clone(),
        tokens: Arc::new(JwtTokenService::new(JwtConfig::default())),
        passwords: Arc::new(Argon2PasswordService::new()),
        posts_per_page: 10,
        storage: "memory",
    };
    (state, media)
}

async fn create_user(state: &AppState, username: &str) -> User {
    let user = User::new(
        username.to_string(),
        format!("{username}@example.com"),
        "unused-hash".to_string(),
    );
    state.repos.users.create(user).await.unwrap()
}

async fn create_group(state: &AppState, slug: &str) -> Group {
    let group = Group::new(
        "Тестовая группа".to_string(),
        slug.to_string(),
        "Тестовое описание".to_string(),
    )
    .unwrap();
    state.repos.groups.create(group).await.unwrap()
}

/// Posts get strictly increasing timestamps so feed order is deterministic.
async fn create_posts(
    state: &AppState,
    author: &User,
    group: Option<&Group>,
    count: usize,
) -> Vec<Post> {
    let start = chrono::Utc::now() - chrono::TimeDelta::hours(1);
    let mut posts = Vec::with_capacity(count);
    for i in 0..count {
        let mut post = Post::new(
            author.id,
            format!("Тестовый пост {i}"),
            group.map(|g| g.id),
            None,
        );
        post.created_at = start + chrono::TimeDelta::seconds(i as i64);
        posts.push(state.repos.posts.create(post).await.unwrap());
    }
    posts
}

fn session(state: &AppState, user: &User) -> Cookie<'static> {
    let token = state.tokens.generate_token(user.id, &user.username).unwrap();
    Cookie::new(SESSION_COOKIE, token)
}

fn location<B>(resp: &actix_web::dev::ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: image/gif\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

#[actix_web::test]
async fn test_public_pages_render() {
    let (state, _) = test_state();
    let author = create_user(&state, "auth").await;
    let group = create_group(&state, "test_slug").await;
    let post = create_posts(&state, &author, Some(&group), 1).await.remove(0);
    let app = app!(state);

    for uri in [
        "/".to_string(),
        "/group/test_slug/".to_string(),
        "/profile/auth/".to_string(),
        format!("/posts/{}/", post.id),
    ] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        let body = test::read_body(resp).await;
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("Тестовый пост 0"), "{uri}");
    }
}

#[actix_web::test]
async fn test_unknown_resources_are_404() {
    let (state, _) = test_state();
    let app = app!(state);

    for uri in [
        "/group/missing/".to_string(),
        "/profile/nobody/".to_string(),
        format!("/posts/{}/", uuid::Uuid::new_v4()),
        "/posts/not-a-uuid/".to_string(),
        "/unexisting_page/".to_string(),
    ] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );
    }
}

#[actix_web::test]
async fn test_health_reports_storage() {
    let (state, _) = test_state();
    let app = app!(state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
}

#[actix_web::test]
async fn test_anonymous_is_sent_to_login() {
    let (state, _) = test_state();
    let author = create_user(&state, "auth").await;
    let post = create_posts(&state, &author, None, 1).await.remove(0);
    let app = app!(state);

    let cases = [
        ("/create/".to_string(), "/auth/login/?next=/create/".to_string()),
        ("/follow/".to_string(), "/auth/login/?next=/follow/".to_string()),
        (
            format!("/posts/{}/edit/", post.id),
            format!("/auth/login/?next=/posts/{}/edit/", post.id),
        ),
        (
            format!("/posts/{}/comment/", post.id),
            format!("/auth/login/?next=/posts/{}/comment/", post.id),
        ),
        (
            "/profile/auth/follow/".to_string(),
            "/auth/login/?next=/profile/auth/follow/".to_string(),
        ),
    ];

    for (uri, expected) in cases {
        let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::FOUND, "{uri}");
        assert_eq!(location(&resp), expected);
    }
}

#[actix_web::test]
async fn test_create_post_with_group_and_image() {
    let (state, media) = test_state();
    let author = create_user(&state, "auth").await;
    let group = create_group(&state, "test_slug").await;
    let app = app!(state);

    let group_id = group.id.to_string();
    let (content_type, body) = multipart_body(
        &[("text", "Тестовый текст"), ("group", &group_id)],
        Some(("small.gif", SMALL_GIF)),
    );
    let req = test::TestRequest::post()
        .uri("/create/")
        .cookie(session(&state, &author))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/auth/");

    let posts = state.repos.posts.list(PostFilter::All, 0, 10).await.unwrap();
    assert_eq!(posts.len(), 1);
    let post = &posts[0];
    assert_eq!(post.text, "Тестовый текст");
    assert_eq!(post.author_id, author.id);
    assert_eq!(post.group_id, Some(group.id));
    assert_eq!(post.image.as_deref(), Some("posts/small.gif"));
    assert_eq!(media.get("posts/small.gif").await.as_deref(), Some(SMALL_GIF));
}

#[actix_web::test]
async fn test_invalid_post_form_is_rerendered() {
    let (state, _) = test_state();
    let author = create_user(&state, "auth").await;
    let app = app!(state);

    let (content_type, body) = multipart_body(&[("text", "   "), ("group", "")], None);
    let req = test::TestRequest::post()
        .uri("/create/")
        .cookie(session(&state, &author))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(body.contains("This field is required."));
    assert_eq!(state.repos.posts.count(PostFilter::All).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_author_edits_post_in_place() {
    let (state, _) = test_state();
    let author = create_user(&state, "auth").await;
    let group = create_group(&state, "test_slug").await;
    let post = create_posts(&state, &author, None, 1).await.remove(0);
    let app = app!(state);

    let form_page = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit/", post.id))
        .cookie(session(&state, &author))
        .to_request();
    assert_eq!(test::call_service(&app, form_page).await.status(), StatusCode::OK);

    let group_id = group.id.to_string();
    let (content_type, body) =
        multipart_body(&[("text", "Новый текст"), ("group", &group_id)], None);
    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post.id))
        .cookie(session(&state, &author))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let edited = state.repos.get_post(post.id).await.unwrap();
    assert_eq!(edited.text, "Новый текст");
    assert_eq!(edited.group_id, Some(group.id));
    assert_eq!(edited.author_id, author.id);
    assert_eq!(edited.created_at, post.created_at);
    assert_eq!(state.repos.posts.count(PostFilter::All).await.unwrap(), 1);
}

#[actix_web::test]
async fn test_non_author_cannot_edit() {
    let (state, _) = test_state();
    let author = create_user(&state, "auth").await;
    let stranger = create_user(&state, "stranger").await;
    let post = create_posts(&state, &author, None, 1).await.remove(0);
    let app = app!(state);

    let (content_type, body) = multipart_body(&[("text", "Взлом")], None);
    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit/", post.id))
        .cookie(session(&state, &stranger))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));
    assert_eq!(state.repos.get_post(post.id).await.unwrap(), post);

    let form_page = test::TestRequest::get()
        .uri(&format!("/posts/{}/edit/", post.id))
        .cookie(session(&state, &stranger))
        .to_request();
    let resp = test::call_service(&app, form_page).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));
}

#[actix_web::test]
async fn test_comments_are_added_by_signed_in_users() {
    let (state, _) = test_state();
    let author = create_user(&state, "auth").await;
    let reader = create_user(&state, "reader").await;
    let post = create_posts(&state, &author, None, 1).await.remove(0);
    let app = app!(state);
    let comment_uri = format!("/posts/{}/comment/", post.id);

    let req = test::TestRequest::post()
        .uri(&comment_uri)
        .cookie(session(&state, &reader))
        .set_form([("text", "Тестовый коммент")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    // Blank text and a bare GET create nothing.
    let blank = test::TestRequest::post()
        .uri(&comment_uri)
        .cookie(session(&state, &reader))
        .set_form([("text", "  ")])
        .to_request();
    assert_eq!(test::call_service(&app, blank).await.status(), StatusCode::FOUND);
    let bare = test::TestRequest::get()
        .uri(&comment_uri)
        .cookie(session(&state, &reader))
        .to_request();
    assert_eq!(test::call_service(&app, bare).await.status(), StatusCode::FOUND);

    let comments = state.repos.comments.list_by_post(post.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].author_id, reader.id);
    assert_eq!(comments[0].text, "Тестовый коммент");

    let detail = test::TestRequest::get()
        .uri(&format!("/posts/{}/", post.id))
        .to_request();
    let body = String::from_utf8(test::call_and_read_body(&app, detail).await.to_vec()).unwrap();
    assert!(body.contains("Тестовый коммент"));
}

#[actix_web::test]
async fn test_follow_and_unfollow() {
    let (state, _) = test_state();
    let author = create_user(&state, "auth").await;
    let reader = create_user(&state, "reader").await;
    let app = app!(state);

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri("/profile/auth/follow/")
            .cookie(session(&state, &reader))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), "/profile/auth/");
    }
    assert!(state.repos.follows.exists(reader.id, author.id).await.unwrap());
    assert_eq!(state.repos.follows.count_following(reader.id).await.unwrap(), 1);

    let profile = test::TestRequest::get()
        .uri("/profile/auth/")
        .cookie(session(&state, &reader))
        .to_request();
    let body = String::from_utf8(test::call_and_read_body(&app, profile).await.to_vec()).unwrap();
    assert!(body.contains("/profile/auth/unfollow/"));

    let req = test::TestRequest::get()
        .uri("/profile/auth/unfollow/")
        .cookie(session(&state, &reader))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert!(!state.repos.follows.exists(reader.id, author.id).await.unwrap());
}

#[actix_web::test]
async fn test_self_follow_creates_nothing() {
    let (state, _) = test_state();
    let author = create_user(&state, "auth").await;
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/profile/auth/follow/")
        .cookie(session(&state, &author))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/profile/auth/");
    assert_eq!(state.repos.follows.count_following(author.id).await.unwrap(), 0);
}

#[actix_web::test]
async fn test_follow_feed_lists_followed_authors_only() {
    let (state, _) = test_state();
    let followed = create_user(&state, "followed").await;
    let other = create_user(&state, "other").await;
    let reader = create_user(&state, "reader").await;
    let mut followed_post = create_posts(&state, &followed, None, 1).await.remove(0);
    followed_post.text = "Пост избранного автора".to_string();
    state.repos.posts.update(followed_post).await.unwrap();
    create_posts(&state, &other, None, 2).await;
    let app = app!(state);

    let follow = test::TestRequest::get()
        .uri("/profile/followed/follow/")
        .cookie(session(&state, &reader))
        .to_request();
    test::call_service(&app, follow).await;

    let feed = test::TestRequest::get()
        .uri("/follow/")
        .cookie(session(&state, &reader))
        .to_request();
    let body = String::from_utf8(test::call_and_read_body(&app, feed).await.to_vec()).unwrap();
    assert_eq!(body.matches(POST_MARKER).count(), 1);
    assert!(body.contains("Пост избранного автора"));

    // Someone following nobody sees an empty feed.
    let feed = test::TestRequest::get()
        .uri("/follow/")
        .cookie(session(&state, &other))
        .to_request();
    let body = String::from_utf8(test::call_and_read_body(&app, feed).await.to_vec()).unwrap();
    assert_eq!(body.matches(POST_MARKER).count(), 0);
}

#[actix_web::test]
async fn test_group_feed_is_paginated() {
    let (state, _) = test_state();
    let author = create_user(&state, "auth").await;
    let group = create_group(&state, "test_slug").await;
    create_posts(&state, &author, Some(&group), 13).await;
    let app = app!(state);

    for (uri, expected) in [
        ("/group/test_slug/", 10),
        ("/group/test_slug/?page=2", 3),
        ("/group/test_slug/?page=99", 3),
        ("/group/test_slug/?page=abc", 10),
        ("/profile/auth/?page=2", 3),
        ("/?page=2", 3),
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let body = String::from_utf8(test::call_and_read_body(&app, req).await.to_vec()).unwrap();
        assert_eq!(body.matches(POST_MARKER).count(), expected, "{uri}");
    }
}

#[actix_web::test]
async fn test_index_is_served_from_cache_until_cleared() {
    let (state, _) = test_state();
    let author = create_user(&state, "auth").await;
    let post = create_posts(&state, &author, None, 1).await.remove(0);
    let app = app!(state);

    let first = test::call_and_read_body(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert!(String::from_utf8(first.to_vec()).unwrap().contains("Тестовый пост 0"));

    state.repos.delete_post(post.id).await.unwrap();
    let cached = test::call_and_read_body(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(first, cached);

    state.page_cache.clear().await.unwrap();
    let fresh = test::call_and_read_body(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_ne!(first, fresh);
    assert!(!String::from_utf8(fresh.to_vec()).unwrap().contains("Тестовый пост 0"));
}

#[actix_web::test]
async fn test_signup_login_logout() {
    let (state, _) = test_state();
    let app = app!(state);

    let signup = test::TestRequest::post()
        .uri("/auth/signup/")
        .set_form([
            ("username", "newbie"),
            ("email", "newbie@example.com"),
            ("password", "correct-horse"),
        ])
        .to_request();
    let resp = test::call_service(&app, signup).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
    assert!(resp.response().cookies().any(|c| c.name() == SESSION_COOKIE));
    let user = state.repos.get_user_by_username("newbie").await.unwrap();

    let taken = test::TestRequest::post()
        .uri("/auth/signup/")
        .set_form([
            ("username", "newbie"),
            ("email", "other@example.com"),
            ("password", "correct-horse"),
        ])
        .to_request();
    let body = String::from_utf8(test::call_and_read_body(&app, taken).await.to_vec()).unwrap();
    assert!(body.contains("already exists"));

    let wrong = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form([("username", "newbie"), ("password", "nope"), ("next", "/follow/")])
        .to_request();
    let resp = test::call_service(&app, wrong).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let login = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form([
            ("username", "newbie"),
            ("password", "correct-horse"),
            ("next", "/follow/"),
        ])
        .to_request();
    let resp = test::call_service(&app, login).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/follow/");

    let offsite = test::TestRequest::post()
        .uri("/auth/login/")
        .set_form([
            ("username", "newbie"),
            ("password", "correct-horse"),
            ("next", "//evil.example/"),
        ])
        .to_request();
    let resp = test::call_service(&app, offsite).await;
    assert_eq!(location(&resp), "/");

    let logout = test::TestRequest::get()
        .uri("/auth/logout/")
        .cookie(session(&state, &user))
        .to_request();
    let resp = test::call_service(&app, logout).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cleared = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .unwrap();
    assert_eq!(cleared.value(), "");
}

#[actix_web::test]
async fn test_profile_redirects_encode_unicode_usernames() {
    let (state, _) = test_state();
    let author = create_user(&state, "Вася").await;
    let reader = create_user(&state, "reader").await;
    let app = app!(state);
    let encoded = "/profile/%D0%92%D0%B0%D1%81%D1%8F/";

    let follow = test::TestRequest::get()
        .uri(&format!("{encoded}follow/"))
        .cookie(session(&state, &reader))
        .to_request();
    let resp = test::call_service(&app, follow).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), encoded);
    assert!(state.repos.follows.exists(reader.id, author.id).await.unwrap());

    let profile = test::TestRequest::get().uri(encoded).to_request();
    assert_eq!(test::call_service(&app, profile).await.status(), StatusCode::OK);

    let (content_type, body) = multipart_body(&[("text", "Привет")], None);
    let req = test::TestRequest::post()
        .uri("/create/")
        .cookie(session(&state, &author))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), encoded);
}

#[actix_web::test]
async fn test_image_without_usable_name_is_stored() {
    let (state, media) = test_state();
    let author = create_user(&state, "auth").await;
    let app = app!(state);

    let (content_type, body) =
        multipart_body(&[("text", "Тестовый текст")], Some(("...", SMALL_GIF)));
    let req = test::TestRequest::post()
        .uri("/create/")
        .cookie(session(&state, &author))
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    let posts = state.repos.posts.list(PostFilter::All, 0, 10).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].image.as_deref(), Some("posts/image.gif"));
    assert_eq!(media.get("posts/image.gif").await.as_deref(), Some(SMALL_GIF));
}

#[actix_web::test]
async fn test_session_of_deleted_user_is_anonymous() {
    let (state, _) = test_state();
    let ghost = create_user(&state, "ghost").await;
    let author = create_user(&state, "auth").await;
    let post = create_posts(&state, &author, None, 1).await.remove(0);
    let cookie = session(&state, &ghost);
    state.repos.delete_user(ghost.id).await.unwrap();
    let app = app!(state);

    let (content_type, body) = multipart_body(&[("text", "Призрак")], None);
    let create = test::TestRequest::post()
        .uri("/create/")
        .cookie(cookie.clone())
        .insert_header((header::CONTENT_TYPE, content_type))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, create).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=/create/");

    let comment = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", post.id))
        .cookie(cookie.clone())
        .set_form([("text", "Призрак")])
        .to_request();
    let resp = test::call_service(&app, comment).await;
    assert!(location(&resp).starts_with("/auth/login/"));

    let follow = test::TestRequest::get()
        .uri("/profile/auth/follow/")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, follow).await;
    assert!(location(&resp).starts_with("/auth/login/"));

    assert_eq!(state.repos.posts.count(PostFilter::All).await.unwrap(), 1);
    assert!(state.repos.comments.list_by_post(post.id).await.unwrap().is_empty());
    assert!(!state.repos.follows.exists(ghost.id, author.id).await.unwrap());
}
