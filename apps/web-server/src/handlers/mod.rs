//! HTTP handlers and route configuration.

mod auth;
mod follow;
mod health;
mod posts;

#[cfg(test)]
mod tests;

use std::collections::{HashMap, HashSet};

use actix_web::http::header::{self, ContentType};
use actix_web::{HttpResponse, web};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tera::Context;
use uuid::Uuid;

use blogroll_core::domain::Post;
use blogroll_core::ports::PostFilter;
use blogroll_core::{Page, Paginator};
use blogroll_shared::{GroupLink, PostCard};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(posts::index))
        .route("/health", web::get().to(health::health_check))
        .route("/group/{slug}/", web::get().to(posts::group_posts))
        .route("/profile/{username}/", web::get().to(posts::profile))
        .route("/profile/{username}/follow/", web::get().to(follow::profile_follow))
        .route("/profile/{username}/unfollow/", web::get().to(follow::profile_unfollow))
        .route("/follow/", web::get().to(follow::follow_index))
        .service(
            web::resource("/create/")
                .route(web::get().to(posts::create_form))
                .route(web::post().to(posts::create_post)),
        )
        .route("/posts/{id}/", web::get().to(posts::post_detail))
        .service(
            web::resource("/posts/{id}/edit/")
                .route(web::get().to(posts::edit_form))
                .route(web::post().to(posts::edit_post)),
        )
        .service(
            web::resource("/posts/{id}/comment/")
                .route(web::get().to(posts::add_comment))
                .route(web::post().to(posts::add_comment)),
        )
        .service(
            web::scope("/auth")
                .service(
                    web::resource("/signup/")
                        .route(web::get().to(auth::signup_form))
                        .route(web::post().to(auth::signup)),
                )
                .service(
                    web::resource("/login/")
                        .route(web::get().to(auth::login_form))
                        .route(web::post().to(auth::login)),
                )
                .route("/logout/", web::get().to(auth::logout)),
        )
        .default_service(web::to(not_found));
}

/// Fallback for unmatched routes.
pub async fn not_found() -> AppResult<HttpResponse> {
    Err(AppError::NotFound("No route matched".to_string()))
}

/// Context shared by every page: the signed-in user for the navigation bar.
fn base_context(viewer: Option<&Identity>) -> Context {
    let mut context = Context::new();
    context.insert("viewer", &viewer.map(|v| v.username.as_str()));
    context
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body)
}

fn redirect(location: impl Into<String>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.into()))
        .finish()
}

/// ASCII left as-is in a path segment: unreserved characters plus `@` and `+`.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'@')
    .remove(b'+');

fn profile_url(username: &str) -> String {
    format!("/profile/{}/", utf8_percent_encode(username, PATH_SEGMENT))
}

fn post_url(post_id: Uuid) -> String {
    format!("/posts/{post_id}/")
}

/// Path ids that do not parse can never match a post.
fn parse_post_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("Post {raw} not found")))
}

/// One page of `filter`, newest first, ready for rendering.
async fn post_page(
    state: &AppState,
    filter: PostFilter,
    raw_page: Option<&str>,
) -> AppResult<Page<PostCard>> {
    let count = state.repos.posts.count(filter).await?;
    let paginator = Paginator::new(count, state.posts_per_page);
    let window = paginator.get_page(raw_page);

    let posts = state
        .repos
        .posts
        .list(filter, window.offset, window.limit)
        .await?;
    let cards = post_cards(state, posts).await?;

    Ok(Page::new(cards, window, &paginator))
}

/// Resolve authors, groups and image URLs for a batch of posts.
async fn post_cards(state: &AppState, posts: Vec<Post>) -> AppResult<Vec<PostCard>> {
    let author_ids: Vec<Uuid> = posts
        .iter()
        .map(|p| p.author_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let group_ids: Vec<Uuid> = posts
        .iter()
        .filter_map(|p| p.group_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let authors: HashMap<Uuid, String> = state
        .repos
        .users
        .find_by_ids(&author_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();
    let groups: HashMap<Uuid, GroupLink> = state
        .repos
        .groups
        .find_by_ids(&group_ids)
        .await?
        .into_iter()
        .map(|g| {
            (
                g.id,
                GroupLink {
                    title: g.title,
                    slug: g.slug,
                },
            )
        })
        .collect();

    Ok(posts
        .into_iter()
        .map(|post| PostCard {
            id: post.id.to_string(),
            author: authors.get(&post.author_id).cloned().unwrap_or_default(),
            group: post.group_id.and_then(|id| groups.get(&id).cloned()),
            image_url: post.image.as_deref().map(|path| state.media.url(path)),
            text: post.text,
            created_at: post.created_at,
        })
        .collect())
}
