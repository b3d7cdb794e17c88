//! Subscriptions between users and the personal feed.

use actix_web::{HttpResponse, web};

use blogroll_core::DomainError;
use blogroll_core::domain::Follow;
use blogroll_core::ports::PostFilter;
use blogroll_shared::dto::PageQuery;

use super::{base_context, html, post_page, profile_url, redirect};
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::templates::render;

/// GET /follow/ - posts by the authors the current user follows.
pub async fn follow_index(
    identity: Identity,
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let filter = PostFilter::FollowedBy(identity.user_id);
    let page = post_page(&state, filter, query.page.as_deref()).await?;

    let mut context = base_context(Some(&identity));
    context.insert("page", &page);
    Ok(html(render(&state.templates, "posts/follow.html", &context)?))
}

/// GET /profile/{username}/follow/
///
/// Following yourself or someone you already follow changes nothing.
pub async fn profile_follow(
    identity: Identity,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let author = state.repos.get_user_by_username(&path).await?;

    match Follow::new(identity.user_id, author.id) {
        Ok(follow) => {
            if state.repos.follows.follow(follow).await? {
                tracing::info!(user = %identity.username, author = %author.username, "Followed");
            }
        }
        Err(DomainError::SelfFollow) => {
            tracing::debug!(user = %identity.username, "Self-follow ignored");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(redirect(profile_url(&author.username)))
}

/// GET /profile/{username}/unfollow/
pub async fn profile_unfollow(
    identity: Identity,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let author = state.repos.get_user_by_username(&path).await?;

    let removed = state
        .repos
        .follows
        .unfollow(identity.user_id, author.id)
        .await?;
    if removed > 0 {
        tracing::info!(user = %identity.username, author = %author.username, "Unfollowed");
    }

    Ok(redirect(profile_url(&author.username)))
}
