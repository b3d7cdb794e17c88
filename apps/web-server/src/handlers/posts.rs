//! Feeds, post detail, post create/edit and comments.

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use actix_web::{HttpRequest, HttpResponse, web};
use serde::Serialize;

use blogroll_core::domain::{Comment, Group, Post};
use blogroll_core::ports::PostFilter;
use blogroll_core::validation::{
    CommentInput, FieldErrors, ImageUpload, PostInput, validate_comment, validate_post,
};
use blogroll_shared::dto::PageQuery;
use blogroll_shared::{AuthorView, CommentView, GroupChoice};

use super::{
    base_context, html, parse_post_id, post_cards, post_page, post_url, profile_url, redirect,
};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::page_cache::PageCache;
use crate::state::AppState;
use crate::templates::render;

/// Directory images are stored under, relative to the media root.
const IMAGE_DIR: &str = "posts";

/// GET /
///
/// The rendered page is cached per URI and viewer for the configured TTL.
pub async fn index(
    req: HttpRequest,
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let key = PageCache::key(&req.uri().to_string(), viewer.user_id());
    if let Some(cached) = state.page_cache.get(&key).await {
        tracing::debug!(%key, "Index served from page cache");
        return Ok(html(cached));
    }

    let page = post_page(&state, PostFilter::All, query.page.as_deref()).await?;

    let mut context = base_context(viewer.0.as_ref());
    context.insert("page", &page);
    let body = render(&state.templates, "posts/index.html", &context)?;

    state.page_cache.store(&key, &body).await;
    Ok(html(body))
}

/// GET /group/{slug}/
pub async fn group_posts(
    path: web::Path<String>,
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let group = state.repos.get_group_by_slug(&path).await?;
    let page = post_page(&state, PostFilter::Group(group.id), query.page.as_deref()).await?;

    let mut context = base_context(viewer.0.as_ref());
    context.insert("group", &group);
    context.insert("page", &page);
    Ok(html(render(&state.templates, "posts/group_list.html", &context)?))
}

/// GET /profile/{username}/
pub async fn profile(
    path: web::Path<String>,
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let author = state.repos.get_user_by_username(&path).await?;
    let page = post_page(&state, PostFilter::Author(author.id), query.page.as_deref()).await?;

    let following = match viewer.user_id() {
        Some(user_id) if user_id != author.id => {
            state.repos.follows.exists(user_id, author.id).await?
        }
        _ => false,
    };
    let is_owner = viewer.user_id() == Some(author.id);

    let mut context = base_context(viewer.0.as_ref());
    context.insert(
        "author",
        &AuthorView {
            username: author.username,
            post_count: page.count,
        },
    );
    context.insert("following", &following);
    context.insert("is_owner", &is_owner);
    context.insert("page", &page);
    Ok(html(render(&state.templates, "posts/profile.html", &context)?))
}

/// GET /posts/{id}/
pub async fn post_detail(
    path: web::Path<String>,
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let post_id = parse_post_id(&path)?;
    let post = state.repos.get_post(post_id).await?;
    let author_id = post.author_id;

    let post_count = state.repos.posts.count(PostFilter::Author(author_id)).await?;
    let comments = comment_views(&state, post.id).await?;
    let card = post_cards(&state, vec![post])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal(format!("Post {post_id} vanished while rendering")))?;

    let mut context = base_context(viewer.0.as_ref());
    context.insert(
        "author",
        &AuthorView {
            username: card.author.clone(),
            post_count,
        },
    );
    context.insert("post", &card);
    context.insert("comments", &comments);
    context.insert("is_author", &(viewer.user_id() == Some(author_id)));
    Ok(html(render(&state.templates, "posts/post_detail.html", &context)?))
}

async fn comment_views(state: &AppState, post_id: uuid::Uuid) -> AppResult<Vec<CommentView>> {
    let comments = state.repos.comments.list_by_post(post_id).await?;

    let mut author_ids: Vec<_> = comments.iter().map(|c| c.author_id).collect();
    author_ids.sort();
    author_ids.dedup();
    let authors = state.repos.users.find_by_ids(&author_ids).await?;

    Ok(comments
        .into_iter()
        .map(|comment| CommentView {
            author: authors
                .iter()
                .find(|u| u.id == comment.author_id)
                .map(|u| u.username.clone())
                .unwrap_or_default(),
            text: comment.text,
            created_at: comment.created_at,
        })
        .collect())
}

/// GET|POST /posts/{id}/comment/
///
/// Always ends on the post page; an empty or invalid comment is dropped.
pub async fn add_comment(
    identity: Identity,
    path: web::Path<String>,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> AppResult<HttpResponse> {
    let post = state.repos.get_post(parse_post_id(&path)?).await?;

    let input: CommentInput = serde_urlencoded::from_bytes(&body).unwrap_or_default();
    match validate_comment(&input) {
        Ok(text) => {
            let comment = state
                .repos
                .comments
                .create(Comment::new(post.id, identity.user_id, text))
                .await?;
            tracing::info!(comment_id = %comment.id, post_id = %post.id, "Comment added");
        }
        Err(errors) => {
            tracing::debug!(post_id = %post.id, ?errors, "Comment rejected");
        }
    }

    Ok(redirect(post_url(post.id)))
}

/// Post form as submitted by the browser.
#[derive(MultipartForm)]
pub struct PostForm {
    text: Option<Text<String>>,
    group: Option<Text<String>>,
    #[multipart(limit = "10MB")]
    image: Option<TempFile>,
}

impl PostForm {
    async fn into_parts(self) -> AppResult<(PostInput, Option<ImageUpload>)> {
        let input = PostInput {
            text: self.text.map(|t| t.0).unwrap_or_default(),
            group: self.group.map(|g| g.0),
        };

        // Browsers send an empty part when no file was chosen.
        let upload = match self.image {
            Some(file) if file.size > 0 => {
                let bytes = tokio::fs::read(file.file.path())
                    .await
                    .map_err(|e| AppError::Internal(format!("Reading upload failed: {e}")))?;
                Some(ImageUpload {
                    file_name: file.file_name.unwrap_or_else(|| "image".to_string()),
                    bytes,
                })
            }
            _ => None,
        };

        Ok((input, upload))
    }
}

/// What the post form template shows in its fields.
#[derive(Debug, Default, Serialize)]
struct PostFormView {
    text: String,
    group: String,
    errors: FieldErrors,
}

impl PostFormView {
    fn from_post(post: &Post) -> Self {
        Self {
            text: post.text.clone(),
            group: post.group_id.map(|id| id.to_string()).unwrap_or_default(),
            errors: FieldErrors::new(),
        }
    }

    fn rejected(input: PostInput, errors: FieldErrors) -> Self {
        Self {
            text: input.text,
            group: input.group.unwrap_or_default(),
            errors,
        }
    }
}

fn group_choices(groups: &[Group]) -> Vec<GroupChoice> {
    groups
        .iter()
        .map(|g| GroupChoice {
            id: g.id.to_string(),
            title: g.title.clone(),
        })
        .collect()
}

fn render_post_form(
    state: &AppState,
    identity: &Identity,
    groups: &[Group],
    form: &PostFormView,
    editing: Option<&Post>,
) -> AppResult<HttpResponse> {
    let mut context = base_context(Some(identity));
    context.insert("form", form);
    context.insert("groups", &group_choices(groups));
    context.insert("is_edit", &editing.is_some());
    context.insert("post_id", &editing.map(|post| post.id.to_string()));
    context.insert(
        "image_url",
        &editing
            .and_then(|post| post.image.as_deref())
            .map(|path| state.media.url(path)),
    );
    Ok(html(render(&state.templates, "posts/create_post.html", &context)?))
}

async fn store_image(state: &AppState, image: Option<ImageUpload>) -> AppResult<Option<String>> {
    match image {
        Some(upload) => Ok(Some(
            state
                .media
                .save(IMAGE_DIR, &upload.file_name, &upload.bytes)
                .await?,
        )),
        None => Ok(None),
    }
}

/// GET /create/
pub async fn create_form(
    identity: Identity,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let groups = state.repos.groups.list_all().await?;
    render_post_form(&state, &identity, &groups, &PostFormView::default(), None)
}

/// POST /create/
pub async fn create_post(
    identity: Identity,
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<PostForm>,
) -> AppResult<HttpResponse> {
    let groups = state.repos.groups.list_all().await?;
    let (input, upload) = form.into_parts().await?;

    let valid = match validate_post(&input, upload, &groups) {
        Ok(valid) => valid,
        Err(errors) => {
            let form = PostFormView::rejected(input, errors);
            return render_post_form(&state, &identity, &groups, &form, None);
        }
    };

    let image = store_image(&state, valid.image).await?;
    let post = state
        .repos
        .posts
        .create(Post::new(identity.user_id, valid.text, valid.group_id, image))
        .await?;

    tracing::info!(post_id = %post.id, author = %identity.username, "Post created");
    Ok(redirect(profile_url(&identity.username)))
}

/// GET /posts/{id}/edit/
pub async fn edit_form(
    identity: Identity,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> AppResult<HttpResponse> {
    let post = state.repos.get_post(parse_post_id(&path)?).await?;
    if !post.is_authored_by(identity.user_id) {
        return Ok(redirect(post_url(post.id)));
    }

    let groups = state.repos.groups.list_all().await?;
    let form = PostFormView::from_post(&post);
    render_post_form(&state, &identity, &groups, &form, Some(&post))
}

/// POST /posts/{id}/edit/
///
/// Non-authors are sent back to the post page without any change.
pub async fn edit_post(
    identity: Identity,
    path: web::Path<String>,
    state: web::Data<AppState>,
    MultipartForm(form): MultipartForm<PostForm>,
) -> AppResult<HttpResponse> {
    let mut post = state.repos.get_post(parse_post_id(&path)?).await?;
    if !post.is_authored_by(identity.user_id) {
        tracing::debug!(post_id = %post.id, user = %identity.username, "Edit by non-author ignored");
        return Ok(redirect(post_url(post.id)));
    }

    let groups = state.repos.groups.list_all().await?;
    let (input, upload) = form.into_parts().await?;

    let valid = match validate_post(&input, upload, &groups) {
        Ok(valid) => valid,
        Err(errors) => {
            let form = PostFormView::rejected(input, errors);
            return render_post_form(&state, &identity, &groups, &form, Some(&post));
        }
    };

    post.text = valid.text;
    post.group_id = valid.group_id;
    if let Some(path) = store_image(&state, valid.image).await? {
        post.image = Some(path);
    }
    let post = state.repos.posts.update(post).await?;

    tracing::info!(post_id = %post.id, "Post updated");
    Ok(redirect(post_url(post.id)))
}
