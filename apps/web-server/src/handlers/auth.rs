//! Sign-up, login and logout pages.

use actix_web::{HttpResponse, web};

use blogroll_core::domain::User;
use blogroll_core::error::RepoError;
use blogroll_core::validation::{FieldErrors, SignupInput, validate_signup};
use blogroll_shared::dto::{LoginRequest, NextQuery};

use super::{base_context, html};
use crate::middleware::auth::{OptionalIdentity, is_safe_next, removal_cookie, session_cookie};
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::templates::render;

const USERNAME_TAKEN: &str = "A user with that username already exists.";
const BAD_CREDENTIALS: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

fn render_signup(
    state: &AppState,
    viewer: &OptionalIdentity,
    input: &SignupInput,
    errors: &FieldErrors,
) -> AppResult<HttpResponse> {
    let mut context = base_context(viewer.0.as_ref());
    context.insert("username", &input.username);
    context.insert("email", &input.email);
    context.insert("errors", errors);
    Ok(html(render(&state.templates, "users/signup.html", &context)?))
}

fn render_login(
    state: &AppState,
    viewer: &OptionalIdentity,
    username: &str,
    next: Option<&str>,
    error: Option<&str>,
) -> AppResult<HttpResponse> {
    let mut context = base_context(viewer.0.as_ref());
    context.insert("username", username);
    context.insert("next", &next.unwrap_or_default());
    context.insert("error", &error);
    Ok(html(render(&state.templates, "users/login.html", &context)?))
}

/// Issue a session for `user` and send them to `location`.
fn signed_in(state: &AppState, user: &User, location: &str) -> AppResult<HttpResponse> {
    let token = state.tokens.generate_token(user.id, &user.username)?;
    let cookie = session_cookie(token, state.tokens.expiration_seconds());

    Ok(HttpResponse::Found()
        .cookie(cookie)
        .insert_header((actix_web::http::header::LOCATION, location.to_string()))
        .finish())
}

/// GET /auth/signup/
pub async fn signup_form(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    render_signup(&state, &viewer, &SignupInput::default(), &FieldErrors::new())
}

/// POST /auth/signup/
pub async fn signup(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    form: web::Form<SignupInput>,
) -> AppResult<HttpResponse> {
    let input = form.into_inner();

    let valid = match validate_signup(&input) {
        Ok(valid) => valid,
        Err(errors) => return render_signup(&state, &viewer, &input, &errors),
    };

    if state.repos.users.find_by_username(&valid.username).await?.is_some() {
        let mut errors = FieldErrors::new();
        errors.add("username", USERNAME_TAKEN);
        return render_signup(&state, &viewer, &valid, &errors);
    }

    let password_hash = state.passwords.hash(&valid.password)?;
    let user = User::new(valid.username.clone(), valid.email.clone(), password_hash);

    let user = match state.repos.users.create(user).await {
        Ok(user) => user,
        // Lost a race with another sign-up for the same name.
        Err(RepoError::Constraint(_)) => {
            let mut errors = FieldErrors::new();
            errors.add("username", USERNAME_TAKEN);
            return render_signup(&state, &viewer, &valid, &errors);
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %user.id, username = %user.username, "User signed up");
    signed_in(&state, &user, "/")
}

/// GET /auth/login/
pub async fn login_form(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: web::Query<NextQuery>,
) -> AppResult<HttpResponse> {
    render_login(&state, &viewer, "", query.next.as_deref(), None)
}

/// POST /auth/login/
pub async fn login(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    form: web::Form<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = form.into_inner();
    let next = req.next.as_deref().filter(|n| !n.is_empty());

    let user = state.repos.users.find_by_username(req.username.trim()).await?;
    let verified = match &user {
        Some(user) => state.passwords.verify(&req.password, &user.password_hash)?,
        None => false,
    };
    let Some(user) = user.filter(|_| verified) else {
        tracing::debug!(username = %req.username, "Login rejected");
        return render_login(&state, &viewer, &req.username, next, Some(BAD_CREDENTIALS));
    };

    let location = next.filter(|n| is_safe_next(n)).unwrap_or("/");
    tracing::info!(user_id = %user.id, "User logged in");
    signed_in(&state, &user, location)
}

/// GET /auth/logout/
pub async fn logout(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let body = render(&state.templates, "users/logged_out.html", &base_context(None))?;

    Ok(HttpResponse::Ok()
        .content_type(actix_web::http::header::ContentType::html())
        .cookie(removal_cookie())
        .body(body))
}

