//! Authentication route handlers for admin.
//!
//! Staff sign in with the shared access token; the session then carries a
//! [`CurrentAdmin`] until sign-out.

use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::AppError;
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginPageTemplate<'a> {
    error: Option<&'a str>,
}

/// Login form body.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    name: String,
    token: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_page).post(login))
        .route("/auth/logout", post(logout))
}

fn render_login(error: Option<&str>) -> Html<String> {
    Html(LoginPageTemplate { error }.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

/// Compare two tokens without short-circuiting on the first differing byte.
fn tokens_match(given: &str, expected: &str) -> bool {
    let (a, b) = (given.as_bytes(), expected.as_bytes());
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Render the login page.
///
/// GET /auth/login
async fn login_page() -> Html<String> {
    render_login(None)
}

/// Check the access token and sign in.
///
/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if !tokens_match(form.token.trim(), state.access_token().expose_secret()) {
        tracing::warn!(name = %form.name, "Rejected admin sign-in");
        return Ok((
            StatusCode::UNAUTHORIZED,
            render_login(Some("That access token is not valid.")),
        )
            .into_response());
    }

    let admin = CurrentAdmin::signed_in_now(&form.name);
    set_current_admin(&session, &admin)
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    tracing::info!(admin = %admin.name, "Admin signed in");

    Ok(Redirect::to("/orders").into_response())
}

/// Logout and clear session.
///
/// POST /auth/logout
async fn logout(session: Session) -> impl IntoResponse {
    let _ = clear_current_admin(&session).await;
    Redirect::to("/auth/login")
}
