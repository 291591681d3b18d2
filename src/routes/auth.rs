// SPDX-License-Identifier: MIT

//! Login, logout, and Google OAuth routes.

use axum::{
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::{
    credential_cookie, flash_cookie, removal_cookie, session_cookie, FLASH_COOKIE, SESSION_COOKIE,
    TOKEN_COOKIE,
};
use crate::routes::pages::render_page;
use crate::services::credential::issue_credential;
use crate::services::google_oauth::{sign_state, verify_state};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", get(login_page).post(login_submit))
        .route("/auth/google", get(google_start))
        .route("/auth/google/callback", get(google_callback))
        .route("/logout", get(logout))
}

/// Render the login page, consuming any queued flash message.
pub async fn login_page(jar: CookieJar) -> Response {
    let flash = jar.get(FLASH_COOKIE).map(|c| {
        urlencoding::decode(c.value())
            .map(|decoded| decoded.into_owned())
            .unwrap_or_else(|_| c.value().to_string())
    });
    let body = login_body(flash.as_deref());

    if flash.is_some() {
        (jar.remove(removal_cookie(FLASH_COOKIE)), body).into_response()
    } else {
        body.into_response()
    }
}

/// Minimal login page markup. Templating is deliberately out of scope.
pub fn login_body(flash: Option<&str>) -> Html<String> {
    let error_note = flash
        .map(|msg| format!("<p class=\"error\">{}</p>", html_escape(msg)))
        .unwrap_or_default();

    render_page(
        "Login",
        &format!(
            "{error_note}\
             <form method=\"post\" action=\"/login\">\
             <input name=\"username\" placeholder=\"Username\" required>\
             <input name=\"password\" type=\"password\" placeholder=\"Password\" required>\
             <button type=\"submit\">Log in</button>\
             </form>\
             <p><a href=\"/auth/google\">Sign in with Google</a></p>"
        ),
    )
}

#[derive(Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

/// Local login: verify the account, issue a credential cookie, and redirect
/// by role. Failures queue a flash message and land back on the login page
/// with no hint of which part was wrong.
async fn login_submit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let Some(account) = state.accounts.verify_login(&form.username, &form.password) else {
        tracing::info!(username = %form.username, "Failed login attempt");
        let jar = jar.add(flash_cookie("Invalid username or password"));
        return Ok((jar, Redirect::to("/login")).into_response());
    };

    let token = issue_credential(account, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("credential issuance failed: {}", e)))?;

    tracing::info!(username = %account.username, role = %account.role, "Login successful");

    let jar = jar.add(credential_cookie(token));
    Ok((jar, Redirect::to(account.role.home_path())).into_response())
}

/// Start the federated handshake: redirect to Google with a signed state.
async fn google_start(State(state): State<Arc<AppState>>) -> Result<Redirect> {
    let oauth_state = sign_state(&state.config.oauth_state_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("state signing failed: {}", e)))?;

    let callback_url = format!("{}/auth/google/callback", state.config.public_url);
    let auth_url = state
        .google_oauth
        .authorize_url(&callback_url, &oauth_state);

    tracing::info!("Starting Google OAuth flow");
    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Complete the federated handshake: verify state, exchange the code, fetch
/// the profile, and establish a server-side session. Any failure lands back
/// on the login page with a flash message; no session state is left behind.
async fn google_callback(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Response {
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from provider");
        return handshake_failed(jar, "Google sign-in was cancelled");
    }

    let (Some(code), Some(oauth_state)) = (params.code, params.state) else {
        return handshake_failed(jar, "Google sign-in failed");
    };

    if !verify_state(&oauth_state, &state.config.oauth_state_key) {
        return handshake_failed(jar, "Google sign-in failed");
    }

    let callback_url = format!("{}/auth/google/callback", state.config.public_url);
    let profile = match async {
        let tokens = state.google_oauth.exchange_code(&code, &callback_url).await?;
        state.google_oauth.fetch_profile(&tokens.access_token).await
    }
    .await
    {
        Ok(profile) => profile,
        Err(e) => {
            tracing::warn!(error = %e, "Federated handshake failed");
            return handshake_failed(jar, "Google sign-in failed");
        }
    };

    let session_id = match state.sessions.create(profile.clone()) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "Session creation failed");
            return handshake_failed(jar, "Google sign-in failed");
        }
    };

    tracing::info!(subject = %profile.subject_id, "Federated login successful");

    let jar = jar.add(session_cookie(session_id));
    (jar, Redirect::to("/")).into_response()
}

fn handshake_failed(jar: CookieJar, message: &str) -> Response {
    (jar.add(flash_cookie(message)), Redirect::to("/login")).into_response()
}

/// Logout: clear the credential cookie and tear down any federated session.
/// Idempotent; logging out twice is fine.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.remove(cookie.value());
    }

    let jar = jar
        .add(removal_cookie(TOKEN_COOKIE))
        .add(removal_cookie(SESSION_COOKIE));

    (jar, Redirect::to("/")).into_response()
}

/// Escape HTML-significant characters in user-influenced text.
fn html_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
