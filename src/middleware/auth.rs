// SPDX-License-Identifier: MIT

//! Access control gate.
//!
//! Every gated route resolves the caller through `resolve_identity`, which
//! checks the signed credential cookie first and the federated session
//! second. Role enforcement is a pure check over the resolved identity; it
//! never re-verifies credentials and it redirects identically whether the
//! identity is missing or merely carries the wrong role.

use crate::error::AppError;
use crate::models::{Identity, Role};
use crate::services::credential::verify_credential;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::sync::Arc;

/// Signed credential cookie (JWT).
pub const TOKEN_COOKIE: &str = "binwatch_token";
/// Opaque federated session id cookie.
pub const SESSION_COOKIE: &str = "binwatch_session";
/// One-shot flash message cookie, cleared when the login page renders.
pub const FLASH_COOKIE: &str = "binwatch_flash";

/// Outcome of identity resolution for one request.
pub struct Resolved {
    pub identity: Identity,
    /// A credential cookie was present but failed verification; the caller
    /// should clear it on the response.
    pub stale_credential: bool,
}

/// Resolve the caller's identity from the request cookies.
///
/// Precedence: valid signed credential, then active federated session, then
/// anonymous. A failed credential is treated as absent, not as an error.
pub fn resolve_identity(jar: &CookieJar, state: &AppState) -> Resolved {
    let mut stale_credential = false;

    if let Some(cookie) = jar.get(TOKEN_COOKIE) {
        match verify_credential(cookie.value(), &state.config.jwt_signing_key) {
            Ok(local) => {
                return Resolved {
                    identity: Identity::Local(local),
                    stale_credential: false,
                }
            }
            Err(e) => {
                tracing::debug!(reason = %e, "Credential cookie rejected");
                stale_credential = true;
            }
        }
    }

    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Some(profile) = state.sessions.get(cookie.value()) {
            return Resolved {
                identity: Identity::Federated(profile),
                stale_credential,
            };
        }
    }

    Resolved {
        identity: Identity::Anonymous,
        stale_credential,
    }
}

/// Middleware: admin-only pages.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    gate(&[Role::Admin], state, jar, request, next).await
}

/// Middleware: worker-only pages.
pub async fn require_worker(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    gate(&[Role::Worker], state, jar, request, next).await
}

/// Middleware: pages shared by admins and workers.
pub async fn require_staff(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    gate(&[Role::Admin, Role::Worker], state, jar, request, next).await
}

async fn gate(
    allowed: &[Role],
    state: Arc<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let resolved = resolve_identity(&jar, &state);

    // Wrong role, federated (roleless), and anonymous all produce the same
    // redirect; the variants differ only for logging.
    let failure = match resolved.identity {
        Identity::Local(local) if allowed.contains(&local.role) => {
            request.extensions_mut().insert(local);
            return next.run(request).await;
        }
        Identity::Local(_) => AppError::Forbidden,
        Identity::Federated(_) | Identity::Anonymous => AppError::Unauthenticated,
    };

    let response = failure.into_response();
    if resolved.stale_credential {
        (jar.remove(removal_cookie(TOKEN_COOKIE)), response).into_response()
    } else {
        response
    }
}

/// Build the credential cookie: HTTP-only, 24-hour lifetime to match the
/// token expiry.
pub fn credential_cookie(token: String) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(24))
        .build()
}

/// Build the federated session cookie.
pub fn session_cookie(session_id: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(24))
        .build()
}

/// Build a one-shot flash message cookie. The value is percent-encoded so
/// arbitrary message text stays a valid cookie value.
pub fn flash_cookie(message: &str) -> Cookie<'static> {
    Cookie::build((FLASH_COOKIE, urlencoding::encode(message).into_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Removal cookie with attributes matching creation.
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}
