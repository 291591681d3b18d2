// SPDX-License-Identifier: MIT

//! HTML page routes.
//!
//! Markup here is intentionally minimal: the dashboard frontend proper lives
//! elsewhere, these pages carry the aggregated data and the access-control
//! behavior that matters.

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Extension,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::middleware::auth::{removal_cookie, resolve_identity, TOKEN_COOKIE};
use crate::models::{AggregatedBin, Identity, LocalIdentity};
use crate::routes::auth::login_page;
use crate::AppState;

/// Wrap a page body in the shared shell.
pub fn render_page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html><html><head><title>{title} - Binwatch</title></head>\
         <body><h1>{title}</h1>{body}</body></html>"
    ))
}

/// Root-path disambiguation policy:
/// 1. valid credential cookie: redirect by role;
/// 2. credential that fails verification: treated as absent, cookie cleared;
/// 3. active federated session: render the landing page;
/// 4. otherwise: render the login page with any queued flash message.
pub async fn root(State(state): State<Arc<AppState>>, jar: CookieJar) -> Response {
    let resolved = resolve_identity(&jar, &state);

    let response = match resolved.identity {
        Identity::Local(local) => Redirect::to(local.role.home_path()).into_response(),
        Identity::Federated(profile) => render_page(
            "Welcome",
            &format!(
                "<p>Signed in as {}.</p><p><a href=\"/logout\">Log out</a></p>",
                profile.display_name
            ),
        )
        .into_response(),
        Identity::Anonymous => login_page(jar.clone()).await,
    };

    // A dead credential cookie gets cleared whichever branch rendered, so a
    // federated visitor is not left carrying an unverifiable token.
    if resolved.stale_credential {
        (jar.remove(removal_cookie(TOKEN_COOKIE)), response).into_response()
    } else {
        response
    }
}

/// Fetch the aggregated bin list, or `None` for a degraded render.
async fn load_bins(state: &AppState) -> Option<Vec<AggregatedBin>> {
    match state.predictor.list(&state.status).await {
        Ok(bins) => Some(bins),
        Err(e) => {
            tracing::error!(error = %e, "Degraded page render: bin data unavailable");
            None
        }
    }
}

fn bin_table(bins: &[AggregatedBin]) -> String {
    let rows: String = bins
        .iter()
        .map(|bin| {
            format!(
                "<tr><td>{}</td><td>{:.0}%</td><td>{}</td><td>{}</td></tr>",
                bin.bin_id,
                bin.predicted_fill,
                serde_json::to_value(bin.status)
                    .ok()
                    .and_then(|v| v.as_str().map(String::from))
                    .unwrap_or_default(),
                if bin.collected { "collected" } else { "-" }
            )
        })
        .collect();
    format!(
        "<table><tr><th>Bin</th><th>Fill</th><th>Status</th><th></th></tr>{rows}</table>"
    )
}

/// Render a bin listing page, showing a visible error with an empty bin set
/// when the prediction service is down. Never a partial or stale view.
fn bin_page(title: &str, user: &LocalIdentity, bins: Option<Vec<AggregatedBin>>) -> Html<String> {
    let body = match bins {
        Some(bins) => format!(
            "<p>Logged in as {} ({})</p>{}",
            user.username,
            user.role,
            bin_table(&bins)
        ),
        None => format!(
            "<p>Logged in as {} ({})</p>\
             <p class=\"error\">Failed to load bin data</p>{}",
            user.username,
            user.role,
            bin_table(&[])
        ),
    };
    render_page(title, &body)
}

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<LocalIdentity>,
) -> Html<String> {
    bin_page("Dashboard", &user, load_bins(&state).await)
}

pub async fn map(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<LocalIdentity>,
) -> Html<String> {
    bin_page("Bin Map", &user, load_bins(&state).await)
}

/// Only bins needing attention (critical or full) appear on the report,
/// alert, and route pages.
fn attention_only(bins: Option<Vec<AggregatedBin>>) -> Option<Vec<AggregatedBin>> {
    bins.map(|bins| {
        bins.into_iter()
            .filter(|bin| bin.status.needs_attention())
            .collect()
    })
}

pub async fn reports(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<LocalIdentity>,
) -> Html<String> {
    bin_page("Reports", &user, attention_only(load_bins(&state).await))
}

pub async fn alerts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<LocalIdentity>,
) -> Html<String> {
    bin_page("Alerts", &user, attention_only(load_bins(&state).await))
}

pub async fn alert(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<LocalIdentity>,
) -> Html<String> {
    bin_page("Alerts", &user, attention_only(load_bins(&state).await))
}

pub async fn collection_routes(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<LocalIdentity>,
) -> Html<String> {
    bin_page(
        "Collection Routes",
        &user,
        attention_only(load_bins(&state).await),
    )
}
