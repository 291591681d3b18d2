// SPDX-License-Identifier: MIT

//! Role-gating tests for the page routes.
//!
//! These drive the real router end to end: local login via POST /login,
//! credential cookie round-trip, and the redirect behavior for missing,
//! wrong-role, and federated identities.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use binwatch::models::FederatedProfile;
use tower::ServiceExt;

mod common;

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

/// Log in through the real handler and return the credential cookie.
async fn login(app: &axum::Router, username: &str, password: &str) -> (StatusCode, Option<String>) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(format!(
                    "username={}&password={}",
                    username, password
                )))
                .unwrap(),
        )
        .await
        .unwrap();

    let cookie = common::extract_cookie(&response, "binwatch_token");
    (response.status(), cookie)
}

async fn get_with_cookie(app: &axum::Router, uri: &str, cookie: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_admin_login_reaches_dashboard_but_not_alerts() {
    let app = common::create_test_app().await;

    let (status, cookie) = login(&app.router, "admin", "123").await;
    assert!(status.is_redirection());
    let cookie = cookie.expect("login should set a credential cookie");

    // Admin page passes the gate (the page itself renders degraded since the
    // prediction service is down in tests, but the gate let us through).
    let response = get_with_cookie(&app.router, "/dashboard", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Worker-only page redirects the same admin to login.
    let response = get_with_cookie(&app.router, "/alerts", &cookie).await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_worker_login_reaches_alerts_but_not_dashboard() {
    let app = common::create_test_app().await;

    let (status, cookie) = login(&app.router, "worker1", "123").await;
    assert!(status.is_redirection());
    let cookie = cookie.unwrap();

    let response = get_with_cookie(&app.router, "/alerts", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_with_cookie(&app.router, "/dashboard", &cookie).await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_shared_pages_accept_both_roles() {
    let app = common::create_test_app().await;

    let (_, admin_cookie) = login(&app.router, "admin", "123").await;
    let (_, worker_cookie) = login(&app.router, "worker1", "123").await;

    for uri in ["/map", "/alert", "/routes"] {
        let response = get_with_cookie(&app.router, uri, admin_cookie.as_ref().unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK, "admin on {}", uri);

        let response = get_with_cookie(&app.router, uri, worker_cookie.as_ref().unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK, "worker on {}", uri);
    }
}

#[tokio::test]
async fn test_login_redirects_by_role() {
    let app = common::create_test_app().await;

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("username=admin&password=123"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(location(&response), "/dashboard");

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("username=worker1&password=123"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(location(&response), "/alerts");
}

#[tokio::test]
async fn test_bad_password_sets_flash_and_no_credential() {
    let app = common::create_test_app().await;

    let (status, cookie) = login(&app.router, "admin", "wrong").await;
    assert!(status.is_redirection());
    assert!(cookie.is_none(), "no credential for a failed login");

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("username=admin&password=wrong"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(location(&response), "/login");
    assert!(common::extract_cookie(&response, "binwatch_flash").is_some());
}

#[tokio::test]
async fn test_gated_page_without_identity_redirects() {
    let app = common::create_test_app().await;

    for uri in ["/dashboard", "/map", "/reports", "/alerts", "/alert", "/routes"] {
        let response = app
            .router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.status().is_redirection(), "{} should redirect", uri);
        assert_eq!(location(&response), "/login");
    }
}

#[tokio::test]
async fn test_stale_credential_is_cleared_on_redirect() {
    let app = common::create_test_app().await;

    let response =
        get_with_cookie(&app.router, "/dashboard", "binwatch_token=not.a.valid.jwt").await;
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/login");

    let cleared = common::set_cookie_headers(&response)
        .into_iter()
        .find(|c| c.starts_with("binwatch_token="))
        .expect("stale credential cookie should be cleared");
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_federated_session_cannot_reach_role_gated_pages() {
    let app = common::create_test_app().await;

    let session_id = app
        .state
        .sessions
        .create(FederatedProfile {
            subject_id: "g-123".to_string(),
            display_name: "Fed User".to_string(),
            email: None,
        })
        .unwrap();
    let cookie = format!("binwatch_session={}", session_id);

    // Authenticated but roleless: every gated page redirects identically.
    for uri in ["/dashboard", "/alerts", "/map"] {
        let response = get_with_cookie(&app.router, uri, &cookie).await;
        assert!(response.status().is_redirection(), "{}", uri);
        assert_eq!(location(&response), "/login");
    }
}

#[tokio::test]
async fn test_logout_clears_cookies_and_session() {
    let app = common::create_test_app().await;

    let session_id = app
        .state
        .sessions
        .create(FederatedProfile {
            subject_id: "g-123".to_string(),
            display_name: "Fed User".to_string(),
            email: None,
        })
        .unwrap();

    let response = get_with_cookie(
        &app.router,
        "/logout",
        &format!("binwatch_session={}", session_id),
    )
    .await;

    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/");
    assert!(app.state.sessions.get(&session_id).is_none());

    let cookies = common::set_cookie_headers(&response);
    assert!(cookies
        .iter()
        .any(|c| c.starts_with("binwatch_token=") && c.contains("Max-Age=0")));
    assert!(cookies
        .iter()
        .any(|c| c.starts_with("binwatch_session=") && c.contains("Max-Age=0")));

    // Logout is idempotent: repeating it on a dead session still succeeds.
    let response = get_with_cookie(
        &app.router,
        "/logout",
        &format!("binwatch_session={}", session_id),
    )
    .await;
    assert!(response.status().is_redirection());
}
