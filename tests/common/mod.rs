#![allow(dead_code)]

use axum::body::Body;
use condodesk::app::{
    db,
    domain::{Email, HashedPassword, OrganizationId, OrganizationName, OrganizationRole, Password, UserId},
    features::onboarding,
    tenant::{self, OrgScope},
};
use condodesk::create_router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;

pub const PASSWORD: &str = "Password123";

pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

pub fn test_router(pool: SqlitePool) -> axum::Router {
    let state = condodesk::app::AppState {
        db: pool,
        mail: std::sync::Arc::new(condodesk::app::mail::ConsoleMailer),
        config: condodesk::app::config::Config::for_tests(),
    };
    create_router(state)
}

pub fn signup_form_body(email: &str, password: &str, confirm_password: &str) -> String {
    format!(
        "email={}&password={}&confirm_password={}",
        urlencoding::encode(email),
        urlencoding::encode(password),
        urlencoding::encode(confirm_password)
    )
}

pub fn login_form_body(email: &str, password: &str) -> String {
    format!(
        "email={}&password={}",
        urlencoding::encode(email),
        urlencoding::encode(password)
    )
}

pub fn extract_session_id_from_cookie(set_cookie_header: &str) -> Option<&str> {
    set_cookie_header.split(';').next()?.strip_prefix("session_id=")
}

/// `session_id=...` cookie header from a response that set one.
pub fn session_cookie_from(response: &http::Response<Body>) -> String {
    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("response should set a cookie")
        .to_str()
        .unwrap();
    let session_id = extract_session_id_from_cookie(set_cookie).unwrap();
    format!("session_id={}", session_id)
}

pub fn location(response: &http::Response<Body>) -> Option<&str> {
    response.headers().get("location").map(|v| v.to_str().unwrap())
}

pub async fn body_json(response: http::Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        panic!("expected JSON body, got: {}", String::from_utf8_lossy(&bytes))
    })
}

/// Create a verified user directly in the database (bypasses signup flow).
pub async fn create_user(pool: &SqlitePool, email: &str) -> UserId {
    let password = Password::new(PASSWORD.to_string()).unwrap();
    let user_id = UserId::new();
    let new_user = db::NewUser {
        id: user_id.clone(),
        email: Email::new(email).unwrap(),
        name: None,
        password_hash: HashedPassword::from_password(&password).unwrap(),
        verified: true,
    };
    db::users::insert(pool, &new_user).await.unwrap();
    user_id
}

/// Create an organization owned by `owner`.
pub async fn create_organization(pool: &SqlitePool, owner: &UserId, name: &str) -> OrganizationId {
    let name = OrganizationName::new(name).unwrap();
    onboarding::create_organization(pool, owner, &name, "Porto").await.unwrap()
}

pub async fn add_member(pool: &SqlitePool, organization_id: &OrganizationId, user_id: &UserId, role: OrganizationRole) {
    db::organizations::add_member(pool, organization_id, user_id, role)
        .await
        .unwrap();
}

/// Scope for direct accessor calls, obtained the same way handlers get one.
pub async fn scope_for(pool: &SqlitePool, user_id: &UserId, organization_id: &OrganizationId) -> OrgScope {
    tenant::require_org_member(pool, user_id, organization_id)
        .await
        .unwrap()
        .0
}

/// Log in through the router and return the cookie header.
pub async fn login(app: &axum::Router, email: &str) -> String {
    let request = http::Request::builder()
        .method("POST")
        .uri("/login")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(login_form_body(email, PASSWORD)))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), http::StatusCode::SEE_OTHER);
    session_cookie_from(&response)
}

pub async fn get(app: &axum::Router, uri: &str, cookie: Option<&str>) -> http::Response<Body> {
    let mut builder = http::Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    app.clone().oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
}

pub async fn post_form(app: &axum::Router, uri: &str, cookie: Option<&str>, body: &str) -> http::Response<Body> {
    let mut builder = http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    app.clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

pub async fn send_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    cookie: &str,
    body: serde_json::Value,
) -> http::Response<Body> {
    let request = http::Request::builder()
        .method(method)
        .uri(uri)
        .header("cookie", cookie)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn send_empty(app: &axum::Router, method: &str, uri: &str, cookie: &str) -> http::Response<Body> {
    let request = http::Request::builder()
        .method(method)
        .uri(uri)
        .header("cookie", cookie)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

/// Owner with one organization, logged in. Returns (owner id, org id, cookie).
pub async fn owner_session(pool: &SqlitePool, app: &axum::Router, email: &str, org_name: &str) -> (UserId, OrganizationId, String) {
    let owner = create_user(pool, email).await;
    let organization_id = create_organization(pool, &owner, org_name).await;
    let cookie = login(app, email).await;
    (owner, organization_id, cookie)
}

/// Member of `organization_id` with `role`, logged in (their only org).
pub async fn member_session(
    pool: &SqlitePool,
    app: &axum::Router,
    organization_id: &OrganizationId,
    email: &str,
    role: OrganizationRole,
) -> (UserId, String) {
    let user = create_user(pool, email).await;
    add_member(pool, organization_id, &user, role).await;
    let cookie = login(app, email).await;
    (user, cookie)
}
