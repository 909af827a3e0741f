use chrono::{Duration as ChronoDuration, Utc};
use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(jwt_secret: &str) -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = skillbridge_api::app::build_app(jwt_secret.to_string()).await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn signup(
    client: &reqwest::Client,
    base_url: &str,
    name: &str,
    email: &str,
) -> (String, serde_json::Value) {
    let res = client
        .post(format!("{}/api/auth/register", base_url))
        .json(&json!({
            "name": name,
            "email": email,
            "password": "Abcd1234!",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    (
        body["token"].as_str().unwrap().to_string(),
        body["user"].clone(),
    )
}

async fn create_event(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    title: &str,
    max_attendees: u32,
) -> serde_json::Value {
    let res = client
        .post(format!("{}/api/events", base_url))
        .bearer_auth(token)
        .json(&json!({
            "title": title,
            "description": "hands-on session",
            "date": (Utc::now() + ChronoDuration::days(7)).to_rfc3339(),
            "type": "workshop",
            "max_attendees": max_attendees,
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    body["event"].clone()
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn("test-secret").await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/api/auth/verify", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(format!("{}/api/events", srv.base_url))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/api/auth/verify", srv.base_url))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_login_verify_roundtrip() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let (token, user) = signup(&client, &srv.base_url, "Alice", "alice@example.com").await;
    assert_eq!(user["email"], "alice@example.com");
    assert!(user.get("password").is_none());
    assert!(user.get("password_hash").is_none());

    // The registration token is immediately usable.
    let res = client
        .get(format!("{}/api/auth/verify", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["user"]["id"], user["id"]);

    // Fresh login with the same credentials.
    let res = client
        .post(format!("{}/api/auth/login", srv.base_url))
        .json(&json!({ "email": "ALICE@example.com ", "password": "Abcd1234!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body.get("token").is_some());
    assert!(body["user"].get("password_hash").is_none());

    // Wrong password is a 401 without detail.
    let res = client
        .post(format!("{}/api/auth/login", srv.base_url))
        .json(&json!({ "email": "alice@example.com", "password": "WrongPass1!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_registration_rejected_with_bad_request() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    signup(&client, &srv.base_url, "Alice", "alice@example.com").await;

    let res = client
        .post(format!("{}/api/auth/register", srv.base_url))
        .json(&json!({
            "name": "Other Alice",
            "email": "Alice@Example.com",
            "password": "Abcd1234!",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "duplicate_email");
}

#[tokio::test]
async fn event_lifecycle_create_get_update_delete() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let (host_token, host) = signup(&client, &srv.base_url, "Host", "host@example.com").await;
    let (other_token, _) = signup(&client, &srv.base_url, "Other", "other@example.com").await;

    let event = create_event(&client, &srv.base_url, &host_token, "Pottery basics", 10).await;
    let id = event["id"].as_str().unwrap();
    assert_eq!(event["type"], "workshop");
    assert_eq!(event["location"], "Online");
    assert_eq!(event["price"], 0.0);
    assert_eq!(event["host"]["id"], host["id"]);
    assert!(event["host"].get("password_hash").is_none());

    // Public read, no token required.
    let res = client
        .get(format!("{}/api/events/{}", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Non-host cannot update or delete.
    let res = client
        .put(format!("{}/api/events/{}", srv.base_url, id))
        .bearer_auth(&other_token)
        .json(&json!({ "title": "Hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = client
        .delete(format!("{}/api/events/{}", srv.base_url, id))
        .bearer_auth(&other_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Host updates, then deletes.
    let res = client
        .put(format!("{}/api/events/{}", srv.base_url, id))
        .bearer_auth(&host_token)
        .json(&json!({ "title": "Pottery for beginners", "price": 15.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["event"]["title"], "Pottery for beginners");
    assert_eq!(body["event"]["price"], 15.0);

    let res = client
        .delete(format!("{}/api/events/{}", srv.base_url, id))
        .bearer_auth(&host_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/api/events/{}", srv.base_url, id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_event_fields_are_a_validation_error() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let (token, _) = signup(&client, &srv.base_url, "Host", "host@example.com").await;

    let res = client
        .post(format!("{}/api/events", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "description": "no title" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn update_cannot_break_event_invariants() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let (token, _) = signup(&client, &srv.base_url, "Host", "host@example.com").await;
    let event = create_event(&client, &srv.base_url, &token, "Origami", 5).await;
    let id = event["id"].as_str().unwrap();

    let res = client
        .put(format!("{}/api/events/{}", srv.base_url, id))
        .bearer_auth(&token)
        .json(&json!({ "price": -50.0, "max_attendees": 0, "title": "" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    // The event is untouched.
    let res = client
        .get(format!("{}/api/events/{}", srv.base_url, id))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["event"]["title"], "Origami");
    assert_eq!(body["event"]["price"], 0.0);
    assert_eq!(body["event"]["max_attendees"], 5);
}

#[tokio::test]
async fn past_dated_event_rejected() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let (token, _) = signup(&client, &srv.base_url, "Host", "host@example.com").await;

    let res = client
        .post(format!("{}/api/events", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Yesterday's news",
            "description": "too late",
            "date": (Utc::now() - ChronoDuration::days(1)).to_rfc3339(),
            "type": "meetup",
            "max_attendees": 5,
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn capacity_is_enforced_and_cancellation_frees_the_slot() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let (host_token, _) = signup(&client, &srv.base_url, "Host", "host@example.com").await;
    let (b_token, _) = signup(&client, &srv.base_url, "Bea", "bea@example.com").await;
    let (c_token, _) = signup(&client, &srv.base_url, "Cal", "cal@example.com").await;

    let event = create_event(&client, &srv.base_url, &host_token, "Tiny workshop", 1).await;
    let id = event["id"].as_str().unwrap();

    let res = client
        .post(format!("{}/api/events/{}/register", srv.base_url, id))
        .bearer_auth(&b_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["event"]["attendee_count"], 1);
    assert_eq!(body["event"]["is_full"], true);

    // Second registration by the same user is rejected.
    let res = client
        .post(format!("{}/api/events/{}/register", srv.base_url, id))
        .bearer_auth(&b_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "already_registered");

    // Event is full for everyone else.
    let res = client
        .post(format!("{}/api/events/{}/register", srv.base_url, id))
        .bearer_auth(&c_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "event_full");

    // Cancellation frees the slot.
    let res = client
        .delete(format!("{}/api/events/{}/register", srv.base_url, id))
        .bearer_auth(&b_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .post(format!("{}/api/events/{}/register", srv.base_url, id))
        .bearer_auth(&c_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn listing_supports_filters_and_pagination() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let (token, _) = signup(&client, &srv.base_url, "Host", "host@example.com").await;

    create_event(&client, &srv.base_url, &token, "Rust workshop", 10).await;
    create_event(&client, &srv.base_url, &token, "Knitting circle", 10).await;

    let res = client
        .post(format!("{}/api/events", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Paid course",
            "description": "structured learning",
            "date": (Utc::now() + ChronoDuration::days(7)).to_rfc3339(),
            "type": "course",
            "price": 49.0,
            "max_attendees": 10,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // Unfiltered listing is public.
    let res = client
        .get(format!("{}/api/events", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 3);

    // Search is a case-insensitive substring over title and description.
    let res = client
        .get(format!("{}/api/events?search=WORKSHOP", srv.base_url))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["events"][0]["title"], "Rust workshop");

    // Price buckets.
    let res = client
        .get(format!("{}/api/events?price=paid", srv.base_url))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["events"][0]["title"], "Paid course");

    // type=all means no category filter.
    let res = client
        .get(format!("{}/api/events?type=all", srv.base_url))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["pagination"]["total"], 3);

    // Pagination echo.
    let res = client
        .get(format!("{}/api/events?page=1&limit=2", srv.base_url))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["events"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["pages"], 2);
}

#[tokio::test]
async fn dashboard_splits_hosted_and_registered() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let (host_token, _) = signup(&client, &srv.base_url, "Host", "host@example.com").await;
    let (a_token, _) = signup(&client, &srv.base_url, "Ada", "ada@example.com").await;

    let hosted = create_event(&client, &srv.base_url, &host_token, "Gardening", 10).await;
    let attended = create_event(&client, &srv.base_url, &a_token, "Baking", 10).await;

    let res = client
        .post(
            format!(
                "{}/api/events/{}/register",
                srv.base_url,
                attended["id"].as_str().unwrap()
            ),
        )
        .bearer_auth(&host_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/api/events/user/me", srv.base_url))
        .bearer_auth(&host_token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["hosted"].as_array().unwrap().len(), 1);
    assert_eq!(body["hosted"][0]["id"], hosted["id"]);
    assert_eq!(body["registered"].as_array().unwrap().len(), 1);
    assert_eq!(body["registered"][0]["id"], attended["id"]);
}

#[tokio::test]
async fn invalid_event_id_is_bad_request() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/events/not-a-uuid", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_id");
}

#[tokio::test]
async fn expired_token_rejected() {
    use jsonwebtoken::{Algorithm, EncodingKey, Header};

    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let now = Utc::now();
    let claims = skillbridge_auth::JwtClaims {
        sub: skillbridge_core::UserId::new(),
        issued_at: now - ChronoDuration::days(9),
        expires_at: now - ChronoDuration::days(2),
    };
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"test-secret"),
    )
    .expect("failed to encode jwt");

    let res = client
        .get(format!("{}/api/auth/verify", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_and_welcome_are_public() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(format!("{}/", srv.base_url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
