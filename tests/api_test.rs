use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use tower::ServiceExt;

use speechai::application::ports::{
    FederatedProfile, StagingStore, TranscriptRepository, TranscriptionEngine, UserRepository,
};
use speechai::application::services::{AuthService, BillingRates, TranscriptionService};
use speechai::infrastructure::audio::{FailingTranscriptionEngine, MockTranscriptionEngine};
use speechai::infrastructure::email::NoopMailer;
use speechai::infrastructure::identity::MockIdentityProvider;
use speechai::infrastructure::persistence::{
    MemorySessionStore, MemoryTranscriptRepository, MemoryUserRepository,
};
use speechai::infrastructure::storage::MemoryStagingStore;
use speechai::presentation::config::{
    BillingSettings, ClientSettings, DatabaseSettings, EmailSettings, Environment, GoogleSettings,
    LoggingSettings, ServerSettings, SessionSettings, Settings, StorageSettings,
    TranscriptionSettings,
};
use speechai::presentation::{AppState, create_router};

const BOUNDARY: &str = "test-boundary-7f9a";

fn test_settings() -> Settings {
    Settings {
        environment: Environment::Test,
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 5000,
        },
        database: DatabaseSettings {
            url: "postgres://test".to_string(),
            max_connections: 5,
        },
        session: SessionSettings {
            cookie_name: "sid".to_string(),
            ttl_hours: 24,
        },
        client: ClientSettings {
            origin: "http://client.test".to_string(),
            dev_origin: None,
        },
        google: GoogleSettings {
            client_id: "client-id".to_string(),
            client_secret: "client-secret".to_string(),
            server_origin: "http://server.test".to_string(),
        },
        transcription: TranscriptionSettings {
            api_key: "test-key".to_string(),
            base_url: None,
            model: None,
        },
        billing: BillingSettings {
            unit_cost_per_minute: 0.006,
            fx_rate: 84.0,
            markup: 1.5,
        },
        email: EmailSettings {
            api_url: None,
            api_key: None,
            from: None,
        },
        storage: StorageSettings {
            staging_dir: "./test-uploads".to_string(),
        },
        logging: LoggingSettings { enable_json: false },
    }
}

struct TestApp {
    router: Router,
    staging: Arc<MemoryStagingStore>,
}

fn create_test_app(engine: Arc<dyn TranscriptionEngine>) -> TestApp {
    let users = Arc::new(MemoryUserRepository::new());
    let sessions = Arc::new(MemorySessionStore::new());
    let transcripts = Arc::new(MemoryTranscriptRepository::new());
    let staging = Arc::new(MemoryStagingStore::new());

    // No delivery configured and a non-production environment, so signup
    // responses carry the OTP.
    let auth_service = Arc::new(AuthService::new(
        Arc::clone(&users) as Arc<dyn UserRepository>,
        sessions,
        Arc::new(NoopMailer),
        chrono::Duration::hours(24),
        true,
    ));

    let transcription_service = Arc::new(TranscriptionService::new(
        engine,
        Arc::clone(&staging) as Arc<dyn StagingStore>,
        transcripts as Arc<dyn TranscriptRepository>,
        Box::new(|_| None),
        BillingRates::default(),
    ));

    let identity_provider = Arc::new(MockIdentityProvider::returning(FederatedProfile {
        subject: "google-sub-42".to_string(),
        email: Some("fed@x.com".to_string()),
        name: "Fed User".to_string(),
        picture: None,
    }));

    let state = AppState {
        auth_service,
        transcription_service,
        identity_provider,
        settings: test_settings(),
    };

    TestApp {
        router: create_router(state),
        staging,
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn session_cookie_from(response: &axum::response::Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|raw| raw.split(';').next())
        .find(|pair| pair.starts_with("sid=") && pair.len() > "sid=".len())
        .map(str::to_string)
}

async fn post_json(
    router: &Router,
    uri: &str,
    body: serde_json::Value,
    cookie: Option<&str>,
) -> axum::response::Response {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    router
        .clone()
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

async fn get(router: &Router, uri: &str, cookie: Option<&str>) -> axum::response::Response {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    router
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

fn multipart_upload(filename: &str, language: Option<&str>) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
             Content-Type: audio/wav\r\n\r\n",
            BOUNDARY, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"fake wav bytes");
    body.extend_from_slice(b"\r\n");
    if let Some(lang) = language {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"language\"\r\n\r\n{}\r\n",
                BOUNDARY, lang
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    (
        format!("multipart/form-data; boundary={}", BOUNDARY),
        body,
    )
}

/// Signup, verify via the echoed OTP, log in; returns the session cookie.
async fn authenticated_cookie(router: &Router, name: &str, email: &str) -> String {
    let response = post_json(
        router,
        "/auth/signup",
        serde_json::json!({"name": name, "email": email, "password": "secret1"}),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let otp = body["otp"].as_str().expect("otp echoed in test config").to_string();

    let response = post_json(
        router,
        "/auth/verify-otp",
        serde_json::json!({"email": email, "otp": otp}),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        router,
        "/auth/login",
        serde_json::json!({"email": email, "password": "secret1"}),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie_from(&response).expect("login sets the session cookie")
}

#[tokio::test]
async fn given_running_app_when_health_check_then_ok_true() {
    let app = create_test_app(Arc::new(MockTranscriptionEngine::returning("hi")));

    let response = get(&app.router, "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({"ok": true}));
}

#[tokio::test]
async fn given_no_session_when_calling_guarded_routes_then_unauthorized() {
    let app = create_test_app(Arc::new(MockTranscriptionEngine::returning("hi")));

    for uri in ["/profile", "/api/transcriptions", "/api/history"] {
        let response = get(&app.router, uri, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Unauthorized");
    }
}

#[tokio::test]
async fn given_garbage_session_cookie_when_calling_then_unauthorized_not_error() {
    let app = create_test_app(Arc::new(MockTranscriptionEngine::returning("hi")));

    let response = get(&app.router, "/profile", Some("sid={\"$oid\":\"x\"}")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn given_signup_flow_when_completed_then_login_establishes_session() {
    let app = create_test_app(Arc::new(MockTranscriptionEngine::returning("hi")));

    // Unverified login is refused distinguishably, with no cookie.
    let response = post_json(
        &app.router,
        "/auth/signup",
        serde_json::json!({"name": "Ann", "email": "ann@x.com", "password": "secret1"}),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let signup_body = body_json(response).await;
    assert_eq!(signup_body["user"]["isEmailVerified"], false);
    let otp = signup_body["otp"].as_str().unwrap().to_string();

    let response = post_json(
        &app.router,
        "/auth/login",
        serde_json::json!({"email": "ann@x.com", "password": "secret1"}),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(session_cookie_from(&response).is_none());
    let body = body_json(response).await;
    assert_eq!(body["verificationRequired"], true);

    let response = post_json(
        &app.router,
        "/auth/verify-otp",
        serde_json::json!({"email": "ann@x.com", "otp": otp}),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["user"]["isEmailVerified"], true);

    let response = post_json(
        &app.router,
        "/auth/login",
        serde_json::json!({"email": "ann@x.com", "password": "secret1"}),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie_from(&response).is_some());
}

#[tokio::test]
async fn given_existing_email_when_signing_up_again_then_conflict() {
    let app = create_test_app(Arc::new(MockTranscriptionEngine::returning("hi")));
    authenticated_cookie(&app.router, "Ann", "ann@x.com").await;

    let response = post_json(
        &app.router,
        "/auth/signup",
        serde_json::json!({"name": "Imposter", "email": "Ann@X.com", "password": "other"}),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Email already registered");
}

#[tokio::test]
async fn given_wrong_password_when_logging_in_then_unauthorized() {
    let app = create_test_app(Arc::new(MockTranscriptionEngine::returning("hi")));
    authenticated_cookie(&app.router, "Ann", "ann@x.com").await;

    let response = post_json(
        &app.router,
        "/auth/login",
        serde_json::json!({"email": "ann@x.com", "password": "wrong"}),
        None,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Invalid email or password");
}

#[tokio::test]
async fn given_session_when_queried_repeatedly_then_same_identity() {
    let app = create_test_app(Arc::new(MockTranscriptionEngine::returning("hi")));
    let cookie = authenticated_cookie(&app.router, "Ann", "ann@x.com").await;

    let first = body_json(get(&app.router, "/auth/session", Some(&cookie)).await).await;
    let second = body_json(get(&app.router, "/auth/session", Some(&cookie)).await).await;

    assert_eq!(first["user"]["id"], second["user"]["id"]);
    assert_eq!(first["user"]["email"], "ann@x.com");

    // Without a cookie the same endpoint reports null, still 200.
    let anonymous = get(&app.router, "/auth/session", None).await;
    assert_eq!(anonymous.status(), StatusCode::OK);
    assert_eq!(body_json(anonymous).await["user"], serde_json::Value::Null);
}

#[tokio::test]
async fn given_logout_when_repeated_then_ok_and_session_gone() {
    let app = create_test_app(Arc::new(MockTranscriptionEngine::returning("hi")));
    let cookie = authenticated_cookie(&app.router, "Ann", "ann@x.com").await;

    let response = post_json(&app.router, "/auth/logout", serde_json::json!({}), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(&app.router, "/auth/logout", serde_json::json!({}), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let session = body_json(get(&app.router, "/auth/session", Some(&cookie)).await).await;
    assert_eq!(session["user"], serde_json::Value::Null);
}

#[tokio::test]
async fn given_upload_when_ingesting_then_created_with_minimum_billing() {
    let app = create_test_app(Arc::new(MockTranscriptionEngine::returning("hello there")));
    let cookie = authenticated_cookie(&app.router, "Ann", "ann@x.com").await;

    let (content_type, body) = multipart_upload("note.wav", None);
    let request = Request::builder()
        .method("POST")
        .uri("/api/transcriptions")
        .header(header::CONTENT_TYPE, content_type)
        .header(header::COOKIE, &cookie)
        .body(Body::from(body))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["text"], "hello there");
    // Unreadable bytes probe to zero seconds; one minute still bills.
    assert_eq!(body["duration"], 1);
    assert_eq!(body["cost"], 0.76);
    assert!(body["createdAt"].is_string());
    assert_eq!(app.staging.staged_count(), 0);
}

#[tokio::test]
async fn given_multipart_without_file_when_ingesting_then_bad_request() {
    let app = create_test_app(Arc::new(MockTranscriptionEngine::returning("hi")));
    let cookie = authenticated_cookie(&app.router, "Ann", "ann@x.com").await;

    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"language\"\r\n\r\nen\r\n--{b}--\r\n",
        b = BOUNDARY
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/transcriptions")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(header::COOKIE, &cookie)
        .body(Body::from(body))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "No file uploaded (field name should be 'file')."
    );
}

#[tokio::test]
async fn given_provider_failure_when_ingesting_then_500_with_detail_and_cleanup() {
    let app = create_test_app(Arc::new(FailingTranscriptionEngine));
    let cookie = authenticated_cookie(&app.router, "Ann", "ann@x.com").await;

    let (content_type, body) = multipart_upload("note.wav", None);
    let request = Request::builder()
        .method("POST")
        .uri("/api/transcriptions")
        .header(header::CONTENT_TYPE, content_type)
        .header(header::COOKIE, &cookie)
        .body(Body::from(body))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = body_json(response).await;
    assert_eq!(body["error"], "Transcription failed");
    assert!(body["detail"].is_string());
    assert_eq!(app.staging.staged_count(), 0);

    // Nothing was persisted for the failed upload.
    let listed = body_json(get(&app.router, "/api/history", Some(&cookie)).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn given_history_save_when_listing_then_newest_first_and_deletable() {
    let app = create_test_app(Arc::new(MockTranscriptionEngine::returning("hi")));
    let cookie = authenticated_cookie(&app.router, "Ann", "ann@x.com").await;

    let response = post_json(
        &app.router,
        "/api/history",
        serde_json::json!({"text": "first note"}),
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let first = body_json(response).await;
    assert_eq!(first["duration"], 0);
    assert_eq!(first["cost"], 0.0);

    let response = post_json(
        &app.router,
        "/api/history",
        serde_json::json!({"text": "second note"}),
        Some(&cookie),
    )
    .await;
    let second = body_json(response).await;

    let listed = body_json(get(&app.router, "/api/history", Some(&cookie)).await).await;
    let listed = listed.as_array().unwrap().clone();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["id"], second["id"], "newest first");

    let id = second["id"].as_str().unwrap();
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/history/{}", id))
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Deleting again reads as not found.
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/history/{}", id))
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn given_blank_history_text_when_saving_then_bad_request() {
    let app = create_test_app(Arc::new(MockTranscriptionEngine::returning("hi")));
    let cookie = authenticated_cookie(&app.router, "Ann", "ann@x.com").await;

    let response = post_json(
        &app.router,
        "/api/history",
        serde_json::json!({"text": "   "}),
        Some(&cookie),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_foreign_record_when_deleting_then_not_found_and_untouched() {
    let app = create_test_app(Arc::new(MockTranscriptionEngine::returning("hi")));
    let owner_cookie = authenticated_cookie(&app.router, "Ann", "ann@x.com").await;
    let intruder_cookie = authenticated_cookie(&app.router, "Bob", "bob@x.com").await;

    let response = post_json(
        &app.router,
        "/api/history",
        serde_json::json!({"text": "private note"}),
        Some(&owner_cookie),
    )
    .await;
    let record = body_json(response).await;
    let id = record["id"].as_str().unwrap();

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/history/{}", id))
        .header(header::COOKIE, &intruder_cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    // NotFound, never Forbidden: existence is not leaked.
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let listed = body_json(get(&app.router, "/api/history", Some(&owner_cookie)).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn given_uploads_when_viewing_profile_then_stats_aggregate() {
    let app = create_test_app(Arc::new(MockTranscriptionEngine::returning("words")));
    let cookie = authenticated_cookie(&app.router, "Ann", "ann@x.com").await;

    for _ in 0..2 {
        let (content_type, body) = multipart_upload("note.wav", None);
        let request = Request::builder()
            .method("POST")
            .uri("/api/transcriptions")
            .header(header::CONTENT_TYPE, content_type)
            .header(header::COOKIE, &cookie)
            .body(Body::from(body))
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get(&app.router, "/profile", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    assert_eq!(body["stats"]["totalTranscripts"], 2);
    assert_eq!(body["stats"]["totalDurationMinutes"], 2);
    assert_eq!(body["stats"]["thisMonthCount"], 2);
    assert!((body["stats"]["totalCost"].as_f64().unwrap() - 1.52).abs() < 1e-9);
    assert_eq!(body["recent"].as_array().unwrap().len(), 2);
    assert_eq!(body["user"]["email"], "ann@x.com");
}

#[tokio::test]
async fn given_email_of_other_user_when_updating_profile_then_conflict() {
    let app = create_test_app(Arc::new(MockTranscriptionEngine::returning("hi")));
    let ann = authenticated_cookie(&app.router, "Ann", "ann@x.com").await;
    authenticated_cookie(&app.router, "Bob", "bob@x.com").await;

    let request = Request::builder()
        .method("PUT")
        .uri("/profile")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, &ann)
        .body(Body::from(
            serde_json::json!({"email": "bob@x.com"}).to_string(),
        ))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_oauth_flow_when_callback_matches_state_then_session_established() {
    let app = create_test_app(Arc::new(MockTranscriptionEngine::returning("hi")));

    let response = get(&app.router, "/auth/google", None).await;
    assert!(response.status().is_redirection());
    let state_cookie = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|raw| raw.split(';').next())
        .find(|pair| pair.starts_with("oauth_state="))
        .map(str::to_string)
        .expect("state cookie set");
    let state_value = state_cookie.trim_start_matches("oauth_state=").to_string();

    let response = get(
        &app.router,
        &format!("/auth/google/callback?code=abc&state={}", state_value),
        Some(&state_cookie),
    )
    .await;
    assert!(response.status().is_redirection());
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert_eq!(location, "http://client.test/home");
    let cookie = session_cookie_from(&response).expect("session cookie set");

    let session = body_json(get(&app.router, "/auth/session", Some(&cookie)).await).await;
    assert_eq!(session["user"]["email"], "fed@x.com");
    assert_eq!(session["user"]["isEmailVerified"], true);
}

#[tokio::test]
async fn given_oauth_callback_with_bad_state_then_redirected_to_failure_page() {
    let app = create_test_app(Arc::new(MockTranscriptionEngine::returning("hi")));

    let response = get(
        &app.router,
        "/auth/google/callback?code=abc&state=forged",
        Some("oauth_state=expected"),
    )
    .await;

    assert!(response.status().is_redirection());
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert_eq!(location, "http://client.test/");
    assert!(session_cookie_from(&response).is_none());
}
