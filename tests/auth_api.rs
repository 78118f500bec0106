use actix_web::{test, web, App};
use opto_server::auth::handlers::{login, me, signup};
use opto_server::{AppState, Settings};
use serde_json::json;

async fn test_state() -> web::Data<AppState> {
    let config = Settings::new_for_test().expect("Failed to load test config");
    let state = AppState::new(config).await.expect("Failed to build app state");
    web::Data::new(state)
}

#[actix_web::test]
async fn test_signup_login_me_flow() {
    let state = test_state().await;
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .route("/api/auth/signup", web::post().to(signup))
            .route("/api/auth/login", web::post().to(login))
            .route("/api/auth/me", web::get().to(me)),
    )
    .await;

    // Signup succeeds once
    let response = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({
            "email": "alice@example.com",
            "password": "secret1",
            "name": "Alice"
        }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 201);

    let body: serde_json::Value = test::read_body_json(response).await;
    assert!(body.get("token").is_some());
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["score"], 51);
    assert_eq!(body["user"]["streak"], 0);
    assert_eq!(body["user"]["level"], 1);
    assert_eq!(body["user"]["level_name"], "Getting Started");
    // the hash never appears under any key name
    let user_keys: Vec<&String> = body["user"].as_object().unwrap().keys().collect();
    assert!(!user_keys.iter().any(|k| k.contains("password")));

    // Same email with different case is a conflict
    let response = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({
            "email": "Alice@Example.Com",
            "password": "secret2",
            "name": "Alice Again"
        }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 409);

    // Wrong password is a generic 401
    let response = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "email": "alice@example.com",
            "password": "wrongpass"
        }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 401);
    let wrong_password: serde_json::Value = test::read_body_json(response).await;

    // Unknown email fails with the exact same shape
    let response = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "email": "nobody@example.com",
            "password": "whatever1"
        }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 401);
    let unknown_email: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(wrong_password, unknown_email);

    // Correct login mints a fresh token
    let response = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "email": "alice@example.com",
            "password": "secret1"
        }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = test::read_body_json(response).await;
    let token = body["token"].as_str().unwrap().to_string();

    // The token resolves to the account
    let response = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["email"], "alice@example.com");

    // Garbage tokens and missing headers are both 401
    let response = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", "Bearer garbage"))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 401);

    let response = test::TestRequest::get()
        .uri("/api/auth/me")
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 401);
}

#[actix_web::test]
async fn test_signup_validation() {
    let state = test_state().await;
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .route("/api/auth/signup", web::post().to(signup)),
    )
    .await;

    // Missing password
    let response = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({ "email": "a@example.com", "name": "A" }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 400);

    // Password under six characters
    let response = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({ "email": "a@example.com", "password": "five5", "name": "A" }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 400);

    // Missing name
    let response = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({ "email": "a@example.com", "password": "secret1" }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 400);

    // Error envelope carries status and message
    let response = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({ "email": "", "password": "secret1", "name": "A" }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 400);
    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["error"]["status"], 400);
    assert!(body["error"]["message"].as_str().unwrap().len() > 0);
}

#[actix_web::test]
async fn test_login_validation() {
    let state = test_state().await;
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .route("/api/auth/login", web::post().to(login)),
    )
    .await;

    let response = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "a@example.com" }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 400);
}

#[actix_web::test]
async fn test_me_after_account_deletion() {
    let state = test_state().await;
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .route("/api/auth/signup", web::post().to(signup))
            .route("/api/auth/me", web::get().to(me)),
    )
    .await;

    let response = test::TestRequest::post()
        .uri("/api/auth/signup")
        .set_json(json!({
            "email": "gone@example.com",
            "password": "secret1",
            "name": "Goner"
        }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 201);
    let body: serde_json::Value = test::read_body_json(response).await;
    let token = body["token"].as_str().unwrap().to_string();
    let user_id = body["user"]["id"].as_str().unwrap().to_string();

    // The account disappears but the token is still signed and unexpired
    assert!(state.users.delete(&user_id).await.unwrap());

    let response = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 404);
}

#[actix_web::test]
async fn test_auth_attempts_are_rate_limited() {
    let state = test_state().await;
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .route("/api/auth/login", web::post().to(login)),
    )
    .await;

    // Unknown email keeps each attempt cheap; the budget is per address
    for _ in 0..10 {
        let response = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({
                "email": "hammered@example.com",
                "password": "guess123"
            }))
            .send_request(&app)
            .await;
        assert_eq!(response.status(), 401);
    }

    let response = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "email": "hammered@example.com",
            "password": "guess123"
        }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 429);

    // Other addresses are unaffected
    let response = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "email": "other@example.com",
            "password": "guess123"
        }))
        .send_request(&app)
        .await;
    assert_eq!(response.status(), 401);
}
