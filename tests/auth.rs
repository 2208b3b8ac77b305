mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;

use common::{
    assert_internal_error, bearer, broken_users_state, counting_state, login, register, send,
    spawn_app, test_state, JWT_SECRET,
};
use taskmaster::auth::token::{encode_claims, Claims};
use taskmaster::auth::{sign_token, verify_token};

#[actix_rt::test]
async fn test_register_and_login_flow() {
    let app = spawn_app(test_state()).await;

    let token = register(&app, "alice", "correct horse").await;
    assert!(!token.is_empty());
    let registered_id = verify_token(&token, JWT_SECRET).unwrap();

    let token = login(&app, "alice", "correct horse").await;
    assert_eq!(verify_token(&token, JWT_SECRET).unwrap(), registered_id);

    let req = test::TestRequest::get()
        .uri("/user")
        .insert_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "status": 200,
            "data": { "id": registered_id, "username": "alice" }
        })
    );
}

#[actix_rt::test]
async fn test_duplicate_username_is_rejected() {
    let (state, store) = counting_state();
    let app = spawn_app(state).await;

    register(&app, "alice", "correct horse").await;

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({ "username": "alice", "password": "another password" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "success": false, "status": 400, "message": "Username already exists" })
    );

    // the first password still works, so no second alice was stored
    login(&app, "alice", "correct horse").await;
    assert_eq!(store.writes(), 2);
}

#[actix_rt::test]
async fn test_short_password_fails_before_store_access() {
    let (state, store) = counting_state();
    let app = spawn_app(state).await;

    for uri in ["/register", "/login"] {
        let req = test::TestRequest::post()
            .uri(uri)
            .set_json(json!({ "username": "bob", "password": "short" }))
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(
            body["data"],
            json!([{ "field": "password", "errors": ["password must be at least 8 characters"] }])
        );
    }

    assert_eq!(store.calls(), 0);
}

#[actix_rt::test]
async fn test_malformed_body_is_bad_request() {
    let app = spawn_app(test_state()).await;

    let req = test::TestRequest::post()
        .uri("/register")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "success": false, "status": 400, "message": "Bad Request" })
    );

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({ "username": "carol", "password": "long enough", "admin": true }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn test_login_failures() {
    let app = spawn_app(test_state()).await;
    register(&app, "alice", "correct horse").await;

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "username": "nobody", "password": "correct horse" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "username": "alice", "password": "wrong horse" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({ "success": false, "status": 401, "message": "Unauthorized" })
    );
}

#[actix_rt::test]
async fn test_protected_routes_reject_bad_tokens() {
    let app = spawn_app(test_state()).await;
    let token = register(&app, "alice", "correct horse").await;
    let user_id = verify_token(&token, JWT_SECRET).unwrap();

    let foreign = encode_claims(&Claims::new(user_id), "some-other-secret").unwrap();
    let expired = encode_claims(
        &Claims::issued_at(user_id, Utc::now() - Duration::hours(48)),
        JWT_SECRET,
    )
    .unwrap();

    let routes = [
        ("GET", "/user"),
        ("GET", "/tasks"),
        ("POST", "/tasks"),
        ("GET", "/tasks/1"),
        ("PATCH", "/tasks/1"),
        ("DELETE", "/tasks/1"),
    ];

    for (method, uri) in routes {
        for header in [
            None,
            Some(format!("Bearer {}", foreign)),
            Some(format!("Bearer {}", expired)),
            Some(format!("Token {}", token)),
            Some("Bearer not-a-jwt".to_string()),
        ] {
            let mut req = test::TestRequest::default()
                .method(method.parse().unwrap())
                .uri(uri)
                .set_json(json!({ "title": "t", "body": "b" }));
            if let Some(value) = &header {
                req = req.insert_header(("authorization", value.as_str()));
            }
            let (status, body) = send(&app, req.to_request()).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {} with {:?}", method, uri, header);
            assert_eq!(body["message"], "Unauthorized");
        }
    }
}

#[actix_rt::test]
async fn test_health_and_unknown_routes() {
    let app = spawn_app(test_state()).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");

    let req = test::TestRequest::get().uri("/does-not-exist").to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not Found");
}

#[actix_rt::test]
async fn test_token_for_missing_user_is_unauthorized() {
    let app = spawn_app(test_state()).await;
    let token = sign_token(42, JWT_SECRET).unwrap();

    for uri in ["/user", "/tasks"] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(bearer(&token))
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
        assert_eq!(
            body,
            json!({ "success": false, "status": 401, "message": "Unauthorized" })
        );
    }
}

#[actix_rt::test]
async fn test_user_store_failures_are_internal_errors() {
    let app = spawn_app(broken_users_state()).await;

    for uri in ["/register", "/login"] {
        let req = test::TestRequest::post()
            .uri(uri)
            .set_json(json!({ "username": "alice", "password": "correct horse" }))
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_internal_error(status, &body);
    }

    // a perfectly valid token, but the user lookup in Authenticate fails
    let token = sign_token(1, JWT_SECRET).unwrap();
    for uri in ["/user", "/tasks"] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header(bearer(&token))
            .to_request();
        let (status, body) = send(&app, req).await;
        assert_internal_error(status, &body);
    }
}

#[actix_rt::test]
async fn test_trailing_slashes_are_ignored() {
    let app = spawn_app(test_state()).await;
    let token = register(&app, "alice", "correct horse").await;

    let req = test::TestRequest::get()
        .uri("/user/")
        .insert_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "alice");

    let req = test::TestRequest::get().uri("/health/").to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
}
