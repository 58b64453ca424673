use crate::helpers::{app::TEST_JWT_SECRET, app::token_for, make_test_app};
use api::auth::Claims;
use jsonwebtoken::{EncodingKey, Header, encode};

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = make_test_app().await;

    let (status, json) = app.get("/api/attendance/me", None).await;

    assert_eq!(status, 401);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Authentication required");
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let app = make_test_app().await;
    let claims = Claims { sub: 1, exp: 1_000, admin: true };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap();

    let (status, _) = app.get("/api/admin/attendance/logs", Some(&token)).await;

    assert_eq!(status, 401);
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
    let app = make_test_app().await;
    let claims = Claims { sub: 1, exp: (chrono::Utc::now().timestamp() + 3600) as usize, admin: true };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"not-the-secret"),
    )
    .unwrap();

    let (status, _) = app.get("/api/admin/attendance/logs", Some(&token)).await;

    assert_eq!(status, 401);
}

#[tokio::test]
async fn students_cannot_reach_admin_routes() {
    let app = make_test_app().await;
    let student = app.student("Nok", 9).await;

    let (status, json) = app
        .get("/api/admin/attendance/today?cohort=9", Some(&token_for(&student)))
        .await;

    assert_eq!(status, 403);
    assert_eq!(json["message"], "Admin access required");
}

#[tokio::test]
async fn admins_can_use_student_routes() {
    let app = make_test_app().await;
    let admin = app.admin().await;

    let (status, _) = app.get("/api/attendance/me", Some(&token_for(&admin))).await;

    assert_eq!(status, 200);
}
