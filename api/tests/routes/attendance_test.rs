use crate::helpers::{app::token_for, make_test_app};
use serde_json::{Value, json};

async fn generate(app: &crate::helpers::TestApp, admin_token: &str, cohort: i32, session: &str) -> String {
    let (status, json) = app
        .post(
            "/api/admin/attendance/generate-code",
            admin_token,
            json!({ "cohort": cohort, "session": session }),
        )
        .await;
    assert_eq!(status, 200, "{json}");
    json["data"]["code"].as_str().unwrap().to_owned()
}

#[tokio::test]
async fn submit_then_duplicate_then_admin_override() {
    let app = make_test_app().await;
    let admin = token_for(&app.admin().await);
    let student = app.student("Nok", 9).await;
    let student_token = token_for(&student);

    let code = generate(&app, &admin, 9, "morning").await;
    assert!(code.starts_with("MORNING-"));

    app.set_local_time(9, 12);
    let (status, json) = app
        .post("/api/attendance/submit", &student_token, json!({ "code": code, "cohort": 9 }))
        .await;
    assert_eq!(status, 200, "{json}");
    assert_eq!(json["data"]["status"], "present");
    assert_eq!(json["data"]["marked_by"], "self");
    assert_eq!(json["data"]["date"], "2025-03-10");
    assert_eq!(json["data"]["ip_address"], "198.51.100.9");
    assert_eq!(json["data"]["submitted_at"], "2025-03-10T09:12:00+07:00");

    let (status, json) = app
        .post("/api/attendance/submit", &student_token, json!({ "code": code, "cohort": 9 }))
        .await;
    assert_eq!(status, 409);
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Attendance already submitted for this session");

    let (status, json) = app
        .post(
            "/api/admin/attendance/manual",
            &admin,
            json!({ "user_id": student.id, "date": "2025-03-10", "session": "morning", "status": "late" }),
        )
        .await;
    assert_eq!(status, 200, "{json}");
    assert_eq!(json["data"]["status"], "late");
    assert_eq!(json["data"]["marked_by"], "admin");
}

#[tokio::test]
async fn expired_code_answers_gone() {
    let app = make_test_app().await;
    let admin = token_for(&app.admin().await);
    let student = token_for(&app.student("Ploy", 9).await);
    let code = generate(&app, &admin, 9, "morning").await;

    app.clock.advance(chrono::Duration::minutes(121));
    let (status, json) = app
        .post("/api/attendance/submit", &student, json!({ "code": code, "cohort": 9 }))
        .await;

    assert_eq!(status, 410);
    assert_eq!(json["message"], "Attendance code has expired");
}

#[tokio::test]
async fn code_from_another_cohort_is_rejected() {
    let app = make_test_app().await;
    let admin = token_for(&app.admin().await);
    let student = token_for(&app.student("Beam", 10).await);
    let code = generate(&app, &admin, 9, "morning").await;

    let (status, json) = app
        .post("/api/attendance/submit", &student, json!({ "code": code, "cohort": 10 }))
        .await;

    assert_eq!(status, 400);
    assert_eq!(json["message"], "This code belongs to a different cohort");
}

#[tokio::test]
async fn locked_session_refuses_submission() {
    let app = make_test_app().await;
    let admin = token_for(&app.admin().await);
    let student = token_for(&app.student("Mint", 9).await);
    let code = generate(&app, &admin, 9, "morning").await;

    let (status, json) = app
        .post(
            "/api/admin/attendance/lock",
            &admin,
            json!({ "date": "2025-03-10", "session": "morning", "locked": true }),
        )
        .await;
    assert_eq!(status, 200, "{json}");
    assert_eq!(json["data"]["cohort_number"], 0);

    let (status, _) = app
        .post("/api/attendance/submit", &student, json!({ "code": code, "cohort": 9 }))
        .await;
    assert_eq!(status, 403);
}

#[tokio::test]
async fn submit_rejects_missing_fields_and_unknown_codes() {
    let app = make_test_app().await;
    let student = token_for(&app.student("Fah", 9).await);

    let (status, json) = app
        .post("/api/attendance/submit", &student, json!({ "cohort": 9 }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(json["message"], "code is required");

    let (status, _) = app
        .post("/api/attendance/submit", &student, json!({ "code": "LUNCH-ABCD", "cohort": 9 }))
        .await;
    assert_eq!(status, 400);

    let (status, json) = app
        .post("/api/attendance/submit", &student, json!({ "code": "MORNING-ABCD", "cohort": 9 }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(json["message"], "No active attendance code for this session");
}

#[tokio::test]
async fn active_code_lookup() {
    let app = make_test_app().await;
    let admin = token_for(&app.admin().await);
    let student = token_for(&app.student("Gun", 9).await);

    let (status, _) = app.get("/api/attendance/code?cohort=9", Some(&student)).await;
    assert_eq!(status, 400);

    let (status, json) = app
        .get("/api/attendance/code?cohort=9&session=afternoon", Some(&student))
        .await;
    assert_eq!(status, 200);
    assert_eq!(json["data"], Value::Null);

    let code = generate(&app, &admin, 9, "afternoon").await;
    let (status, json) = app
        .get("/api/admin/attendance/active-code?cohort=9&session=afternoon", Some(&admin))
        .await;
    assert_eq!(status, 200);
    assert_eq!(json["data"]["code"], code.as_str());
    assert_eq!(json["data"]["expires_at"], "2025-03-10T11:05:00+07:00");
}

#[tokio::test]
async fn my_status_and_history() {
    let app = make_test_app().await;
    let admin = token_for(&app.admin().await);
    let student = app.student("Ice", 9).await;
    let token = token_for(&student);

    for (date, session, status) in [
        ("2025-03-07", "morning", "absent"),
        ("2025-03-07", "afternoon", "present"),
        ("2025-03-10", "morning", "late"),
    ] {
        let (code, _) = app
            .post(
                "/api/admin/attendance/manual",
                &admin,
                json!({ "user_id": student.id, "date": date, "session": session, "status": status }),
            )
            .await;
        assert_eq!(code, 200);
    }

    let (status, json) = app.get("/api/attendance/me", Some(&token)).await;
    assert_eq!(status, 200);
    assert_eq!(json["data"]["total_sessions"], 3);
    assert_eq!(json["data"]["absent"], 1);
    assert_eq!(json["data"]["late"], 1);
    assert_eq!(json["data"]["warning_level"], "normal");

    let (status, json) = app.get("/api/attendance/me/history?days=1", Some(&token)).await;
    assert_eq!(status, 200);
    let records = json["data"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["date"], "2025-03-10");

    let (_, json) = app.get("/api/attendance/me/history", Some(&token)).await;
    let records = json["data"].as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["date"], "2025-03-10");
    assert_eq!(records[1]["session"], "morning");
}
