use crate::helpers::{app::token_for, make_test_app};
use serde_json::json;

#[tokio::test]
async fn half_day_without_session_is_rejected() {
    let app = make_test_app().await;
    let student = token_for(&app.student("Nan", 9).await);

    let (status, json) = app
        .post(
            "/api/leave-requests",
            &student,
            json!({ "leave_type": "half_day", "date": "2025-03-12", "reason": "Dentist" }),
        )
        .await;

    assert_eq!(status, 400);
    assert_eq!(json["message"], "Session is required for a half-day leave");
}

#[tokio::test]
async fn approving_full_day_excuses_both_sessions() {
    let app = make_test_app().await;
    let admin = token_for(&app.admin().await);
    let student = app.student("Oat", 9).await;
    let token = token_for(&student);

    let (status, json) = app
        .post(
            "/api/leave-requests",
            &token,
            json!({ "leave_type": "full_day", "date": "2025-03-12", "reason": "Family" }),
        )
        .await;
    assert_eq!(status, 201, "{json}");
    assert_eq!(json["data"]["status"], "pending");
    let id = json["data"]["id"].as_i64().unwrap();

    let (_, json) = app.get("/api/leave-requests/me", Some(&token)).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let (status, json) = app
        .put(
            &format!("/api/admin/leave-requests/{id}"),
            &admin,
            json!({ "status": "approved", "review_notes": "ok" }),
        )
        .await;
    assert_eq!(status, 200, "{json}");
    assert_eq!(json["data"]["request"]["status"], "approved");
    assert_eq!(json["data"]["request"]["review_notes"], "ok");
    let marked = json["data"]["marked"].as_array().unwrap();
    assert_eq!(marked.len(), 2);
    assert!(marked.iter().all(|r| r["status"] == "absent_excused"));
    assert_eq!(json["data"]["failures"].as_array().unwrap().len(), 0);

    let (status, json) = app
        .put(
            &format!("/api/admin/leave-requests/{id}"),
            &admin,
            json!({ "status": "rejected" }),
        )
        .await;
    assert_eq!(status, 409);
    assert_eq!(json["message"], "Leave request already processed");
}

#[tokio::test]
async fn rejection_writes_no_attendance() {
    let app = make_test_app().await;
    let admin = token_for(&app.admin().await);
    let student = app.student("Pun", 9).await;

    let (_, json) = app
        .post(
            "/api/leave-requests",
            &token_for(&student),
            json!({ "leave_type": "late", "session": "morning", "date": "2025-03-12", "reason": "Bus" }),
        )
        .await;
    let id = json["data"]["id"].as_i64().unwrap();

    let (status, json) = app
        .put(&format!("/api/admin/leave-requests/{id}"), &admin, json!({ "status": "rejected" }))
        .await;
    assert_eq!(status, 200);
    assert_eq!(json["message"], "Leave request rejected");
    assert_eq!(json["data"]["marked"].as_array().unwrap().len(), 0);

    let (_, json) = app.get("/api/admin/attendance/logs", Some(&admin)).await;
    assert_eq!(json["data"]["total"], 0);
}

#[tokio::test]
async fn review_validates_status_and_id() {
    let app = make_test_app().await;
    let admin = token_for(&app.admin().await);

    let (status, _) = app
        .put("/api/admin/leave-requests/77", &admin, json!({ "status": "approved" }))
        .await;
    assert_eq!(status, 404);

    let (status, _) = app
        .put("/api/admin/leave-requests/77", &admin, json!({ "status": "maybe" }))
        .await;
    assert_eq!(status, 400);

    let (status, _) = app
        .put("/api/admin/leave-requests/77", &admin, json!({ "status": "pending" }))
        .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn admin_manual_entry_is_approved_and_reconciled() {
    let app = make_test_app().await;
    let admin = token_for(&app.admin().await);
    let student = app.student("Rin", 9).await;

    let (status, json) = app
        .post(
            "/api/admin/leave-requests",
            &admin,
            json!({
                "user_id": student.id,
                "leave_type": "half_day",
                "session": "afternoon",
                "date": "2025-03-10",
                "reason": "Clinic"
            }),
        )
        .await;
    assert_eq!(status, 201, "{json}");
    assert_eq!(json["data"]["request"]["status"], "approved");
    assert_eq!(json["data"]["request"]["is_manual_entry"], true);
    let marked = json["data"]["marked"].as_array().unwrap();
    assert_eq!(marked.len(), 1);
    assert_eq!(marked[0]["session"], "afternoon");
    assert_eq!(marked[0]["status"], "absent_excused");

    let (status, json) = app
        .post(
            "/api/admin/leave-requests",
            &admin,
            json!({ "leave_type": "full_day", "date": "2025-03-10", "reason": "Clinic" }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(json["message"], "user_id is required");

    let (status, json) = app
        .get("/api/admin/leave-requests?cohort=9&status=approved", Some(&admin))
        .await;
    assert_eq!(status, 200);
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let (_, json) = app
        .get("/api/admin/leave-requests?cohort=10", Some(&admin))
        .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 0);
}
