use crate::helpers::{app::token_for, make_test_app};
use serde_json::json;

#[tokio::test]
async fn bulk_mark_skips_unknown_students() {
    let app = make_test_app().await;
    let admin = token_for(&app.admin().await);
    let a = app.student("Arm", 9).await;
    let b = app.student("Bow", 9).await;
    let c = app.student("Cake", 9).await;

    let (status, json) = app
        .post(
            "/api/admin/attendance/bulk",
            &admin,
            json!({
                "user_ids": [a.id, b.id, 999_999, c.id],
                "date": "2025-03-10",
                "session": "afternoon",
                "status": "present"
            }),
        )
        .await;

    assert_eq!(status, 200, "{json}");
    assert_eq!(json["data"]["marked_count"], 3);
    assert_eq!(json["data"]["records"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn bulk_mark_requires_user_ids() {
    let app = make_test_app().await;
    let admin = token_for(&app.admin().await);

    let body = json!({ "user_ids": [], "date": "2025-03-10", "session": "morning", "status": "present" });
    let (status, json) = app.post("/api/admin/attendance/bulk", &admin, body).await;
    assert_eq!(status, 400);
    assert_eq!(json["message"], "Request must include a non-empty list of user_ids");

    let body = json!({ "user_ids": [0, -4], "date": "2025-03-10", "session": "morning", "status": "present" });
    let (status, json) = app.post("/api/admin/attendance/bulk", &admin, body).await;
    assert_eq!(status, 400);
    assert_eq!(json["message"], "no valid user ids");
}

#[tokio::test]
async fn manual_mark_validates_input() {
    let app = make_test_app().await;
    let admin = token_for(&app.admin().await);
    let student = app.student("Dew", 9).await;

    let (status, json) = app
        .post(
            "/api/admin/attendance/manual",
            &admin,
            json!({ "user_id": student.id, "date": "2025-03-10", "session": "morning", "status": "sick" }),
        )
        .await;
    assert_eq!(status, 400);
    assert!(json["message"].as_str().unwrap().starts_with("Invalid status"));

    let (status, _) = app
        .post(
            "/api/admin/attendance/manual",
            &admin,
            json!({ "user_id": student.id, "date": "10/03/2025", "session": "morning", "status": "late" }),
        )
        .await;
    assert_eq!(status, 400);

    let (status, json) = app
        .post(
            "/api/admin/attendance/manual",
            &admin,
            json!({ "user_id": 424242, "date": "2025-03-10", "session": "morning", "status": "late" }),
        )
        .await;
    assert_eq!(status, 404);
    assert_eq!(json["message"], "Student not found");
}

#[tokio::test]
async fn delete_then_remark_restores_record() {
    let app = make_test_app().await;
    let admin = token_for(&app.admin().await);
    let student = app.student("Earth", 9).await;
    let mark = |status: &str| {
        json!({ "user_id": student.id, "date": "2025-03-10", "session": "morning", "status": status })
    };

    let (_, json) = app.post("/api/admin/attendance/manual", &admin, mark("present")).await;
    let id = json["data"]["id"].as_i64().unwrap();

    let (status, json) = app.delete(&format!("/api/admin/attendance/{id}"), &admin).await;
    assert_eq!(status, 200);
    assert_eq!(json["data"]["status"], "present");

    let (status, _) = app.delete(&format!("/api/admin/attendance/{id}"), &admin).await;
    assert_eq!(status, 404);

    let (status, json) = app.post("/api/admin/attendance/manual", &admin, mark("absent")).await;
    assert_eq!(status, 200);
    assert_eq!(json["data"]["status"], "absent");
    assert_eq!(json["data"]["deleted"], false);

    let (_, json) = app.get("/api/admin/attendance/logs?cohort=9", Some(&admin)).await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["records"][0]["status"], "absent");
}

#[tokio::test]
async fn today_overview_lists_the_whole_cohort() {
    let app = make_test_app().await;
    let admin = token_for(&app.admin().await);
    let marked = app.student("Bee", 9).await;
    app.student("Art", 9).await;
    app.student("Zed", 10).await;

    let (status, _) = app.get("/api/admin/attendance/today", Some(&admin)).await;
    assert_eq!(status, 400);

    app.post(
        "/api/admin/attendance/manual",
        &admin,
        json!({ "user_id": marked.id, "date": "2025-03-10", "session": "morning", "status": "present" }),
    )
    .await;

    let (status, json) = app
        .get("/api/admin/attendance/today?cohort=9", Some(&admin))
        .await;
    assert_eq!(status, 200, "{json}");
    let students = json["data"]["students"].as_array().unwrap();
    assert_eq!(students.len(), 2);
    assert_eq!(students[0]["first_name"], "Art");
    assert_eq!(students[0]["morning"]["status"], "-");
    assert_eq!(students[1]["morning"]["status"], "present");
    assert_eq!(students[1]["afternoon"]["status"], "-");
    assert_eq!(json["data"]["submitted_count"], 1);
}

#[tokio::test]
async fn lock_can_be_set_before_any_record_exists() {
    let app = make_test_app().await;
    let admin = token_for(&app.admin().await);

    let (status, json) = app
        .get("/api/admin/attendance/lock?date=2025-03-11&session=afternoon&cohort=9", Some(&admin))
        .await;
    assert_eq!(status, 200);
    assert_eq!(json["data"]["locked"], false);

    let (status, _) = app
        .post(
            "/api/admin/attendance/lock",
            &admin,
            json!({ "date": "2025-03-11", "session": "afternoon", "locked": true, "cohort": 9 }),
        )
        .await;
    assert_eq!(status, 200);

    let (_, json) = app
        .get("/api/admin/attendance/lock?date=2025-03-11&session=afternoon&cohort=9", Some(&admin))
        .await;
    assert_eq!(json["data"]["locked"], true);

    let (_, json) = app
        .get("/api/admin/attendance/lock?date=2025-03-11&session=afternoon&cohort=10", Some(&admin))
        .await;
    assert_eq!(json["data"]["locked"], false);

    let (status, json) = app
        .post("/api/admin/attendance/lock", &admin, json!({ "date": "2025-03-11", "session": "afternoon" }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(json["message"], "locked is required");
}

#[tokio::test]
async fn stats_rank_students_by_absent_days() {
    let app = make_test_app().await;
    let admin = token_for(&app.admin().await);
    let steady = app.student("Steady", 9).await;
    let missing = app.student("Missing", 9).await;

    for (user, status) in [(steady.id, "present"), (missing.id, "absent")] {
        for date in ["2025-03-06", "2025-03-07"] {
            app.post(
                "/api/admin/attendance/manual",
                &admin,
                json!({ "user_id": user, "date": date, "session": "morning", "status": status }),
            )
            .await;
        }
    }

    let (status, json) = app
        .get("/api/admin/attendance/stats-by-days?cohort=9&days=7", Some(&admin))
        .await;
    assert_eq!(status, 200);
    let stats = json["data"].as_array().unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0]["user_id"], missing.id);
    assert_eq!(stats[0]["absent_days"], 2);
    assert_eq!(stats[1]["present_days"], 2);

    let (status, json) = app
        .get("/api/admin/attendance/daily-stats?cohort=9&days=7", Some(&admin))
        .await;
    assert_eq!(status, 200);
    let days = json["data"].as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["date"], "2025-03-06");
    assert_eq!(days[0]["total"], 2);

    let (status, _) = app
        .get(
            "/api/admin/attendance/stats?start_date=2025-03-08&end_date=2025-03-01",
            Some(&admin),
        )
        .await;
    assert_eq!(status, 400);

    let (status, json) = app
        .get(&format!("/api/admin/attendance/student/{}", missing.id), Some(&admin))
        .await;
    assert_eq!(status, 200);
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn purge_removes_expired_codes() {
    let app = make_test_app().await;
    let admin = token_for(&app.admin().await);

    app.post(
        "/api/admin/attendance/generate-code",
        &admin,
        json!({ "cohort": 9, "session": "morning" }),
    )
    .await;

    let (status, json) = app.delete("/api/admin/attendance/codes/expired", &admin).await;
    assert_eq!(status, 200);
    assert_eq!(json["data"]["deleted"], 0);

    app.clock.advance(chrono::Duration::hours(3));
    let (_, json) = app.delete("/api/admin/attendance/codes/expired", &admin).await;
    assert_eq!(json["data"]["deleted"], 1);
}

#[tokio::test]
async fn generate_code_requires_cohort_and_session() {
    let app = make_test_app().await;
    let admin = token_for(&app.admin().await);

    let (status, json) = app
        .post("/api/admin/attendance/generate-code", &admin, json!({ "session": "morning" }))
        .await;
    assert_eq!(status, 400);
    assert_eq!(json["message"], "cohort is required");

    let (status, json) = app
        .post(
            "/api/admin/attendance/generate-code",
            &admin,
            json!({ "cohort": 9, "session": "evening" }),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(json["message"], "Invalid session: must be morning or afternoon");
}

#[tokio::test]
async fn oversized_day_windows_answer_bad_request() {
    let app = make_test_app().await;
    let admin = token_for(&app.admin().await);
    let student = app.student("Wide", 9).await;
    let token = token_for(&student);

    for path in [
        "/api/admin/attendance/stats-by-days?cohort=9&days=1000000000".to_owned(),
        "/api/admin/attendance/daily-stats?cohort=9&days=9223372036854775807".to_owned(),
        format!("/api/admin/attendance/student/{}?days=1000000000", student.id),
    ] {
        let (status, json) = app.get(&path, Some(&admin)).await;
        assert_eq!(status, 400, "{path}: {json}");
        assert_eq!(json["message"], "days must be at most 3650");
    }

    let (status, _) = app
        .get("/api/attendance/me/history?days=1000000000", Some(&token))
        .await;
    assert_eq!(status, 400);

    let (status, _) = app
        .get("/api/admin/attendance/daily-stats?cohort=9&days=3650", Some(&admin))
        .await;
    assert_eq!(status, 200);
}
