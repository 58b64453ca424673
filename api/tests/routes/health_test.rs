use crate::helpers::make_test_app;

#[tokio::test]
async fn health_check_is_public() {
    let app = make_test_app().await;

    let (status, json) = app.get("/api/health", None).await;

    assert_eq!(status, 200);
    assert_eq!(json["success"], true);
    assert_eq!(json["data"], "OK");
    assert_eq!(json["message"], "Health check passed");
}
