use api::{auth::generate_jwt, auth::middleware::log_request, routes::routes, state::AppState};
use axum::{
    Router,
    body::Body,
    extract::ConnectInfo,
    http::{Request, header},
    middleware::from_fn,
    response::Response,
};
use chrono::{NaiveDate, NaiveTime};
use db::{models::user, test_utils::setup_test_db};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use services::{AttendancePolicy, DbUserDirectory, ServiceContext};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tower::ServiceExt;
use util::clock::FixedClock;
use util::config::AppConfig;

pub const TEST_JWT_SECRET: &str = "attendance-test-secret";
pub const CLIENT_IP: [u8; 4] = [198, 51, 100, 9];

/// Router over a fresh in-memory database, with the clock pinned to
/// 09:05 Bangkok time on [`day`].
pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub clock: Arc<FixedClock>,
}

pub fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

pub fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub async fn make_test_app() -> TestApp {
    AppConfig::set_jwt_secret(TEST_JWT_SECRET);

    let db = setup_test_db().await;
    let clock = Arc::new(FixedClock::at_local(day(), hm(9, 5)));
    let ctx = ServiceContext::new(
        db.clone(),
        Arc::new(DbUserDirectory::new(db.clone())),
        clock.clone(),
        AttendancePolicy::default(),
    );

    let router = Router::new()
        .nest("/api", routes(AppState::with_context(ctx)))
        .layer(from_fn(log_request));

    TestApp { router, db, clock }
}

impl TestApp {
    pub fn set_local_time(&self, h: u32, m: u32) {
        if let Some(at) = util::clock::local_instant(day(), hm(h, m)) {
            self.clock.set(at);
        }
    }

    pub async fn student(&self, first_name: &str, cohort: i32) -> user::Model {
        let email = format!("{}@school.test", first_name.to_lowercase());
        user::Model::create(
            &self.db,
            &email,
            first_name,
            "Tester",
            &format!("JSD-{first_name}"),
            cohort,
            false,
        )
        .await
        .unwrap()
    }

    pub async fn admin(&self) -> user::Model {
        user::Model::create(&self.db, "admin@school.test", "Ada", "Admin", "", 0, true)
            .await
            .unwrap()
    }

    pub async fn send(&self, req: Request<Body>) -> (u16, Value) {
        let response: Response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status().as_u16();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (u16, Value) {
        self.send(request("GET", uri, token, None)).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (u16, Value) {
        self.send(request("POST", uri, Some(token), Some(body))).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (u16, Value) {
        self.send(request("PUT", uri, Some(token), Some(body))).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (u16, Value) {
        self.send(request("DELETE", uri, Some(token), None)).await
    }
}

pub fn token_for(user: &user::Model) -> String {
    generate_jwt(user.id, user.admin).unwrap().0
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    with_connect_info(req, CLIENT_IP)
}

pub fn with_connect_info(mut req: Request<Body>, ip: [u8; 4]) -> Request<Body> {
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::from(ip)), 43210);
    req.extensions_mut().insert(ConnectInfo(addr));
    req
}
