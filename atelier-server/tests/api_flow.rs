//! End-to-end API tests against an in-memory database
//!
//! Every test builds the full router (`build_app`) and drives it with
//! `tower::ServiceExt::oneshot`, so auth, permission layers and error
//! mapping are exercised exactly as in production.

use std::sync::Arc;

use atelier_server::auth::permissions::get_default_permissions;
use atelier_server::auth::{JwtConfig, JwtService};
use atelier_server::db::DbService;
use atelier_server::db::repository::employee;
use atelier_server::services::{dashboard, sweep};
use atelier_server::utils::time::{add_days, format_date, today};
use atelier_server::{Config, ServerState, build_app};
use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use shared::error::ErrorCode;
use shared::models::EmployeeRole;
use tower::ServiceExt;

struct TestApp {
    app: Router,
    state: ServerState,
    admin_token: String,
    _work_dir: tempfile::TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let work_dir = tempfile::tempdir().unwrap();
        let mut config = Config::with_overrides(work_dir.path().to_string_lossy(), 0).unwrap();
        config.jwt = JwtConfig::with_secret("integration-test-secret-0123456789abcdef");
        config.admin_password = Some("admin-pass-123".into());

        let db = DbService::open_in_memory().await.unwrap();
        atelier_server::core::state::seed_admin(&db.pool, &config)
            .await
            .unwrap();
        let jwt = Arc::new(JwtService::with_config(config.jwt.clone()));
        let state = ServerState::new(config, db.pool, jwt);

        let admin = employee::find_by_username(&state.pool, "admin")
            .await
            .unwrap()
            .unwrap();
        let admin_token = token_for(&state, admin.id, &admin.username, EmployeeRole::Admin);

        Self {
            app: build_app(state.clone()),
            state,
            admin_token,
            _work_dir: work_dir,
        }
    }

    async fn staff_token(&self) -> String {
        let staff = employee::create(
            &self.state.pool,
            "clerk",
            "Front Desk",
            "not-a-real-hash",
            EmployeeRole::Staff,
        )
        .await
        .unwrap();
        token_for(&self.state, staff.id, &staff.username, EmployeeRole::Staff)
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn admin(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let token = self.admin_token.clone();
        self.send(method, uri, Some(&token), body).await
    }

    /// Creates an item with one variation and returns `(item_id, variation_id)`
    async fn stock_item(&self, name: &str, price: f64, quantity: i64) -> (i64, i64) {
        let (status, item) = self
            .admin(
                Method::POST,
                "/api/items",
                Some(json!({
                    "name": name,
                    "category": "Gowns",
                    "price": price,
                    "variations": [{ "color": "Ivory", "size": "M", "quantity": quantity }]
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{item}");
        (
            item["id"].as_i64().unwrap(),
            item["variations"][0]["id"].as_i64().unwrap(),
        )
    }

    async fn shelf_quantity(&self, item_id: i64) -> i64 {
        let (status, item) = self
            .admin(Method::GET, &format!("/api/items/{item_id}"), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        item["variations"][0]["quantity"].as_i64().unwrap()
    }

    fn date_in(&self, days: i64) -> String {
        format_date(add_days(today(self.state.config.timezone), days))
    }

    fn customer() -> Value {
        json!({ "name": "Maria Santos", "phone": "0917 555 0101", "email": "maria@example.ph" })
    }

    async fn rent(&self, variation_id: i64, quantity: i64) -> (StatusCode, Value) {
        self.admin(
            Method::POST,
            "/api/rentals",
            Some(json!({
                "customer": Self::customer(),
                "rental_date": self.date_in(1),
                "return_date": self.date_in(4),
                "items": [{ "variation_id": variation_id, "quantity": quantity }]
            })),
        )
        .await
    }

    async fn set_status(&self, rental_id: i64, body: Value) -> (StatusCode, Value) {
        self.admin(
            Method::POST,
            &format!("/api/rentals/{rental_id}/status"),
            Some(body),
        )
        .await
    }
}

fn token_for(state: &ServerState, id: i64, username: &str, role: EmployeeRole) -> String {
    state
        .jwt_service
        .generate_token(id, username, role, &get_default_permissions(role))
        .unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let t = TestApp::new().await;
    let (status, body) = t.send(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"]["status"], "ok");
    assert!(body["business_date"].is_string());
}

#[tokio::test]
async fn login_and_me() {
    let t = TestApp::new().await;

    let (status, _) = t
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "admin", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, login) = t
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "admin", "password": "admin-pass-123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{login}");
    let token = login["token"].as_str().unwrap().to_string();
    assert!(login["expires_in"].as_i64().unwrap() > 0);

    let (status, me) = t.send(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "admin");
}

#[tokio::test]
async fn back_office_requires_token() {
    let t = TestApp::new().await;
    let (status, _) = t.send(Method::GET, "/api/rentals", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = t
        .send(Method::GET, "/api/rentals", Some("garbage"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // storefront stays open
    let (status, _) = t.send(Method::GET, "/api/public/items", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn staff_cannot_change_settings() {
    let t = TestApp::new().await;
    let staff = t.staff_token().await;

    let (status, settings) = t.send(Method::GET, "/api/settings", Some(&staff), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["appointment_slot_capacity"], 2);

    let update = json!({ "appointment_slot_capacity": 5 });
    let (status, _) = t
        .send(Method::PUT, "/api/settings", Some(&staff), Some(update.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = t.send(Method::GET, "/api/employees", Some(&staff), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, settings) = t.admin(Method::PUT, "/api/settings", Some(update)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["appointment_slot_capacity"], 5);
}

#[tokio::test]
async fn return_with_damage_restores_the_rest() {
    let t = TestApp::new().await;
    let (item_id, variation_id) = t.stock_item("Maria Clara Gown", 2500.0, 3).await;

    let (status, rental) = t.rent(variation_id, 2).await;
    assert_eq!(status, StatusCode::OK, "{rental}");
    assert_eq!(rental["status"], "pending");
    let rental_id = rental["id"].as_i64().unwrap();
    assert_eq!(t.shelf_quantity(item_id).await, 1);

    for next in ["to_pickup", "to_return"] {
        let (status, _) = t.set_status(rental_id, json!({ "status": next })).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, returned) = t
        .set_status(
            rental_id,
            json!({
                "status": "returned",
                "damaged": [{ "variation_id": variation_id, "quantity": 1, "notes": "torn hem" }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{returned}");
    assert_eq!(returned["stock_settled"], true);
    assert_eq!(t.shelf_quantity(item_id).await, 2);

    // completing a returned rental never restores twice
    let (status, _) = t.set_status(rental_id, json!({ "status": "completed" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(t.shelf_quantity(item_id).await, 2);

    let (status, damaged) = t
        .admin(Method::GET, "/api/damaged-items?status=awaiting_repair", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let damaged = damaged.as_array().unwrap();
    assert_eq!(damaged.len(), 1);
    let damage_id = damaged[0]["id"].as_i64().unwrap();

    let (status, resolved) = t
        .admin(
            Method::POST,
            &format!("/api/damaged-items/{damage_id}/resolve"),
            Some(json!({ "status": "repaired" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["status"], "repaired");
    assert_eq!(t.shelf_quantity(item_id).await, 3);
}

#[tokio::test]
async fn cancel_puts_stock_back_and_is_terminal() {
    let t = TestApp::new().await;
    let (item_id, variation_id) = t.stock_item("Barong Tagalog", 1800.0, 2).await;

    let (_, rental) = t.rent(variation_id, 2).await;
    let rental_id = rental["id"].as_i64().unwrap();
    assert_eq!(t.shelf_quantity(item_id).await, 0);

    let (status, _) = t.set_status(rental_id, json!({ "status": "cancelled" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(t.shelf_quantity(item_id).await, 2);

    let (status, _) = t.set_status(rental_id, json!({ "status": "to_pickup" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn renting_more_than_the_shelf_fails_cleanly() {
    let t = TestApp::new().await;
    let (item_id, variation_id) = t.stock_item("Ball Gown", 3000.0, 1).await;

    let (status, body) = t.rent(variation_id, 2).await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(t.shelf_quantity(item_id).await, 1);

    let (status, rentals) = t.admin(Method::GET, "/api/rentals", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rentals["total"], 0);
}

#[tokio::test]
async fn payments_cannot_exceed_the_balance() {
    let t = TestApp::new().await;
    let (_, variation_id) = t.stock_item("Terno", 2000.0, 1).await;
    let (_, rental) = t.rent(variation_id, 1).await;
    let rental_id = rental["id"].as_i64().unwrap();
    let remaining = rental["financials"]["remaining_balance"].as_f64().unwrap();
    assert!(remaining > 0.0);

    let uri = format!("/api/rentals/{rental_id}/payments");
    let (status, _) = t
        .admin(
            Method::POST,
            &uri,
            Some(json!({ "amount": remaining + 100.0, "method": "cash" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, paid) = t
        .admin(
            Method::POST,
            &uri,
            Some(json!({ "amount": remaining, "method": "e_wallet", "reference": "GC-1234" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{paid}");
    assert_eq!(paid["financials"]["remaining_balance"].as_f64().unwrap(), 0.0);
    assert_eq!(paid["payments"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn reservation_takes_stock_only_on_convert() {
    let t = TestApp::new().await;
    let (item_id, variation_id) = t.stock_item("Filipiniana", 2200.0, 2).await;

    let (status, receipt) = t
        .send(
            Method::POST,
            "/api/public/reservations",
            None,
            Some(json!({
                "customer": TestApp::customer(),
                "event_date": t.date_in(10),
                "items": [{ "variation_id": variation_id, "quantity": 1 }]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{receipt}");
    assert_eq!(receipt["status"], "pending");
    assert!(receipt["reference_code"].as_str().unwrap().starts_with("RSV-"));
    assert_eq!(t.shelf_quantity(item_id).await, 2);

    let (_, listed) = t.admin(Method::GET, "/api/reservations?status=pending", None).await;
    let reservation_id = listed["items"][0]["id"].as_i64().unwrap();

    let (status, rental) = t
        .admin(
            Method::POST,
            &format!("/api/reservations/{reservation_id}/convert"),
            Some(json!({ "rental_date": t.date_in(9), "return_date": t.date_in(11) })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{rental}");
    assert_eq!(rental["reservation_id"].as_i64(), Some(reservation_id));
    assert_eq!(t.shelf_quantity(item_id).await, 1);

    let (_, detail) = t
        .admin(Method::GET, &format!("/api/reservations/{reservation_id}"), None)
        .await;
    assert_eq!(detail["status"], "converted");

    // a converted reservation is closed
    let (status, _) = t
        .admin(
            Method::POST,
            &format!("/api/reservations/{reservation_id}/cancel"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn appointment_slots_fill_up() {
    let t = TestApp::new().await;
    let date = t.date_in(5);
    let book = |slot: &str| {
        json!({
            "customer": TestApp::customer(),
            "appointment_date": date,
            "time_slot": slot,
            "appointment_type": "fitting"
        })
    };

    for _ in 0..2 {
        let (status, body) = t
            .send(Method::POST, "/api/public/appointments", None, Some(book("10:00")))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }
    let (status, _) = t
        .send(Method::POST, "/api/public/appointments", None, Some(book("10:00")))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // not a configured slot
    let (status, _) = t
        .send(Method::POST, "/api/public/appointments", None, Some(book("10:30")))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, slots) = t
        .send(
            Method::GET,
            &format!("/api/public/appointments/availability?date={date}"),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let ten = slots
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["time_slot"] == "10:00")
        .unwrap();
    assert_eq!(ten["remaining"], 0);
}

#[tokio::test]
async fn tracking_needs_the_matching_contact() {
    let t = TestApp::new().await;
    let (_, variation_id) = t.stock_item("Coat", 900.0, 1).await;
    let (_, rental) = t.rent(variation_id, 1).await;
    let reference = rental["reference_code"].as_str().unwrap().to_string();

    let (status, tracked) = t
        .send(
            Method::GET,
            &format!("/api/public/track/{reference}?contact=MARIA@example.ph"),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{tracked}");
    assert_eq!(tracked["kind"], "rental");
    assert_eq!(tracked["status"], "pending");

    // stored as "0917 555 0101"; formatting differences do not matter
    let (status, _) = t
        .send(
            Method::GET,
            &format!("/api/public/track/{reference}?contact=0917-555-0101"),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = t
        .send(
            Method::GET,
            &format!("/api/public/track/{reference}?contact=09170000000"),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn replacing_lines_moves_stock_between_garments() {
    let t = TestApp::new().await;
    let (gown_item, gown) = t.stock_item("Ivory Gown", 2000.0, 2).await;
    let (suit_item, suit) = t.stock_item("Navy Suit", 1500.0, 1).await;

    let (_, rental) = t.rent(gown, 2).await;
    let rental_id = rental["id"].as_i64().unwrap();
    let lines_uri = format!("/api/rentals/{rental_id}/lines");
    assert_eq!(t.shelf_quantity(gown_item).await, 0);

    // swap: the gowns go back, the suit leaves
    let (status, swapped) = t
        .admin(
            Method::PUT,
            &lines_uri,
            Some(json!({ "items": [{ "variation_id": suit, "quantity": 1 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{swapped}");
    assert_eq!(swapped["items"][0]["variation_id"].as_i64(), Some(suit));
    assert_eq!(t.shelf_quantity(gown_item).await, 2);
    assert_eq!(t.shelf_quantity(suit_item).await, 0);

    // more gowns than the shelf holds: nothing moves
    let (status, body) = t
        .admin(
            Method::PUT,
            &lines_uri,
            Some(json!({ "items": [{ "variation_id": gown, "quantity": 3 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], ErrorCode::InsufficientStock.code());
    assert_eq!(t.shelf_quantity(gown_item).await, 2);
    assert_eq!(t.shelf_quantity(suit_item).await, 0);
    let (_, detail) = t
        .admin(Method::GET, &format!("/api/rentals/{rental_id}"), None)
        .await;
    assert_eq!(detail["items"][0]["variation_id"].as_i64(), Some(suit));

    // a cancelled rental is locked
    let (status, _) = t.set_status(rental_id, json!({ "status": "cancelled" })).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = t
        .admin(
            Method::PUT,
            &lines_uri,
            Some(json!({ "items": [{ "variation_id": gown, "quantity": 1 }] })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], ErrorCode::RentalLocked.code());
    assert_eq!(t.shelf_quantity(gown_item).await, 2);
    assert_eq!(t.shelf_quantity(suit_item).await, 1);
}

#[tokio::test]
async fn sweep_closes_expired_requests_once() {
    let t = TestApp::new().await;
    let (_, variation_id) = t.stock_item("Tuxedo", 1200.0, 2).await;

    let (status, _) = t
        .send(
            Method::POST,
            "/api/public/reservations",
            None,
            Some(json!({
                "customer": TestApp::customer(),
                "event_date": t.date_in(2),
                "items": [{ "variation_id": variation_id, "quantity": 1 }]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = t
        .send(
            Method::POST,
            "/api/public/appointments",
            None,
            Some(json!({
                "customer": TestApp::customer(),
                "appointment_date": t.date_in(2),
                "time_slot": "10:00",
                "appointment_type": "measurement"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, rental) = t.rent(variation_id, 1).await;
    let rental_id = rental["id"].as_i64().unwrap();
    for next in ["to_pickup", "to_return"] {
        let (status, _) = t.set_status(rental_id, json!({ "status": next })).await;
        assert_eq!(status, StatusCode::OK);
    }

    let later = add_days(today(t.state.config.timezone), 10);
    let report = sweep::run_once(&t.state.pool, later).await.unwrap();
    assert_eq!(report.reservations_cancelled, 1);
    assert_eq!(report.appointments_no_show, 1);
    assert_eq!(report.overdue_rentals, 1);

    let (_, appointments) = t.admin(Method::GET, "/api/appointments", None).await;
    assert_eq!(appointments[0]["status"], "no_show");
    let (_, cancelled) = t
        .admin(Method::GET, "/api/reservations?status=cancelled", None)
        .await;
    assert_eq!(cancelled["total"], 1);

    // overdue rentals are only reported, never changed
    let again = sweep::run_once(&t.state.pool, later).await.unwrap();
    assert_eq!(again.reservations_cancelled, 0);
    assert_eq!(again.appointments_no_show, 0);
    assert_eq!(again.overdue_rentals, 1);
}

#[tokio::test]
async fn dashboard_counts_the_shop_floor() {
    let t = TestApp::new().await;
    let (_, variation_id) = t.stock_item("Barong", 900.0, 1).await;
    let (_, gown) = t.stock_item("Ball Gown", 2500.0, 5).await;

    let (_, rental) = t.rent(variation_id, 1).await;
    let rental_id = rental["id"].as_i64().unwrap();
    for next in ["to_pickup", "to_return"] {
        t.set_status(rental_id, json!({ "status": next })).await;
    }
    let (status, _) = t
        .admin(
            Method::POST,
            &format!("/api/rentals/{rental_id}/payments"),
            Some(json!({ "amount": 250.0, "method": "cash" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    t.send(
        Method::POST,
        "/api/public/appointments",
        None,
        Some(json!({
            "customer": TestApp::customer(),
            "appointment_date": t.date_in(0),
            "time_slot": "14:00",
            "appointment_type": "pickup"
        })),
    )
    .await;
    t.send(
        Method::POST,
        "/api/public/reservations",
        None,
        Some(json!({
            "customer": TestApp::customer(),
            "event_date": t.date_in(20),
            "items": [{ "variation_id": gown, "quantity": 1 }]
        })),
    )
    .await;

    let (status, summary) = t.admin(Method::GET, "/api/dashboard/summary", None).await;
    assert_eq!(status, StatusCode::OK, "{summary}");
    assert_eq!(summary["today"], t.date_in(0));
    assert_eq!(summary["pending_reservations"], 1);
    assert_eq!(summary["pending_appointments"], 1);
    assert_eq!(summary["appointments_today"], 1);
    assert_eq!(summary["active_rentals"], 1);
    assert_eq!(summary["overdue_rentals"], 0);
    assert_eq!(summary["damaged_awaiting_repair"], 0);
    assert_eq!(summary["low_stock_variations"], 1);
    assert_eq!(summary["revenue_this_month"].as_f64(), Some(250.0));
    assert_eq!(summary["upcoming_returns"].as_array().unwrap().len(), 1);

    // seen from after the return date the same rental is overdue
    let tz = t.state.config.timezone;
    let later = dashboard::summary(&t.state.pool, add_days(today(tz), 10), tz)
        .await
        .unwrap();
    assert_eq!(later.overdue_rentals, 1);
    assert!(later.upcoming_returns.is_empty());
}

#[tokio::test]
async fn employee_guards_keep_an_admin() {
    let t = TestApp::new().await;
    let owner = employee::find_by_username(&t.state.pool, "admin")
        .await
        .unwrap()
        .unwrap();
    let owner_uri = format!("/api/employees/{}", owner.id);

    // no self-demotion or self-deletion
    let (status, _) = t
        .admin(Method::PUT, &owner_uri, Some(json!({ "role": "staff" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = t.admin(Method::DELETE, &owner_uri, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, ben) = t
        .admin(
            Method::POST,
            "/api/employees",
            Some(json!({ "username": "ben", "password": "tailor-pass-1", "role": "admin" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{ben}");
    let ben_id = ben["id"].as_i64().unwrap();
    let ben_token = token_for(&t.state, ben_id, "ben", EmployeeRole::Admin);

    let (status, _) = t
        .admin(
            Method::PUT,
            &format!("/api/employees/{ben_id}"),
            Some(json!({ "is_active": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // ben's token still works, but the owner is now the only active admin
    let (status, body) = t
        .send(Method::PUT, &owner_uri, Some(&ben_token), Some(json!({ "is_active": false })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], ErrorCode::LastAdminRequired.code());
    let (status, _) = t.send(Method::DELETE, &owner_uri, Some(&ben_token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = t
        .admin(Method::DELETE, "/api/employees/404", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reservation_lines_for_one_garment_share_its_shelf() {
    let t = TestApp::new().await;
    let (_, variation_id) = t.stock_item("Maria Clara", 1800.0, 1).await;

    let (status, body) = t
        .send(
            Method::POST,
            "/api/public/reservations",
            None,
            Some(json!({
                "customer": TestApp::customer(),
                "event_date": t.date_in(14),
                "items": [
                    { "variation_id": variation_id, "quantity": 1 },
                    { "variation_id": variation_id, "quantity": 1 }
                ]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["code"], ErrorCode::InsufficientStock.code());
    assert_eq!(body["details"]["requested"], 2);
    assert_eq!(body["details"]["available"], 1);

    let (_, listed) = t.admin(Method::GET, "/api/reservations", None).await;
    assert_eq!(listed["total"], 0);
}
