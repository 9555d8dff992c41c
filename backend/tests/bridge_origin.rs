//! Behavioural tests for bridge upgrade origin checks.

use std::sync::Arc;

use actix_web::http::header::HeaderValue;
use actix_web::http::{StatusCode, header};
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use mockable::Clock;
use portal::domain::{AttemptLimiter, RateLimitPolicy};
use portal::inbound::bridge::{self, BridgeState, OriginGuard};
use portal::outbound::memory::MemoryBackend;
use portal::protocol::TargetOrigin;
use portal::test_support::MutableClock;
use rstest::{fixture, rstest};

// Example Sec-WebSocket-Key from RFC 6455 section 1.3.
const RFC6455_SAMPLE_KEY: &str = "dGhlIHNhbXBsZSBub25jZQ==";

#[fixture]
fn bridge_state() -> BridgeState {
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(MutableClock::fixed());
    let limiter = Arc::new(AttemptLimiter::new(
        Arc::clone(&clock),
        RateLimitPolicy::default(),
    ));
    let guard = OriginGuard::parse(["http://localhost:3000", "https://portal.example"])
        .expect("allow-list");
    let target = TargetOrigin::parse("https://portal.example").expect("target origin");
    BridgeState::new(MemoryBackend::seeded().ports(), limiter, clock, guard, target)
}

fn handshake_request() -> TestRequest {
    TestRequest::get()
        .uri("/bridge")
        .insert_header((header::UPGRADE, "websocket"))
        .insert_header((header::CONNECTION, "Upgrade"))
        .insert_header((header::SEC_WEBSOCKET_VERSION, "13"))
        .insert_header((header::SEC_WEBSOCKET_KEY, RFC6455_SAMPLE_KEY))
}

/// Origin header shapes the bridge must refuse.
#[derive(Debug, Clone, Copy)]
enum OriginHeaderCase {
    Missing,
    Unlisted,
    Multiple,
    Malformed,
    WrongScheme,
}

fn with_origin_case(request: TestRequest, origin_case: OriginHeaderCase) -> TestRequest {
    match origin_case {
        OriginHeaderCase::Missing => request,
        OriginHeaderCase::Unlisted => request.insert_header((header::ORIGIN, "https://evil.example")),
        OriginHeaderCase::Multiple => request
            .append_header((header::ORIGIN, "https://portal.example"))
            .append_header((header::ORIGIN, "https://evil.example")),
        OriginHeaderCase::Malformed => {
            let invalid = HeaderValue::from_bytes(&[0x80]).expect("opaque Origin header value");
            request.insert_header((header::ORIGIN, invalid))
        }
        OriginHeaderCase::WrongScheme => {
            request.insert_header((header::ORIGIN, "http://portal.example"))
        }
    }
}

#[rstest]
#[case("http://localhost:3000")]
#[case("https://portal.example")]
#[actix_rt::test]
async fn upgrades_when_origin_allowed(bridge_state: BridgeState, #[case] origin: &str) {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(bridge_state))
            .service(bridge::bridge_entry),
    )
    .await;

    let request = handshake_request()
        .insert_header((header::ORIGIN, origin))
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(
        response.status(),
        StatusCode::SWITCHING_PROTOCOLS,
        "origin {origin}"
    );
}

#[rstest]
#[case(OriginHeaderCase::Missing, StatusCode::FORBIDDEN)]
#[case(OriginHeaderCase::Unlisted, StatusCode::FORBIDDEN)]
#[case(OriginHeaderCase::Multiple, StatusCode::BAD_REQUEST)]
#[case(OriginHeaderCase::Malformed, StatusCode::BAD_REQUEST)]
#[case(OriginHeaderCase::WrongScheme, StatusCode::FORBIDDEN)]
#[actix_rt::test]
async fn rejects_disallowed_origin_headers(
    bridge_state: BridgeState,
    #[case] origin_case: OriginHeaderCase,
    #[case] expected: StatusCode,
) {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(bridge_state))
            .service(bridge::bridge_entry),
    )
    .await;

    let request = with_origin_case(handshake_request(), origin_case).to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), expected, "{origin_case:?}");
}
