//! Bridge session loop tests over a real socket.

use super::*;
use crate::domain::{AttemptLimiter, RateLimitPolicy};
use crate::inbound::bridge::{self, BridgeState, OriginGuard};
use crate::outbound::memory::MemoryBackend;
use actix_web::{App, HttpServer, dev::Server, dev::ServerHandle, http::header};
use awc::{BoxedSocket, ws::Codec, ws::Frame, ws::Message};
use futures_util::{SinkExt, StreamExt};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use std::sync::Arc;

type Socket = actix_codec::Framed<BoxedSocket, Codec>;

const SURFACE_ORIGIN: &str = "http://localhost:3000";

#[fixture]
async fn start_bridge_server() -> (String, Server) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let clock: Arc<dyn mockable::Clock + Send + Sync> = Arc::new(DefaultClock);
    let limiter = Arc::new(AttemptLimiter::new(
        Arc::clone(&clock),
        RateLimitPolicy::default(),
    ));
    let guard = OriginGuard::parse([SURFACE_ORIGIN]).expect("allow-list");
    let target = TargetOrigin::parse(SURFACE_ORIGIN).expect("target origin");
    let state = BridgeState::new(MemoryBackend::seeded().ports(), limiter, clock, guard, target);
    let server = HttpServer::new(move || {
        App::new()
            .app_data(actix_web::web::Data::new(state.clone()))
            .service(bridge::bridge_entry)
    })
    .listen(listener)
    .expect("bind test server")
    .disable_signals()
    .run();
    let url = format!("http://{addr}");
    (url, server)
}

#[fixture]
async fn bridge_client(#[future] start_bridge_server: (String, Server)) -> (Socket, ServerHandle) {
    let (url, server) = start_bridge_server.await;
    let handle = server.handle();
    actix_web::rt::spawn(server);

    let (_resp, socket) = awc::Client::default()
        .ws(format!("{url}/bridge"))
        .set_header(header::ORIGIN, SURFACE_ORIGIN)
        .connect()
        .await
        .expect("websocket connect");

    (socket, handle)
}

fn relay_frame(origin: &str, message: Value) -> Message {
    Message::Text(json!({ "origin": origin, "message": message }).to_string().into())
}

async fn next_text_frame(socket: &mut Socket) -> Value {
    loop {
        let frame = socket.next().await.expect("response frame").expect("frame");
        match frame {
            Frame::Text(bytes) => return serde_json::from_slice(&bytes).expect("json"),
            Frame::Ping(_) | Frame::Pong(_) => continue,
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

#[rstest]
#[actix_rt::test]
async fn replies_are_addressed_to_the_surface_origin(
    #[future] bridge_client: (Socket, ServerHandle),
) {
    let (mut socket, _server) = bridge_client.await;
    socket
        .send(relay_frame(
            SURFACE_ORIGIN,
            json!({ "type": "LOAD_BUILDINGS_REQUEST" }),
        ))
        .await
        .expect("send text");

    let first = next_text_frame(&mut socket).await;
    assert_eq!(first["targetOrigin"], SURFACE_ORIGIN);
    assert_eq!(first["message"]["type"], "LOADING_STATE");
    assert_eq!(first["message"]["data"]["resource"], "buildings");

    let loaded = next_text_frame(&mut socket).await;
    assert_eq!(loaded["message"]["type"], "BUILDINGS_LOADED");
    let buildings = loaded["message"]["data"]["buildings"]
        .as_array()
        .expect("building list");
    assert_eq!(buildings.len(), 3);
}

#[rstest]
#[actix_rt::test]
async fn untrusted_senders_get_no_reply(#[future] bridge_client: (Socket, ServerHandle)) {
    let (mut socket, _server) = bridge_client.await;
    socket
        .send(relay_frame(
            "https://evil.example",
            json!({ "type": "LOAD_BUILDINGS_REQUEST" }),
        ))
        .await
        .expect("send untrusted");
    socket
        .send(relay_frame(
            SURFACE_ORIGIN,
            json!({ "type": "BUILDING_SELECTED", "data": { "buildingId": 3 } }),
        ))
        .await
        .expect("send trusted");

    let first = next_text_frame(&mut socket).await;
    assert_eq!(first["message"]["type"], "LOADING_STATE");
    assert_eq!(first["message"]["data"]["resource"], "courses");
}

#[rstest]
#[actix_rt::test]
async fn closes_on_invalid_frame(#[future] bridge_client: (Socket, ServerHandle)) {
    let (mut socket, _server) = bridge_client.await;
    socket
        .send(Message::Text("not-json".into()))
        .await
        .expect("send text");

    let frame = loop {
        match socket.next().await.expect("response frame").expect("frame") {
            Frame::Ping(_) | Frame::Pong(_) => continue,
            other => break other,
        }
    };
    match frame {
        Frame::Close(reason) => {
            assert_eq!(reason.expect("reason").code, CloseCode::Policy);
        }
        other => panic!("expected close frame, got {other:?}"),
    }
}

#[rstest]
#[actix_rt::test]
async fn closes_after_timeout_without_relay_traffic(
    #[future] bridge_client: (Socket, ServerHandle),
) {
    let (mut socket, _server) = bridge_client.await;
    tokio::time::sleep(CLIENT_TIMEOUT + HEARTBEAT_INTERVAL * 3).await;

    let observed_close = tokio::time::timeout(Duration::from_secs(2), async {
        let mut observed = None;
        while let Some(frame) = socket.next().await {
            match frame.expect("frame") {
                Frame::Ping(_) | Frame::Pong(_) => continue,
                Frame::Close(reason) => {
                    observed = reason;
                    break;
                }
                other => panic!("unexpected frame before close: {other:?}"),
            }
        }
        observed
    })
    .await
    .expect("close frame missing within timeout")
    .expect("close frame missing after timeout");

    assert_eq!(observed_close.code, CloseCode::Normal);
    assert_eq!(
        observed_close.description.as_deref(),
        Some("heartbeat timeout")
    );
}
