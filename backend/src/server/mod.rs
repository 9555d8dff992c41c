//! Server construction and background tasks.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use portal::domain::AttemptLimiter;
use portal::inbound::bridge::{BridgeState, bridge_entry};
use portal::inbound::http::{HealthState, live, ready};
use tracing::debug;

fn build_app(
    health_state: web::Data<HealthState>,
    bridge_state: web::Data<BridgeState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(health_state)
        .app_data(bridge_state)
        .service(bridge_entry)
        .service(ready)
        .service(live)
}

/// Periodically drop rate limit windows with no recent attempts.
fn spawn_limiter_purge(limiter: Arc<AttemptLimiter>, interval: std::time::Duration) {
    actix_web::rt::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            limiter.purge_idle();
            debug!(tracked = limiter.tracked_keys(), "purged idle rate limit windows");
        }
    });
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        bind_addr,
        bridge_state,
        limiter,
        purge_interval,
    } = config;
    let bridge_state = web::Data::new(bridge_state);

    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), bridge_state.clone())
    })
    .bind(bind_addr)?
    .run();

    spawn_limiter_purge(limiter, purge_interval);
    health_state.mark_ready();
    Ok(server)
}
