//! WebSocket bridge between the host relay and the session controller.
//!
//! Responsibilities:
//! - validate upgrade requests against the origin allow-list
//! - start one controller per connection
//! - drop relayed messages from untrusted senders before decoding

use actix_web::http::header::{HeaderValue, ORIGIN};
use actix_web::web::{self, Payload};
use actix_web::{HttpRequest, HttpResponse, get};
use tracing::{error, info, warn};

mod frame;
mod listener;
mod origin_guard;
mod session;
mod sink;
mod state;

pub use frame::{InboundFrame, OutboundFrame};
pub use listener::{BridgeListener, FrameOutcome, ListenerError};
pub use origin_guard::OriginGuard;
pub use sink::WsSink;
pub use state::BridgeState;

/// Handle WebSocket upgrade for the `/bridge` endpoint.
#[get("/bridge")]
pub async fn bridge_entry(
    state: web::Data<BridgeState>,
    req: HttpRequest,
    body: Payload,
) -> actix_web::Result<HttpResponse> {
    let mut origin_iter = req.headers().get_all(ORIGIN);
    let origin_header = origin_iter.next().ok_or_else(|| {
        error!("missing Origin header on bridge upgrade");
        actix_web::error::ErrorForbidden("Origin not allowed")
    })?;
    if origin_iter.next().is_some() {
        error!("multiple Origin headers on bridge upgrade");
        return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
    }

    validate_origin(state.guard(), origin_header)?;

    let (response, session, stream) = actix_ws::handle(&req, body).map_err(|error| {
        error!(error = %error, "bridge upgrade failed");
        actix_web::error::ErrorInternalServerError("Bridge upgrade failed")
    })?;
    info!("bridge connection opened");
    actix_web::rt::spawn(session::handle_bridge_session(
        state.listener(),
        state.target_origin().clone(),
        session,
        stream,
    ));
    Ok(response)
}

fn validate_origin(guard: &OriginGuard, origin_header: &HeaderValue) -> actix_web::Result<()> {
    let origin_value = match origin_header.to_str() {
        Ok(value) => value,
        Err(error) => {
            error!(error = %error, "failed to parse Origin header as string");
            return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
        }
    };

    if url::Url::parse(origin_value).is_err() {
        error!(origin = origin_value, "failed to parse Origin header as URL");
        return Err(actix_web::error::ErrorBadRequest("Invalid Origin header"));
    }

    if guard.is_trusted(origin_value) {
        Ok(())
    } else {
        warn!(
            origin = origin_value,
            "rejected bridge upgrade due to disallowed Origin"
        );
        Err(actix_web::error::ErrorForbidden("Origin not allowed"))
    }
}
