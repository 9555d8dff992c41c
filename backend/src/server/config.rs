//! Resolved server configuration.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mockable::{Clock, DefaultClock};
use portal::domain::{AttemptLimiter, PortalPorts};
use portal::inbound::bridge::BridgeState;
use portal::outbound::memory::MemoryBackend;
use portal::outbound::rest::{DEFAULT_REQUEST_TIMEOUT, RestBackend};
use portal::settings::{BackendTarget, PortalSettings};
use tracing::{info, warn};

/// How often idle rate limit windows are dropped.
const LIMITER_PURGE_INTERVAL: Duration = Duration::from_secs(60);

/// Everything the HTTP server needs, resolved from settings.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) bridge_state: BridgeState,
    pub(crate) limiter: Arc<AttemptLimiter>,
    pub(crate) purge_interval: Duration,
}

impl ServerConfig {
    /// Resolve settings into adapters and shared state.
    ///
    /// # Errors
    /// Returns [`std::io::Error`] when a setting is invalid or the REST
    /// client cannot be built.
    pub fn from_settings(settings: &PortalSettings) -> std::io::Result<Self> {
        let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
        let guard = settings.origin_guard().map_err(std::io::Error::other)?;
        let target_origin = settings.surface_origin().map_err(std::io::Error::other)?;
        let policy = settings.rate_limit_policy().map_err(std::io::Error::other)?;
        let ports = build_ports(settings.backend().map_err(std::io::Error::other)?)?;

        let clock: Arc<dyn Clock + Send + Sync> = Arc::new(DefaultClock);
        let limiter = Arc::new(AttemptLimiter::new(Arc::clone(&clock), policy));
        info!(
            bind_addr = %bind_addr,
            surface_origin = %target_origin.as_str(),
            trusted_origins = guard.allowed().count(),
            "portal configuration resolved"
        );
        let bridge_state =
            BridgeState::new(ports, Arc::clone(&limiter), clock, guard, target_origin);
        Ok(Self {
            bind_addr,
            bridge_state,
            limiter,
            purge_interval: LIMITER_PURGE_INTERVAL,
        })
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}

fn build_ports(target: BackendTarget) -> std::io::Result<PortalPorts> {
    match target {
        BackendTarget::Memory => {
            warn!("no backend URL configured; using the seeded in-memory backend");
            Ok(MemoryBackend::seeded().ports())
        }
        BackendTarget::Rest { base_url, api_key } => {
            info!(backend_url = %base_url, "using REST backend");
            let backend = RestBackend::new(base_url, api_key, DEFAULT_REQUEST_TIMEOUT)
                .map_err(|e| std::io::Error::other(format!("REST client setup failed: {e}")))?;
            Ok(backend.ports())
        }
    }
}
