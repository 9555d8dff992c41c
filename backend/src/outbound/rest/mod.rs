//! REST adapters for a hosted table store and identity service.
//!
//! Tables are read and written through a PostgREST-style API
//! (`/rest/v1/{table}`); accounts go through a GoTrue-style auth API
//! (`/auth/v1/*`). One [`RestBackend`] implements every backend port.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;

use crate::domain::PortalPorts;

mod client;
mod dto;
mod error;
mod identity;
mod tables;

use client::RestClient;

/// Request timeout applied when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Backend adapter bound to one project URL and API key.
#[derive(Debug, Clone)]
pub struct RestBackend {
    client: RestClient,
}

impl RestBackend {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base_url: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: RestClient::new(base_url, api_key, timeout)?,
        })
    }

    /// Every port, backed by this adapter.
    #[must_use]
    pub fn ports(&self) -> PortalPorts {
        PortalPorts {
            directory: Arc::new(self.clone()),
            identity: Arc::new(self.clone()),
            invites: Arc::new(self.clone()),
            profiles: Arc::new(self.clone()),
            tests: Arc::new(self.clone()),
        }
    }
}
