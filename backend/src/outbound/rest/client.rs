//! Reqwest transport for the table and identity APIs.
//!
//! This type owns transport details only: endpoint resolution, the API key
//! headers, status mapping and JSON decoding. Port semantics live in the
//! adapters built on top of it.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Url, header};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::{RestError, map_status_error, map_transport_error};

const DEFAULT_USER_AGENT: &str = "portal-backend/0.1";
const RETURN_REPRESENTATION: &str = "return=representation";

/// Equality or ordering constraint on a table read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Filter {
    Eq(&'static str, String),
    OrderAsc(&'static str),
}

impl Filter {
    pub(super) fn eq(column: &'static str, value: impl ToString) -> Self {
        Self::Eq(column, value.to_string())
    }

    fn query_pair(&self) -> (&'static str, String) {
        match self {
            Self::Eq(column, value) => (*column, format!("eq.{value}")),
            Self::OrderAsc(column) => ("order", format!("{column}.asc")),
        }
    }
}

/// HTTP client bound to one backend project.
#[derive(Debug, Clone)]
pub(super) struct RestClient {
    client: Client,
    base: Url,
    api_key: String,
}

impl RestClient {
    pub(super) fn new(
        mut base: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base,
            api_key: api_key.into(),
        })
    }

    pub(super) fn table_url(&self, table: &str, filters: &[Filter]) -> Result<Url, RestError> {
        let mut url = self.endpoint(&format!("rest/v1/{table}"))?;
        if !filters.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for filter in filters {
                let (key, value) = filter.query_pair();
                pairs.append_pair(key, &value);
            }
        }
        Ok(url)
    }

    pub(super) fn endpoint(&self, path: &str) -> Result<Url, RestError> {
        self.base
            .join(path)
            .map_err(|error| RestError::Endpoint(format!("{path}: {error}")))
    }

    /// Rows of `table` matching `filters`.
    pub(super) async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[Filter],
    ) -> Result<Vec<T>, RestError> {
        let url = self.table_url(table, filters)?;
        let request = self.authorised(self.client.get(url), None);
        self.send_json(request).await
    }

    /// Insert one row.
    pub(super) async fn insert<B: Serialize + Sync>(
        &self,
        table: &str,
        row: &B,
    ) -> Result<(), RestError> {
        let url = self.table_url(table, &[])?;
        let request = self.authorised(self.client.post(url), None).json(row);
        self.send(request).await.map(drop)
    }

    /// Update matching rows and return how many changed.
    pub(super) async fn update<B: Serialize + Sync>(
        &self,
        table: &str,
        filters: &[Filter],
        changes: &B,
    ) -> Result<usize, RestError> {
        let url = self.table_url(table, filters)?;
        let request = self
            .authorised(self.client.patch(url), None)
            .header("Prefer", RETURN_REPRESENTATION)
            .json(changes);
        let rows: Vec<serde_json::Value> = self.send_json(request).await?;
        Ok(rows.len())
    }

    /// POST to the identity API, optionally on behalf of a signed-in user.
    pub(super) async fn auth_post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: Url,
        bearer: Option<&str>,
        body: &B,
    ) -> Result<T, RestError> {
        let request = self.authorised(self.client.post(url), bearer).json(body);
        self.send_json(request).await
    }

    /// POST without a response body.
    pub(super) async fn auth_post_empty(&self, url: Url, bearer: &str) -> Result<(), RestError> {
        let request = self.authorised(self.client.post(url), Some(bearer));
        self.send(request).await.map(drop)
    }

    /// GET from the identity API on behalf of a signed-in user.
    pub(super) async fn auth_get<T: DeserializeOwned>(
        &self,
        url: Url,
        bearer: &str,
    ) -> Result<T, RestError> {
        let request = self.authorised(self.client.get(url), Some(bearer));
        self.send_json(request).await
    }

    fn authorised(&self, request: RequestBuilder, bearer: Option<&str>) -> RequestBuilder {
        request
            .header("apikey", self.api_key.as_str())
            .bearer_auth(bearer.unwrap_or(self.api_key.as_str()))
            .header(header::ACCEPT, "application/json")
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>, RestError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RestError> {
        let body = self.send(request).await?;
        serde_json::from_slice(&body).map_err(|error| RestError::Decode(error.to_string()))
    }
}
