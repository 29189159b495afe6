//! JSON over HTTPS.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, trace};

use crate::core::constants;
use crate::error::{RemoteError, Result};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// One HTTP client bound to a server and a machine.
///
/// Every request carries `Content-Type: application/json`, the machine id
/// header and, once a session exists, `Authorization: Bearer <token>`.
/// A request without a body still sends `{}`.
pub struct Transport {
    client: Client,
    base_url: String,
    machine_id: String,
    token: RwLock<Option<String>>,
}

impl Transport {
    pub fn new(base_url: &str, machine_id: &str, token: Option<&str>) -> Result<Self> {
        let client = Client::builder()
            .timeout(constants::DEFAULT_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(RemoteError::from)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            machine_id: machine_id.to_string(),
            token: RwLock::new(token.filter(|t| !t.is_empty()).map(str::to_string)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_token(&self, token: Option<&str>) {
        let mut slot = self.token.write().unwrap_or_else(PoisonError::into_inner);
        *slot = token.filter(|t| !t.is_empty()).map(str::to_string);
    }

    fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, constants::API_PREFIX, path)
    }

    /// Send one request and decode a 2xx body into `T`.
    ///
    /// Non-2xx answers become `RemoteError::Status` with the body verbatim.
    /// An empty 2xx body decodes as JSON `null`.
    pub async fn request<B, T>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = match body {
            Some(body) => serde_json::to_vec(body)?,
            None => b"{}".to_vec(),
        };

        let mut req = self
            .client
            .request(method.clone(), self.url(path))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(constants::MACHINE_ID_HEADER, &self.machine_id)
            .body(payload);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(token) = self.token() {
            req = req.bearer_auth(token);
        }

        trace!(%method, path, "sending request");
        let response = req.send().await.map_err(RemoteError::from)?;
        let status = response.status();
        let text = response.text().await.map_err(RemoteError::from)?;

        if !status.is_success() {
            debug!(%method, path, status = status.as_u16(), "request failed");
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body: text,
            }
            .into());
        }

        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text)
            .map_err(|e| RemoteError::Decode(format!("{} {}: {}", method, path, e)).into())
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        self.request::<(), T>(Method::GET, path, query, None).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, &[], Some(body)).await
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url)
            .field("machine_id", &self.machine_id)
            .finish_non_exhaustive()
    }
}
