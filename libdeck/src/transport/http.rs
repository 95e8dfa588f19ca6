use std::time::Duration;

use async_trait::async_trait;
use derive_getters::Getters;
use serde::de::DeserializeOwned;

use super::{Transport, TransportError};
use crate::ipc::http::*;
use crate::log::*;

/// [`Transport`] over HTTP with JSON bodies.
#[derive(Getters, Debug, Clone)]
pub struct HttpTransport {
    #[getter(skip)]
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new<S: Into<String>>(base_url: S) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Build a transport whose requests give up after `timeout`. Without a
    /// timeout a request waits as long as the connection stays open.
    pub fn with_timeout<S: Into<String>>(
        base_url: S,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let base_url = base_url.into();
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| TransportError::Request {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client<S: Into<String>>(base_url: S, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// URL of the execute endpoint of one client. The name always stays a
    /// single path segment, so it can never address another endpoint.
    fn client_url(&self, client: &str) -> Result<String, TransportError> {
        if matches!(client, "" | "." | "..") {
            return Err(TransportError::InvalidClient {
                client: client.into(),
            });
        }
        let clients = self.url(CLIENTS_PATH);
        let mut url = reqwest::Url::parse(&clients).map_err(|e| TransportError::Request {
            url: clients.clone(),
            reason: e.to_string(),
        })?;
        url.path_segments_mut()
            .map_err(|_| TransportError::Request {
                url: clients.clone(),
                reason: "base URL cannot carry a path".into(),
            })?
            .push(client)
            .push(CLIENT_EXECUTE_SEGMENT);
        Ok(url.into())
    }

    #[tracing::instrument(skip(self))]
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        let url = self.url(path);
        trace!("GET {url}");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| request_error(&url, e))?;
        decode(&url, response).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, command: &str) -> Result<T, TransportError> {
        self.post_to(self.url(path), command).await
    }

    #[tracing::instrument(skip(self))]
    async fn post_to<T: DeserializeOwned>(&self, url: String, command: &str) -> Result<T, TransportError> {
        trace!("POST {url}");
        let response = self
            .client
            .post(&url)
            .json(&CommandRequest {
                command: command.to_string(),
            })
            .send()
            .await
            .map_err(|e| request_error(&url, e))?;
        decode(&url, response).await
    }
}

fn request_error(url: &str, e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout { url: url.into() }
    } else {
        TransportError::Request {
            url: url.into(),
            reason: e.to_string(),
        }
    }
}

async fn decode<T: DeserializeOwned>(
    url: &str,
    response: reqwest::Response,
) -> Result<T, TransportError> {
    let status = response.status();
    if !status.is_success() {
        warn!("{url} answered with {status}");
        return Err(TransportError::Status {
            url: url.into(),
            status: status.as_u16(),
        });
    }
    let body = response.bytes().await.map_err(|e| request_error(url, e))?;
    serde_json::from_slice(&body).map_err(|e| TransportError::Decode {
        url: url.into(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl Transport for HttpTransport {
    async fn system(&self) -> Result<SystemResponse, TransportError> {
        self.get(SYSTEM_PATH).await
    }

    async fn network(&self) -> Result<NetworkResponse, TransportError> {
        self.get(NETWORK_PATH).await
    }

    async fn clients(&self) -> Result<ClientsResponse, TransportError> {
        self.get(CLIENTS_PATH).await
    }

    async fn execute(&self, command: &str) -> Result<HostExecResponse, TransportError> {
        self.post(EXECUTE_PATH, command).await
    }

    async fn execute_on_client(
        &self,
        client: &str,
        command: &str,
    ) -> Result<ClientExecResponse, TransportError> {
        self.post_to(self.client_url(client)?, command).await
    }

    async fn execute_on_all(&self, command: &str) -> Result<BroadcastResponse, TransportError> {
        self.post(EXECUTE_ALL_PATH, command).await
    }
}
