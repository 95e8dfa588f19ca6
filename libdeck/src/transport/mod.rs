use async_trait::async_trait;
use thiserror::Error;

use crate::ipc::http::{
    BroadcastResponse, ClientExecResponse, ClientsResponse, HostExecResponse, NetworkResponse,
    SystemResponse,
};

pub mod http;

pub use http::HttpTransport;

/// The request itself failed: nothing usable came back from the service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },
    #[error("request to {url} timed out")]
    Timeout { url: String },
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("malformed response from {url}: {reason}")]
    Decode { url: String, reason: String },
    #[error("`{client}` is not a valid client name")]
    InvalidClient { client: String },
}

/// The console service, one method per endpoint. Implementations only move
/// bytes; interpreting the responses is left to the status and dispatch
/// layers.
#[async_trait]
pub trait Transport: std::fmt::Debug + Send + Sync {
    async fn system(&self) -> Result<SystemResponse, TransportError>;

    async fn network(&self) -> Result<NetworkResponse, TransportError>;

    async fn clients(&self) -> Result<ClientsResponse, TransportError>;

    async fn execute(&self, command: &str) -> Result<HostExecResponse, TransportError>;

    async fn execute_on_client(
        &self,
        client: &str,
        command: &str,
    ) -> Result<ClientExecResponse, TransportError>;

    async fn execute_on_all(&self, command: &str) -> Result<BroadcastResponse, TransportError>;
}

#[cfg(test)]
pub(crate) mod fake {
    //! A scripted [`Transport`] that records every request it receives.

    use std::sync::Mutex;

    use super::*;
    use crate::ipc::http::{ClientInfo, Entries, HostInfo, Reachability};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Request {
        System,
        Network,
        Clients,
        Execute(String),
        ExecuteOnClient(String, String),
        ExecuteOnAll(String),
    }

    #[derive(Debug)]
    pub struct FakeTransport {
        pub system: Result<SystemResponse, TransportError>,
        pub network: Result<NetworkResponse, TransportError>,
        pub clients: Result<ClientsResponse, TransportError>,
        pub execute: Result<HostExecResponse, TransportError>,
        pub execute_on_client: Result<ClientExecResponse, TransportError>,
        pub execute_on_all: Result<BroadcastResponse, TransportError>,
        pub(crate) requests: Mutex<Vec<Request>>,
    }

    impl FakeTransport {
        pub fn requests(&self) -> Vec<Request> {
            self.requests.lock().map(|r| r.clone()).unwrap_or_default()
        }

        fn record(&self, request: Request) {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request);
            }
        }
    }

    pub fn timeout(path: &str) -> TransportError {
        TransportError::Timeout {
            url: format!("http://fake{path}"),
        }
    }

    impl Default for FakeTransport {
        fn default() -> Self {
            Self {
                system: Ok(SystemResponse::Info(HostInfo {
                    hostname: "lab".into(),
                    timestamp: "2024-01-01T00:00:00".into(),
                    uptime: "up 3 days".into(),
                })),
                network: Ok(Entries::from_iter([(
                    "10.0.0.10",
                    Reachability {
                        success: true,
                        output: "reachable".into(),
                    },
                )])),
                clients: Ok(ClientsResponse::Clients(Entries::from_iter([(
                    "alpha",
                    ClientInfo {
                        running: true,
                        container_name: "lab-alpha".into(),
                        ip_address: Some("10.0.0.10".into()),
                    },
                )]))),
                execute: Ok(HostExecResponse {
                    success: true,
                    output: Some("root\n".into()),
                    error: None,
                }),
                execute_on_client: Ok(ClientExecResponse {
                    success: true,
                    stdout: Some("root".into()),
                    stderr: Some(String::new()),
                    error: None,
                }),
                execute_on_all: Ok(BroadcastResponse::default()),
                requests: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn system(&self) -> Result<SystemResponse, TransportError> {
            self.record(Request::System);
            self.system.clone()
        }

        async fn network(&self) -> Result<NetworkResponse, TransportError> {
            self.record(Request::Network);
            self.network.clone()
        }

        async fn clients(&self) -> Result<ClientsResponse, TransportError> {
            self.record(Request::Clients);
            self.clients.clone()
        }

        async fn execute(&self, command: &str) -> Result<HostExecResponse, TransportError> {
            self.record(Request::Execute(command.into()));
            self.execute.clone()
        }

        async fn execute_on_client(
            &self,
            client: &str,
            command: &str,
        ) -> Result<ClientExecResponse, TransportError> {
            self.record(Request::ExecuteOnClient(client.into(), command.into()));
            self.execute_on_client.clone()
        }

        async fn execute_on_all(&self, command: &str) -> Result<BroadcastResponse, TransportError> {
            self.record(Request::ExecuteOnAll(command.into()));
            self.execute_on_all.clone()
        }
    }
}
