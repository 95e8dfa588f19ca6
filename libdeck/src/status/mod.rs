//! Status snapshots of the host, its network, and its fleet.
//!
//! A [`StatusSnapshot`] either carries a payload or an error, never both.
//! Each poll replaces the previous snapshot of its channel wholesale.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::ipc::http::{ClientInfo, HostInfo, Reachability};

pub mod poller;
pub mod scheduler;

pub use poller::Poller;
pub use scheduler::PollScheduler;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Channel {
    Host,
    Network,
    Fleet,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Host => write!(f, "host"),
            Channel::Network => write!(f, "network"),
            Channel::Fleet => write!(f, "fleet"),
        }
    }
}

#[derive(Getters, Clone, Debug, PartialEq, Eq)]
pub struct HostStatus {
    hostname: String,
    timestamp: String,
    uptime: String,
}

impl From<HostInfo> for HostStatus {
    fn from(info: HostInfo) -> Self {
        Self {
            hostname: info.hostname,
            timestamp: info.timestamp,
            uptime: info.uptime,
        }
    }
}

#[derive(Getters, Clone, Debug, PartialEq, Eq)]
pub struct EndpointStatus {
    name: String,
    reachable: bool,
    output: String,
}

impl EndpointStatus {
    pub fn new<S: Into<String>>(name: S, reachability: Reachability) -> Self {
        Self {
            name: name.into(),
            reachable: reachability.success,
            output: reachability.output,
        }
    }
}

#[derive(Getters, Clone, Debug, PartialEq, Eq)]
pub struct ClientStatus {
    name: String,
    running: bool,
    container_name: String,
    ip_address: Option<String>,
}

impl ClientStatus {
    pub fn new<S: Into<String>>(name: S, info: ClientInfo) -> Self {
        Self {
            name: name.into(),
            running: info.running,
            container_name: info.container_name,
            ip_address: info.ip_address,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatusPayload {
    Host(HostStatus),
    /// Endpoints in the order the service reported them.
    Network(Vec<EndpointStatus>),
    /// Clients in the order the service reported them.
    Fleet(Vec<ClientStatus>),
}

#[derive(Getters, Clone, Debug, PartialEq, Eq)]
pub struct StatusSnapshot {
    channel: Channel,
    fetched_at: OffsetDateTime,
    payload: Option<StatusPayload>,
    error: Option<String>,
}

impl StatusSnapshot {
    pub fn ok(channel: Channel, fetched_at: OffsetDateTime, payload: StatusPayload) -> Self {
        Self {
            channel,
            fetched_at,
            payload: Some(payload),
            error: None,
        }
    }

    pub fn failed<S: Into<String>>(channel: Channel, fetched_at: OffsetDateTime, error: S) -> Self {
        Self {
            channel,
            fetched_at,
            payload: None,
            error: Some(error.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// The latest snapshot of every channel, as produced by one poll.
#[derive(Getters, Clone, Debug, PartialEq, Eq)]
pub struct StatusSet {
    host: StatusSnapshot,
    network: StatusSnapshot,
    fleet: StatusSnapshot,
}

impl StatusSet {
    pub fn new(host: StatusSnapshot, network: StatusSnapshot, fleet: StatusSnapshot) -> Self {
        Self {
            host,
            network,
            fleet,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusSnapshot> {
        [&self.host, &self.network, &self.fleet].into_iter()
    }

    /// Names of the clients in the fleet snapshot, if the fleet was reachable.
    pub fn client_names(&self) -> Vec<String> {
        match self.fleet.payload() {
            Some(StatusPayload::Fleet(clients)) => {
                clients.iter().map(|c| c.name().clone()).collect()
            }
            _ => vec![],
        }
    }
}

/// Source of poll timestamps.
pub trait Clock: std::fmt::Debug + Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
