use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const SYSTEM_PATH: &str = "/api/system";
pub const NETWORK_PATH: &str = "/api/network";
pub const CLIENTS_PATH: &str = "/api/clients";
pub const EXECUTE_PATH: &str = "/api/execute";
pub const EXECUTE_ALL_PATH: &str = "/api/clients/execute-all";

/// Last segment of `/api/clients/{name}/execute`. The client name between
/// [`CLIENTS_PATH`] and this segment is always a single encoded segment.
pub const CLIENT_EXECUTE_SEGMENT: &str = "execute";

/// A JSON object decoded as its entries, in the order the service wrote them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entries<T>(pub Vec<(String, T)>);

impl<T> Entries<T> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.iter().find(|(n, _)| *n == name).map(|(_, value)| value)
    }
}

impl<T> Default for Entries<T> {
    fn default() -> Self {
        Self(vec![])
    }
}

impl<T> IntoIterator for Entries<T> {
    type Item = (String, T);
    type IntoIter = std::vec::IntoIter<(String, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<S: Into<String>, T> FromIterator<(S, T)> for Entries<T> {
    fn from_iter<I: IntoIterator<Item = (S, T)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Entries<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
            type Value = Entries<T>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object keyed by name")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, value)) = map.next_entry::<String, T>()? {
                    entries.push((name, value));
                }
                Ok(Entries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

impl<T: Serialize> Serialize for Entries<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub command: String,
}

/// `GET /api/system`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum SystemResponse {
    Failed { error: String },
    Info(HostInfo),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub hostname: String,
    pub timestamp: String,
    #[serde(default)]
    pub uptime: String,
}

/// `GET /api/network`
pub type NetworkResponse = Entries<Reachability>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Reachability {
    pub success: bool,
    #[serde(default)]
    pub output: String,
}

/// `GET /api/clients`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ClientsResponse {
    Failed { error: String },
    Clients(Entries<ClientInfo>),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub container_name: String,
    #[serde(default)]
    pub ip_address: Option<String>,
}

/// `POST /api/execute`. On success `error` carries the command's stderr.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HostExecResponse {
    pub success: bool,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /api/clients/{name}/execute`, and each entry of a broadcast.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ClientExecResponse {
    pub success: bool,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `POST /api/clients/execute-all`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct BroadcastResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Entries<ClientExecResponse>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
