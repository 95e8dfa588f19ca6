//! Command dispatch to the host, a single client, or the whole fleet.
//!
//! The [`Dispatcher`] only talks to the service and normalizes what comes
//! back; it never touches a transcript.

use std::convert::Infallible;
use std::str::FromStr;
use std::sync::Arc;

use derive_getters::Getters;

use crate::log::*;
use crate::transport::{Transport, TransportError};

pub mod adapter;

/// Name reported for results of host dispatches.
pub const HOST_TARGET_NAME: &str = "host";

/// Where a command is sent.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    Host,
    SingleClient(String),
    AllClients,
}

impl Target {
    pub fn client<S: Into<String>>(name: S) -> Self {
        Target::SingleClient(name.into())
    }

    /// Whether results for this target belong to the fleet.
    pub fn is_fleet(&self) -> bool {
        !matches!(self, Target::Host)
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Host => write!(f, "{HOST_TARGET_NAME}"),
            Target::SingleClient(name) => write!(f, "{name}"),
            Target::AllClients => write!(f, "all clients"),
        }
    }
}

/// `host` and `all` are reserved; anything else names a client.
impl FromStr for Target {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "host" => Target::Host,
            "all" | "*" => Target::AllClients,
            name => Target::client(name),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Execution {
    /// The command ran. Either stream may be absent.
    Completed {
        stdout: Option<String>,
        stderr: Option<String>,
    },
    /// The service reported that the command could not be run.
    Failed { error: String },
}

/// The outcome of a command on one host or client.
#[derive(Getters, Clone, Debug, PartialEq, Eq)]
pub struct CommandResult {
    target_name: String,
    execution: Execution,
}

impl CommandResult {
    pub fn completed<S: Into<String>>(
        target_name: S,
        stdout: Option<String>,
        stderr: Option<String>,
    ) -> Self {
        Self {
            target_name: target_name.into(),
            execution: Execution::Completed { stdout, stderr },
        }
    }

    pub fn failed<S: Into<String>, E: Into<String>>(target_name: S, error: E) -> Self {
        Self {
            target_name: target_name.into(),
            execution: Execution::Failed {
                error: error.into(),
            },
        }
    }

    pub fn success(&self) -> bool {
        matches!(self.execution, Execution::Completed { .. })
    }

    pub fn stdout(&self) -> Option<&str> {
        match &self.execution {
            Execution::Completed { stdout, .. } => stdout.as_deref(),
            Execution::Failed { .. } => None,
        }
    }

    pub fn stderr(&self) -> Option<&str> {
        match &self.execution {
            Execution::Completed { stderr, .. } => stderr.as_deref(),
            Execution::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.execution {
            Execution::Failed { error } => Some(error),
            Execution::Completed { .. } => None,
        }
    }
}

/// What a single [`Dispatcher::dispatch`] call ended with. Every call ends
/// with exactly one of these.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The command was empty; nothing was sent.
    Skipped,
    /// Per-target results, in the order the service reported them.
    Completed(Vec<CommandResult>),
    /// The service answered a broadcast without any per-client results.
    Rejected { error: String },
    /// The request itself failed.
    TransportFailed(TransportError),
}

#[derive(Debug, Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Send `command` to `target`. Failures are reported once and never
    /// retried.
    #[tracing::instrument(skip(self))]
    pub async fn dispatch(&self, command: &str, target: &Target) -> DispatchOutcome {
        let command = command.trim();
        if command.is_empty() {
            debug!("ignoring empty command for {target}");
            return DispatchOutcome::Skipped;
        }

        info!("dispatching {command:?} to {target}");
        let outcome = match target {
            Target::Host => self
                .transport
                .execute(command)
                .await
                .map(|response| DispatchOutcome::Completed(vec![adapter::host(response)])),
            Target::SingleClient(name) => self
                .transport
                .execute_on_client(name, command)
                .await
                .map(|response| {
                    DispatchOutcome::Completed(vec![adapter::client(name, response)])
                }),
            Target::AllClients => self
                .transport
                .execute_on_all(command)
                .await
                .map(adapter::broadcast),
        };

        match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("dispatch to {target} failed: {e}");
                DispatchOutcome::TransportFailed(e)
            }
        }
    }
}
