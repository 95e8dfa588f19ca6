//! Translation from each endpoint's response shape into [`CommandResult`]s.
//!
//! The host endpoint reports stderr under `error` when the command ran,
//! while client endpoints use `stdout`/`stderr`/`error` throughout. Both
//! shapes are kept as-is on the wire and only meet here.

use super::{CommandResult, DispatchOutcome, HOST_TARGET_NAME};
use crate::ipc::http::{BroadcastResponse, ClientExecResponse, HostExecResponse};

const UNKNOWN_ERROR: &str = "command failed without an error message";
const MISSING_RESULTS: &str = "response carried no results";

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.is_empty())
}

pub fn host(response: HostExecResponse) -> CommandResult {
    if response.success {
        CommandResult::completed(
            HOST_TARGET_NAME,
            non_empty(response.output),
            non_empty(response.error),
        )
    } else {
        CommandResult::failed(
            HOST_TARGET_NAME,
            non_empty(response.error).unwrap_or_else(|| UNKNOWN_ERROR.into()),
        )
    }
}

pub fn client(name: &str, response: ClientExecResponse) -> CommandResult {
    if response.success {
        CommandResult::completed(name, non_empty(response.stdout), non_empty(response.stderr))
    } else {
        CommandResult::failed(
            name,
            non_empty(response.error).unwrap_or_else(|| UNKNOWN_ERROR.into()),
        )
    }
}

/// A broadcast without a `results` mapping fails as a whole; an empty
/// mapping is a successful broadcast to nobody.
pub fn broadcast(response: BroadcastResponse) -> DispatchOutcome {
    match response.results {
        Some(results) => DispatchOutcome::Completed(
            results
                .into_iter()
                .map(|(name, result)| client(&name, result))
                .collect(),
        ),
        None => DispatchOutcome::Rejected {
            error: non_empty(response.error).unwrap_or_else(|| MISSING_RESULTS.into()),
        },
    }
}
