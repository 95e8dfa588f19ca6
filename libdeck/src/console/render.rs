//! Turning dispatches into transcript lines.

use crate::dispatch::{CommandResult, DispatchOutcome, Execution, Target};
use crate::transcript::{LineKind, TranscriptLine};

/// The line echoed when the operator submits `command` to `target`.
pub fn command_echo(prompt: &str, command: &str, target: &Target) -> TranscriptLine {
    let text = match target {
        Target::Host => format!("{prompt} {command}"),
        Target::SingleClient(name) => {
            format!("{prompt} Executing \"{command}\" on {}", name.to_uppercase())
        }
        Target::AllClients => format!("{prompt} Executing \"{command}\" on all clients"),
    };
    TranscriptLine::command(text)
}

/// Header plus detail lines for one target's result.
pub fn result_block(result: &CommandResult) -> Vec<TranscriptLine> {
    let name = result.target_name().to_uppercase();
    match result.execution() {
        Execution::Completed { stdout, stderr } => {
            let mut lines = vec![TranscriptLine::new(
                LineKind::SuccessHeader,
                format!("[{name}] Success:"),
            )];
            if let Some(stdout) = stdout.as_deref().filter(|s| !s.is_empty()) {
                lines.push(TranscriptLine::output(stdout));
            }
            if let Some(stderr) = stderr.as_deref().filter(|s| !s.is_empty()) {
                lines.push(TranscriptLine::new(
                    LineKind::Warning,
                    format!("stderr: {stderr}"),
                ));
            }
            lines
        }
        Execution::Failed { error } => vec![
            TranscriptLine::new(LineKind::ErrorHeader, format!("[{name}] Error:")),
            TranscriptLine::error(error.as_str()),
        ],
    }
}

/// Every line a finished dispatch contributes, in display order.
pub fn outcome_block(outcome: &DispatchOutcome) -> Vec<TranscriptLine> {
    match outcome {
        DispatchOutcome::Skipped => vec![],
        DispatchOutcome::Completed(results) => results.iter().flat_map(result_block).collect(),
        DispatchOutcome::Rejected { error } => vec![TranscriptLine::error(format!("Error: {error}"))],
        DispatchOutcome::TransportFailed(e) => {
            vec![TranscriptLine::error(format!("Network error: {e}"))]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportError;

    fn kinds(lines: &[TranscriptLine]) -> Vec<LineKind> {
        lines.iter().map(|l| l.kind).collect()
    }

    #[test]
    fn test_that_command_echo_names_the_target() {
        assert_eq!(
            "root@deck:~$ uptime",
            command_echo("root@deck:~$", "uptime", &Target::Host).text
        );
        assert_eq!(
            "ops@deck:~$ Executing \"whoami\" on ALPHA",
            command_echo("ops@deck:~$", "whoami", &Target::client("alpha")).text
        );
        assert_eq!(
            "ops@deck:~$ Executing \"whoami\" on all clients",
            command_echo("ops@deck:~$", "whoami", &Target::AllClients).text
        );
    }

    #[test]
    fn test_that_mixed_broadcast_renders_contiguous_blocks() {
        let outcome = DispatchOutcome::Completed(vec![
            CommandResult::completed("a", Some("ok".into()), None),
            CommandResult::failed("b", "container stopped"),
        ]);
        let lines = outcome_block(&outcome);
        assert_eq!(
            vec![
                LineKind::SuccessHeader,
                LineKind::Output,
                LineKind::ErrorHeader,
                LineKind::Error
            ],
            kinds(&lines)
        );
        let text: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(
            vec!["[A] Success:", "ok", "[B] Error:", "container stopped"],
            text
        );
    }

    #[test]
    fn test_that_stderr_becomes_a_warning() {
        let lines = result_block(&CommandResult::completed(
            "host",
            None,
            Some("permission denied".into()),
        ));
        assert_eq!(vec![LineKind::SuccessHeader, LineKind::Warning], kinds(&lines));
        assert_eq!("stderr: permission denied", lines[1].text);
    }

    #[test]
    fn test_that_dispatch_level_failures_have_no_header() {
        let rejected = outcome_block(&DispatchOutcome::Rejected {
            error: "no clients connected".into(),
        });
        assert_eq!(vec![TranscriptLine::error("Error: no clients connected")], rejected);

        let failed = outcome_block(&DispatchOutcome::TransportFailed(TransportError::Timeout {
            url: "http://lab/api/execute".into(),
        }));
        assert_eq!(
            vec![TranscriptLine::error(
                "Network error: request to http://lab/api/execute timed out"
            )],
            failed
        );
        assert!(outcome_block(&DispatchOutcome::Skipped).is_empty());
    }
}
