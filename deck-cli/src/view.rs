//! Plain-text rendering of console output for a terminal.

use deck::console::{Pane, ViewUpdate};
use deck::status::{StatusPayload, StatusSet, StatusSnapshot};
use deck::transcript::{LineKind, TranscriptLine};
use time::macros::format_description;

fn pane_label(pane: Pane) -> &'static str {
    match pane {
        Pane::Host => "host",
        Pane::Fleet => "fleet",
    }
}

pub fn format_line(pane: Pane, line: &TranscriptLine) -> String {
    let label = pane_label(pane);
    match line.kind {
        LineKind::Command | LineKind::SuccessHeader | LineKind::ErrorHeader => {
            format!("[{label}] {}", line.text)
        }
        LineKind::Output | LineKind::Error | LineKind::Warning => line
            .text
            .trim_end_matches('\n')
            .lines()
            .map(|l| format!("[{label}]     {l}"))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

pub fn print_lines(pane: Pane, lines: &[TranscriptLine]) {
    for line in lines {
        println!("{}", format_line(pane, line));
    }
}

pub fn print_update(update: &ViewUpdate) {
    match update {
        ViewUpdate::Appended { pane, lines, .. } => print_lines(*pane, lines),
        ViewUpdate::Status(status) => print_status(status),
        ViewUpdate::InputCleared(_) => {}
    }
}

fn fetched_at(snapshot: &StatusSnapshot) -> String {
    snapshot
        .fetched_at()
        .format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_default()
}

pub fn format_status(status: &StatusSet) -> String {
    let mut out = vec![];
    for snapshot in status.iter() {
        out.push(format!("* {} (as of {})", snapshot.channel(), fetched_at(snapshot)));
        if let Some(error) = snapshot.error() {
            out.push(format!("** Error: {error}"));
        }
        match snapshot.payload() {
            Some(StatusPayload::Host(host)) => {
                out.push(format!("** hostname: {}", host.hostname()));
                out.push(format!("** timestamp: {}", host.timestamp()));
                out.push(format!("** uptime: {}", host.uptime().trim()));
            }
            Some(StatusPayload::Network(endpoints)) => {
                for endpoint in endpoints {
                    let state = if *endpoint.reachable() { "ONLINE" } else { "OFFLINE" };
                    out.push(format!("** {} - {state}", endpoint.name()));
                    for line in endpoint.output().lines() {
                        out.push(format!("   {line}"));
                    }
                }
            }
            Some(StatusPayload::Fleet(clients)) => {
                if clients.is_empty() {
                    out.push("** no clients".into());
                }
                for client in clients {
                    let state = if *client.running() { "ONLINE" } else { "OFFLINE" };
                    out.push(format!(
                        "** {} - {state} (container: {}, ip: {})",
                        client.name().to_uppercase(),
                        client.container_name(),
                        client.ip_address().as_deref().unwrap_or("-")
                    ));
                }
            }
            None => {}
        }
    }
    out.join("\n")
}

pub fn print_status(status: &StatusSet) {
    println!("{}", format_status(status));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_that_output_lines_are_indented_per_line() {
        let line = TranscriptLine::output("one\ntwo\n");
        assert_eq!(
            "[fleet]     one\n[fleet]     two",
            format_line(Pane::Fleet, &line)
        );
    }

    #[test]
    fn test_that_headers_are_not_indented() {
        let line = TranscriptLine::new(LineKind::SuccessHeader, "[HOST] Success:");
        assert_eq!("[host] [HOST] Success:", format_line(Pane::Host, &line));
    }
}
