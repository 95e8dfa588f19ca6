use std::str::FromStr;

use async_trait::async_trait;
use color_eyre::eyre::{Result, WrapErr};
use deck::console::{Console, ViewUpdate};
use deck::dispatch::Target;
use deck::log::*;
use deck::status::StatusSet;
use dialoguer::BasicHistory;
use tokio::sync::{mpsc, watch};

use super::{CliContext, CommandErrors, Interactive};
use crate::view;

const HELP: &[&str] = &[
    "* commands:",
    "** <cmd>              run on the host",
    "** @<client> <cmd>    run on one client",
    "** @all <cmd>         run on every client",
    "** :status            show the latest status",
    "** :help              show this help",
    "** :quit              leave the console",
];

/// One line of operator input.
#[derive(Debug, PartialEq, Eq)]
enum Line {
    Empty,
    Quit,
    Help,
    Status,
    Dispatch(String, Target),
    Invalid(String),
}

fn parse_line(line: &str) -> Line {
    let line = line.trim();
    if line.is_empty() {
        return Line::Empty;
    }
    match line {
        ":quit" | ":q" | ":exit" => return Line::Quit,
        ":help" | ":h" => return Line::Help,
        ":status" | ":s" => return Line::Status,
        _ => {}
    }
    if let Some(rest) = line.strip_prefix('@') {
        return match rest.split_once(char::is_whitespace) {
            Some((target, command)) if !target.is_empty() && !command.trim().is_empty() => {
                match Target::from_str(target) {
                    Ok(target) => Line::Dispatch(command.trim().to_string(), target),
                    Err(never) => match never {},
                }
            }
            _ => Line::Invalid(format!("expected `@<target> <command>`, got `{line}`")),
        };
    }
    if line.starts_with(':') {
        return Line::Invalid(format!("unknown console command `{line}`"));
    }
    Line::Dispatch(line.to_string(), Target::Host)
}

pub struct ConsoleCommand;

impl Interactive for ConsoleCommand {}

impl ConsoleCommand {
    async fn read_line(&self, prompt: String, history: BasicHistory) -> Result<(String, BasicHistory)> {
        tokio::task::spawn_blocking(move || {
            let mut history = history;
            ConsoleCommand
                .prompt_with_history(&prompt, &mut history)
                .map(|line| (line, history))
        })
        .await
        .wrap_err("Input task failed.")?
    }
}

#[async_trait]
impl<'a> super::Command<'a> for ConsoleCommand {
    fn new() -> Self {
        Self
    }

    async fn run(&self, context: &'a CliContext) -> Result<()> {
        let (view_tx, mut view_rx) = mpsc::unbounded_channel::<ViewUpdate>();
        let console = Console::connect(&context.config, view_tx)
            .map_err(|e| CommandErrors::ServiceUnreachable(e.to_string()))?;
        let handle = console.handle();
        let running = tokio::spawn(console.run());

        let (status_tx, status_rx) = watch::channel::<Option<StatusSet>>(None);
        let printer = tokio::spawn(async move {
            while let Some(update) = view_rx.recv().await {
                match update {
                    ViewUpdate::Status(status) => {
                        // Only the first status is printed unasked; later
                        // ones are kept for `:status`.
                        if status_tx.borrow().is_none() {
                            view::print_status(&status);
                        }
                        status_tx.send_replace(Some(status));
                    }
                    update => view::print_update(&update),
                }
            }
        });

        let prompt = context.config.host_prompt().clone();
        let mut history = BasicHistory::new().max_entries(100).no_duplicates(true);
        loop {
            let (input, returned) = self.read_line(prompt.clone(), history).await?;
            history = returned;
            match parse_line(&input) {
                Line::Empty => {}
                Line::Quit => break,
                Line::Help => HELP.iter().for_each(|l| println!("{l}")),
                Line::Status => match status_rx.borrow().as_ref() {
                    Some(status) => view::print_status(status),
                    None => println!("* no status yet"),
                },
                Line::Invalid(reason) => println!("* {reason}"),
                Line::Dispatch(command, target) => {
                    if !handle.submit(command, target) {
                        error!("console stopped accepting input");
                        break;
                    }
                }
            }
        }

        handle.teardown();
        let console = running.await.wrap_err("Console task failed.")?;
        debug!(
            "leaving console with {} dispatch(es) in flight",
            console.state().in_flight()
        );
        drop(console);
        printer.await.wrap_err("Output task failed.")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_that_plain_lines_go_to_the_host() {
        assert_eq!(
            Line::Dispatch("uptime".into(), Target::Host),
            parse_line("  uptime ")
        );
    }

    #[test]
    fn test_that_at_prefix_selects_a_target() {
        assert_eq!(
            Line::Dispatch("whoami".into(), Target::client("alpha")),
            parse_line("@alpha whoami")
        );
        assert_eq!(
            Line::Dispatch("ls -la /tmp".into(), Target::AllClients),
            parse_line("@all ls -la /tmp")
        );
        assert_eq!(
            Line::Dispatch("id".into(), Target::Host),
            parse_line("@host id")
        );
    }

    #[test]
    fn test_that_incomplete_targets_are_rejected() {
        assert!(matches!(parse_line("@alpha"), Line::Invalid(_)));
        assert!(matches!(parse_line("@ whoami"), Line::Invalid(_)));
        assert!(matches!(parse_line(":frobnicate"), Line::Invalid(_)));
    }

    #[test]
    fn test_that_console_commands_are_recognized() {
        assert_eq!(Line::Empty, parse_line("   "));
        assert_eq!(Line::Quit, parse_line(":quit"));
        assert_eq!(Line::Quit, parse_line(":q"));
        assert_eq!(Line::Status, parse_line(":status"));
        assert_eq!(Line::Help, parse_line(":help"));
    }
}
