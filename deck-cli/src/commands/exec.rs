use async_trait::async_trait;
use color_eyre::eyre::Result;
use deck::console::render;
use deck::console::Pane;
use deck::dispatch::{DispatchOutcome, Dispatcher, Target};
use deck::log::*;

use super::{CliContext, CommandErrors};
use crate::view;

pub struct ExecCommand;

impl ExecCommand {
    fn read_command(&self, context: &CliContext) -> Result<String> {
        let command = context
            .matches
            .get_many::<String>("command")
            .map(|parts| parts.map(String::as_str).collect::<Vec<_>>().join(" "))
            .unwrap_or_default();
        if command.trim().is_empty() {
            return Err(CommandErrors::RequiredUserInputMissing("command".into()).into());
        }
        Ok(command.trim().to_string())
    }

    fn read_target(&self, context: &CliContext) -> Target {
        context
            .matches
            .get_one::<String>("target")
            .and_then(|t| t.parse::<Target>().ok())
            .unwrap_or(Target::Host)
    }
}

#[async_trait]
impl<'a> super::Command<'a> for ExecCommand {
    fn new() -> Self {
        Self
    }

    async fn run(&self, context: &'a CliContext) -> Result<()> {
        let command = self.read_command(context)?;
        let target = self.read_target(context);
        let pane = Pane::for_target(&target);
        let prompt = match pane {
            Pane::Host => context.config.host_prompt(),
            Pane::Fleet => context.config.fleet_prompt(),
        };

        let dispatcher = Dispatcher::new(context.transport()?);
        view::print_lines(pane, &[render::command_echo(prompt, &command, &target)]);
        let outcome = dispatcher.dispatch(&command, &target).await;
        view::print_lines(pane, &render::outcome_block(&outcome));

        match outcome {
            DispatchOutcome::TransportFailed(e) => {
                error!("could not dispatch to {target}");
                Err(CommandErrors::ServiceUnreachable(e.to_string()).into())
            }
            _ => Ok(()),
        }
    }
}
