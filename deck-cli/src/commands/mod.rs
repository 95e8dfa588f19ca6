use std::sync::Arc;

use async_trait::async_trait;
use clap::ArgMatches;
use color_eyre::eyre::{Result, WrapErr};
use deck::config::ConsoleConfig;
use deck::transport::HttpTransport;
use dialoguer::{BasicHistory, Input};
use thiserror::Error;

pub mod console;
pub mod exec;
pub mod status;

#[derive(Error, Debug)]
pub enum CommandErrors {
    #[error("Prompt interaction failed.")]
    PromptInteractionFailed(
        #[from]
        #[source]
        dialoguer::Error,
    ),
    #[error("Required user input `{0}` is missing.")]
    RequiredUserInputMissing(String),
    #[error("Could not reach the console service: {0}")]
    ServiceUnreachable(String),
}

pub struct CliContext<'a> {
    pub config: ConsoleConfig,
    pub matches: &'a ArgMatches,
}

impl<'a> CliContext<'a> {
    pub fn new(config: ConsoleConfig, matches: &'a ArgMatches) -> Self {
        Self { config, matches }
    }

    /// A transport to the configured console service.
    pub fn transport(&self) -> Result<Arc<HttpTransport>> {
        let transport = HttpTransport::with_timeout(
            self.config.base_url().as_str(),
            self.config.request_timeout(),
        )
        .wrap_err("Building HTTP transport failed.")?;
        Ok(Arc::new(transport))
    }
}

#[async_trait]
pub trait Command<'a> {
    fn new() -> Self
    where
        Self: Sized;

    async fn run(&self, context: &'a CliContext) -> Result<()>;
}

pub trait Interactive {
    /// Prompt for one line of operator input, recording it in `history`.
    fn prompt_with_history(&self, prompt: &str, history: &mut BasicHistory) -> Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .history_with(history)
            .interact_text()
            .map_err(CommandErrors::PromptInteractionFailed)
            .wrap_err("Prompting operator input failed.")
    }
}
