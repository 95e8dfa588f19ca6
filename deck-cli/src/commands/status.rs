use async_trait::async_trait;
use color_eyre::eyre::Result;
use deck::log::*;
use deck::status::Poller;

use super::CliContext;
use crate::view;

pub struct StatusCommand;

#[async_trait]
impl<'a> super::Command<'a> for StatusCommand {
    fn new() -> Self {
        Self
    }

    async fn run(&self, context: &'a CliContext) -> Result<()> {
        let poller = Poller::new(context.transport()?);
        let status = poller.poll_all().await;
        let failed = status.iter().filter(|s| !s.is_ok()).count();
        if failed > 0 {
            warn!("{failed} status channel(s) failed");
        }
        view::print_status(&status);
        Ok(())
    }
}
