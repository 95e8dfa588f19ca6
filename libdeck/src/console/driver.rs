use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::event::{Event, Source, Trigger};
use super::state::{self, ConsoleState, Effect, Pane};
use crate::config::ConsoleConfig;
use crate::dispatch::{Dispatcher, Target};
use crate::log::*;
use crate::status::{PollScheduler, Poller, StatusSet};
use crate::transcript::{Transcript, TranscriptLine};
use crate::transport::{HttpTransport, Transport, TransportError};

/// What the view layer is told after each step of the console.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewUpdate {
    Status(StatusSet),
    Appended {
        pane: Pane,
        lines: Vec<TranscriptLine>,
        evicted: usize,
    },
    InputCleared(Pane),
}

#[derive(Error, Debug)]
#[error("View is no longer listening.")]
pub struct ViewClosed;

#[async_trait]
pub trait ViewSink: std::fmt::Debug + Send {
    async fn sink(&mut self, update: ViewUpdate) -> Result<(), ViewClosed>;
}

#[async_trait]
impl ViewSink for mpsc::UnboundedSender<ViewUpdate> {
    async fn sink(&mut self, update: ViewUpdate) -> Result<(), ViewClosed> {
        self.send(update).map_err(|_| ViewClosed)
    }
}

#[async_trait]
impl ViewSink for mpsc::Sender<ViewUpdate> {
    async fn sink(&mut self, update: ViewUpdate) -> Result<(), ViewClosed> {
        self.send(update).await.map_err(|_| ViewClosed)
    }
}

/// Feeds events to a running [`Console`]. Sending fails once the console is
/// gone.
#[derive(Clone, Debug)]
pub struct ConsoleHandle {
    tx: mpsc::UnboundedSender<Event>,
}

impl ConsoleHandle {
    pub fn send(&self, event: Event) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn ui(&self, source: Source, trigger: Trigger) -> bool {
        self.send(Event::ui(source, trigger))
    }

    /// Select `command` in the right input and activate the control that
    /// sends it to `target`.
    pub fn submit<S: Into<String>>(&self, command: S, target: Target) -> bool {
        let command = Trigger::Change(command.into());
        match target {
            Target::Host => {
                self.ui(Source::HostCommandInput, command)
                    && self.ui(Source::HostExecuteButton, Trigger::Click)
            }
            Target::SingleClient(name) => {
                self.ui(Source::FleetCommandInput, command)
                    && self.ui(Source::ClientButton(name), Trigger::Click)
            }
            Target::AllClients => {
                self.ui(Source::FleetCommandInput, command)
                    && self.ui(Source::ExecuteAllButton, Trigger::Click)
            }
        }
    }

    pub fn teardown(&self) -> bool {
        self.send(Event::Teardown)
    }
}

/// Owns the transcripts and the latest status, and carries out the effects
/// of the state machine. All mutation happens on the task running the
/// console, so appends never interleave.
#[derive(Debug)]
pub struct Console<V: ViewSink> {
    state: ConsoleState,
    host_transcript: Transcript,
    fleet_transcript: Transcript,
    status: Option<StatusSet>,
    dispatcher: Dispatcher,
    poller: Poller,
    poll_interval: Duration,
    scheduler: Option<PollScheduler>,
    view: V,
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl<V: ViewSink> Console<V> {
    pub fn new(config: &ConsoleConfig, dispatcher: Dispatcher, poller: Poller, view: V) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: ConsoleState::new(config),
            host_transcript: Transcript::new(*config.host_capacity()),
            fleet_transcript: Transcript::new(*config.fleet_capacity()),
            status: None,
            dispatcher,
            poller,
            poll_interval: config.poll_interval(),
            scheduler: None,
            view,
            tx,
            rx,
        }
    }

    pub fn with_transport(config: &ConsoleConfig, transport: Arc<dyn Transport>, view: V) -> Self {
        Self::new(
            config,
            Dispatcher::new(transport.clone()),
            Poller::new(transport),
            view,
        )
    }

    /// A console talking HTTP to `config.base_url`.
    pub fn connect(config: &ConsoleConfig, view: V) -> Result<Self, TransportError> {
        let transport =
            HttpTransport::with_timeout(config.base_url().as_str(), config.request_timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport), view))
    }

    pub fn handle(&self) -> ConsoleHandle {
        ConsoleHandle {
            tx: self.tx.clone(),
        }
    }

    pub fn state(&self) -> &ConsoleState {
        &self.state
    }

    pub fn transcript(&self, pane: Pane) -> &Transcript {
        match pane {
            Pane::Host => &self.host_transcript,
            Pane::Fleet => &self.fleet_transcript,
        }
    }

    pub fn status(&self) -> Option<&StatusSet> {
        self.status.as_ref()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Write the banner and start the poll timer. The first poll fires
    /// right away. Starting a console that already runs its timer, or one
    /// that was torn down, does nothing.
    pub fn start(&mut self) {
        if self.scheduler.is_some() || *self.state.torn_down() {
            debug!("console already started");
            return;
        }
        if self.tx.send(Event::Started).is_err() {
            warn!("console event queue closed before start");
            return;
        }
        let tx = self.tx.clone();
        self.scheduler = Some(PollScheduler::start(self.poll_interval, move || {
            tx.send(Event::PollTick).is_ok()
        }));
        info!("console started, polling every {:?}", self.poll_interval);
    }

    /// Start, then process events until torn down.
    #[tracing::instrument(skip(self))]
    pub async fn run(mut self) -> Self {
        self.start();
        while let Some(event) = self.rx.recv().await {
            let teardown = matches!(event, Event::Teardown);
            self.step(event).await;
            if teardown {
                break;
            }
        }
        info!("console torn down");
        self
    }

    /// Wait for the next queued event and process it. Returns `false` once
    /// the console has been torn down.
    pub async fn pump(&mut self) -> bool {
        if *self.state.torn_down() {
            return false;
        }
        match self.rx.recv().await {
            Some(event) => {
                self.step(event).await;
                true
            }
            None => false,
        }
    }

    /// Run one event through the state machine and apply its effects.
    pub async fn step(&mut self, event: Event) {
        trace!("console event: {event:?}");
        let (next, effects) = state::handle(std::mem::take(&mut self.state), event);
        self.state = next;
        for effect in effects {
            self.apply(effect).await;
        }
    }

    async fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::Append { pane, lines } => {
                let evicted = match pane {
                    Pane::Host => self.host_transcript.extend(lines.iter().cloned()),
                    Pane::Fleet => self.fleet_transcript.extend(lines.iter().cloned()),
                };
                self.publish(ViewUpdate::Appended {
                    pane,
                    lines,
                    evicted,
                })
                .await;
            }
            Effect::ClearInput(pane) => self.publish(ViewUpdate::InputCleared(pane)).await,
            Effect::Dispatch {
                id,
                command,
                target,
            } => {
                let dispatcher = self.dispatcher.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let outcome = dispatcher.dispatch(&command, &target).await;
                    if tx.send(Event::DispatchCompleted { id, outcome }).is_err() {
                        debug!("console gone, dropping outcome of {id:?}");
                    }
                });
            }
            Effect::Poll => {
                let poller = self.poller.clone();
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let status = poller.poll_all().await;
                    if tx.send(Event::PollCompleted(status)).is_err() {
                        debug!("console gone, dropping poll result");
                    }
                });
            }
            Effect::PublishStatus(status) => {
                self.status = Some(status.clone());
                self.publish(ViewUpdate::Status(status)).await;
            }
            Effect::StopPolling => {
                if let Some(scheduler) = self.scheduler.take() {
                    scheduler.stop();
                }
            }
        }
    }

    async fn publish(&mut self, update: ViewUpdate) {
        if let Err(e) = self.view.sink(update).await {
            warn!("{e}");
        }
    }
}
