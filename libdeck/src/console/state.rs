//! The console state machine. Handlers are pure: they take the current
//! state and return the next state along with the [`Effect`]s the driver
//! must carry out.

use std::collections::BTreeMap;

use derive_getters::Getters;

use super::event::{self, DispatchId, Event, Source, Trigger};
use super::render;
use crate::config::{Banner, ConsoleConfig};
use crate::dispatch::Target;
use crate::log::*;
use crate::status::StatusSet;
use crate::transcript::TranscriptLine;

pub type Transition = (ConsoleState, Vec<Effect>);

/// One of the two transcripts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pane {
    Host,
    Fleet,
}

impl Pane {
    pub fn for_target(target: &Target) -> Self {
        if target.is_fleet() {
            Pane::Fleet
        } else {
            Pane::Host
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Append `lines` to a transcript as one block.
    Append {
        pane: Pane,
        lines: Vec<TranscriptLine>,
    },
    /// The command input of a pane was cleared.
    ClearInput(Pane),
    Dispatch {
        id: DispatchId,
        command: String,
        target: Target,
    },
    Poll,
    PublishStatus(StatusSet),
    StopPolling,
}

#[derive(Getters, Clone, Debug, Default)]
pub struct ConsoleState {
    host_command: String,
    fleet_command: String,
    host_prompt: String,
    fleet_prompt: String,
    banner: Banner,
    polling: bool,
    torn_down: bool,
    #[getter(skip)]
    next_dispatch: u64,
    #[getter(skip)]
    in_flight: BTreeMap<DispatchId, Pane>,
}

impl ConsoleState {
    pub fn new(config: &ConsoleConfig) -> Self {
        Self {
            host_prompt: config.host_prompt().clone(),
            fleet_prompt: config.fleet_prompt().clone(),
            banner: config.banner().clone(),
            ..Default::default()
        }
    }

    /// Number of dispatches still waiting for an outcome.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_dispatching(&self) -> bool {
        !self.in_flight.is_empty()
    }
}

/// Advance the state machine by one event.
pub fn handle(state: ConsoleState, event: Event) -> Transition {
    match event {
        Event::Ui { source, trigger } => {
            if state.torn_down {
                return (state, vec![]);
            }
            match event::lookup(&source, &trigger) {
                Some(handler) => handler(state, &source, &trigger),
                None => {
                    trace!("no binding for {trigger:?} on {source:?}");
                    (state, vec![])
                }
            }
        }
        Event::Started => started(state),
        Event::PollTick => poll_tick(state),
        Event::PollCompleted(status) => poll_completed(state, status),
        Event::DispatchCompleted { id, outcome } => {
            dispatch_completed(state, id, render::outcome_block(&outcome))
        }
        Event::Teardown => teardown(state),
    }
}

fn started(state: ConsoleState) -> Transition {
    let mut effects = vec![];
    for (pane, lines) in [
        (Pane::Host, state.banner.host()),
        (Pane::Fleet, state.banner.fleet()),
    ] {
        if !lines.is_empty() {
            effects.push(Effect::Append {
                pane,
                lines: lines.iter().map(TranscriptLine::output).collect(),
            });
        }
    }
    (state, effects)
}

fn poll_tick(mut state: ConsoleState) -> Transition {
    if state.torn_down {
        return (state, vec![]);
    }
    if state.polling {
        debug!("poll still in flight, skipping tick");
        return (state, vec![]);
    }
    state.polling = true;
    (state, vec![Effect::Poll])
}

fn poll_completed(mut state: ConsoleState, status: StatusSet) -> Transition {
    state.polling = false;
    if state.torn_down {
        return (state, vec![]);
    }
    (state, vec![Effect::PublishStatus(status)])
}

fn dispatch_completed(
    mut state: ConsoleState,
    id: DispatchId,
    lines: Vec<TranscriptLine>,
) -> Transition {
    let Some(pane) = state.in_flight.remove(&id) else {
        warn!("outcome for unknown dispatch {id:?}");
        return (state, vec![]);
    };
    if state.torn_down || lines.is_empty() {
        return (state, vec![]);
    }
    (state, vec![Effect::Append { pane, lines }])
}

fn teardown(mut state: ConsoleState) -> Transition {
    state.torn_down = true;
    (state, vec![Effect::StopPolling])
}

pub fn select_host_command(mut state: ConsoleState, _: &Source, trigger: &Trigger) -> Transition {
    if let Trigger::Change(command) = trigger {
        state.host_command = command.clone();
    }
    (state, vec![])
}

pub fn select_fleet_command(mut state: ConsoleState, _: &Source, trigger: &Trigger) -> Transition {
    if let Trigger::Change(command) = trigger {
        state.fleet_command = command.clone();
    }
    (state, vec![])
}

pub fn submit_host(state: ConsoleState, _: &Source, _: &Trigger) -> Transition {
    submit(state, Target::Host)
}

pub fn submit_all(state: ConsoleState, _: &Source, _: &Trigger) -> Transition {
    submit(state, Target::AllClients)
}

pub fn submit_client(state: ConsoleState, source: &Source, _: &Trigger) -> Transition {
    match source {
        Source::ClientButton(name) => submit(state, Target::client(name.as_str())),
        _ => (state, vec![]),
    }
}

fn submit(mut state: ConsoleState, target: Target) -> Transition {
    let pane = Pane::for_target(&target);
    let (input, prompt) = match pane {
        Pane::Host => (&mut state.host_command, &state.host_prompt),
        Pane::Fleet => (&mut state.fleet_command, &state.fleet_prompt),
    };
    let command = input.trim().to_string();
    if command.is_empty() {
        return (state, vec![]);
    }
    input.clear();
    let echo = render::command_echo(prompt, &command, &target);

    let id = DispatchId(state.next_dispatch);
    state.next_dispatch += 1;
    state.in_flight.insert(id, pane);
    debug!("submitting dispatch {id:?} to {target}");

    (
        state,
        vec![
            Effect::Append {
                pane,
                lines: vec![echo],
            },
            Effect::ClearInput(pane),
            Effect::Dispatch {
                id,
                command,
                target,
            },
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{CommandResult, DispatchOutcome};
    use crate::transcript::LineKind;

    fn state() -> ConsoleState {
        ConsoleState::new(&ConsoleConfig::default())
    }

    fn ui(source: Source, trigger: Trigger) -> Event {
        Event::ui(source, trigger)
    }

    fn change(source: Source, command: &str) -> Event {
        ui(source, Trigger::Change(command.into()))
    }

    fn enter() -> Trigger {
        Trigger::Key("Enter".into())
    }

    #[test]
    fn test_that_empty_commands_emit_nothing_for_every_target() {
        for command in ["", "  ", "\t"] {
            let (s, _) = handle(state(), change(Source::HostCommandInput, command));
            let (s, effects) = handle(s, ui(Source::HostExecuteButton, Trigger::Click));
            assert!(effects.is_empty());
            assert!(!s.is_dispatching());

            let (s, _) = handle(s, change(Source::FleetCommandInput, command));
            for source in [
                Source::ExecuteAllButton,
                Source::ClientButton("alpha".into()),
            ] {
                let (next, effects) = handle(s.clone(), ui(source, Trigger::Click));
                assert!(effects.is_empty());
                assert!(!next.is_dispatching());
            }
        }
    }

    #[test]
    fn test_that_submitting_echoes_clears_and_dispatches() {
        let (s, _) = handle(state(), change(Source::FleetCommandInput, " whoami "));
        let (s, effects) = handle(s, ui(Source::ClientButton("alpha".into()), Trigger::Click));

        assert_eq!(
            vec![
                Effect::Append {
                    pane: Pane::Fleet,
                    lines: vec![TranscriptLine::command(
                        "ops@deck:~$ Executing \"whoami\" on ALPHA"
                    )],
                },
                Effect::ClearInput(Pane::Fleet),
                Effect::Dispatch {
                    id: DispatchId(0),
                    command: "whoami".into(),
                    target: Target::client("alpha"),
                },
            ],
            effects
        );
        assert!(s.fleet_command().is_empty());
        assert_eq!(1, s.in_flight());
    }

    #[test]
    fn test_that_enter_on_inputs_submits() {
        let (s, _) = handle(state(), change(Source::HostCommandInput, "uptime"));
        let (s, effects) = handle(s, ui(Source::HostCommandInput, enter()));
        assert!(matches!(
            effects.last(),
            Some(Effect::Dispatch { target: Target::Host, .. })
        ));

        let (s, _) = handle(s, change(Source::FleetCommandInput, "uptime"));
        let (_, effects) = handle(s, ui(Source::FleetCommandInput, enter()));
        assert!(matches!(
            effects.last(),
            Some(Effect::Dispatch { target: Target::AllClients, .. })
        ));
    }

    #[test]
    fn test_that_results_land_in_the_dispatching_pane() {
        let (s, _) = handle(state(), change(Source::HostCommandInput, "whoami"));
        let (s, _) = handle(s, ui(Source::HostExecuteButton, Trigger::Click));
        let (s, effects) = handle(
            s,
            Event::DispatchCompleted {
                id: DispatchId(0),
                outcome: DispatchOutcome::Completed(vec![CommandResult::completed(
                    "host",
                    Some("root".into()),
                    None,
                )]),
            },
        );
        match effects.as_slice() {
            [Effect::Append { pane, lines }] => {
                assert_eq!(Pane::Host, *pane);
                let kinds: Vec<LineKind> = lines.iter().map(|l| l.kind).collect();
                assert_eq!(vec![LineKind::SuccessHeader, LineKind::Output], kinds);
            }
            other => panic!("expected one append, got {other:?}"),
        }
        assert!(!s.is_dispatching());
    }

    #[test]
    fn test_that_overlapping_ticks_are_coalesced() {
        let (s, effects) = handle(state(), Event::PollTick);
        assert_eq!(vec![Effect::Poll], effects);
        let (s, effects) = handle(s, Event::PollTick);
        assert!(effects.is_empty());
        assert!(*s.polling());
    }

    #[test]
    fn test_that_teardown_discards_late_outcomes() {
        let (s, _) = handle(state(), change(Source::HostCommandInput, "ps"));
        let (s, _) = handle(s, ui(Source::HostExecuteButton, Trigger::Click));
        let (s, _) = handle(s, Event::PollTick);
        let (s, effects) = handle(s, Event::Teardown);
        assert_eq!(vec![Effect::StopPolling], effects);

        let (s, effects) = handle(
            s,
            Event::DispatchCompleted {
                id: DispatchId(0),
                outcome: DispatchOutcome::Rejected {
                    error: "late".into(),
                },
            },
        );
        assert!(effects.is_empty());
        let (s, effects) = handle(s, Event::PollTick);
        assert!(effects.is_empty());
        let (_, effects) = handle(s, change(Source::HostCommandInput, "ls"));
        assert!(effects.is_empty());
    }

    #[test]
    fn test_that_startup_writes_the_banner() {
        let (_, effects) = handle(state(), Event::Started);
        let panes: Vec<Pane> = effects
            .iter()
            .filter_map(|e| match e {
                Effect::Append { pane, .. } => Some(*pane),
                _ => None,
            })
            .collect();
        assert_eq!(vec![Pane::Host, Pane::Fleet], panes);
    }
}
