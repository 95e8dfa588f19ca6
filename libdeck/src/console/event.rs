//! Console events and the table that routes UI events to their handlers.

use super::state::{self, ConsoleState, Transition};
use crate::dispatch::DispatchOutcome;
use crate::status::StatusSet;

/// Identifies one in-flight dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DispatchId(pub u64);

/// A UI element that can raise events.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Source {
    HostCommandInput,
    HostExecuteButton,
    FleetCommandInput,
    ExecuteAllButton,
    ClientButton(String),
}

/// What happened on a [`Source`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// The selected command text changed.
    Change(String),
    /// A key was pressed, named as the browser names it (`"Enter"`).
    Key(String),
    Click,
}

#[derive(Debug)]
pub enum Event {
    Ui { source: Source, trigger: Trigger },
    Started,
    PollTick,
    PollCompleted(StatusSet),
    DispatchCompleted {
        id: DispatchId,
        outcome: DispatchOutcome,
    },
    Teardown,
}

impl Event {
    pub fn ui(source: Source, trigger: Trigger) -> Self {
        Event::Ui { source, trigger }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SourceKind {
    HostCommandInput,
    HostExecuteButton,
    FleetCommandInput,
    ExecuteAllButton,
    ClientButton,
}

impl From<&Source> for SourceKind {
    fn from(source: &Source) -> Self {
        match source {
            Source::HostCommandInput => SourceKind::HostCommandInput,
            Source::HostExecuteButton => SourceKind::HostExecuteButton,
            Source::FleetCommandInput => SourceKind::FleetCommandInput,
            Source::ExecuteAllButton => SourceKind::ExecuteAllButton,
            Source::ClientButton(_) => SourceKind::ClientButton,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TriggerKind {
    Change,
    Enter,
    OtherKey,
    Click,
}

impl From<&Trigger> for TriggerKind {
    fn from(trigger: &Trigger) -> Self {
        match trigger {
            Trigger::Change(_) => TriggerKind::Change,
            Trigger::Key(key) if key == "Enter" => TriggerKind::Enter,
            Trigger::Key(_) => TriggerKind::OtherKey,
            Trigger::Click => TriggerKind::Click,
        }
    }
}

pub type UiHandler = fn(ConsoleState, &Source, &Trigger) -> Transition;

struct Binding {
    source: SourceKind,
    trigger: TriggerKind,
    handler: UiHandler,
}

const BINDINGS: &[Binding] = &[
    Binding {
        source: SourceKind::HostCommandInput,
        trigger: TriggerKind::Change,
        handler: state::select_host_command,
    },
    Binding {
        source: SourceKind::HostCommandInput,
        trigger: TriggerKind::Enter,
        handler: state::submit_host,
    },
    Binding {
        source: SourceKind::HostExecuteButton,
        trigger: TriggerKind::Click,
        handler: state::submit_host,
    },
    Binding {
        source: SourceKind::FleetCommandInput,
        trigger: TriggerKind::Change,
        handler: state::select_fleet_command,
    },
    Binding {
        source: SourceKind::FleetCommandInput,
        trigger: TriggerKind::Enter,
        handler: state::submit_all,
    },
    Binding {
        source: SourceKind::ExecuteAllButton,
        trigger: TriggerKind::Click,
        handler: state::submit_all,
    },
    Binding {
        source: SourceKind::ClientButton,
        trigger: TriggerKind::Click,
        handler: state::submit_client,
    },
];

/// The handler bound to `trigger` on `source`, if any.
pub fn lookup(source: &Source, trigger: &Trigger) -> Option<UiHandler> {
    let source = SourceKind::from(source);
    let trigger = TriggerKind::from(trigger);
    BINDINGS
        .iter()
        .find(|b| b.source == source && b.trigger == trigger)
        .map(|b| b.handler)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_that_submit_gestures_are_bound() {
        let enter = Trigger::Key("Enter".into());
        for (source, trigger) in [
            (Source::HostCommandInput, &enter),
            (Source::HostExecuteButton, &Trigger::Click),
            (Source::FleetCommandInput, &enter),
            (Source::ExecuteAllButton, &Trigger::Click),
            (Source::ClientButton("alpha".into()), &Trigger::Click),
        ] {
            assert!(lookup(&source, trigger).is_some(), "{source:?} {trigger:?}");
        }
    }

    #[test]
    fn test_that_unbound_pairs_are_ignored() {
        assert!(lookup(&Source::HostCommandInput, &Trigger::Key("a".into())).is_none());
        assert!(lookup(&Source::HostCommandInput, &Trigger::Click).is_none());
        assert!(lookup(&Source::ExecuteAllButton, &Trigger::Key("Enter".into())).is_none());
        assert!(lookup(&Source::ClientButton("alpha".into()), &Trigger::Change("x".into())).is_none());
    }
}
