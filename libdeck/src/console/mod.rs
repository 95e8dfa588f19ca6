//! The console controller: a pure state machine ([`state`]) routed by an
//! explicit binding table ([`event`]) and driven by an async loop
//! ([`driver`]) that owns both transcripts and the latest status.

pub mod driver;
pub mod event;
pub mod render;
pub mod state;

pub use driver::{Console, ConsoleHandle, ViewClosed, ViewSink, ViewUpdate};
pub use event::{DispatchId, Event, Source, Trigger};
pub use state::{ConsoleState, Effect, Pane};
