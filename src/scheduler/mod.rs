pub mod commands;
pub mod controller;
pub mod probes;
pub mod state;

pub use controller::{ScheduleSnapshot, SchedulerController};
pub use probes::{AttentionState, OsProbes, SystemProbes};
pub use state::{BreakConfig, CountdownState, SkipReason, TickOutcome, TickSignals};
