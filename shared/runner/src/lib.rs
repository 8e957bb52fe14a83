mod controller;
mod dummy;
mod error;
mod traits;

pub use controller::{EpochController, RunOutcome, RunSummary, StopReason, NO_DATA};
pub use dummy::{DummyCheckpoint, DummyExtra, DummyRunner};
pub use error::RunnerError;
pub use traits::{BatchOutput, Runner};
