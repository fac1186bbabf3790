//! InningState aggregate and the base-running vocabulary it works in.

mod aggregate;
mod at_bat;
mod bases;
mod events;

pub use aggregate::{InningSituation, InningState};
pub use at_bat::{AdvanceReason, AtBatResultType, RunnerDestination, RunnerMovement};
pub use bases::{Base, BasesState};
pub use events::{
    AtBatCompletedData, CurrentBatterChangedData, HalfInningEndedData, InningStateCreatedData,
    OUTS_PER_HALF_INNING, RunScoredData, RunnerAdvancedData,
};
