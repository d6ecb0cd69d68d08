//! Match lifecycle: the report/confirm state machine for a single match.

pub mod errors;
pub mod machine;

pub use errors::{LifecycleError, LifecycleResult};
pub use machine::{
    ConfirmedOutcome, confirm, force_confirm, reject, report, reset_for_replay, schedule, void,
};
