//! Simulated agents
//!
//! Local learners that each see one feature partition:
//! - Learner lifecycle and fold-scoped evaluation
//! - Barrier-synchronised concurrent fitting

pub mod learner;
pub mod scheduler;

pub use learner::{Evaluation, Learner, LearnerState};
pub use scheduler::{ConcurrentFitScheduler, ScheduleMode};
