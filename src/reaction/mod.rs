pub mod board;
pub mod engine;

pub use board::{ReactionBoard, ReactionOutcome};
pub use engine::{
    apply_optimistic, PendingReaction, ReactionEngine, ReactionPhase, Settled, LOGIN_PROMPT,
};
