//! Optimistic reaction updates with server reconciliation.
//!
//! A click goes through [`ReactionEngine::begin`], which applies the
//! optimistic state at once and hands back a [`PendingReaction`] ticket
//! holding the pre-click snapshot. The caller submits the reaction however
//! it likes and passes the outcome to [`ReactionEngine::settle`].
//!
//! Tickets are numbered. Only the most recent ticket may change state when
//! it settles; older ones are reported as [`Settled::Stale`] and ignored, so
//! a slow response can never overwrite a newer click. Tickets also carry the
//! mount they were issued under, so an engine created after a remount never
//! accepts a ticket from an earlier one.

use tracing::{debug, warn};

use crate::api::ReactionApi;
use crate::app::{InkpostError, Result};
use crate::domain::{ReactionResponse, ReactionState, ReactionType, User};

/// Shown when a signed-out viewer tries to react.
pub const LOGIN_PROMPT: &str = "Please log in to react.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionPhase {
    Idle,
    /// Waiting on the request stamped with `seq`.
    Pending { seq: u64 },
}

/// One in-flight reaction and the state to restore if it fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReaction {
    pub item_id: i64,
    pub reaction: ReactionType,
    pub mount: u64,
    pub seq: u64,
    snapshot: ReactionState,
}

impl PendingReaction {
    pub fn snapshot(&self) -> &ReactionState {
        &self.snapshot
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// Server state applied, or the optimistic state kept when the server
    /// sent no counts.
    Confirmed,
    /// Request failed; pre-click snapshot restored.
    RolledBack,
    /// A newer click superseded this ticket; nothing changed.
    Stale,
}

/// Compute the optimistic state for clicking `reaction`.
///
/// Clicking the active reaction removes it; clicking another one moves the
/// viewer's reaction over. A previous count is only decremented while it is
/// positive.
pub fn apply_optimistic(state: &ReactionState, reaction: ReactionType) -> ReactionState {
    let is_removing = state.user_reaction == Some(reaction);
    let mut counts = state.counts.clone();

    if let Some(previous) = state.user_reaction {
        counts.decrement(previous);
    }
    if !is_removing {
        counts.increment(reaction);
    }

    ReactionState::new(counts, if is_removing { None } else { Some(reaction) })
}

/// Reaction state for a single displayed item.
#[derive(Debug, Clone)]
pub struct ReactionEngine {
    item_id: i64,
    state: ReactionState,
    phase: ReactionPhase,
    mount: u64,
    last_seq: u64,
}

impl ReactionEngine {
    /// Seed from the server snapshot delivered with the item.
    pub fn new(item_id: i64, initial: ReactionState) -> Self {
        Self {
            item_id,
            state: initial,
            phase: ReactionPhase::Idle,
            mount: 0,
            last_seq: 0,
        }
    }

    /// Tag the engine with the mount it belongs to.
    pub fn with_mount(mut self, mount: u64) -> Self {
        self.mount = mount;
        self
    }

    pub fn item_id(&self) -> i64 {
        self.item_id
    }

    pub fn state(&self) -> &ReactionState {
        &self.state
    }

    pub fn phase(&self) -> ReactionPhase {
        self.phase
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, ReactionPhase::Pending { .. })
    }

    /// Apply a click optimistically and return the ticket to settle later.
    ///
    /// Signed-out viewers are refused without touching the state. A click
    /// while another request is pending starts from the state currently
    /// displayed.
    pub fn begin(
        &mut self,
        viewer: Option<&User>,
        reaction: ReactionType,
    ) -> Result<PendingReaction> {
        if viewer.is_none() {
            return Err(InkpostError::NotAuthenticated);
        }

        let snapshot = self.state.clone();
        self.state = apply_optimistic(&snapshot, reaction);
        self.last_seq += 1;
        self.phase = ReactionPhase::Pending { seq: self.last_seq };

        debug!(
            "Reaction {} on item {} pending (seq {})",
            reaction, self.item_id, self.last_seq
        );

        Ok(PendingReaction {
            item_id: self.item_id,
            reaction,
            mount: self.mount,
            seq: self.last_seq,
            snapshot,
        })
    }

    /// Fold the outcome of a submitted reaction back into the state.
    pub fn settle(
        &mut self,
        pending: PendingReaction,
        outcome: Result<ReactionResponse>,
    ) -> Settled {
        if pending.item_id != self.item_id
            || pending.mount != self.mount
            || pending.seq != self.last_seq
        {
            debug!(
                "Discarding stale reaction result for item {} (mount {}, seq {}; latest mount {}, seq {})",
                pending.item_id, pending.mount, pending.seq, self.mount, self.last_seq
            );
            return Settled::Stale;
        }

        self.phase = ReactionPhase::Idle;
        match outcome {
            Ok(response) => {
                if let Some(server_state) = response.into_state() {
                    self.state = server_state;
                }
                Settled::Confirmed
            }
            Err(e) => {
                warn!("Reaction on item {} failed: {}", self.item_id, e);
                self.state = pending.snapshot;
                Settled::RolledBack
            }
        }
    }

    /// Begin, submit through `api`, and settle in one go.
    ///
    /// Returns the resulting state, or [`InkpostError::ReactionFailed`]
    /// after rolling back.
    pub async fn react<A: ReactionApi + ?Sized>(
        &mut self,
        viewer: Option<&User>,
        reaction: ReactionType,
        api: &A,
    ) -> Result<ReactionState> {
        let pending = self.begin(viewer, reaction)?;
        let outcome = api.submit_reaction(self.item_id, reaction).await;
        match self.settle(pending, outcome) {
            Settled::RolledBack => Err(InkpostError::ReactionFailed),
            Settled::Confirmed | Settled::Stale => Ok(self.state.clone()),
        }
    }
}
