use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::api::ReactionApi;
use crate::app::Result;
use crate::domain::{ReactionResponse, ReactionState, ReactionType, User};
use crate::reaction::engine::{PendingReaction, ReactionEngine, Settled};

/// Result of a submitted reaction, delivered back to the board.
#[derive(Debug)]
pub struct ReactionOutcome {
    pub pending: PendingReaction,
    pub result: Result<ReactionResponse>,
}

/// Reaction engines for the items currently on screen.
///
/// Clicks are submitted on the runtime and their outcomes come back through
/// a channel, so the caller's loop never waits on the network. Outcomes for
/// items that have left the screen are dropped.
pub struct ReactionBoard {
    engines: HashMap<i64, ReactionEngine>,
    /// Bumped on every mount, never reset.
    mounts: u64,
    tx: mpsc::UnboundedSender<ReactionOutcome>,
    rx: mpsc::UnboundedReceiver<ReactionOutcome>,
}

impl ReactionBoard {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            engines: HashMap::new(),
            mounts: 0,
            tx,
            rx,
        }
    }

    /// Start tracking an item with its server snapshot.
    ///
    /// An item already tracked keeps its current state, so re-rendering
    /// does not wipe a pending optimistic update.
    pub fn mount(&mut self, item_id: i64, initial: ReactionState) {
        let mounts = &mut self.mounts;
        self.engines.entry(item_id).or_insert_with(|| {
            *mounts += 1;
            ReactionEngine::new(item_id, initial).with_mount(*mounts)
        });
    }

    /// Replace whatever is tracked with a fresh snapshot.
    pub fn remount(&mut self, item_id: i64, initial: ReactionState) {
        self.mounts += 1;
        self.engines.insert(
            item_id,
            ReactionEngine::new(item_id, initial).with_mount(self.mounts),
        );
    }

    pub fn unmount(&mut self, item_id: i64) {
        self.engines.remove(&item_id);
    }

    /// Keep only the items for which `visible` holds.
    pub fn retain<F: Fn(i64) -> bool>(&mut self, visible: F) {
        self.engines.retain(|id, _| visible(*id));
    }

    pub fn is_mounted(&self, item_id: i64) -> bool {
        self.engines.contains_key(&item_id)
    }

    pub fn state(&self, item_id: i64) -> Option<&ReactionState> {
        self.engines.get(&item_id).map(|e| e.state())
    }

    pub fn is_pending(&self, item_id: i64) -> bool {
        self.engines
            .get(&item_id)
            .map(|e| e.is_pending())
            .unwrap_or(false)
    }

    /// Apply a click and submit it in the background.
    ///
    /// Must be called from within a tokio runtime. Errors when the item is
    /// not mounted or the viewer is signed out; no request is sent then.
    pub fn click(
        &mut self,
        viewer: Option<&User>,
        item_id: i64,
        reaction: ReactionType,
        api: Arc<dyn ReactionApi + Send + Sync>,
    ) -> Result<()> {
        let engine = self
            .engines
            .get_mut(&item_id)
            .ok_or_else(|| crate::app::InkpostError::NotFound(format!("item {}", item_id)))?;
        let pending = engine.begin(viewer, reaction)?;

        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = api.submit_reaction(pending.item_id, pending.reaction).await;
            // The board may be gone by now; nothing to do then.
            let _ = tx.send(ReactionOutcome { pending, result });
        });
        Ok(())
    }

    /// Settle one outcome. `None` when its item is no longer mounted.
    pub fn apply(&mut self, outcome: ReactionOutcome) -> Option<Settled> {
        let item_id = outcome.pending.item_id;
        match self.engines.get_mut(&item_id) {
            Some(engine) => Some(engine.settle(outcome.pending, outcome.result)),
            None => {
                debug!("Dropping reaction result for unmounted item {}", item_id);
                None
            }
        }
    }

    /// Settle every outcome that has arrived so far, without waiting.
    pub fn drain(&mut self) -> Vec<(i64, Settled)> {
        let mut settled = Vec::new();
        while let Ok(outcome) = self.rx.try_recv() {
            let item_id = outcome.pending.item_id;
            if let Some(result) = self.apply(outcome) {
                settled.push((item_id, result));
            }
        }
        settled
    }

    /// Wait for the next outcome and settle it.
    pub async fn next_settled(&mut self) -> Option<(i64, Option<Settled>)> {
        let outcome = self.rx.recv().await?;
        let item_id = outcome.pending.item_id;
        Some((item_id, self.apply(outcome)))
    }
}

impl Default for ReactionBoard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::InkpostError;
    use crate::domain::{ReactionCounts, Role};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    struct EchoApi;

    #[async_trait]
    impl ReactionApi for EchoApi {
        async fn submit_reaction(
            &self,
            _item_id: i64,
            reaction: ReactionType,
        ) -> Result<ReactionResponse> {
            let counts: ReactionCounts = [(reaction, 10)].into_iter().collect();
            Ok(ReactionResponse {
                counts: Some(counts),
                user_reaction: Some(reaction),
            })
        }
    }

    struct FailingApi;

    #[async_trait]
    impl ReactionApi for FailingApi {
        async fn submit_reaction(&self, _: i64, _: ReactionType) -> Result<ReactionResponse> {
            Err(InkpostError::Api {
                status: 503,
                message: "unavailable".into(),
            })
        }
    }

    /// Holds every request until released.
    struct GatedApi {
        gate: Notify,
    }

    #[async_trait]
    impl ReactionApi for GatedApi {
        async fn submit_reaction(
            &self,
            _item_id: i64,
            _reaction: ReactionType,
        ) -> Result<ReactionResponse> {
            self.gate.notified().await;
            Ok(ReactionResponse::default())
        }
    }

    fn viewer() -> User {
        User::new(1, "reader", Role::User)
    }

    #[tokio::test]
    async fn test_click_applies_optimistically_then_confirms() {
        let mut board = ReactionBoard::new();
        board.mount(7, ReactionState::default());
        let user = viewer();

        board
            .click(Some(&user), 7, ReactionType::Love, Arc::new(EchoApi))
            .unwrap();
        assert_eq!(board.state(7).unwrap().counts.get(ReactionType::Love), 1);
        assert!(board.is_pending(7));

        let (item_id, settled) = board.next_settled().await.unwrap();
        assert_eq!((item_id, settled), (7, Some(Settled::Confirmed)));
        assert_eq!(board.state(7).unwrap().counts.get(ReactionType::Love), 10);
    }

    #[tokio::test]
    async fn test_failed_click_rolls_back() {
        let mut board = ReactionBoard::new();
        let initial = ReactionState::new(
            [(ReactionType::Like, 3)].into_iter().collect(),
            None,
        );
        board.mount(7, initial.clone());
        let user = viewer();

        board
            .click(Some(&user), 7, ReactionType::Love, Arc::new(FailingApi))
            .unwrap();
        let (_, settled) = board.next_settled().await.unwrap();
        assert_eq!(settled, Some(Settled::RolledBack));
        assert_eq!(board.state(7), Some(&initial));
    }

    #[tokio::test]
    async fn test_result_after_unmount_is_dropped() {
        let mut board = ReactionBoard::new();
        board.mount(7, ReactionState::default());
        board.mount(8, ReactionState::default());
        let user = viewer();

        board
            .click(Some(&user), 7, ReactionType::Sad, Arc::new(EchoApi))
            .unwrap();
        board.unmount(7);

        let (item_id, settled) = board.next_settled().await.unwrap();
        assert_eq!(item_id, 7);
        assert_eq!(settled, None);
        assert_eq!(board.state(8), Some(&ReactionState::default()));
    }

    #[tokio::test]
    async fn test_other_items_stay_interactive_while_one_is_pending() {
        let mut board = ReactionBoard::new();
        board.mount(1, ReactionState::default());
        board.mount(2, ReactionState::default());
        let user = viewer();
        let gated = Arc::new(GatedApi {
            gate: Notify::new(),
        });

        board
            .click(Some(&user), 1, ReactionType::Like, gated.clone())
            .unwrap();
        board
            .click(Some(&user), 2, ReactionType::Wow, Arc::new(EchoApi))
            .unwrap();

        let (item_id, settled) = board.next_settled().await.unwrap();
        assert_eq!((item_id, settled), (2, Some(Settled::Confirmed)));
        assert!(board.is_pending(1));

        gated.gate.notify_one();
        let (item_id, settled) = board.next_settled().await.unwrap();
        assert_eq!((item_id, settled), (1, Some(Settled::Confirmed)));
        assert!(!board.is_pending(1));
    }

    #[tokio::test]
    async fn test_click_signed_out_or_unmounted_is_refused() {
        let mut board = ReactionBoard::new();
        board.mount(1, ReactionState::default());
        let user = viewer();

        assert!(matches!(
            board.click(None, 1, ReactionType::Like, Arc::new(EchoApi)),
            Err(InkpostError::NotAuthenticated)
        ));
        assert!(matches!(
            board.click(Some(&user), 99, ReactionType::Like, Arc::new(EchoApi)),
            Err(InkpostError::NotFound(_))
        ));
        assert!(board.drain().is_empty());
    }

    /// Fails every request once released.
    struct GatedFailingApi {
        gate: Notify,
    }

    #[async_trait]
    impl ReactionApi for GatedFailingApi {
        async fn submit_reaction(&self, _: i64, _: ReactionType) -> Result<ReactionResponse> {
            self.gate.notified().await;
            Err(InkpostError::Api {
                status: 500,
                message: "boom".into(),
            })
        }
    }

    #[tokio::test]
    async fn test_late_failure_from_previous_mount_leaves_new_mount_alone() {
        let mut board = ReactionBoard::new();
        let user = viewer();
        board.mount(
            7,
            ReactionState::new([(ReactionType::Like, 3)].into_iter().collect(), None),
        );
        let failing = Arc::new(GatedFailingApi {
            gate: Notify::new(),
        });
        board
            .click(Some(&user), 7, ReactionType::Love, failing.clone())
            .unwrap();

        board.unmount(7);
        board.mount(
            7,
            ReactionState::new(
                [(ReactionType::Like, 3), (ReactionType::Love, 1)]
                    .into_iter()
                    .collect(),
                None,
            ),
        );
        let silent = Arc::new(GatedApi {
            gate: Notify::new(),
        });
        board
            .click(Some(&user), 7, ReactionType::Wow, silent.clone())
            .unwrap();
        let displayed = board.state(7).unwrap().clone();
        assert_eq!(displayed.counts.get(ReactionType::Wow), 1);
        assert_eq!(displayed.user_reaction, Some(ReactionType::Wow));

        failing.gate.notify_one();
        let (item_id, settled) = board.next_settled().await.unwrap();
        assert_eq!((item_id, settled), (7, Some(Settled::Stale)));
        assert_eq!(board.state(7), Some(&displayed));
        assert!(board.is_pending(7));
    }

    #[tokio::test]
    async fn test_remount_rejects_superseded_ticket() {
        let mut board = ReactionBoard::new();
        let user = viewer();
        board.mount(3, ReactionState::default());
        let gated = Arc::new(GatedApi {
            gate: Notify::new(),
        });
        board
            .click(Some(&user), 3, ReactionType::Haha, gated.clone())
            .unwrap();

        let refreshed = ReactionState::new([(ReactionType::Sad, 2)].into_iter().collect(), None);
        board.remount(3, refreshed.clone());

        gated.gate.notify_one();
        let (_, settled) = board.next_settled().await.unwrap();
        assert_eq!(settled, Some(Settled::Stale));
        assert_eq!(board.state(3), Some(&refreshed));
    }

    #[test]
    fn test_mount_keeps_existing_state() {
        let mut board = ReactionBoard::new();
        board.mount(1, ReactionState::default());
        let seeded = ReactionState::new([(ReactionType::Like, 1)].into_iter().collect(), None);
        board.mount(1, seeded.clone());
        assert_eq!(board.state(1), Some(&ReactionState::default()));

        board.remount(1, seeded.clone());
        assert_eq!(board.state(1), Some(&seeded));

        board.retain(|id| id != 1);
        assert!(!board.is_mounted(1));
    }
}
