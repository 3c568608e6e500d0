/// Board session: one view's reconciliation store paired with the remote service.
///
/// Flow for every user mutation:
///   register pending entry -> call service -> refresh snapshot
///   success: clear the entry once the fresh snapshot is in
///   failure: drop only the entry this call registered and hand the error back
///
/// If the post-success refresh fails, the entry stays pending and is pruned by
/// content on the next successful refresh.
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ReconcileConfig;
use crate::reconcile::{MergeOutcome, PendingCardMove, PruneSummary, ReconciliationStore};
use crate::remote::{CreateCardRequest, MoveCardRequest, RemoteBoardService, RemoteError, TrashedCard};
use crate::types::{Card, CardDraft, CardList};

pub struct BoardSession<S: RemoteBoardService> {
    service: Arc<S>,
    store: ReconciliationStore,
    /// Last snapshot fetched from the service
    snapshot: Vec<CardList>,
    user_id: String,
    /// entry key -> consecutive merge passes it was skipped
    misses: HashMap<String, u32>,
}

impl<S: RemoteBoardService> BoardSession<S> {
    pub fn new(service: Arc<S>, config: ReconcileConfig, user_id: &str) -> Self {
        Self {
            service,
            store: ReconciliationStore::new(config),
            snapshot: Vec::new(),
            user_id: user_id.to_string(),
            misses: HashMap::new(),
        }
    }

    pub fn store(&self) -> &ReconciliationStore {
        &self.store
    }

    pub fn snapshot(&self) -> &[CardList] {
        &self.snapshot
    }

    /// Lists to render: snapshot plus everything still pending.
    pub fn view(&self) -> Vec<CardList> {
        self.store.merge(&self.snapshot)
    }

    pub fn view_with_report(&self) -> MergeOutcome {
        self.store.merge_with_report(&self.snapshot)
    }

    /// Fetch a fresh snapshot and drop pending entries it already reflects.
    pub fn refresh(&mut self) -> Result<PruneSummary, RemoteError> {
        self.snapshot = self.service.fetch_lists()?;
        let summary = self.store.prune_confirmed(&self.snapshot);
        self.track_misses();
        Ok(summary)
    }

    /// Optimistically add a card, then persist it.
    pub fn create_card(&mut self, list_id: &str, draft: CardDraft) -> Result<Card, RemoteError> {
        let position = draft.position;
        let pending = self.store.add_pending_insertion(list_id, draft);
        let request = CreateCardRequest {
            list_id: list_id.to_string(),
            title: pending.title.clone(),
            description: pending.description.clone(),
            position,
            created_by: self.user_id.clone(),
        };

        match self.service.create_card(request) {
            Ok(response) => {
                match self.refresh() {
                    Ok(_) => {
                        self.store.clear_pending_insertion(&pending.id);
                    }
                    Err(e) => log::warn!(
                        "[procura.session.create] {} saved as {} but refresh failed: {}",
                        pending.id,
                        response.card.id,
                        e
                    ),
                }
                Ok(response.card)
            }
            Err(e) => {
                log::warn!(
                    "[procura.session.create] Rolling back {}: {}",
                    pending.id,
                    e
                );
                self.store.clear_pending_insertion(&pending.id);
                Err(e)
            }
        }
    }

    /// Optimistically move a card, then persist the move.
    pub fn move_card(
        &mut self,
        card_id: &str,
        from_list_id: &str,
        to_list_id: &str,
        position: usize,
    ) -> Result<(), RemoteError> {
        self.store
            .add_pending_move(card_id, from_list_id, to_list_id, position);
        let request = MoveCardRequest {
            card_id: card_id.to_string(),
            to_list_id: to_list_id.to_string(),
            position,
        };

        match self.service.move_card(request) {
            Ok(()) => {
                match self.refresh() {
                    Ok(_) => {
                        self.store.clear_pending_move(card_id);
                    }
                    Err(e) => log::warn!(
                        "[procura.session.move] Move of {} saved but refresh failed: {}",
                        card_id,
                        e
                    ),
                }
                Ok(())
            }
            Err(e) => {
                log::warn!("[procura.session.move] Rolling back move of {}: {}", card_id, e);
                // Earlier moves of this card may be saved but not yet seen in a snapshot.
                self.store.retract_pending_move(&PendingCardMove {
                    card_id: card_id.to_string(),
                    from_list_id: from_list_id.to_string(),
                    to_list_id: to_list_id.to_string(),
                    position,
                });
                Err(e)
            }
        }
    }

    pub fn trash_card(&mut self, card_id: &str) -> Result<(), RemoteError> {
        self.service.trash_card(card_id)?;
        self.refresh().map(|_| ())
    }

    pub fn restore_card(&mut self, card_id: &str) -> Result<(), RemoteError> {
        self.service.restore_card(card_id)?;
        self.refresh().map(|_| ())
    }

    pub fn delete_card(&mut self, card_id: &str) -> Result<(), RemoteError> {
        self.service.delete_card(card_id)?;
        self.refresh().map(|_| ())
    }

    pub fn trash(&self) -> Result<Vec<TrashedCard>, RemoteError> {
        self.service.fetch_trash()
    }

    /// Consecutive passes this entry has been skipped (0 when applied last time).
    pub fn miss_count(&self, entry_key: &str) -> u32 {
        self.misses.get(entry_key).copied().unwrap_or(0)
    }

    fn track_misses(&mut self) {
        let threshold = self.store.config().miss_report_threshold;
        let outcome = self.store.merge_with_report(&self.snapshot);
        let mut next = HashMap::new();
        for entry in &outcome.skipped {
            let key = entry.key();
            let count = self.misses.get(&key).copied().unwrap_or(0) + 1;
            if threshold > 0 && count == threshold {
                log::warn!(
                    "[procura.session.reconcile] {} skipped {} merges in a row ({:?})",
                    key,
                    count,
                    entry.reason()
                );
            }
            next.insert(key, count);
        }
        self.misses = next;
    }
}
