/// Client-side registry of card mutations issued but not yet confirmed.
///
/// The store never talks to the network and never decides whether a
/// mutation succeeded. It only records, clears and overlays.
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::confirm::{self, PruneSummary};
use super::fingerprint::ContentFingerprint;
use super::merge::{merge_pending, MergeOutcome};
use super::temp_id;
use crate::config::ReconcileConfig;
use crate::types::{Card, CardDraft, CardList};

/// A locally created card waiting for its server echo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCardInsertion {
    pub card: Card,
    pub fingerprint: ContentFingerprint,
    /// Server card ids already in the target list when this was registered.
    /// None of them can be the echo.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preexisting_ids: Vec<String>,
}

impl PendingCardInsertion {
    pub fn temp_id(&self) -> &str {
        &self.card.id
    }

    pub fn list_id(&self) -> &str {
        &self.card.list_id
    }
}

/// A drag-and-drop move waiting for the server to persist it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCardMove {
    pub card_id: String,
    pub from_list_id: String,
    pub to_list_id: String,
    /// 0-based index in the destination list. Clamped when merged.
    pub position: usize,
}

/// Everything currently in flight, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationState {
    #[serde(default)]
    pub insertions: Vec<PendingCardInsertion>,
    #[serde(default)]
    pub moves: Vec<PendingCardMove>,
}

impl ReconciliationState {
    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty() && self.moves.is_empty()
    }
}

/// Owned by one board view for its lifetime; create on mount, drop on unmount.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationStore {
    config: ReconcileConfig,
    state: ReconciliationState,
    /// list id -> card ids of the last snapshot passed to `observe_snapshot`
    observed: HashMap<String, Vec<String>>,
}

impl ReconciliationStore {
    pub fn new(config: ReconcileConfig) -> Self {
        let config = if config.temp_id_prefix.is_empty() {
            log::warn!("[procura.reconcile.store] Empty temp id prefix, using default");
            ReconcileConfig {
                temp_id_prefix: ReconcileConfig::default().temp_id_prefix,
                ..config
            }
        } else {
            config
        };
        Self {
            config,
            state: ReconciliationState::default(),
            observed: HashMap::new(),
        }
    }

    /// Remember which server cards each list holds. Insertions registered
    /// afterwards never treat those cards as their echo.
    pub fn observe_snapshot(&mut self, server_lists: &[CardList]) {
        self.observed = server_lists
            .iter()
            .map(|l| (l.id.clone(), l.cards.iter().map(|c| c.id.clone()).collect()))
            .collect();
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    pub fn state(&self) -> &ReconciliationState {
        &self.state
    }

    pub fn pending_count(&self) -> usize {
        self.state.insertions.len() + self.state.moves.len()
    }

    pub fn is_temp_id(&self, id: &str) -> bool {
        temp_id::is_temp_id(id, &self.config.temp_id_prefix)
    }

    /// Register a card the user just created. The returned card carries the
    /// temporary id to clear later.
    pub fn add_pending_insertion(&mut self, list_id: &str, draft: CardDraft) -> Card {
        let card = Card {
            id: temp_id::generate_temp_id(&self.config.temp_id_prefix),
            title: draft.title,
            description: draft.description,
            position: draft.position.unwrap_or(0),
            list_id: list_id.to_string(),
            created_by: self.config.placeholder_creator.clone(),
        };
        let fingerprint = ContentFingerprint::of_card(&card.title, card.description.as_deref());
        log::debug!(
            "[procura.reconcile.store] Pending insertion {} into list {}",
            card.id,
            list_id
        );
        let preexisting_ids = self.observed.get(list_id).cloned().unwrap_or_default();
        self.state.insertions.push(PendingCardInsertion {
            card: card.clone(),
            fingerprint,
            preexisting_ids,
        });
        card
    }

    /// Register a move. Earlier moves of the same card are kept; they are
    /// replayed in order at merge time.
    pub fn add_pending_move(
        &mut self,
        card_id: &str,
        from_list_id: &str,
        to_list_id: &str,
        position: usize,
    ) {
        log::debug!(
            "[procura.reconcile.store] Pending move {} {} -> {} @{}",
            card_id,
            from_list_id,
            to_list_id,
            position
        );
        self.state.moves.push(PendingCardMove {
            card_id: card_id.to_string(),
            from_list_id: from_list_id.to_string(),
            to_list_id: to_list_id.to_string(),
            position,
        });
    }

    /// Drop every insertion with this temporary id. Returns how many were removed.
    pub fn clear_pending_insertion(&mut self, temp_id: &str) -> usize {
        let before = self.state.insertions.len();
        self.state.insertions.retain(|p| p.card.id != temp_id);
        before - self.state.insertions.len()
    }

    /// Drop every move of this card. Returns how many were removed.
    pub fn clear_pending_move(&mut self, card_id: &str) -> usize {
        let before = self.state.moves.len();
        self.state.moves.retain(|m| m.card_id != card_id);
        before - self.state.moves.len()
    }

    /// Drop the most recent move equal to `mv`, leaving earlier moves of the
    /// same card in place. Returns whether one was removed.
    pub fn retract_pending_move(&mut self, mv: &PendingCardMove) -> bool {
        match self.state.moves.iter().rposition(|m| m == mv) {
            Some(idx) => {
                self.state.moves.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn clear_all(&mut self) {
        self.state = ReconciliationState::default();
    }

    /// Server snapshot with every pending entry applied on top.
    pub fn merge(&self, server_lists: &[CardList]) -> Vec<CardList> {
        self.merge_with_report(server_lists).lists
    }

    /// Like [`merge`](Self::merge), also reporting the entries that could not be applied.
    pub fn merge_with_report(&self, server_lists: &[CardList]) -> MergeOutcome {
        merge_pending(server_lists, &self.state)
    }

    /// Clear the entries the snapshot already reflects, then observe it.
    pub fn prune_confirmed(&mut self, server_lists: &[CardList]) -> PruneSummary {
        let confirmed = confirm::find_confirmed(server_lists, &self.state, &self.config);
        self.observe_snapshot(server_lists);
        if confirmed.is_empty() {
            return PruneSummary::default();
        }

        let mut summary = PruneSummary::default();
        let mut index = 0;
        self.state.insertions.retain(|p| {
            let keep = !confirmed.insertions.contains(&index);
            index += 1;
            if !keep {
                summary.insertions.push(p.card.id.clone());
            }
            keep
        });
        let mut index = 0;
        self.state.moves.retain(|m| {
            let keep = !confirmed.moves.contains(&index);
            index += 1;
            if !keep {
                summary.moves.push(m.card_id.clone());
            }
            keep
        });

        log::debug!(
            "[procura.reconcile.store] Pruned {} insertions, {} moves confirmed by snapshot",
            summary.insertions.len(),
            summary.moves.len()
        );
        summary
    }
}
