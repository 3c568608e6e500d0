/// Detect pending entries that a fresh snapshot already reflects.
///
/// Insertion: the target list holds a server card (non-temporary id) with the
/// same content fingerprint and that was not already in the list when the
/// insertion was registered. Each server card confirms at most one insertion,
/// earliest registration first.
///
/// Move: per card, moves are confirmed as a prefix in registration order. A
/// move counts as confirmed when the card sits in its destination list; a
/// reorder within one list also needs the card at the clamped target index.
/// The first unconfirmed move stops the scan for that card.
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::fingerprint::ContentFingerprint;
use super::store::{PendingCardMove, ReconciliationState};
use super::temp_id::is_temp_id;
use crate::config::ReconcileConfig;
use crate::types::{locate_card, CardList};

/// Ids cleared by a prune pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PruneSummary {
    /// Temporary ids of confirmed insertions.
    pub insertions: Vec<String>,
    /// Card ids of confirmed moves (one per entry, may repeat).
    pub moves: Vec<String>,
}

impl PruneSummary {
    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty() && self.moves.is_empty()
    }
}

/// Indices into the pending sequences.
#[derive(Debug, Default)]
pub(crate) struct ConfirmedEntries {
    pub insertions: Vec<usize>,
    pub moves: Vec<usize>,
}

impl ConfirmedEntries {
    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty() && self.moves.is_empty()
    }
}

pub(crate) fn find_confirmed(
    server_lists: &[CardList],
    state: &ReconciliationState,
    config: &ReconcileConfig,
) -> ConfirmedEntries {
    ConfirmedEntries {
        insertions: confirmed_insertions(server_lists, state, config),
        moves: confirmed_moves(server_lists, &state.moves),
    }
}

fn confirmed_insertions(
    server_lists: &[CardList],
    state: &ReconciliationState,
    config: &ReconcileConfig,
) -> Vec<usize> {
    // (list index, card index) of server cards already used as an echo
    let mut consumed: HashSet<(usize, usize)> = HashSet::new();
    let mut confirmed = Vec::new();

    for (idx, pending) in state.insertions.iter().enumerate() {
        let Some(li) = server_lists.iter().position(|l| l.id == pending.list_id()) else {
            continue;
        };
        let echo = server_lists[li].cards.iter().enumerate().find(|(ci, card)| {
            !consumed.contains(&(li, *ci))
                && !is_temp_id(&card.id, &config.temp_id_prefix)
                && !pending.preexisting_ids.contains(&card.id)
                && ContentFingerprint::of_card(&card.title, card.description.as_deref())
                    == pending.fingerprint
        });
        if let Some((ci, card)) = echo {
            log::debug!(
                "[procura.reconcile.confirm] {} echoed as {}",
                pending.temp_id(),
                card.id
            );
            consumed.insert((li, ci));
            confirmed.push(idx);
        }
    }
    confirmed
}

fn confirmed_moves(server_lists: &[CardList], moves: &[PendingCardMove]) -> Vec<usize> {
    let mut blocked: HashSet<&str> = HashSet::new();
    let mut confirmed = Vec::new();

    for (idx, mv) in moves.iter().enumerate() {
        if blocked.contains(mv.card_id.as_str()) {
            continue;
        }
        if move_reflected(server_lists, mv) {
            confirmed.push(idx);
        } else {
            blocked.insert(mv.card_id.as_str());
        }
    }
    confirmed
}

fn move_reflected(server_lists: &[CardList], mv: &PendingCardMove) -> bool {
    let Some((li, ci)) = locate_card(server_lists, &mv.card_id) else {
        return false;
    };
    let list = &server_lists[li];
    if list.id != mv.to_list_id {
        return false;
    }
    if mv.from_list_id != mv.to_list_id {
        return true;
    }
    // Same-list reorder: list length already includes the card.
    ci == mv.position.min(list.cards.len().saturating_sub(1))
}
