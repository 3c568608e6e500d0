/// Overlay of pending entries onto a server snapshot.
///
/// Order of application:
/// - clone the snapshot (caller data is never touched)
/// - append pending insertions to their target list, in registration order
/// - replay pending moves in registration order against the already-patched lists
///
/// Anything that references a list or card the snapshot lacks is skipped for
/// this pass and reported. The entry itself stays pending.
use serde::{Deserialize, Serialize};

use super::store::{PendingCardMove, ReconciliationState};
use crate::types::CardList;

/// Result of overlaying pending entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    /// Lists to render.
    pub lists: Vec<CardList>,
    /// Entries that could not be applied on this pass.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SkippedEntry {
    #[serde(rename_all = "camelCase")]
    Insertion { temp_id: String, reason: SkipReason },
    #[serde(rename_all = "camelCase")]
    Move { card_id: String, reason: SkipReason },
}

impl SkippedEntry {
    /// Stable key identifying the pending entry across merge passes.
    pub fn key(&self) -> String {
        match self {
            SkippedEntry::Insertion { temp_id, .. } => format!("insert:{}", temp_id),
            SkippedEntry::Move { card_id, .. } => format!("move:{}", card_id),
        }
    }

    pub fn reason(&self) -> SkipReason {
        match self {
            SkippedEntry::Insertion { reason, .. } | SkippedEntry::Move { reason, .. } => *reason,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkipReason {
    ListMissing,
    SourceListMissing,
    DestinationListMissing,
    CardNotInSource,
}

/// Apply `state` on top of `server_lists`. Pure: same inputs, same output.
pub fn merge_pending(server_lists: &[CardList], state: &ReconciliationState) -> MergeOutcome {
    let mut lists = server_lists.to_vec();
    let mut skipped = Vec::new();

    for pending in &state.insertions {
        match lists.iter_mut().find(|l| l.id == pending.list_id()) {
            Some(list) => list.cards.push(pending.card.clone()),
            None => skipped.push(SkippedEntry::Insertion {
                temp_id: pending.temp_id().to_string(),
                reason: SkipReason::ListMissing,
            }),
        }
    }

    for mv in &state.moves {
        if let Err(reason) = apply_move(&mut lists, mv) {
            skipped.push(SkippedEntry::Move {
                card_id: mv.card_id.clone(),
                reason,
            });
        }
    }

    if !skipped.is_empty() {
        log::debug!(
            "[procura.reconcile.merge] {} pending entries skipped this pass",
            skipped.len()
        );
    }

    MergeOutcome { lists, skipped }
}

fn apply_move(lists: &mut [CardList], mv: &PendingCardMove) -> Result<(), SkipReason> {
    let src = lists
        .iter()
        .position(|l| l.id == mv.from_list_id)
        .ok_or(SkipReason::SourceListMissing)?;
    let dst = lists
        .iter()
        .position(|l| l.id == mv.to_list_id)
        .ok_or(SkipReason::DestinationListMissing)?;
    let card_idx = lists[src]
        .card_index(&mv.card_id)
        .ok_or(SkipReason::CardNotInSource)?;

    let mut card = lists[src].cards.remove(card_idx);
    card.list_id = mv.to_list_id.clone();
    let dest_cards = &mut lists[dst].cards;
    let at = mv.position.min(dest_cards.len());
    dest_cards.insert(at, card);
    Ok(())
}
