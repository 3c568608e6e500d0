use serde::{Deserialize, Serialize};

/// Prefix carried by every card id minted locally before the server confirms it.
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Creator marker placed on optimistic cards until the server echo replaces them.
pub const PLACEHOLDER_CREATOR: &str = "pending-user";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Persisted ordering hint. The board renders by array order, never by this field.
    #[serde(default)]
    pub position: i64,
    pub list_id: String,
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardList {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl CardList {
    pub fn card_index(&self, card_id: &str) -> Option<usize> {
        self.cards.iter().position(|c| c.id == card_id)
    }
}

/// What the user typed into the "new card" form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDraft {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
}

impl CardDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn at_position(mut self, position: i64) -> Self {
        self.position = Some(position);
        self
    }
}

/// Find a list by id in a board snapshot.
pub fn find_list<'a>(lists: &'a [CardList], list_id: &str) -> Option<&'a CardList> {
    lists.iter().find(|l| l.id == list_id)
}

/// Locate a card anywhere on the board. Returns (list index, card index).
pub fn locate_card(lists: &[CardList], card_id: &str) -> Option<(usize, usize)> {
    lists
        .iter()
        .enumerate()
        .find_map(|(li, list)| list.card_index(card_id).map(|ci| (li, ci)))
}
