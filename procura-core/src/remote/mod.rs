pub mod memory;

use serde::{Deserialize, Serialize};

use crate::types::{Card, CardList};

/// The hosted backend as seen by the board.
/// Implementations: InMemoryBoardService (tests, offline sessions); the
/// production client lives with the application.
pub trait RemoteBoardService: Send + Sync {
    /// All lists in board order, each with its live (non-trashed) cards.
    fn fetch_lists(&self) -> Result<Vec<CardList>, RemoteError>;

    /// Persist a new card. The response carries the server-assigned id.
    fn create_card(&self, request: CreateCardRequest) -> Result<CreateCardResponse, RemoteError>;

    /// Persist a card's new list and position.
    fn move_card(&self, request: MoveCardRequest) -> Result<(), RemoteError>;

    /// Soft-delete: hide the card from the board, keep it restorable.
    fn trash_card(&self, card_id: &str) -> Result<(), RemoteError>;

    /// Bring a trashed card back to its list.
    fn restore_card(&self, card_id: &str) -> Result<(), RemoteError>;

    /// Permanently remove a trashed card.
    fn delete_card(&self, card_id: &str) -> Result<(), RemoteError>;

    /// Cards currently in the trash.
    fn fetch_trash(&self) -> Result<Vec<TrashedCard>, RemoteError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    pub list_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Insert index among the list's live cards; appended when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
    pub created_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardResponse {
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardRequest {
    pub card_id: String,
    pub to_list_id: String,
    pub position: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrashedCard {
    pub card: Card,
    /// RFC 3339 timestamp of the move to trash.
    pub trashed_at: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("List not found: {0}")]
    ListNotFound(String),

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Card {0} is already in the trash")]
    AlreadyTrashed(String),

    #[error("Card {0} is not in the trash")]
    NotTrashed(String),

    #[error("Remote service unavailable: {0}")]
    Unavailable(String),
}
