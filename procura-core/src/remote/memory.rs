/// In-memory board backend.
///
/// Mirrors the hosted service closely enough for sessions and tests:
/// - server-assigned card ids (`card-N`, monotonic)
/// - positions are live-card indices, recomputed on every fetch
/// - trashed cards stay in their list but are hidden from `fetch_lists`
/// - an availability switch to simulate network failures
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{
    CreateCardRequest, CreateCardResponse, MoveCardRequest, RemoteBoardService, RemoteError,
    TrashedCard,
};
use crate::types::{Card, CardList};

const CARD_ID_PREFIX: &str = "card-";

#[derive(Debug, Clone)]
struct StoredCard {
    card: Card,
    trashed_at: Option<String>,
}

impl StoredCard {
    fn is_live(&self) -> bool {
        self.trashed_at.is_none()
    }
}

#[derive(Debug, Clone)]
struct StoredList {
    id: String,
    title: String,
    cards: Vec<StoredCard>,
}

impl StoredList {
    /// Raw vector index for a live-card index; past the end appends.
    fn raw_index_for(&self, live_position: usize) -> usize {
        self.cards
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_live())
            .nth(live_position)
            .map(|(i, _)| i)
            .unwrap_or(self.cards.len())
    }
}

pub struct InMemoryBoardService {
    lists: RwLock<Vec<StoredList>>,
    /// Monotonic card id counter
    next_id: AtomicU64,
    available: AtomicBool,
}

impl Default for InMemoryBoardService {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBoardService {
    pub fn new() -> Self {
        Self {
            lists: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            available: AtomicBool::new(true),
        }
    }

    /// Seed with existing lists. Card ids are kept as given; new ids start
    /// past the highest seeded `card-N`.
    pub fn with_lists(lists: Vec<CardList>) -> Self {
        let highest = lists
            .iter()
            .flat_map(|l| l.cards.iter())
            .filter_map(|c| c.id.strip_prefix(CARD_ID_PREFIX)?.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        let stored = lists
            .into_iter()
            .map(|list| StoredList {
                id: list.id,
                title: list.title,
                cards: list
                    .cards
                    .into_iter()
                    .map(|card| StoredCard {
                        card,
                        trashed_at: None,
                    })
                    .collect(),
            })
            .collect();
        Self {
            lists: RwLock::new(stored),
            next_id: AtomicU64::new(highest + 1),
            available: AtomicBool::new(true),
        }
    }

    pub fn add_list(&self, id: &str, title: &str) -> Result<(), RemoteError> {
        let mut lists = self.write()?;
        if lists.iter().any(|l| l.id == id) {
            return Err(RemoteError::InvalidRequest(format!("duplicate list id {}", id)));
        }
        lists.push(StoredList {
            id: id.to_string(),
            title: title.to_string(),
            cards: Vec::new(),
        });
        Ok(())
    }

    /// Toggle simulated availability. While unavailable every call fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn next_card_id(&self) -> String {
        format!("{}{}", CARD_ID_PREFIX, self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    fn check_available(&self) -> Result<(), RemoteError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RemoteError::Unavailable("service offline".to_string()))
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<StoredList>>, RemoteError> {
        self.check_available()?;
        self.lists
            .read()
            .map_err(|_| RemoteError::Unavailable("board lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<StoredList>>, RemoteError> {
        self.check_available()?;
        self.lists
            .write()
            .map_err(|_| RemoteError::Unavailable("board lock poisoned".to_string()))
    }
}

/// (list index, card index) of a stored card, trashed or not.
fn find_card(lists: &[StoredList], card_id: &str) -> Option<(usize, usize)> {
    lists.iter().enumerate().find_map(|(li, list)| {
        list.cards
            .iter()
            .position(|c| c.card.id == card_id)
            .map(|ci| (li, ci))
    })
}

impl RemoteBoardService for InMemoryBoardService {
    fn fetch_lists(&self) -> Result<Vec<CardList>, RemoteError> {
        let lists = self.read()?;
        Ok(lists
            .iter()
            .map(|list| CardList {
                id: list.id.clone(),
                title: list.title.clone(),
                cards: list
                    .cards
                    .iter()
                    .filter(|c| c.is_live())
                    .enumerate()
                    .map(|(pos, c)| Card {
                        position: pos as i64,
                        ..c.card.clone()
                    })
                    .collect(),
            })
            .collect())
    }

    fn create_card(&self, request: CreateCardRequest) -> Result<CreateCardResponse, RemoteError> {
        if request.title.trim().is_empty() {
            return Err(RemoteError::InvalidRequest("card title is empty".to_string()));
        }
        let mut lists = self.write()?;
        let list = lists
            .iter_mut()
            .find(|l| l.id == request.list_id)
            .ok_or_else(|| RemoteError::ListNotFound(request.list_id.clone()))?;

        let live_count = list.cards.iter().filter(|c| c.is_live()).count();
        let live_position = request
            .position
            .map(|p| (p.max(0) as usize).min(live_count))
            .unwrap_or(live_count);
        let card = Card {
            id: self.next_card_id(),
            title: request.title,
            description: request.description,
            position: live_position as i64,
            list_id: list.id.clone(),
            created_by: request.created_by,
        };
        let raw = list.raw_index_for(live_position);
        list.cards.insert(
            raw,
            StoredCard {
                card: card.clone(),
                trashed_at: None,
            },
        );
        log::info!(
            "[procura.remote.memory] Created {} in list {}",
            card.id,
            card.list_id
        );
        Ok(CreateCardResponse { card })
    }

    fn move_card(&self, request: MoveCardRequest) -> Result<(), RemoteError> {
        let mut lists = self.write()?;
        let dst = lists
            .iter()
            .position(|l| l.id == request.to_list_id)
            .ok_or_else(|| RemoteError::ListNotFound(request.to_list_id.clone()))?;
        let (src, ci) = find_card(&lists, &request.card_id)
            .filter(|&(li, ci)| lists[li].cards[ci].is_live())
            .ok_or_else(|| RemoteError::CardNotFound(request.card_id.clone()))?;

        let mut stored = lists[src].cards.remove(ci);
        stored.card.list_id = request.to_list_id.clone();
        let raw = lists[dst].raw_index_for(request.position);
        lists[dst].cards.insert(raw, stored);
        log::info!(
            "[procura.remote.memory] Moved {} to list {} @{}",
            request.card_id,
            request.to_list_id,
            request.position
        );
        Ok(())
    }

    fn trash_card(&self, card_id: &str) -> Result<(), RemoteError> {
        let mut lists = self.write()?;
        let (li, ci) =
            find_card(&lists, card_id).ok_or_else(|| RemoteError::CardNotFound(card_id.to_string()))?;
        let stored = &mut lists[li].cards[ci];
        if !stored.is_live() {
            return Err(RemoteError::AlreadyTrashed(card_id.to_string()));
        }
        stored.trashed_at = Some(chrono::Utc::now().to_rfc3339());
        Ok(())
    }

    fn restore_card(&self, card_id: &str) -> Result<(), RemoteError> {
        let mut lists = self.write()?;
        let (li, ci) =
            find_card(&lists, card_id).ok_or_else(|| RemoteError::CardNotFound(card_id.to_string()))?;
        let stored = &mut lists[li].cards[ci];
        if stored.is_live() {
            return Err(RemoteError::NotTrashed(card_id.to_string()));
        }
        stored.trashed_at = None;
        Ok(())
    }

    fn delete_card(&self, card_id: &str) -> Result<(), RemoteError> {
        let mut lists = self.write()?;
        let (li, ci) =
            find_card(&lists, card_id).ok_or_else(|| RemoteError::CardNotFound(card_id.to_string()))?;
        if lists[li].cards[ci].is_live() {
            return Err(RemoteError::NotTrashed(card_id.to_string()));
        }
        lists[li].cards.remove(ci);
        log::info!("[procura.remote.memory] Permanently deleted {}", card_id);
        Ok(())
    }

    fn fetch_trash(&self) -> Result<Vec<TrashedCard>, RemoteError> {
        let lists = self.read()?;
        Ok(lists
            .iter()
            .flat_map(|l| l.cards.iter())
            .filter_map(|c| {
                c.trashed_at.as_ref().map(|at| TrashedCard {
                    card: c.card.clone(),
                    trashed_at: at.clone(),
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str, list_id: &str) -> Card {
        Card {
            id: id.to_string(),
            title: id.to_uppercase(),
            description: None,
            position: 0,
            list_id: list_id.to_string(),
            created_by: "u1".to_string(),
        }
    }

    fn seeded() -> InMemoryBoardService {
        InMemoryBoardService::with_lists(vec![
            CardList {
                id: "l1".into(),
                title: "Atas".into(),
                cards: vec![card("a", "l1"), card("b", "l1")],
            },
            CardList {
                id: "l2".into(),
                title: "Pedidos".into(),
                cards: vec![],
            },
        ])
    }

    fn create(title: &str, list_id: &str, position: Option<i64>) -> CreateCardRequest {
        CreateCardRequest {
            list_id: list_id.to_string(),
            title: title.to_string(),
            description: None,
            position,
            created_by: "u1".to_string(),
        }
    }

    fn ids(lists: &[CardList], li: usize) -> Vec<String> {
        lists[li].cards.iter().map(|c| c.id.clone()).collect()
    }

    #[test]
    fn test_create_assigns_server_id_and_appends() {
        let service = seeded();
        let created = service.create_card(create("new", "l1", None)).unwrap().card;
        assert_eq!(created.id, "card-1");
        assert_eq!(created.position, 2);

        let lists = service.fetch_lists().unwrap();
        assert_eq!(ids(&lists, 0), vec!["a", "b", "card-1"]);
    }

    #[test]
    fn test_seeded_server_ids_are_not_reused() {
        let service = InMemoryBoardService::with_lists(vec![CardList {
            id: "l1".into(),
            title: "Atas".into(),
            cards: vec![card("card-2", "l1"), card("card-x", "l1")],
        }]);
        let created = service.create_card(create("new", "l1", None)).unwrap().card;
        assert_eq!(created.id, "card-3");

        let lists = service.fetch_lists().unwrap();
        assert_eq!(ids(&lists, 0), vec!["card-2", "card-x", "card-3"]);
    }

    #[test]
    fn test_create_at_position() {
        let service = seeded();
        service.create_card(create("front", "l1", Some(0))).unwrap();
        let lists = service.fetch_lists().unwrap();
        assert_eq!(lists[0].cards[0].title, "front");
        assert_eq!(lists[0].cards[2].position, 2);
    }

    #[test]
    fn test_create_rejects_unknown_list_and_empty_title() {
        let service = seeded();
        assert!(matches!(
            service.create_card(create("x", "nope", None)),
            Err(RemoteError::ListNotFound(_))
        ));
        assert!(matches!(
            service.create_card(create("  ", "l1", None)),
            Err(RemoteError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_move_card_between_lists() {
        let service = seeded();
        service
            .move_card(MoveCardRequest {
                card_id: "a".into(),
                to_list_id: "l2".into(),
                position: 0,
            })
            .unwrap();
        let lists = service.fetch_lists().unwrap();
        assert_eq!(ids(&lists, 0), vec!["b"]);
        assert_eq!(ids(&lists, 1), vec!["a"]);
        assert_eq!(lists[1].cards[0].list_id, "l2");
    }

    #[test]
    fn test_move_errors() {
        let service = seeded();
        let err = service
            .move_card(MoveCardRequest {
                card_id: "a".into(),
                to_list_id: "ghost".into(),
                position: 0,
            })
            .unwrap_err();
        assert!(matches!(err, RemoteError::ListNotFound(_)));

        let err = service
            .move_card(MoveCardRequest {
                card_id: "zzz".into(),
                to_list_id: "l2".into(),
                position: 0,
            })
            .unwrap_err();
        assert!(matches!(err, RemoteError::CardNotFound(_)));
    }

    #[test]
    fn test_trash_lifecycle() {
        let service = seeded();
        service.trash_card("a").unwrap();
        assert_eq!(ids(&service.fetch_lists().unwrap(), 0), vec!["b"]);
        assert!(matches!(service.trash_card("a"), Err(RemoteError::AlreadyTrashed(_))));

        let trash = service.fetch_trash().unwrap();
        assert_eq!(trash.len(), 1);
        assert_eq!(trash[0].card.id, "a");

        service.restore_card("a").unwrap();
        assert_eq!(ids(&service.fetch_lists().unwrap(), 0), vec!["a", "b"]);
        assert!(matches!(service.restore_card("a"), Err(RemoteError::NotTrashed(_))));
    }

    #[test]
    fn test_delete_requires_trash() {
        let service = seeded();
        assert!(matches!(service.delete_card("a"), Err(RemoteError::NotTrashed(_))));
        service.trash_card("a").unwrap();
        service.delete_card("a").unwrap();
        assert!(service.fetch_trash().unwrap().is_empty());
        assert!(matches!(service.restore_card("a"), Err(RemoteError::CardNotFound(_))));
    }

    #[test]
    fn test_trashed_card_cannot_move() {
        let service = seeded();
        service.trash_card("b").unwrap();
        let err = service
            .move_card(MoveCardRequest {
                card_id: "b".into(),
                to_list_id: "l2".into(),
                position: 0,
            })
            .unwrap_err();
        assert!(matches!(err, RemoteError::CardNotFound(_)));
    }

    #[test]
    fn test_positions_skip_trashed_cards() {
        let service = seeded();
        service.trash_card("a").unwrap();
        service.create_card(create("c", "l1", Some(0))).unwrap();
        let lists = service.fetch_lists().unwrap();
        assert_eq!(lists[0].cards[0].title, "c");
        assert_eq!(lists[0].cards[1].id, "b");
        assert_eq!(lists[0].cards[1].position, 1);
    }

    #[test]
    fn test_unavailable_service_fails_every_call() {
        let service = seeded();
        service.set_available(false);
        assert!(matches!(service.fetch_lists(), Err(RemoteError::Unavailable(_))));
        assert!(matches!(
            service.create_card(create("x", "l1", None)),
            Err(RemoteError::Unavailable(_))
        ));
        service.set_available(true);
        assert_eq!(service.fetch_lists().unwrap().len(), 2);
    }

    #[test]
    fn test_add_list_rejects_duplicate() {
        let service = seeded();
        service.add_list("l3", "AFOs").unwrap();
        assert!(service.add_list("l3", "again").is_err());
        assert_eq!(service.fetch_lists().unwrap()[2].title, "AFOs");
    }
}
