//! Flashcard decks and the cards of the open deck.
//!
//! # Invariants
//! - `flashcards` always holds the cards of `current` (empty when no deck is
//!   open).

use crate::api::{ApiResult, RestClient};
use crate::config::ClientConfig;
use crate::model::{DeckDetail, Flashcard, FlashcardDeck, Resource, ResourceId};
use crate::observable::Observable;
use crate::store::{require_id, Endpoints, RemoteStore};
use serde_json::{json, Value};
use std::sync::Arc;

const CARDS_PREFIX: &str = "/flashcards/cards";
pub const DEFAULT_CARD_COUNT: u32 = 10;

pub struct FlashcardStore {
    remote: RemoteStore<FlashcardDeck>,
    flashcards: Observable<Vec<Flashcard>>,
}

impl FlashcardStore {
    pub fn new(rest: Arc<dyn RestClient>, config: &ClientConfig) -> Self {
        let endpoints = Endpoints::new("/flashcards/all", "/flashcards")
            .list_key("decks")
            .create_path("/flashcards/create")
            .record_key("deck");
        Self {
            remote: RemoteStore::new(rest, endpoints, config),
            flashcards: Observable::new(Vec::new()),
        }
    }

    pub fn remote(&self) -> &RemoteStore<FlashcardDeck> {
        &self.remote
    }

    /// Cards of the currently open deck.
    pub fn flashcards(&self) -> &Observable<Vec<Flashcard>> {
        &self.flashcards
    }

    pub async fn fetch_decks(&self) -> Vec<FlashcardDeck> {
        self.remote.fetch_all().await
    }

    /// Opens a deck: sets `current` and replaces `flashcards`.
    pub async fn fetch_deck(&self, id: &ResourceId) -> Option<DeckDetail> {
        self.remote.read("fetch_deck", self.try_fetch_deck(id)).await
    }

    /// Generates a deck of `count` cards from a document.
    pub async fn create_deck(
        &self,
        document_id: &ResourceId,
        title: &str,
        topic: &str,
        count: u32,
    ) -> ApiResult<DeckDetail> {
        let payload = json!({
            "document_id": document_id,
            "title": title,
            "topic": topic,
            "count": count,
        });
        self.remote
            .write("create_deck", self.try_create_deck(&payload))
            .await
    }

    /// Deletes a deck; closing it first when it is the open one.
    pub async fn delete_deck(&self, id: &ResourceId) -> ApiResult<bool> {
        self.remote.write("delete_deck", self.try_delete_deck(id)).await
    }

    /// Updates one card of the open deck.
    pub async fn update_flashcard(&self, card_id: &ResourceId, updates: &Value) -> ApiResult<Flashcard> {
        self.remote
            .write("update_flashcard", self.try_update_card(card_id, updates))
            .await
    }

    async fn try_fetch_deck(&self, id: &ResourceId) -> ApiResult<DeckDetail> {
        let id = require_id(FlashcardDeck::KIND, id)?;
        let body = self
            .remote
            .rest()
            .get(&self.remote.endpoints().item_path(id), &[])
            .await?;
        let detail = DeckDetail::from_json(&body)?;
        self.remote.current().set(Some(detail.deck.clone()));
        self.flashcards.set(detail.flashcards.clone());
        Ok(detail)
    }

    async fn try_create_deck(&self, payload: &Value) -> ApiResult<DeckDetail> {
        let body = self
            .remote
            .rest()
            .post(&self.remote.endpoints().create, payload)
            .await?;
        let detail = if body.get("deck").is_some() {
            DeckDetail::from_json(&body)?
        } else {
            DeckDetail {
                deck: FlashcardDeck::from_json(&body)?,
                flashcards: Vec::new(),
            }
        };
        self.remote.append(detail.deck.clone());
        Ok(detail)
    }

    async fn try_delete_deck(&self, id: &ResourceId) -> ApiResult<bool> {
        let id = require_id(FlashcardDeck::KIND, id)?;
        self.remote
            .rest()
            .delete(&self.remote.endpoints().item_path(id))
            .await?;
        if self.remote.remove(id) {
            self.flashcards.set(Vec::new());
        }
        Ok(true)
    }

    async fn try_update_card(&self, card_id: &ResourceId, updates: &Value) -> ApiResult<Flashcard> {
        let card_id = require_id(Flashcard::KIND, card_id)?;
        let body = self
            .remote
            .rest()
            .put(&format!("{CARDS_PREFIX}/{}", card_id.path_segment()), updates)
            .await?;
        let card = Flashcard::from_json(&body)?;
        self.flashcards.update(|cards| {
            cards
                .iter()
                .map(|existing| {
                    if &existing.id == card_id {
                        card.clone()
                    } else {
                        existing.clone()
                    }
                })
                .collect()
        });
        Ok(card)
    }
}

#[cfg(test)]
mod tests {
    use super::FlashcardStore;
    use crate::config::ClientConfig;
    use crate::model::ResourceId;
    use crate::store::testing::FakeRest;
    use serde_json::json;

    fn deck_detail() -> serde_json::Value {
        json!({
            "deck": {"id": "d1", "title": "Arrays"},
            "flashcards": [
                {"id": "c1", "question": "Two sum?", "answer": "Hash map"},
                {"id": "c2", "front": "Kadane?", "back": "Running max"}
            ]
        })
    }

    #[tokio::test]
    async fn fetch_deck_opens_deck_and_cards() {
        let rest = FakeRest::new();
        rest.respond("GET /flashcards/d1", deck_detail());
        let store = FlashcardStore::new(rest.clone(), &ClientConfig::default());

        let detail = store.fetch_deck(&ResourceId::from("d1")).await.unwrap();

        assert_eq!(detail.deck.card_count, 2);
        assert_eq!(store.remote().current().get(), Some(detail.deck));
        assert_eq!(store.flashcards().get().len(), 2);
    }

    #[tokio::test]
    async fn deleting_open_deck_clears_cards() {
        let rest = FakeRest::new();
        rest.respond("GET /flashcards/d1", deck_detail());
        rest.respond("DELETE /flashcards/d1", json!({"ok": true}));
        let store = FlashcardStore::new(rest.clone(), &ClientConfig::default());
        store.fetch_deck(&ResourceId::from("d1")).await.unwrap();

        assert!(store.delete_deck(&ResourceId::from("d1")).await.unwrap());

        assert_eq!(store.remote().current().get(), None);
        assert!(store.flashcards().get().is_empty());
    }

    #[tokio::test]
    async fn create_deck_appends_wrapped_deck() {
        let rest = FakeRest::new();
        rest.respond("POST /flashcards/create", json!({"deck": {"id": 8, "title": "Graphs", "cardCount": 10}}));
        let store = FlashcardStore::new(rest.clone(), &ClientConfig::default());

        let detail = store
            .create_deck(&ResourceId::from("doc"), "Graphs", "", 10)
            .await
            .unwrap();

        assert_eq!(detail.deck.card_count, 10);
        assert_eq!(store.remote().items().get(), vec![detail.deck]);
        assert_eq!(rest.calls()[0].1["count"], json!(10));
    }

    #[tokio::test]
    async fn update_flashcard_replaces_matching_card() {
        let rest = FakeRest::new();
        rest.respond("GET /flashcards/d1", deck_detail());
        rest.respond(
            "PUT /flashcards/cards/c2",
            json!({"id": "c2", "front": "Kadane?", "back": "Running max", "mastered": true}),
        );
        let store = FlashcardStore::new(rest.clone(), &ClientConfig::default());
        store.fetch_deck(&ResourceId::from("d1")).await.unwrap();

        store
            .update_flashcard(&ResourceId::from("c2"), &json!({"mastered": true}))
            .await
            .unwrap();

        let cards = store.flashcards().get();
        assert!(!cards[0].mastered);
        assert!(cards[1].mastered);
    }
}
