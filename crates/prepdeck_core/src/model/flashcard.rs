//! Flashcard decks and their cards.

use crate::model::{Fields, NormalizeError, Resource, ResourceId};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashcardDeck {
    pub id: ResourceId,
    pub title: String,
    pub document_id: Option<ResourceId>,
    pub topic: Option<String>,
    pub source: Option<String>,
    pub card_count: u64,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Flashcard {
    pub id: ResourceId,
    pub deck_id: Option<ResourceId>,
    pub front: String,
    pub back: String,
    pub mastered: bool,
}

/// Deck plus its cards, as returned by deck detail and deck creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckDetail {
    pub deck: FlashcardDeck,
    pub flashcards: Vec<Flashcard>,
}

impl Resource for FlashcardDeck {
    const KIND: &'static str = "flashcard deck";

    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn from_json(value: &Value) -> Result<Self, NormalizeError> {
        let fields = Fields::of(Self::KIND, value)?;
        let card_count = fields
            .count(&["cardCount", "card_count", "count"])
            .or_else(|| {
                fields
                    .array(&["flashcards", "cards"])
                    .map(|cards| cards.len() as u64)
            })
            .unwrap_or_default();
        Ok(Self {
            id: fields.id()?,
            title: fields.text(&["title", "name"]).unwrap_or_else(|| "Untitled deck".to_string()),
            document_id: fields.id_of(&["document_id", "documentId"]),
            topic: fields.text(&["topic"]),
            source: fields.text(&["source", "document_name"]),
            card_count,
            created_at: fields.text(&["createdAt", "created_at"]),
        })
    }
}

impl Resource for Flashcard {
    const KIND: &'static str = "flashcard";

    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn from_json(value: &Value) -> Result<Self, NormalizeError> {
        let fields = Fields::of(Self::KIND, value)?;
        Ok(Self {
            id: fields.id()?,
            deck_id: fields.id_of(&["deck_id", "deckId"]),
            front: fields.required_text(&["front", "question"], "front")?,
            back: fields.text(&["back", "answer"]).unwrap_or_default(),
            mastered: fields.flag(&["mastered", "is_mastered"]).unwrap_or(false),
        })
    }
}

impl DeckDetail {
    /// Decodes `{deck, flashcards}`.
    pub fn from_json(value: &Value) -> Result<Self, NormalizeError> {
        let deck_json = value.get("deck").ok_or(NormalizeError::MissingField {
            kind: FlashcardDeck::KIND,
            field: "deck",
        })?;
        let flashcards = match value.get("flashcards") {
            Some(Value::Array(cards)) => cards
                .iter()
                .map(Flashcard::from_json)
                .collect::<Result<Vec<_>, _>>()?,
            _ => Vec::new(),
        };
        let mut deck = FlashcardDeck::from_json(deck_json)?;
        if deck.card_count == 0 {
            deck.card_count = flashcards.len() as u64;
        }
        Ok(Self { deck, flashcards })
    }
}
