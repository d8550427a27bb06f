//! Application-wide store container.
//!
//! # Responsibility
//! - Build one store per resource type over a shared REST client.
//! - Own the start-up loads and the tear-down of pending timers.
//!
//! # Invariants
//! - Constructing a context performs no I/O; loads happen in `initialize`.
//! - `initialize` loads at most once per context.
//! - After `dispose` no upload-progress reset is pending and the context
//!   refuses to initialize.

use crate::api::{ApiError, HttpRestClient, RestClient};
use crate::config::ClientConfig;
use crate::store::{
    ChatStore, CrewStore, DocumentStore, DsaStore, FlashcardStore, MindMapStore, NotesStore,
};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// The HTTP client could not be built.
    Client(ApiError),
    /// The context was disposed.
    Disposed,
}

impl Display for ContextError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Client(err) => write!(f, "{err}"),
            Self::Disposed => write!(f, "app context is disposed"),
        }
    }
}

impl Error for ContextError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Client(err) => Some(err),
            Self::Disposed => None,
        }
    }
}

impl From<ApiError> for ContextError {
    fn from(value: ApiError) -> Self {
        Self::Client(value)
    }
}

/// Collection sizes after the start-up loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitReport {
    pub documents: usize,
    pub notes: usize,
    pub decks: usize,
}

pub struct AppContext {
    config: ClientConfig,
    documents: Arc<DocumentStore>,
    chat: Arc<ChatStore>,
    notes: Arc<NotesStore>,
    flashcards: Arc<FlashcardStore>,
    mind_maps: Arc<MindMapStore>,
    crews: Arc<CrewStore>,
    dsa: Arc<DsaStore>,
    initialized: AtomicBool,
    disposed: AtomicBool,
}

impl AppContext {
    /// Builds a context talking HTTP to `config.api_base_url`.
    ///
    /// # Errors
    /// - `Client` when the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, ContextError> {
        let rest = HttpRestClient::new(&config)?;
        Ok(Self::with_rest(config, Arc::new(rest)))
    }

    /// Builds a context over any REST implementation.
    pub fn with_rest(config: ClientConfig, rest: Arc<dyn RestClient>) -> Self {
        Self {
            documents: Arc::new(DocumentStore::new(Arc::clone(&rest), &config)),
            chat: Arc::new(ChatStore::new(Arc::clone(&rest), &config)),
            notes: Arc::new(NotesStore::new(Arc::clone(&rest), &config)),
            flashcards: Arc::new(FlashcardStore::new(Arc::clone(&rest), &config)),
            mind_maps: Arc::new(MindMapStore::new(Arc::clone(&rest), &config)),
            crews: Arc::new(CrewStore::new(Arc::clone(&rest), &config)),
            dsa: Arc::new(DsaStore::new(rest, &config)),
            config,
            initialized: AtomicBool::new(false),
            disposed: AtomicBool::new(false),
        }
    }

    /// Loads documents, notes and flashcard decks.
    ///
    /// Returns `Ok(None)` when the context was already initialized. Load
    /// failures do not fail initialization; they are left in each store's
    /// `error` field.
    ///
    /// # Errors
    /// - `Disposed` after [`Self::dispose`].
    pub async fn initialize(&self) -> Result<Option<InitReport>, ContextError> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(ContextError::Disposed);
        }
        if self.initialized.swap(true, Ordering::AcqRel) {
            return Ok(None);
        }

        let (documents, notes, decks) = tokio::join!(
            self.documents.fetch_documents(),
            self.notes.fetch_notes(),
            self.flashcards.fetch_decks(),
        );
        let report = InitReport {
            documents: documents.len(),
            notes: notes.len(),
            decks: decks.len(),
        };
        info!(
            "event=context_init module=context status=ok base_url={} documents={} notes={} decks={}",
            self.config.api_base_url, report.documents, report.notes, report.decks
        );
        Ok(Some(report))
    }

    /// Cancels pending timers. Safe to call repeatedly.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.documents.remote().dispose();
        self.chat.remote().dispose();
        self.notes.remote().dispose();
        self.flashcards.remote().dispose();
        self.mind_maps.remote().dispose();
        self.crews.remote().dispose();
        self.dsa.remote().dispose();
        info!("event=context_dispose module=context status=ok");
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn documents(&self) -> &Arc<DocumentStore> {
        &self.documents
    }

    pub fn chat(&self) -> &Arc<ChatStore> {
        &self.chat
    }

    pub fn notes(&self) -> &Arc<NotesStore> {
        &self.notes
    }

    pub fn flashcards(&self) -> &Arc<FlashcardStore> {
        &self.flashcards
    }

    pub fn mind_maps(&self) -> &Arc<MindMapStore> {
        &self.mind_maps
    }

    pub fn crews(&self) -> &Arc<CrewStore> {
        &self.crews
    }

    pub fn dsa(&self) -> &Arc<DsaStore> {
        &self.dsa
    }
}
