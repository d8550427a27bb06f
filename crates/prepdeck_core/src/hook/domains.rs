//! One hook per store.
//!
//! Every hook is a [`StoreHook`] over a [`HookedStore`]. `mount` binds the
//! store fields; `mount_and_fetch` additionally performs the initial load for
//! stores that implement [`InitialLoad`].

use crate::hook::{HookAdapter, HookError, Mirror, RemoteMirrors};
use crate::model::{
    ChatMessage, Crew, Document, DsaProblem, Flashcard, FlashcardDeck, MindMap, Note,
    ProblemFilters, Resource,
};
use crate::store::{
    ChatStore, CrewStore, DocumentStore, DsaStore, FlashcardStore, MindMapStore, NotesStore,
    RemoteStore,
};
use async_trait::async_trait;
use std::sync::Arc;

/// Store a hook can mount onto.
pub trait HookedStore: Send + Sync + 'static {
    type Record: Resource;
    /// Mirrors for fields beyond the common [`RemoteMirrors`].
    type Extras;

    fn remote_store(&self) -> &RemoteStore<Self::Record>;

    fn bind_extras(&self, adapter: &mut HookAdapter) -> Result<Self::Extras, HookError>;
}

/// Load a screen performs when its hook mounts.
#[async_trait]
pub trait InitialLoad: HookedStore {
    async fn initial_load(&self);
}

/// Mounted view of one store.
pub struct StoreHook<S: HookedStore> {
    store: Arc<S>,
    pub fields: RemoteMirrors<S::Record>,
    pub extras: S::Extras,
    adapter: HookAdapter,
}

impl<S: HookedStore> StoreHook<S> {
    pub fn mount(store: Arc<S>) -> Result<Self, HookError> {
        let mut adapter = HookAdapter::new();
        let fields = RemoteMirrors::bind(&mut adapter, store.remote_store())?;
        let extras = store.bind_extras(&mut adapter)?;
        Ok(Self {
            store,
            fields,
            extras,
            adapter,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_mounted(&self) -> bool {
        self.adapter.is_mounted()
    }

    pub fn unmount(&mut self) {
        self.adapter.unmount();
    }
}

impl<S: InitialLoad> StoreHook<S> {
    pub async fn mount_and_fetch(store: Arc<S>) -> Result<Self, HookError> {
        let hook = Self::mount(store)?;
        hook.store.initial_load().await;
        Ok(hook)
    }
}

macro_rules! plain_store {
    ($store:ty, $record:ty) => {
        impl HookedStore for $store {
            type Record = $record;
            type Extras = ();

            fn remote_store(&self) -> &RemoteStore<$record> {
                self.remote()
            }

            fn bind_extras(&self, _adapter: &mut HookAdapter) -> Result<(), HookError> {
                Ok(())
            }
        }
    };
}

plain_store!(DocumentStore, Document);
plain_store!(ChatStore, ChatMessage);
plain_store!(NotesStore, Note);
plain_store!(MindMapStore, MindMap);
plain_store!(CrewStore, Crew);
plain_store!(DsaStore, DsaProblem);

impl HookedStore for FlashcardStore {
    type Record = FlashcardDeck;
    /// Cards of the open deck.
    type Extras = Mirror<Vec<Flashcard>>;

    fn remote_store(&self) -> &RemoteStore<FlashcardDeck> {
        self.remote()
    }

    fn bind_extras(&self, adapter: &mut HookAdapter) -> Result<Self::Extras, HookError> {
        let flashcards = Mirror::default();
        adapter.bind("flashcards", self.flashcards(), flashcards.writer())?;
        Ok(flashcards)
    }
}

#[async_trait]
impl InitialLoad for DocumentStore {
    async fn initial_load(&self) {
        self.fetch_documents().await;
    }
}

#[async_trait]
impl InitialLoad for NotesStore {
    async fn initial_load(&self) {
        self.fetch_notes().await;
    }
}

#[async_trait]
impl InitialLoad for MindMapStore {
    async fn initial_load(&self) {
        self.fetch_mind_maps().await;
    }
}

#[async_trait]
impl InitialLoad for CrewStore {
    async fn initial_load(&self) {
        self.fetch_crews().await;
    }
}

/// Loads the unfiltered problem list.
#[async_trait]
impl InitialLoad for DsaStore {
    async fn initial_load(&self) {
        self.fetch_problems(&ProblemFilters::default()).await;
    }
}

pub type DocumentsHook = StoreHook<DocumentStore>;
pub type ChatHook = StoreHook<ChatStore>;
pub type NotesHook = StoreHook<NotesStore>;
pub type FlashcardsHook = StoreHook<FlashcardStore>;
pub type MindMapsHook = StoreHook<MindMapStore>;
pub type CrewsHook = StoreHook<CrewStore>;
pub type DsaHook = StoreHook<DsaStore>;

#[cfg(test)]
mod tests {
    use super::{DocumentsHook, DsaHook, FlashcardsHook};
    use crate::config::ClientConfig;
    use crate::store::testing::FakeRest;
    use crate::store::{DocumentStore, DsaStore, FlashcardStore};
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn mounted_hooks_share_one_store() {
        let rest = FakeRest::new();
        rest.respond("GET /v1/documents/all", json!({"documents": [{"id": 1}]}));
        let store = Arc::new(DocumentStore::new(rest.clone(), &ClientConfig::default()));

        let first = DocumentsHook::mount_and_fetch(Arc::clone(&store)).await.unwrap();
        let second = DocumentsHook::mount(Arc::clone(&store)).unwrap();

        assert_eq!(first.fields.items.get().len(), 1);
        assert_eq!(second.fields.items.get().len(), 1, "late mount replays state");
        assert!(!first.fields.loading.get());
    }

    #[tokio::test]
    async fn unmounted_hook_stops_mirroring() {
        let rest = FakeRest::new();
        rest.respond("GET /v1/documents/all", json!([{"id": 1}, {"id": 2}]));
        let store = Arc::new(DocumentStore::new(rest.clone(), &ClientConfig::default()));
        let mut hook = DocumentsHook::mount(Arc::clone(&store)).unwrap();

        hook.unmount();
        hook.store().fetch_documents().await;

        assert!(!hook.is_mounted());
        assert!(hook.fields.items.get().is_empty());
        assert_eq!(store.remote().items().subscriber_count(), 0);
    }

    #[tokio::test]
    async fn flashcards_hook_mirrors_cards() {
        let rest = FakeRest::new();
        rest.respond(
            "GET /flashcards/d",
            json!({"deck": {"id": "d"}, "flashcards": [{"id": "c", "front": "q", "back": "a"}]}),
        );
        let store = Arc::new(FlashcardStore::new(rest.clone(), &ClientConfig::default()));
        let hook = FlashcardsHook::mount(Arc::clone(&store)).unwrap();

        hook.store().fetch_deck(&"d".into()).await;

        assert_eq!(hook.extras.get().len(), 1);
        assert!(hook.fields.current.get().is_some());
    }

    #[tokio::test]
    async fn dsa_hook_loads_unfiltered_problems_on_mount() {
        let rest = FakeRest::new();
        rest.respond(
            "GET /dsa/problems",
            json!([{"id": "two-sum", "title": "Two Sum"}]),
        );
        let store = Arc::new(DsaStore::new(rest.clone(), &ClientConfig::default()));

        let hook = DsaHook::mount_and_fetch(store).await.unwrap();

        assert_eq!(hook.fields.items.get().len(), 1);
        assert_eq!(rest.calls().len(), 1);
    }
}
