//! Component-side bindings onto store fields.
//!
//! # Responsibility
//! - Mirror store fields into component-local state while mounted.
//! - Release every subscription exactly once on unmount.
//!
//! # Invariants
//! - A field name is bound at most once per adapter.
//! - Mirrors are written only by subscription callbacks; after unmount no
//!   store notification reaches them.
//! - Dropping an adapter unmounts it.

mod domains;

pub use domains::{
    ChatHook, CrewsHook, DocumentsHook, DsaHook, FlashcardsHook, HookedStore, InitialLoad,
    MindMapsHook, NotesHook, StoreHook,
};

use crate::model::Resource;
use crate::observable::{Observable, Subscription};
use crate::store::RemoteStore;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    /// The field already has a live binding on this adapter.
    AlreadyBound(&'static str),
    /// The adapter was unmounted and accepts no new bindings.
    Unmounted,
}

impl Display for HookError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyBound(field) => write!(f, "field `{field}` is already bound"),
            Self::Unmounted => write!(f, "hook adapter is unmounted"),
        }
    }
}

impl Error for HookError {}

/// Set of live subscriptions owned by one mounted component.
#[derive(Debug, Default)]
pub struct HookAdapter {
    bindings: Vec<(&'static str, Subscription)>,
    unmounted: bool,
}

impl HookAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `sink` to `observable` under `field`.
    ///
    /// The sink receives the current value before this returns.
    ///
    /// # Errors
    /// - `AlreadyBound` when `field` was bound before.
    /// - `Unmounted` after [`Self::unmount`].
    pub fn bind<T, F>(
        &mut self,
        field: &'static str,
        observable: &Observable<T>,
        sink: F,
    ) -> Result<(), HookError>
    where
        T: Clone + Send + 'static,
        F: Fn(&T) + Send + Sync + 'static,
    {
        if self.unmounted {
            return Err(HookError::Unmounted);
        }
        if self.bindings.iter().any(|(bound, _)| *bound == field) {
            return Err(HookError::AlreadyBound(field));
        }
        let subscription = observable.subscribe(sink);
        self.bindings.push((field, subscription));
        Ok(())
    }

    /// Disposes every binding. Later calls are no-ops.
    pub fn unmount(&mut self) {
        if self.unmounted {
            return;
        }
        self.unmounted = true;
        let count = self.bindings.len();
        for (_, subscription) in self.bindings.drain(..) {
            subscription.unsubscribe();
        }
        debug!("event=hook_unmount module=hook status=ok bindings={count}");
    }

    pub fn is_mounted(&self) -> bool {
        !self.unmounted
    }

    pub fn bound_fields(&self) -> Vec<&'static str> {
        self.bindings.iter().map(|(field, _)| *field).collect()
    }
}

impl Drop for HookAdapter {
    fn drop(&mut self) {
        self.unmount();
    }
}

struct MirrorState<T> {
    value: T,
    renders: u64,
}

/// Component-local copy of one store field.
///
/// Every write counts as one render.
pub struct Mirror<T> {
    state: Arc<Mutex<MirrorState<T>>>,
}

impl<T> Mirror<T>
where
    T: Clone + Send + 'static,
{
    pub fn new(initial: T) -> Self {
        Self {
            state: Arc::new(Mutex::new(MirrorState {
                value: initial,
                renders: 0,
            })),
        }
    }

    pub fn get(&self) -> T {
        lock(&self.state).value.clone()
    }

    /// Number of writes received so far.
    pub fn renders(&self) -> u64 {
        lock(&self.state).renders
    }

    /// Callback that writes into this mirror, for [`HookAdapter::bind`].
    pub fn writer(&self) -> impl Fn(&T) + Send + Sync + 'static {
        let state = Arc::clone(&self.state);
        move |value: &T| {
            let mut state = lock(&state);
            state.value = value.clone();
            state.renders += 1;
        }
    }
}

impl<T: Clone + Send + Default + 'static> Default for Mirror<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Mirror<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("Mirror")
            .field("value", &state.value)
            .field("renders", &state.renders)
            .finish()
    }
}

/// Mirrors of the five standard fields of a [`RemoteStore`].
#[derive(Debug)]
pub struct RemoteMirrors<R: Resource> {
    pub items: Mirror<Vec<R>>,
    pub current: Mirror<Option<R>>,
    pub loading: Mirror<bool>,
    pub error: Mirror<Option<String>>,
    pub upload_progress: Mirror<u8>,
}

impl<R: Resource> RemoteMirrors<R> {
    /// Binds every standard field of `remote` onto `adapter`.
    ///
    /// # Errors
    /// - Any [`HookError`] from the underlying binds.
    pub fn bind(adapter: &mut HookAdapter, remote: &RemoteStore<R>) -> Result<Self, HookError> {
        let mirrors = Self {
            items: Mirror::default(),
            current: Mirror::default(),
            loading: Mirror::default(),
            error: Mirror::default(),
            upload_progress: Mirror::default(),
        };
        adapter.bind("items", remote.items(), mirrors.items.writer())?;
        adapter.bind("current", remote.current(), mirrors.current.writer())?;
        adapter.bind("loading", remote.loading(), mirrors.loading.writer())?;
        adapter.bind("error", remote.error(), mirrors.error.writer())?;
        adapter.bind(
            "upload_progress",
            remote.upload_progress(),
            mirrors.upload_progress.writer(),
        )?;
        Ok(mirrors)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
