//! Remote-backed resource stores.
//!
//! # Responsibility
//! - Hold the authoritative client-side snapshot of one resource type.
//! - Run mutators against the REST boundary and fan results out through
//!   per-field observables.
//!
//! # Invariants
//! - Every mutator sets `loading = true` and clears `error` before any I/O,
//!   and sets `loading = false` when it completes or its future is dropped.
//! - Reads (`fetch_all`, `fetch_one`) never return an error: failures land in
//!   `error` and the call yields an empty result.
//! - Writes set `error` and also return the failure to the caller.
//! - Field notifications are synchronous: when a mutator resolves, every
//!   subscriber has already observed the new value.
//! - Concurrent mutators are not serialized; the last write to a field wins.
//!
//! # See also
//! - `crate::observable` for the replay contract of each field.

mod chat;
mod crew;
mod document;
mod dsa;
mod flashcard;
mod mindmap;
mod notes;

pub use chat::ChatStore;
pub use crew::CrewStore;
pub use document::DocumentStore;
pub use dsa::DsaStore;
pub use flashcard::{FlashcardStore, DEFAULT_CARD_COUNT};
pub use mindmap::{MindMapStore, DEFAULT_MAX_DEPTH};
pub use notes::NotesStore;

use crate::api::{ApiError, ApiResult, ProgressFn, RestClient, UploadFile};
use crate::config::ClientConfig;
use crate::model::{decode_list, decode_record, Resource, ResourceId};
use crate::observable::Observable;
use log::{debug, info, warn};
use serde_json::Value;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

/// REST paths for one resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// `GET` path returning the collection.
    pub list: String,
    /// Envelope key holding the collection, when the list is wrapped.
    pub list_key: Option<&'static str>,
    /// Prefix for single-record paths (`{item}/{id}`).
    pub item: String,
    /// `POST` path creating a record.
    pub create: String,
    /// Envelope key holding a single record in item/create responses.
    pub record_key: Option<&'static str>,
    /// Multipart upload path, for resources that support uploads.
    pub upload: Option<String>,
}

impl Endpoints {
    /// Endpoints where list and create share `collection` and items live
    /// under `item`.
    pub fn new(collection: impl Into<String>, item: impl Into<String>) -> Self {
        let collection = collection.into();
        Self {
            create: collection.clone(),
            list: collection,
            list_key: None,
            item: item.into(),
            record_key: None,
            upload: None,
        }
    }

    pub fn list_key(mut self, key: &'static str) -> Self {
        self.list_key = Some(key);
        self
    }

    pub fn create_path(mut self, path: impl Into<String>) -> Self {
        self.create = path.into();
        self
    }

    pub fn record_key(mut self, key: &'static str) -> Self {
        self.record_key = Some(key);
        self
    }

    pub fn upload_path(mut self, path: impl Into<String>) -> Self {
        self.upload = Some(path.into());
        self
    }

    pub fn item_path(&self, id: &ResourceId) -> String {
        format!("{}/{}", self.item, id.path_segment())
    }
}

/// Cache of one resource type kept in sync with the REST boundary.
pub struct RemoteStore<R: Resource> {
    rest: Arc<dyn RestClient>,
    endpoints: Endpoints,
    items: Observable<Vec<R>>,
    current: Observable<Option<R>>,
    loading: Observable<bool>,
    error: Observable<Option<String>>,
    upload_progress: Arc<Observable<u8>>,
    reset_delay: Duration,
    reset_task: Mutex<Option<JoinHandle<()>>>,
}

impl<R: Resource> RemoteStore<R> {
    pub fn new(rest: Arc<dyn RestClient>, endpoints: Endpoints, config: &ClientConfig) -> Self {
        Self {
            rest,
            endpoints,
            items: Observable::new(Vec::new()),
            current: Observable::new(None),
            loading: Observable::new(false),
            error: Observable::new(None),
            upload_progress: Arc::new(Observable::new(0)),
            reset_delay: config.upload_reset_delay,
            reset_task: Mutex::new(None),
        }
    }

    pub fn items(&self) -> &Observable<Vec<R>> {
        &self.items
    }

    pub fn current(&self) -> &Observable<Option<R>> {
        &self.current
    }

    pub fn loading(&self) -> &Observable<bool> {
        &self.loading
    }

    pub fn error(&self) -> &Observable<Option<String>> {
        &self.error
    }

    /// Upload progress in whole percent.
    pub fn upload_progress(&self) -> &Observable<u8> {
        &self.upload_progress
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Loads the collection and replaces `items`.
    ///
    /// Returns an empty list on failure; the message is left in `error` and
    /// `items` keeps its previous value.
    pub async fn fetch_all(&self) -> Vec<R> {
        self.fetch_all_with(&[]).await
    }

    /// [`Self::fetch_all`] with query parameters appended to the list path.
    pub async fn fetch_all_with(&self, query: &[(&str, String)]) -> Vec<R> {
        self.read("fetch_all", self.try_fetch_all(query))
            .await
            .unwrap_or_default()
    }

    /// Loads one record and makes it `current`.
    ///
    /// A blank id is rejected without a network call. Returns `None` on any
    /// failure, with the message left in `error`.
    pub async fn fetch_one(&self, id: &ResourceId) -> Option<R> {
        self.read("fetch_one", self.try_fetch_one(id)).await
    }

    /// Creates a record and appends it to `items`.
    ///
    /// # Errors
    /// - Any REST or decode failure; the same message is left in `error`.
    pub async fn create(&self, payload: &Value) -> ApiResult<R> {
        self.write("create", self.try_create(&self.endpoints.create, payload))
            .await
    }

    /// Replaces the record `id` in `items` (and `current` when it matches)
    /// with the server's updated copy.
    ///
    /// # Errors
    /// - `Validation` for a blank id; otherwise any REST or decode failure.
    pub async fn update(&self, id: &ResourceId, payload: &Value) -> ApiResult<R> {
        self.write("update", self.try_update(id, payload)).await
    }

    /// Deletes `id` remotely, then drops every matching element from `items`
    /// and clears `current` if it matched.
    ///
    /// # Errors
    /// - `Validation` for a blank id; otherwise any REST failure.
    pub async fn delete(&self, id: &ResourceId) -> ApiResult<bool> {
        self.write("delete", self.try_delete(id)).await
    }

    /// Uploads `file` as multipart form data and appends the resulting record.
    ///
    /// `upload_progress` follows the bytes handed to the transport, is 100 on
    /// success, and returns to 0 once the configured reset delay has passed
    /// after completion (success, failure, or the future being dropped). A
    /// newer upload cancels the pending reset of an older one.
    ///
    /// # Errors
    /// - `Validation` when this resource has no upload endpoint.
    /// - Any REST or decode failure; the same message is left in `error`.
    pub async fn upload_with_progress(&self, file: UploadFile) -> ApiResult<R> {
        let _loading = self.begin();
        self.cancel_pending_reset();
        self.upload_progress.set(0);
        let _reset = ProgressReset { store: self };
        info!(
            "event=store_upload module=store status=start kind={} bytes={}",
            R::KIND,
            file.len()
        );

        let result = self.try_upload(file).await;
        match &result {
            Ok(record) => {
                self.upload_progress.set(100);
                self.append(record.clone());
                info!(
                    "event=store_upload module=store status=ok kind={} id={}",
                    R::KIND,
                    record.id()
                );
            }
            Err(err) => self.fail("upload", err),
        }
        result
    }

    /// Aborts a pending upload-progress reset and zeroes the progress.
    pub fn dispose(&self) {
        self.cancel_pending_reset();
        self.upload_progress.set(0);
    }

    /// Marks the store busy until the returned guard is dropped.
    pub(crate) fn begin(&self) -> LoadingGuard<'_> {
        self.loading.set(true);
        self.error.set(None);
        LoadingGuard {
            loading: &self.loading,
        }
    }

    /// Records a failed operation in `error`.
    pub(crate) fn fail(&self, op: &str, err: &ApiError) {
        warn!(
            "event=store_op module=store status=error kind={} op={} message={}",
            R::KIND,
            op,
            err.message()
        );
        self.error.set(Some(err.to_string()));
    }

    /// Runs a read: failures are swallowed into `error`.
    pub(crate) async fn read<T, F>(&self, op: &str, operation: F) -> Option<T>
    where
        F: Future<Output = ApiResult<T>>,
    {
        let _loading = self.begin();
        match operation.await {
            Ok(value) => {
                debug!(
                    "event=store_op module=store status=ok kind={} op={}",
                    R::KIND,
                    op
                );
                Some(value)
            }
            Err(err) => {
                self.fail(op, &err);
                None
            }
        }
    }

    /// Runs a write: failures go to `error` and back to the caller.
    pub(crate) async fn write<T, F>(&self, op: &str, operation: F) -> ApiResult<T>
    where
        F: Future<Output = ApiResult<T>>,
    {
        let _loading = self.begin();
        match operation.await {
            Ok(value) => {
                debug!(
                    "event=store_op module=store status=ok kind={} op={}",
                    R::KIND,
                    op
                );
                Ok(value)
            }
            Err(err) => {
                self.fail(op, &err);
                Err(err)
            }
        }
    }

    pub(crate) fn rest(&self) -> &dyn RestClient {
        self.rest.as_ref()
    }

    /// `POST path` and decode the response as one record appended to `items`.
    pub(crate) async fn try_create(&self, path: &str, payload: &Value) -> ApiResult<R> {
        let body = self.rest.post(path, payload).await?;
        let record: R = decode_record(&body, self.endpoints.record_key)?;
        self.append(record.clone());
        Ok(record)
    }

    pub(crate) fn append(&self, record: R) {
        self.items.update(|items| {
            let mut next = items.clone();
            next.push(record);
            next
        });
    }

    /// Swaps in `record` for every element with `id`.
    pub(crate) fn replace(&self, id: &ResourceId, record: &R) {
        self.items.update(|items| {
            items
                .iter()
                .map(|item| {
                    if item.id() == id {
                        record.clone()
                    } else {
                        item.clone()
                    }
                })
                .collect()
        });
        if self.current_is(id) {
            self.current.set(Some(record.clone()));
        }
    }

    /// Drops every element with `id`; returns whether `current` was cleared.
    pub(crate) fn remove(&self, id: &ResourceId) -> bool {
        self.items.update(|items| {
            items
                .iter()
                .filter(|item| item.id() != id)
                .cloned()
                .collect()
        });
        if self.current_is(id) {
            self.current.set(None);
            return true;
        }
        false
    }

    pub(crate) fn current_is(&self, id: &ResourceId) -> bool {
        self.current
            .with(|current| current.as_ref().is_some_and(|item| item.id() == id))
    }

    async fn try_fetch_all(&self, query: &[(&str, String)]) -> ApiResult<Vec<R>> {
        let body = self.rest.get(&self.endpoints.list, query).await?;
        let items: Vec<R> = decode_list(&body, self.endpoints.list_key)?;
        info!(
            "event=store_fetch_all module=store status=ok kind={} count={}",
            R::KIND,
            items.len()
        );
        self.items.set(items.clone());
        Ok(items)
    }

    async fn try_fetch_one(&self, id: &ResourceId) -> ApiResult<R> {
        let id = require_id(R::KIND, id)?;
        let body = self.rest.get(&self.endpoints.item_path(id), &[]).await?;
        let record: R = decode_record(&body, self.endpoints.record_key)?;
        self.current.set(Some(record.clone()));
        Ok(record)
    }

    async fn try_update(&self, id: &ResourceId, payload: &Value) -> ApiResult<R> {
        let id = require_id(R::KIND, id)?;
        let body = self.rest.put(&self.endpoints.item_path(id), payload).await?;
        let record: R = decode_record(&body, self.endpoints.record_key)?;
        self.replace(id, &record);
        Ok(record)
    }

    async fn try_delete(&self, id: &ResourceId) -> ApiResult<bool> {
        let id = require_id(R::KIND, id)?;
        self.rest.delete(&self.endpoints.item_path(id)).await?;
        self.remove(id);
        Ok(true)
    }

    async fn try_upload(&self, file: UploadFile) -> ApiResult<R> {
        let path = self.endpoints.upload.as_deref().ok_or_else(|| {
            ApiError::validation(format!("{} uploads are not supported", R::KIND))
        })?;
        let progress = Arc::clone(&self.upload_progress);
        let sink: ProgressFn = Arc::new(move |percent| progress.set(percent));
        let body = self.rest.upload(path, file, sink).await?;
        Ok(decode_record(&body, self.endpoints.record_key)?)
    }

    fn schedule_progress_reset(&self) {
        let progress = Arc::clone(&self.upload_progress);
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            progress.set(0);
            return;
        };
        let delay = self.reset_delay;
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            progress.set(0);
        });
        if let Some(previous) = lock(&self.reset_task).replace(task) {
            previous.abort();
        }
    }

    fn cancel_pending_reset(&self) {
        if let Some(task) = lock(&self.reset_task).take() {
            task.abort();
        }
    }
}

impl<R: Resource> Drop for RemoteStore<R> {
    fn drop(&mut self) {
        self.cancel_pending_reset();
    }
}

/// Resets `loading` when an operation completes or is abandoned.
pub(crate) struct LoadingGuard<'a> {
    loading: &'a Observable<bool>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.loading.set(false);
    }
}

/// Schedules the upload-progress reset when an upload settles or is
/// abandoned.
struct ProgressReset<'a, R: Resource> {
    store: &'a RemoteStore<R>,
}

impl<R: Resource> Drop for ProgressReset<'_, R> {
    fn drop(&mut self) {
        self.store.schedule_progress_reset();
    }
}

/// Rejects blank ids before any network call.
pub(crate) fn require_id<'a>(kind: &str, id: &'a ResourceId) -> ApiResult<&'a ResourceId> {
    if id.is_blank() {
        return Err(ApiError::validation(format!("{kind} id is required")));
    }
    Ok(id)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
pub(crate) mod testing;
