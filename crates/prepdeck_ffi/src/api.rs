//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Own the process-wide [`AppContext`] and the runtime that drives it.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures come back as envelopes with `ok = false` and a readable
//!   `message`; read failures carry the store's `error` text.
//! - At most one context is live; replacing it disposes the previous one.

use log::{info, warn};
use prepdeck_core::model::{Document, Note};
use prepdeck_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AppContext, ClientConfig, ResourceId,
};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tokio::runtime::Runtime;

static RUNTIME: OnceLock<Result<Runtime, String>> = OnceLock::new();
static CONTEXT: Mutex<Option<Arc<AppContext>>> = Mutex::new(None);

const NOT_INITIALIZED: &str = "app is not initialized; call app_initialize first";

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Id of the affected resource, when there is one.
    pub id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

/// Result of [`app_initialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppInitResponse {
    pub ok: bool,
    /// Effective API base URL.
    pub api_base_url: String,
    pub documents: u32,
    pub notes: u32,
    pub decks: u32,
    pub message: String,
}

impl AppInitResponse {
    fn failure(api_base_url: String, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            api_base_url,
            documents: 0,
            notes: 0,
            decks: 0,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentItem {
    pub id: String,
    pub name: String,
    pub file_type: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentListResponse {
    pub ok: bool,
    pub items: Vec<DocumentItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: String,
    pub title: String,
    /// Plain-text preview for list rows.
    pub preview: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListResponse {
    pub ok: bool,
    pub items: Vec<NoteItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSendResponse {
    pub ok: bool,
    /// Assistant reply text.
    pub reply: Option<String>,
    /// Assistant reply HTML, when the service renders one.
    pub reply_html: Option<String>,
    pub message: String,
}

/// Builds the app context and runs the start-up loads.
///
/// `api_base_url` overrides `PREPDECK_API_URL`; `None` or blank falls back
/// to the environment and then to the default local backend.
///
/// # FFI contract
/// - Async call (FRB worker thread); performs network I/O.
/// - Repeating with the same base URL keeps the live context.
/// - A different base URL disposes the previous context first.
/// - Never panics.
#[flutter_rust_bridge::frb]
pub fn app_initialize(api_base_url: Option<String>) -> AppInitResponse {
    let config = match resolve_config(api_base_url) {
        Ok(config) => config,
        Err(err) => return AppInitResponse::failure(String::new(), err),
    };
    let base_url = config.api_base_url.clone();

    let live = lock_context()
        .as_ref()
        .filter(|context| context.config().api_base_url == base_url)
        .map(Arc::clone);
    let context = match live {
        Some(context) => context,
        None => {
            let context = match AppContext::new(config) {
                Ok(context) => Arc::new(context),
                Err(err) => return AppInitResponse::failure(base_url, err.to_string()),
            };
            let previous = lock_context().replace(Arc::clone(&context));
            if let Some(previous) = previous {
                previous.dispose();
            }
            context
        }
    };

    match block_on(context.initialize()) {
        Ok(Ok(Some(report))) => {
            info!(
                "event=ffi_app_initialize module=ffi status=ok documents={} notes={} decks={}",
                report.documents, report.notes, report.decks
            );
            AppInitResponse {
                ok: true,
                api_base_url: base_url,
                documents: count_u32(report.documents),
                notes: count_u32(report.notes),
                decks: count_u32(report.decks),
                message: "App initialized.".to_string(),
            }
        }
        Ok(Ok(None)) => AppInitResponse {
            ok: true,
            documents: count_u32(context.documents().remote().items().with(Vec::len)),
            notes: count_u32(context.notes().remote().items().with(Vec::len)),
            decks: count_u32(context.flashcards().remote().items().with(Vec::len)),
            api_base_url: base_url,
            message: "App already initialized.".to_string(),
        },
        Ok(Err(err)) => AppInitResponse::failure(base_url, err.to_string()),
        Err(err) => AppInitResponse::failure(base_url, err),
    }
}

/// Disposes the live context, cancelling its pending timers.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Safe to call when nothing is initialized.
#[flutter_rust_bridge::frb(sync)]
pub fn app_dispose() -> ActionResponse {
    match lock_context().take() {
        Some(context) => {
            context.dispose();
            ActionResponse::success("App disposed.", None)
        }
        None => ActionResponse::success("Nothing to dispose.", None),
    }
}

/// Reloads the document list.
///
/// # FFI contract
/// - Async call; performs network I/O.
/// - On failure `ok = false`, `items` is empty and `message` is the store
///   error.
#[flutter_rust_bridge::frb]
pub fn documents_refresh() -> DocumentListResponse {
    let result = with_context(|context| async move {
        let store = context.documents();
        let documents = store.fetch_documents().await;
        (documents, store.remote().error().get())
    });
    match result {
        Ok((documents, None)) => DocumentListResponse {
            ok: true,
            message: list_message(documents.len()),
            items: documents.into_iter().map(to_document_item).collect(),
        },
        Ok((_, Some(err))) | Err(err) => DocumentListResponse {
            ok: false,
            items: Vec::new(),
            message: err,
        },
    }
}

/// Deletes one document.
///
/// # FFI contract
/// - Async call; performs network I/O.
/// - Returns the deleted id on success.
#[flutter_rust_bridge::frb]
pub fn document_delete(document_id: String) -> ActionResponse {
    let id = ResourceId::new(document_id);
    let target = id.clone();
    let result = with_context(|context| async move {
        context.documents().delete_document(&target).await
    });
    match result {
        Ok(Ok(_)) => ActionResponse::success("Document deleted.", Some(id.to_string())),
        Ok(Err(err)) => {
            warn!("event=ffi_document_delete module=ffi status=error id={id}");
            ActionResponse::failure(format!("document_delete failed: {err}"))
        }
        Err(err) => ActionResponse::failure(err),
    }
}

/// Reloads the notes list.
///
/// # FFI contract
/// - Async call; performs network I/O.
/// - Same failure shape as [`documents_refresh`].
#[flutter_rust_bridge::frb]
pub fn notes_refresh() -> NoteListResponse {
    let result = with_context(|context| async move {
        let store = context.notes();
        let notes = store.fetch_notes().await;
        (notes, store.remote().error().get())
    });
    match result {
        Ok((notes, None)) => NoteListResponse {
            ok: true,
            message: list_message(notes.len()),
            items: notes.into_iter().map(to_note_item).collect(),
        },
        Ok((_, Some(err))) | Err(err) => NoteListResponse {
            ok: false,
            items: Vec::new(),
            message: err,
        },
    }
}

/// Sends a chat message about a document.
///
/// # FFI contract
/// - Async call; performs network I/O.
/// - Blank document id or message fails without a network call.
#[flutter_rust_bridge::frb]
pub fn chat_send(document_id: String, message: String) -> ChatSendResponse {
    let id = ResourceId::new(document_id);
    let result = with_context(|context| async move {
        context.chat().send_message(&id, &message).await
    });
    match result {
        Ok(Ok(reply)) => ChatSendResponse {
            ok: true,
            reply: Some(reply.content),
            reply_html: reply.html_content,
            message: "Reply received.".to_string(),
        },
        Ok(Err(err)) => ChatSendResponse {
            ok: false,
            reply: None,
            reply_html: None,
            message: err.to_string(),
        },
        Err(err) => ChatSendResponse {
            ok: false,
            reply: None,
            reply_html: None,
            message: err,
        },
    }
}

fn resolve_config(api_base_url: Option<String>) -> Result<ClientConfig, String> {
    match api_base_url {
        Some(raw) if !raw.trim().is_empty() => ClientConfig::with_base_url(&raw),
        _ => ClientConfig::from_env(),
    }
}

fn runtime() -> Result<&'static Runtime, String> {
    RUNTIME
        .get_or_init(|| {
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .thread_name("prepdeck-ffi")
                .build()
                .map_err(|err| format!("failed to start async runtime: {err}"))
        })
        .as_ref()
        .map_err(Clone::clone)
}

fn block_on<F: Future>(future: F) -> Result<F::Output, String> {
    Ok(runtime()?.block_on(future))
}

fn with_context<T, F, Fut>(f: F) -> Result<T, String>
where
    F: FnOnce(Arc<AppContext>) -> Fut,
    Fut: Future<Output = T>,
{
    let context = lock_context()
        .as_ref()
        .map(Arc::clone)
        .ok_or_else(|| NOT_INITIALIZED.to_string())?;
    block_on(f(context))
}

fn lock_context() -> MutexGuard<'static, Option<Arc<AppContext>>> {
    CONTEXT.lock().unwrap_or_else(PoisonError::into_inner)
}

fn count_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

fn list_message(count: usize) -> String {
    if count == 0 {
        "No items.".to_string()
    } else {
        format!("Loaded {count} item(s).")
    }
}

fn to_document_item(document: Document) -> DocumentItem {
    DocumentItem {
        id: document.id.to_string(),
        name: document.name,
        file_type: document.file_type,
        status: document.status,
    }
}

fn to_note_item(note: Note) -> NoteItem {
    NoteItem {
        id: note.id.to_string(),
        title: note.title,
        preview: note.preview,
    }
}
