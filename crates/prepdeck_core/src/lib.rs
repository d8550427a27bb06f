//! Client-side data layer for PrepDeck.
//! Stores here are the single source of truth for UI state mirrored from the
//! remote API.

pub mod api;
pub mod config;
pub mod context;
pub mod hook;
pub mod logging;
pub mod model;
pub mod observable;
pub mod session;
pub mod store;

pub use api::{ApiError, ApiResult, HttpRestClient, RestClient, UploadFile};
pub use config::{ClientConfig, API_URL_ENV, DEFAULT_API_BASE_URL};
pub use context::{AppContext, ContextError, InitReport};
pub use hook::{HookAdapter, HookError, Mirror, RemoteMirrors};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::{Resource, ResourceId};
pub use observable::{Observable, Subscription};
pub use session::{format_duration, SessionTimer, TimerError, TimerMode};
pub use store::{Endpoints, RemoteStore};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
