//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `prepdeck_core` linkage.
//! - Optionally list a remote collection (`documents` or `notes`) from the
//!   API named by `PREPDECK_API_URL`.
//!
//! Logs go to `PREPDECK_LOG_DIR` when it is set to an absolute path.

use log::warn;
use prepdeck_core::{default_log_level, init_logging, AppContext, ClientConfig};
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "PREPDECK_LOG_DIR";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    println!("prepdeck_core ping={}", prepdeck_core::ping());
    println!("prepdeck_core version={}", prepdeck_core::core_version());

    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        if let Err(err) = init_logging(default_log_level(), &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let Some(collection) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };
    match list_collection(&collection).await {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            warn!("event=cli_list module=cli status=error collection={collection}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn list_collection(collection: &str) -> Result<Vec<String>, String> {
    let config = ClientConfig::from_env()?;
    println!("api_base_url={}", config.api_base_url);
    let context = AppContext::new(config).map_err(|err| err.to_string())?;

    let (lines, error) = match collection {
        "documents" => {
            let store = context.documents();
            let lines = store
                .fetch_documents()
                .await
                .into_iter()
                .map(|doc| format!("{}\t{}", doc.id, doc.name))
                .collect::<Vec<_>>();
            (lines, store.remote().error().get())
        }
        "notes" => {
            let store = context.notes();
            let lines = store
                .fetch_notes()
                .await
                .into_iter()
                .map(|note| format!("{}\t{}", note.id, note.title))
                .collect::<Vec<_>>();
            (lines, store.remote().error().get())
        }
        other => {
            return Err(format!(
                "unknown collection `{other}`; expected documents|notes"
            ))
        }
    };
    context.dispose();

    match error {
        Some(err) => Err(err),
        None => Ok(lines),
    }
}
