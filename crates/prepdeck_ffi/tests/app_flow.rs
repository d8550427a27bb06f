use prepdeck_ffi::api::{
    app_dispose, app_initialize, chat_send, document_delete, documents_refresh, notes_refresh,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mount(runtime: &tokio::runtime::Runtime, server: &MockServer, verb: &str, route: &str, body: serde_json::Value) {
    runtime.block_on(
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server),
    );
}

#[test]
fn app_lifecycle_over_http() {
    let runtime = tokio::runtime::Runtime::new().expect("test runtime");
    let server = runtime.block_on(MockServer::start());
    mount(
        &runtime,
        &server,
        "GET",
        "/api/v1/documents/all",
        json!({"documents": [{"id": 1, "filename": "cv.pdf", "type": "pdf"}]}),
    );
    mount(
        &runtime,
        &server,
        "GET",
        "/api/notes/all",
        json!({"notes": [{"id": "n1", "title": "Graphs", "content": "**BFS** first"}]}),
    );
    mount(&runtime, &server, "GET", "/api/flashcards/all", json!({"decks": []}));
    mount(&runtime, &server, "DELETE", "/api/v1/documents/1", json!({"ok": true}));
    mount(
        &runtime,
        &server,
        "POST",
        "/api/v1/chat/1/message",
        json!({"response": "Start with BFS."}),
    );

    let before = documents_refresh();
    assert!(!before.ok);
    assert!(before.message.contains("app_initialize"));

    let base_url = format!("{}/api", server.uri());
    let init = app_initialize(Some(base_url.clone()));
    assert!(init.ok, "{}", init.message);
    assert_eq!((init.documents, init.notes, init.decks), (1, 1, 0));

    let again = app_initialize(Some(base_url));
    assert!(again.ok);
    assert_eq!(again.message, "App already initialized.");

    let notes = notes_refresh();
    assert!(notes.ok, "{}", notes.message);
    assert_eq!(notes.items[0].preview.as_deref(), Some("BFS first"));

    let reply = chat_send("1".to_string(), "Where do I start?".to_string());
    assert!(reply.ok, "{}", reply.message);
    assert_eq!(reply.reply.as_deref(), Some("Start with BFS."));

    let blank = chat_send("1".to_string(), "  ".to_string());
    assert!(!blank.ok);

    let deleted = document_delete("1".to_string());
    assert!(deleted.ok, "{}", deleted.message);
    assert_eq!(deleted.id.as_deref(), Some("1"));

    let missing = document_delete("404".to_string());
    assert!(!missing.ok);
    assert!(missing.message.starts_with("document_delete failed:"));

    assert!(app_dispose().ok);
    assert!(!documents_refresh().ok);
}
