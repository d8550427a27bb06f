use prepdeck_core::model::ProblemFilters;
use prepdeck_core::store::{DocumentStore, DsaStore, NotesStore};
use prepdeck_core::{ApiError, AppContext, ClientConfig, HttpRestClient, ResourceId, UploadFile};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{body_json, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::with_base_url(&format!("{}/api/", server.uri()))
        .unwrap()
        .upload_reset_delay(Duration::from_millis(300))
}

fn rest_for(config: &ClientConfig) -> Arc<HttpRestClient> {
    Arc::new(HttpRestClient::new(config).unwrap())
}

#[tokio::test]
async fn subscribers_fire_in_registration_order_before_fetch_returns() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/documents/all"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"documents": [{"id": 1, "name": "cv.pdf"}]})),
        )
        .mount(&server)
        .await;
    let config = config_for(&server);
    let store = DocumentStore::new(rest_for(&config), &config);

    let log = Arc::new(Mutex::new(Vec::new()));
    let sink_a = Arc::clone(&log);
    let _a = store
        .remote()
        .items()
        .subscribe(move |items| sink_a.lock().unwrap().push(("A", items.len())));
    let sink_b = Arc::clone(&log);
    let _b = store
        .remote()
        .items()
        .subscribe(move |items| sink_b.lock().unwrap().push(("B", items.len())));
    log.lock().unwrap().clear();

    let documents = store.fetch_documents().await;

    assert_eq!(documents.len(), 1);
    assert_eq!(*log.lock().unwrap(), vec![("A", 1), ("B", 1)]);
}

#[tokio::test]
async fn create_failure_surfaces_detail_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/notes/create"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "Internal error"})))
        .mount(&server)
        .await;
    let config = config_for(&server);
    let store = NotesStore::new(rest_for(&config), &config);

    let err = store
        .create_notes(&ResourceId::from("1"), "Graphs", "")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Internal error");
    assert_eq!(err.status(), Some(500));
    assert_eq!(store.remote().error().get().as_deref(), Some("Internal error"));
    assert!(!store.remote().loading().get());
}

#[tokio::test]
async fn non_json_error_body_falls_back_to_status_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notes/all"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;
    let config = config_for(&server);
    let store = NotesStore::new(rest_for(&config), &config);

    assert!(store.fetch_notes().await.is_empty());
    assert_eq!(store.remote().error().get().as_deref(), Some("API error: 502"));
}

#[tokio::test]
async fn update_and_delete_round_trip_through_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/notes/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "notes": [{"id": 1, "title": "Arrays"}, {"id": 2, "title": "Graphs"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/notes/1"))
        .and(body_json(json!({"title": "Arrays II"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1, "title": "Arrays II"})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/notes/2"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    let config = config_for(&server);
    let store = NotesStore::new(rest_for(&config), &config);
    store.fetch_notes().await;

    let update = prepdeck_core::model::NoteUpdate {
        title: Some("Arrays II".to_string()),
        ..Default::default()
    };
    store.update_note(&ResourceId::from("1"), &update).await.unwrap();
    assert!(store.delete_note(&ResourceId::from("2")).await.unwrap());

    let titles: Vec<_> = store
        .remote()
        .items()
        .get()
        .into_iter()
        .map(|note| note.title)
        .collect();
    assert_eq!(titles, vec!["Arrays II".to_string()]);
}

#[tokio::test]
async fn upload_streams_multipart_and_resets_progress() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/documents/upload"))
        .and(header_exists("content-type"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "d9", "filename": "cv.pdf"})),
        )
        .mount(&server)
        .await;
    let config = config_for(&server);
    let store = DocumentStore::new(rest_for(&config), &config);

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _progress = store
        .remote()
        .upload_progress()
        .subscribe(move |percent| sink.lock().unwrap().push(*percent));

    let bytes = vec![7_u8; 200 * 1024];
    let document = store
        .upload_document(UploadFile::new("cv.pdf", bytes))
        .await
        .unwrap();

    assert_eq!(document.name, "cv.pdf");
    assert_eq!(store.remote().upload_progress().get(), 100);
    assert_eq!(store.remote().items().get(), vec![document]);
    let values = seen.lock().unwrap().clone();
    assert!(values.windows(2).skip(1).all(|pair| pair[0] <= pair[1]), "{values:?}");

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0].headers.get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"cv.pdf\""));

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(store.remote().upload_progress().get(), 0);
}

#[tokio::test]
async fn failed_upload_still_resets_progress() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/documents/upload"))
        .respond_with(ResponseTemplate::new(413).set_body_json(json!({"message": "file too large"})))
        .mount(&server)
        .await;
    let config = config_for(&server);
    let store = DocumentStore::new(rest_for(&config), &config);

    let err = store
        .upload_document(UploadFile::new("big.pdf", vec![0; 1024]))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "file too large");
    assert_eq!(store.remote().error().get().as_deref(), Some("file too large"));
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(store.remote().upload_progress().get(), 0);
}

#[tokio::test]
async fn problem_filters_reach_the_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/dsa/problems"))
        .and(query_param("category", "graphs"))
        .and(query_param("limit", "5"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "title": "Course Schedule"}])),
        )
        .mount(&server)
        .await;
    let config = config_for(&server);
    let store = DsaStore::new(rest_for(&config), &config);

    let filters = ProblemFilters {
        category: Some("graphs".to_string()),
        limit: Some(5),
        ..ProblemFilters::default()
    };
    let problems = store.fetch_problems(&filters).await;

    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].title, "Course Schedule");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let config = ClientConfig::with_base_url("http://127.0.0.1:9/api")
        .unwrap()
        .request_timeout(Duration::from_secs(2));
    let context = AppContext::new(config).unwrap();

    assert!(context.documents().fetch_documents().await.is_empty());
    let message = context.documents().remote().error().get().unwrap();
    assert!(message.starts_with("network error:"), "{message}");

    let err = context
        .crews()
        .create_crew("Prep", "")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
