//! Integration tests using mock HTTP server
//!
//! Tests the full flow: config → HTTP requests with backoff → collected
//! records → flattened rows

use api_extractor::config::load_config_from_yaml;
use api_extractor::extract::{MemorySink, RecordingSleeper};
use api_extractor::fetch::HttpFetcher;
use api_extractor::normalize::{flatten_records, normalize_columns, to_table, DEFAULT_SEPARATOR};
use api_extractor::{
    extract, AbortReason, Error, ExtractionController, ExtractionEvent, ExtractorConfig,
    Termination,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> ExtractorConfig {
    ExtractorConfig::new(format!("{}/obras", server.uri()))
        .with_param("pagina", 0)
        .with_param("tamanhoDaPagina", 2)
        .with_inter_request_delay(Duration::from_secs(30))
        .with_backoff_base(Duration::from_secs(30))
}

fn controller(
    config: ExtractorConfig,
) -> (ExtractionController, Arc<RecordingSleeper>, Arc<MemorySink>) {
    let sleeper = Arc::new(RecordingSleeper::new());
    let sink = Arc::new(MemorySink::new());

    let controller = ExtractionController::new(config, HttpFetcher::new().unwrap())
        .unwrap()
        .with_sleeper(sleeper.clone())
        .with_log_sink(sink.clone())
        .with_progress_sink(sink.clone());

    (controller, sleeper, sink)
}

async fn mount_page(server: &MockServer, page: u64, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/obras"))
        .and(query_param("pagina", page.to_string()))
        .and(query_param("tamanhoDaPagina", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn secs(values: &[u64]) -> Vec<Duration> {
    values.iter().map(|s| Duration::from_secs(*s)).collect()
}

// ============================================================================
// Extraction
// ============================================================================

#[tokio::test]
async fn test_extract_all_pages() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        0,
        json!({"totalPages": 2, "content": [{"id": 1}, {"id": 2}]}),
    )
    .await;
    mount_page(&server, 1, json!({"totalPages": 2, "content": [{"id": 3}]})).await;
    mount_page(&server, 2, json!({"totalPages": 2, "content": []})).await;

    let (controller, sleeper, sink) = controller(config(&server));
    let result = controller.run().await;

    assert!(result.is_complete());
    assert_eq!(
        result.records,
        vec![json!({"id": 1}), json!({"id": 2}), json!({"id": 3})]
    );
    assert_eq!(result.metadata, vec![json!({"totalPages": 2}); 3]);
    assert_eq!(result.pages, 2);
    assert_eq!(sleeper.waits(), secs(&[30, 30]));
    assert_eq!(sink.progress().len(), 2);
}

#[tokio::test]
async fn test_retries_service_unavailable() {
    let server = MockServer::start().await;

    // Two 503s take priority over the page until they are used up
    Mock::given(method("GET"))
        .and(path("/obras"))
        .and(query_param("pagina", "1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_page(&server, 0, json!({"content": [{"id": 1}]})).await;
    mount_page(&server, 1, json!({"content": [{"id": 2}]})).await;
    mount_page(&server, 2, json!({"content": []})).await;

    let (controller, sleeper, sink) = controller(config(&server));
    let result = controller.run().await;

    assert_eq!(result.termination, Termination::Done);
    assert_eq!(result.records, vec![json!({"id": 1}), json!({"id": 2})]);
    assert_eq!(sleeper.waits(), secs(&[30, 30, 60, 30]));
    assert_eq!(sink.retry_attempts(), vec![1, 2]);
}

#[tokio::test]
async fn test_rate_limited_until_budget_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/obras"))
        .respond_with(ResponseTemplate::new(429))
        .expect(4)
        .mount(&server)
        .await;

    let (controller, sleeper, _) = controller(config(&server).with_max_attempts(3));
    let result = controller.run().await;

    assert_eq!(
        result.abort_reason(),
        Some(&AbortReason::RetryBudgetExhausted {
            status: 429,
            max_attempts: 3
        })
    );
    assert!(result.records.is_empty());
    assert_eq!(sleeper.waits(), secs(&[30, 60, 90]));
}

#[tokio::test]
async fn test_not_found_aborts_with_partial_data() {
    let server = MockServer::start().await;
    mount_page(&server, 0, json!({"content": [{"id": 1}]})).await;
    Mock::given(method("GET"))
        .and(path("/obras"))
        .and(query_param("pagina", "1"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let (controller, _, sink) = controller(config(&server));
    let result = controller.run().await;

    assert_eq!(
        result.termination,
        Termination::Aborted(AbortReason::Unrecoverable { status: 404 })
    );
    assert_eq!(result.records, vec![json!({"id": 1})]);
    assert_eq!(result.final_cursor, 1);
    assert!(sink
        .events()
        .iter()
        .any(|e| matches!(e, ExtractionEvent::Aborted { .. })));
}

#[tokio::test]
async fn test_invalid_json_aborts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/obras"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let (controller, _, _) = controller(config(&server));
    let result = controller.run().await;

    assert!(matches!(
        result.abort_reason(),
        Some(AbortReason::Transport { .. })
    ));
}

#[tokio::test]
async fn test_missing_cursor_makes_no_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = ExtractorConfig::new(format!("{}/obras", server.uri())).with_param("uf", "DF");
    let err = extract(config).await.unwrap_err();

    assert!(matches!(err, Error::MissingCursorKey { .. }));
}

#[tokio::test]
async fn test_extract_from_yaml_config() {
    let server = MockServer::start().await;
    mount_page(&server, 5, json!({"content": [{"id": 51}]})).await;
    mount_page(&server, 6, json!({"content": []})).await;

    let yaml = format!(
        r"
base_url: {}/obras
initial_params:
  pagina: 5
  tamanhoDaPagina: 2
inter_request_delay_seconds: 0
backoff_base_seconds: 0
",
        server.uri()
    );
    let config = load_config_from_yaml(&yaml).unwrap();

    let result = extract(config).await.unwrap();

    assert!(result.is_complete());
    assert_eq!(result.records, vec![json!({"id": 51})]);
    assert_eq!(result.final_cursor, 6);
}

// ============================================================================
// Extraction → Normalization
// ============================================================================

#[tokio::test]
async fn test_extract_then_flatten() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        0,
        json!({"content": [
            {"idUnico": "A1", "nome": "Escola", "Endereço": {"UF": "DF"}},
            {"idUnico": "B2", "nome": "Posto", "Endereço": {}}
        ]}),
    )
    .await;
    mount_page(&server, 1, json!({"content": []})).await;

    let (controller, _, _) = controller(config(&server));
    let result = controller.run().await;

    let rows = normalize_columns(flatten_records(&result.records, DEFAULT_SEPARATOR));
    let table = to_table(&rows);

    assert_eq!(table.columns, vec!["id_unico", "nome", "endereco_uf", "endereco"]);
    assert_eq!(table.len(), 2);
    assert_eq!(
        table.column("endereco_uf").unwrap(),
        vec![&json!("DF"), &serde_json::Value::Null]
    );
}
