//! End-to-end tests for roadmap generation against a real database with a
//! scripted model.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use pathwise_core::generation::{GenerationClient, GenerationError};
use pathwise_core::roadmap::{RoadmapStore, SchemaProblem};
use pathwise_core::{
    GenerationSession, GenerationStatus, RoadmapError, RoadmapRequest, generate_roadmap,
};
use pathwise_db::PersistenceError;
use pathwise_test_utils::TestDb;

const THREE_STEPS: &str = r#"```json
{
  "title": "Learn <script>alert(1)</script>Go",
  "description": "A hands-on path into Go.",
  "steps": [
    {"title": "Tour of Go", "description": "Finish the tour.", "resources": ["https://go.dev/tour"]},
    {"title": "Build a CLI", "description": "Use the flag package.", "resources": ["javascript:alert(1)", "Go by Example"]},
    {"title": "Write a web service", "description": "net/http and JSON."}
  ]
}
```"#;

/// Returns a fixed reply and counts calls.
struct ScriptedClient {
    reply: Result<String, u16>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn ok(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_owned()),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(GenerationError::Service {
                status: *status,
                body: "unavailable".into(),
            }),
        }
    }
}

/// Holds its reply until released, so a test can cancel mid-flight.
struct GatedClient {
    reply: String,
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl GenerationClient for GatedClient {
    fn name(&self) -> &str {
        "gated"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(self.reply.clone())
    }
}

fn go_request() -> RoadmapRequest {
    RoadmapRequest::parse(
        "learn Go",
        "Beginner",
        "5 to 10 hours per week",
        "Hands-on projects",
    )
    .unwrap()
}

async fn roadmap_count(store: &RoadmapStore) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM roadmaps")
        .fetch_one(store.pool())
        .await
        .unwrap()
}

#[tokio::test]
async fn three_step_response_is_persisted_for_the_caller() {
    let db = TestDb::new().await;
    let store = RoadmapStore::new(db.pool.clone());
    let client = ScriptedClient::ok(THREE_STEPS);

    let roadmap = generate_roadmap(
        &client,
        &store,
        "user-42",
        &go_request(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(roadmap.steps().len(), 3);
    assert_eq!(roadmap.owner_id, "user-42");
    assert_eq!(roadmap.title, "Learn Go");
    assert_eq!(roadmap.steps()[1].resources, vec!["Go by Example".to_string()]);
    assert!(roadmap.steps()[2].resources.is_empty());

    let stored = store.get(roadmap.id).await.unwrap();
    assert_eq!(stored, roadmap);

    let listed = store.list_by_owner("user-42").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].step_count, 3);
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);

    db.teardown().await;
}

#[tokio::test]
async fn prose_response_is_a_parse_error_and_nothing_is_stored() {
    let db = TestDb::new().await;
    let store = RoadmapStore::new(db.pool.clone());
    let prose = "Sure! Here is a roadmap: first learn the basics, then build things.";
    let client = ScriptedClient::ok(prose);

    let err = generate_roadmap(
        &client,
        &store,
        "user-42",
        &go_request(),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    match err {
        RoadmapError::Parse(parse) => assert_eq!(parse.raw, prose),
        other => panic!("expected parse error, got {other:?}"),
    }
    assert_eq!(roadmap_count(&store).await, 0);

    db.teardown().await;
}

#[tokio::test]
async fn missing_steps_is_a_schema_error() {
    let db = TestDb::new().await;
    let store = RoadmapStore::new(db.pool.clone());
    let client = ScriptedClient::ok(r#"{"title": "Go", "description": "d"}"#);

    let err = generate_roadmap(
        &client,
        &store,
        "user-42",
        &go_request(),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    match err {
        RoadmapError::Schema(schema) => {
            assert_eq!(schema.path, "steps");
            assert_eq!(schema.problem, SchemaProblem::Missing);
        }
        other => panic!("expected schema error, got {other:?}"),
    }
    assert_eq!(roadmap_count(&store).await, 0);

    db.teardown().await;
}

#[tokio::test]
async fn service_failure_is_not_retried() {
    let db = TestDb::new().await;
    let store = RoadmapStore::new(db.pool.clone());
    let client = ScriptedClient::failing(503);

    let err = generate_roadmap(
        &client,
        &store,
        "user-42",
        &go_request(),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        RoadmapError::Generation(GenerationError::Service { status: 503, .. })
    ));
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    assert_eq!(roadmap_count(&store).await, 0);

    db.teardown().await;
}

#[tokio::test]
async fn blank_owner_is_unauthenticated_and_model_is_not_called() {
    let db = TestDb::new().await;
    let store = RoadmapStore::new(db.pool.clone());
    let client = ScriptedClient::ok(THREE_STEPS);

    let err = generate_roadmap(&client, &store, "  ", &go_request(), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, RoadmapError::Unauthenticated));
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);

    db.teardown().await;
}

#[tokio::test]
async fn response_after_cancellation_is_dropped() {
    let db = TestDb::new().await;
    let store = RoadmapStore::new(db.pool.clone());
    let client = Arc::new(GatedClient {
        reply: THREE_STEPS.to_owned(),
        entered: Notify::new(),
        release: Notify::new(),
    });
    let cancel = CancellationToken::new();

    let task = {
        let client = client.clone();
        let store = store.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            generate_roadmap(client.as_ref(), &store, "user-42", &go_request(), &cancel).await
        })
    };

    client.entered.notified().await;
    cancel.cancel();
    client.release.notify_one();

    let result = task.await.unwrap();
    assert!(matches!(result, Err(RoadmapError::Cancelled)));
    assert_eq!(roadmap_count(&store).await, 0);

    db.teardown().await;
}

#[tokio::test]
async fn duplicate_insert_is_a_conflict() {
    let db = TestDb::new().await;
    let store = RoadmapStore::new(db.pool.clone());
    let client = ScriptedClient::ok(THREE_STEPS);

    let roadmap = generate_roadmap(
        &client,
        &store,
        "user-42",
        &go_request(),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    let err = store.create(&roadmap).await.unwrap_err();
    assert!(matches!(err, PersistenceError::Conflict(id) if id == roadmap.id));

    db.teardown().await;
}

#[tokio::test]
async fn session_publishes_success() {
    let db = TestDb::new().await;
    let store = RoadmapStore::new(db.pool.clone());
    let client = Arc::new(ScriptedClient::ok(THREE_STEPS));

    let session = GenerationSession::start(client, store.clone(), "user-7".into(), go_request());
    let status = session.wait().await;

    let GenerationStatus::Succeeded(roadmap) = status else {
        panic!("expected success, got {status:?}");
    };
    assert_eq!(roadmap.owner_id, "user-7");
    assert_eq!(store.get(roadmap.id).await.unwrap().steps().len(), 3);

    db.teardown().await;
}

#[tokio::test]
async fn session_reports_generic_message_on_bad_output() {
    let db = TestDb::new().await;
    let store = RoadmapStore::new(db.pool.clone());
    let client = Arc::new(ScriptedClient::ok("<b>not json</b>"));

    let session = GenerationSession::start(client, store.clone(), "user-7".into(), go_request());

    assert_eq!(
        session.wait().await,
        GenerationStatus::Failed("Failed to generate a roadmap. Please try again.".into())
    );
    assert_eq!(roadmap_count(&store).await, 0);

    db.teardown().await;
}

/// A store whose pool is already closed, so every write fails.
async fn unreachable_store() -> RoadmapStore {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgresql://localhost:5432/pathwise_unreachable")
        .unwrap();
    pool.close().await;
    RoadmapStore::new(pool)
}

#[tokio::test]
async fn storage_failure_after_generation_is_a_hard_failure() {
    let store = unreachable_store().await;
    let client = ScriptedClient::ok(THREE_STEPS);

    let result = generate_roadmap(
        &client,
        &store,
        "user-42",
        &go_request(),
        &CancellationToken::new(),
    )
    .await;

    match result {
        Err(RoadmapError::Persistence(_)) => {}
        other => panic!("expected a persistence error, got {other:?}"),
    }
    assert_eq!(client.calls.load(Ordering::SeqCst), 1, "no retry after a storage failure");
}

#[tokio::test]
async fn session_reports_storage_failure() {
    let store = unreachable_store().await;
    let client = Arc::new(ScriptedClient::ok(THREE_STEPS));

    let session = GenerationSession::start(client.clone(), store, "user-7".into(), go_request());

    assert_eq!(
        session.wait().await,
        GenerationStatus::Failed("Could not save your changes. Please try again.".into())
    );
    assert_eq!(client.calls.load(Ordering::SeqCst), 1);
}
