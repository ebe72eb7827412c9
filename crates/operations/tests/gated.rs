//! The confirm-then-execute flow against an in-process mock Director.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use auth::{BOSH_CLIENT, BOSH_CLIENT_SECRET, BOSH_ENVIRONMENT, EnvSource, Resolver, Vars};
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, put};
use confirm::TokenStore;
use director::TaskState;
use operations::{Error, Operations, Outcome, Target, WaitSettings};
use policy::Policy;
use serde_json::json;

#[derive(Default)]
struct Director {
    mutations: AtomicUsize,
    polls: AtomicUsize,
}

type Shared = State<Arc<Director>>;

async fn delete_deployment(State(d): Shared) -> Response {
    d.mutations.fetch_add(1, Ordering::SeqCst);
    (StatusCode::FOUND, [(header::LOCATION, "/tasks/123")]).into_response()
}

async fn job_state(State(d): Shared) -> Response {
    d.mutations.fetch_add(1, Ordering::SeqCst);
    (StatusCode::FOUND, [(header::LOCATION, "/tasks/456")]).into_response()
}

async fn task(State(d): Shared, Path(id): Path<u64>) -> Response {
    let polls = d.polls.fetch_add(1, Ordering::SeqCst) + 1;
    let state = if polls >= 2 { "done" } else { "processing" };
    axum::Json(json!({"id": id, "state": state, "description": "delete deployment cf"}))
        .into_response()
}

/// Task 5 finishes but its result log cannot be served.
async fn task_output(Path(id): Path<u64>) -> Response {
    if id == 5 {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    "{\"deleted\":true}\n".into_response()
}

async fn deployments() -> Response {
    axum::Json(json!([{"name": "cf"}])).into_response()
}

struct Harness {
    ops: Operations,
    director: Arc<Director>,
    tokens: Arc<TokenStore>,
}

async fn harness(policy: Policy, token_ttl: Duration) -> Harness {
    let director = Arc::new(Director::default());
    let app = Router::new()
        .route("/deployments", get(deployments))
        .route("/deployments/{deployment}", delete(delete_deployment))
        .route("/deployments/{deployment}/jobs/{job}", put(job_state))
        .route("/deployments/{deployment}/jobs/{job}/{index}", put(job_state))
        .route("/tasks/{id}", get(task))
        .route("/tasks/{id}/output", get(task_output))
        .with_state(director.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let vars = Vars::from_pairs([
        (BOSH_ENVIRONMENT, format!("http://{addr}")),
        (BOSH_CLIENT, "admin".to_string()),
        (BOSH_CLIENT_SECRET, "secret".to_string()),
    ]);
    let resolver = Arc::new(Resolver::new(vec![Box::new(EnvSource::with_vars(vars))]));
    let tokens = Arc::new(TokenStore::new(token_ttl));
    let ops = Operations::new(resolver, policy, tokens.clone()).with_wait_settings(WaitSettings {
        timeout: Duration::from_secs(5),
        poll_interval: Duration::from_millis(10),
    });

    Harness {
        ops,
        director,
        tokens,
    }
}

async fn default_harness() -> Harness {
    harness(Policy::default(), Duration::from_secs(300)).await
}

fn token_of(outcome: Outcome) -> String {
    match outcome {
        Outcome::ConfirmationRequired(c) => {
            assert!(c.requires_confirmation);
            c.confirmation_token
        }
        other => panic!("expected confirmation request, got {other:?}"),
    }
}

impl Harness {
    fn mutations(&self) -> usize {
        self.director.mutations.load(Ordering::SeqCst)
    }
}

#[tokio::test]
async fn delete_deployment_end_to_end() {
    let h = default_harness().await;

    let first = h.ops.delete_deployment("cf", false, None, None).await.unwrap();
    let value = serde_json::to_value(&first).unwrap();
    assert_eq!(value["requires_confirmation"], true);
    assert_eq!(value["deployment"], "cf");
    assert_eq!(value["expires_in_seconds"], 300);
    assert_eq!(h.mutations(), 0);

    let token = token_of(first);
    let second = h
        .ops
        .delete_deployment("cf", false, None, Some(&token))
        .await
        .unwrap();
    match &second {
        Outcome::Submitted(s) => {
            assert_eq!(s.task_id, 123);
            assert_eq!(s.state, "queued");
        }
        other => panic!("expected submission, got {other:?}"),
    }
    let value = serde_json::to_value(&second).unwrap();
    assert_eq!(value["task_id"], 123);
    assert_eq!(value["state"], "queued");
    assert_eq!(h.mutations(), 1);

    let third = h.ops.delete_deployment("cf", false, None, Some(&token)).await;
    assert!(matches!(third, Err(Error::InvalidToken)));
    assert_eq!(h.mutations(), 1);
}

#[tokio::test]
async fn token_bound_to_job() {
    let h = default_harness().await;

    let token = token_of(
        h.ops
            .stop(Target::job("cf", "router"), None, None)
            .await
            .unwrap(),
    );

    let other_job = h.ops.stop(Target::job("cf", "api"), None, Some(&token)).await;
    assert!(matches!(other_job, Err(Error::InvalidToken)));

    let other_op = h
        .ops
        .recreate(Target::job("cf", "router"), None, Some(&token))
        .await;
    assert!(matches!(other_op, Err(Error::InvalidToken)));
    assert_eq!(h.mutations(), 0);

    // Mismatches leave the token redeemable for its own target.
    let ok = h
        .ops
        .stop(Target::job("cf", "router"), None, Some(&token))
        .await
        .unwrap();
    assert!(matches!(ok, Outcome::Submitted(s) if s.task_id == 456));
}

#[tokio::test]
async fn token_bound_to_instance_index() {
    let h = default_harness().await;
    let target = Target::job("cf", "router").with_index("0");

    let token = token_of(h.ops.recreate(target.clone(), None, None).await.unwrap());
    let wrong = h
        .ops
        .recreate(Target::job("cf", "router").with_index("1"), None, Some(&token))
        .await;
    assert!(matches!(wrong, Err(Error::InvalidToken)));

    let ok = h.ops.recreate(target, None, Some(&token)).await.unwrap();
    assert!(matches!(ok, Outcome::Submitted(_)));
}

#[tokio::test]
async fn blocked_operation_never_mints() {
    let policy = Policy {
        blocked_operations: ["recreate".to_string()].into_iter().collect(),
        ..Policy::default()
    };
    let h = harness(policy, Duration::from_secs(300)).await;

    let without = h.ops.recreate(Target::deployment("cf"), None, None).await;
    assert!(matches!(without, Err(Error::Blocked("recreate"))));

    let with = h
        .ops
        .recreate(Target::deployment("cf"), None, Some("tok_00"))
        .await;
    assert!(matches!(with, Err(Error::Blocked("recreate"))));

    assert!(h.tokens.is_empty());
    assert_eq!(h.mutations(), 0);
}

#[tokio::test]
async fn ungated_operation_executes_directly() {
    let h = default_harness().await;
    let outcome = h
        .ops
        .start(Target::job("cf", "router"), None, None)
        .await
        .unwrap();
    assert!(matches!(outcome, Outcome::Submitted(s) if s.task_id == 456));
    assert!(h.tokens.is_empty());
    assert_eq!(h.mutations(), 1);
}

#[tokio::test]
async fn policy_can_remove_confirmation() {
    let policy = Policy {
        confirm_operations: ["recreate".to_string()].into_iter().collect(),
        ..Policy::default()
    };
    let h = harness(policy, Duration::from_secs(300)).await;

    let outcome = h.ops.delete_deployment("cf", true, None, None).await.unwrap();
    assert!(matches!(outcome, Outcome::Submitted(s) if s.task_id == 123));
}

#[tokio::test]
async fn expired_token_rejected() {
    let h = harness(Policy::default(), Duration::from_millis(20)).await;
    let token = token_of(h.ops.delete_deployment("cf", false, None, None).await.unwrap());

    tokio::time::sleep(Duration::from_millis(60)).await;
    let outcome = h.ops.delete_deployment("cf", false, None, Some(&token)).await;
    assert!(matches!(outcome, Err(Error::InvalidToken)));
    assert_eq!(h.mutations(), 0);
}

#[tokio::test]
async fn index_without_job_is_rejected_before_minting() {
    let h = default_harness().await;
    let target = Target {
        deployment: "cf".into(),
        job: None,
        index: Some("0".into()),
    };
    let outcome = h.ops.stop(target, None, None).await;
    assert!(matches!(outcome, Err(Error::MissingField("job"))));
    assert!(h.tokens.is_empty());
}

#[tokio::test]
async fn minting_needs_no_credentials() {
    let resolver = Arc::new(Resolver::new(vec![Box::new(EnvSource::with_vars(
        Vars::from_pairs(Vec::<(String, String)>::new()),
    ))]));
    let ops = Operations::new(resolver, Policy::default(), Arc::new(TokenStore::default()));

    let token = token_of(ops.delete_deployment("cf", false, None, None).await.unwrap());
    let err = ops
        .delete_deployment("cf", false, None, Some(&token))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Auth(auth::Error::NoCredentials)));
}

#[tokio::test]
async fn task_wait_includes_result_output() {
    let h = default_harness().await;
    let report = h.ops.task_wait(123, None, None).await.unwrap();
    assert_eq!(report.task.state, TaskState::Done);
    assert_eq!(report.output.as_deref(), Some("{\"deleted\":true}\n"));
    assert!(h.director.polls.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn task_wait_survives_missing_result_output() {
    let h = default_harness().await;
    let report = h.ops.task_wait(5, None, None).await.unwrap();
    assert_eq!(report.task.id, 5);
    assert_eq!(report.task.state, TaskState::Done);
    assert_eq!(report.output, None);
}

#[tokio::test]
async fn padded_job_redeems_token_minted_for_trimmed_job() {
    let h = default_harness().await;
    let token = token_of(
        h.ops
            .stop(Target::job("cf", "router").with_index("0"), None, None)
            .await
            .unwrap(),
    );
    let outcome = h
        .ops
        .stop(Target::job("cf", " router ").with_index(" 0"), None, Some(&token))
        .await
        .unwrap();
    match outcome {
        Outcome::Submitted(s) => {
            assert_eq!(s.job.as_deref(), Some("router"));
            assert_eq!(s.index.as_deref(), Some("0"));
        }
        other => panic!("expected submission, got {other:?}"),
    }
    assert_eq!(h.mutations(), 1);
}

#[tokio::test]
async fn read_handlers_require_deployment() {
    let h = default_harness().await;
    assert!(matches!(
        h.ops.vms(" ", None).await,
        Err(Error::MissingField("deployment"))
    ));
    assert_eq!(h.ops.deployments(None).await.unwrap()[0].name, "cf");
}
