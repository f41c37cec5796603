//! TrackerClient against a mock JSON-RPC endpoint.

use httpmock::prelude::*;
use serde_json::json;
use taskbridge_core::{StageId, StageRef, TaskClient, TaskId, TrackerError, UserMapping};
use taskbridge_tracker::{RetryPolicy, TrackerClient, TrackerConfig, RETRY_ATTEMPT_HEADER};

fn config(server: &MockServer) -> TrackerConfig {
    TrackerConfig::new(&server.url("/rpc"))
        .with_token("tracker-token")
        .with_retry(RetryPolicy::new(3, 1))
}

fn client(server: &MockServer) -> TrackerClient {
    TrackerClient::new(&config(server), StageRef::Id(5)).unwrap()
}

#[tokio::test]
async fn fetch_task_sends_bearer_rpc_request() {
    let server = MockServer::start();
    let rpc = server.mock(|when, then| {
        when.method(POST)
            .path("/rpc")
            .header("authorization", "Bearer tracker-token")
            .body_includes(r#""jsonrpc":"2.0""#)
            .body_includes(r#""method":"task.get""#)
            .body_includes(r#""params":{"id":42}"#);
        then.status(200).json_body(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": {"id": 42, "name": "Ship it", "stage_id": 2}
        }));
    });

    let task = client(&server).fetch_task(TaskId(42)).await.unwrap().unwrap();
    assert_eq!(task.id, TaskId(42));
    assert_eq!(task.name, "Ship it");
    assert_eq!(task.stage_id, Some(StageId(2)));
    rpc.assert_calls(1);
}

#[tokio::test]
async fn fetch_task_null_result_is_absent() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/rpc");
        then.status(200)
            .json_body(json!({"jsonrpc": "2.0", "id": 1, "result": null}));
    });

    let task = client(&server).fetch_task(TaskId(9)).await.unwrap();
    assert!(task.is_none());
}

#[tokio::test]
async fn server_errors_are_retried_until_attempts_run_out() {
    let server = MockServer::start();
    let rpc = server.mock(|when, then| {
        when.method(POST).path("/rpc");
        then.status(503).body("maintenance");
    });

    let err = client(&server).fetch_task(TaskId(1)).await.unwrap_err();
    assert_eq!(
        err,
        TrackerError::Status {
            status: 503,
            body: "maintenance".to_string()
        }
    );
    assert_eq!(rpc.calls(), 3);
}

#[tokio::test]
async fn rate_limit_then_success() {
    let server = MockServer::start();
    let limited = server.mock(|when, then| {
        when.method(POST)
            .path("/rpc")
            .header(RETRY_ATTEMPT_HEADER, "0");
        then.status(429).header("retry-after", "0").body("slow down");
    });
    let accepted = server.mock(|when, then| {
        when.method(POST)
            .path("/rpc")
            .header(RETRY_ATTEMPT_HEADER, "1");
        then.status(200)
            .json_body(json!({"jsonrpc": "2.0", "id": 1, "result": {"id": 77}}));
    });

    let message = client(&server)
        .post_message(TaskId(3), "<p>hi</p>", None)
        .await
        .unwrap();
    assert_eq!(message.0, 77);
    assert_eq!(limited.calls(), 1);
    assert_eq!(accepted.calls(), 1);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start();
    let rpc = server.mock(|when, then| {
        when.method(POST).path("/rpc");
        then.status(401).body("bad token");
    });

    let err = client(&server).fetch_task(TaskId(1)).await.unwrap_err();
    assert!(matches!(err, TrackerError::Status { status: 401, .. }));
    rpc.assert_calls(1);
}

#[tokio::test]
async fn remote_error_is_final() {
    let server = MockServer::start();
    let rpc = server.mock(|when, then| {
        when.method(POST).path("/rpc");
        then.status(200).json_body(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32602, "message": "invalid task"}
        }));
    });

    let err = client(&server)
        .post_message(TaskId(1), "body", None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        TrackerError::Remote {
            code: -32602,
            message: "invalid task".to_string()
        }
    );
    rpc.assert_calls(1);
}

#[tokio::test]
async fn author_lookup_is_cached_per_email() {
    let server = MockServer::start();
    let lookup = server.mock(|when, then| {
        when.method(POST)
            .path("/rpc")
            .body_includes(r#""method":"user.find""#)
            .body_includes(r#""email":"dev@corp.example""#);
        then.status(200)
            .json_body(json!({"jsonrpc": "2.0", "id": 1, "result": {"id": 11}}));
    });
    let post = server.mock(|when, then| {
        when.method(POST)
            .path("/rpc")
            .body_includes(r#""method":"comment.add""#)
            .body_includes(r#""author_id":11"#);
        then.status(200)
            .json_body(json!({"jsonrpc": "2.0", "id": 2, "result": {"id": 1}}));
    });

    let mapping = UserMapping::new().with("dev@users.noreply.example", "dev@corp.example");
    let client = TrackerClient::new(&config(&server), StageRef::Id(5))
        .unwrap()
        .with_user_mapping(mapping);

    for task in [1, 2] {
        client
            .post_message(TaskId(task), "<p>commit</p>", Some("dev@users.noreply.example"))
            .await
            .unwrap();
    }

    lookup.assert_calls(1);
    post.assert_calls(2);
}

#[tokio::test]
async fn unknown_author_falls_back_to_default_identity() {
    let server = MockServer::start();
    let lookup = server.mock(|when, then| {
        when.method(POST)
            .path("/rpc")
            .body_includes(r#""method":"user.find""#);
        then.status(200)
            .json_body(json!({"jsonrpc": "2.0", "id": 1, "result": null}));
    });
    let post = server.mock(|when, then| {
        when.method(POST)
            .path("/rpc")
            .body_includes(r#""method":"comment.add""#)
            .body_includes(r#""author_id":3"#);
        then.status(200)
            .json_body(json!({"jsonrpc": "2.0", "id": 2, "result": {"id": 4}}));
    });

    let client =
        TrackerClient::new(&config(&server).with_default_author(3), StageRef::Id(5)).unwrap();
    client
        .post_message(TaskId(1), "<p>x</p>", Some("stranger@example.com"))
        .await
        .unwrap();
    client
        .post_message(TaskId(1), "<p>y</p>", Some("stranger@example.com"))
        .await
        .unwrap();

    // Misses are not cached.
    lookup.assert_calls(2);
    post.assert_calls(2);
}

#[tokio::test]
async fn numeric_stage_needs_no_lookup() {
    let server = MockServer::start();
    let list = server.mock(|when, then| {
        when.method(POST)
            .path("/rpc")
            .body_includes(r#""method":"stage.list""#);
        then.status(200)
            .json_body(json!({"jsonrpc": "2.0", "id": 1, "result": []}));
    });

    let id = client(&server)
        .resolve_stage(&StageRef::Id(8))
        .await
        .unwrap();
    assert_eq!(id, Some(StageId(8)));
    list.assert_calls(0);
}

#[tokio::test]
async fn stage_names_match_case_insensitively() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/rpc")
            .body_includes(r#""method":"stage.list""#);
        then.status(200).json_body(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": [
                {"id": 1, "name": "Backlog"},
                {"id": 4, "name": "In Review "}
            ]
        }));
    });

    let client = client(&server);
    assert_eq!(
        client.resolve_stage(&StageRef::name("in review")).await.unwrap(),
        Some(StageId(4))
    );
    assert_eq!(
        client.resolve_stage(&StageRef::name("Shipped")).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn set_stage_without_target_uses_done() {
    let server = MockServer::start();
    let update = server.mock(|when, then| {
        when.method(POST)
            .path("/rpc")
            .body_includes(r#""method":"task.update""#)
            .body_includes(r#""params":{"id":12,"stage_id":5}"#);
        then.status(200)
            .json_body(json!({"jsonrpc": "2.0", "id": 1, "result": true}));
    });

    client(&server).set_stage(TaskId(12), None).await.unwrap();
    update.assert_calls(1);
}

#[tokio::test]
async fn set_stage_unknown_name_fails_without_update() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST)
            .path("/rpc")
            .body_includes(r#""method":"stage.list""#);
        then.status(200)
            .json_body(json!({"jsonrpc": "2.0", "id": 1, "result": [{"id": 1, "name": "Backlog"}]}));
    });
    let update = server.mock(|when, then| {
        when.method(POST)
            .path("/rpc")
            .body_includes(r#""method":"task.update""#);
        then.status(200)
            .json_body(json!({"jsonrpc": "2.0", "id": 2, "result": true}));
    });

    let err = client(&server)
        .set_stage(TaskId(12), Some(&StageRef::name("Review")))
        .await
        .unwrap_err();
    assert_eq!(err, TrackerError::StageNotFound("Review".to_string()));
    update.assert_calls(0);
}

#[tokio::test]
async fn unreachable_tracker_surfaces_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = TrackerConfig::new(&format!("http://{addr}/rpc")).with_retry(RetryPolicy::new(3, 1));
    let client = TrackerClient::new(&config, StageRef::Id(5)).unwrap();

    let err = client.fetch_task(TaskId(1)).await.unwrap_err();
    assert!(matches!(err, TrackerError::Transport(_)), "{err:?}");
}
